//! Move operation - relocating one product ref between buckets
//!
//! Moves never perform I/O and never leave an assignment half-updated: on
//! every rejected or no-op path the assignment is exactly what it was.
//!
//! A drag in progress is an explicit [`DragSession`] value handed to the
//! drop handler rather than shared state between event handlers.

use crate::assignment::{Location, TierAssignment};
use crate::product::ProductRef;
use thiserror::Error;

/// Where a moved ref should land
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    /// Target bucket: a tier name or [`UNRANKED`](crate::UNRANKED)
    pub bucket: String,
    /// Insert before this ref; append when `None` or absent from the bucket
    pub before: Option<ProductRef>,
}

impl Destination {
    /// Append to the end of `bucket`
    pub fn end_of(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            before: None,
        }
    }

    /// Insert into `bucket` ahead of `anchor`
    pub fn before(bucket: impl Into<String>, anchor: ProductRef) -> Self {
        Self {
            bucket: bucket.into(),
            before: Some(anchor),
        }
    }
}

/// What a successful move did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveEffect {
    /// The ref changed buckets
    Moved {
        /// Position before the move
        from: Location,
        /// Position after the move
        to: Location,
    },
    /// Source and destination are the same bucket; in-bucket reordering is
    /// not supported through this path
    Unchanged,
}

/// Recoverable reasons a move was ignored
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveRejected {
    /// The ref is not held by any bucket
    #[error("Product not found in tier list: {0}")]
    RefNotFound(ProductRef),

    /// The destination names no configured tier and is not unranked
    #[error("Invalid destination: {0}")]
    InvalidDestination(String),
}

impl TierAssignment {
    /// Move `product` to `destination`
    ///
    /// # Errors
    /// Returns [`MoveRejected`] without touching the assignment when the ref
    /// is unknown or the destination bucket does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use tierforge_domain::{Destination, ProductRef, TierAssignment, UNRANKED};
    ///
    /// let mut a = TierAssignment::initialize(
    ///     ["S", "A", "B", "C", "D"],
    ///     ["p1", "p2", "p3"].map(ProductRef::from),
    /// ).unwrap();
    ///
    /// a.move_product(&ProductRef::from("p2"), &Destination::end_of("S")).unwrap();
    ///
    /// assert_eq!(a.bucket("S").unwrap(), &[ProductRef::from("p2")]);
    /// assert_eq!(a.bucket(UNRANKED).unwrap().len(), 2);
    /// ```
    pub fn move_product(
        &mut self,
        product: &ProductRef,
        destination: &Destination,
    ) -> Result<MoveEffect, MoveRejected> {
        let from = self
            .locate(product)
            .ok_or_else(|| MoveRejected::RefNotFound(product.clone()))?;

        let target = self
            .tiers()
            .bucket(&destination.bucket)
            .ok_or_else(|| MoveRejected::InvalidDestination(destination.bucket.clone()))?;

        if from.bucket == target {
            return Ok(MoveEffect::Unchanged);
        }

        // Resolved before removal; source and target differ so the index holds.
        let anchor = destination
            .before
            .as_ref()
            .and_then(|anchor| self.refs_in(target).iter().position(|r| r == anchor));

        let taken = self.take(from);
        let index = self.insert(target, anchor.unwrap_or(usize::MAX), taken);

        tracing::trace!(
            product = %product,
            from = self.bucket_name(from.bucket),
            to = self.bucket_name(target),
            index,
            "Moved product"
        );

        Ok(MoveEffect::Moved {
            from,
            to: Location {
                bucket: target,
                index,
            },
        })
    }

    /// Copy-on-write form of [`move_product`](Self::move_product)
    ///
    /// `self` is left untouched; the returned assignment carries the move.
    pub fn moved(
        &self,
        product: &ProductRef,
        destination: &Destination,
    ) -> (TierAssignment, Result<MoveEffect, MoveRejected>) {
        let mut next = self.clone();
        let result = next.move_product(product, destination);
        (next, result)
    }
}

/// What a dragged card was dropped onto
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// A bucket's drop area: append to the end
    Bucket(String),
    /// Another card: take its bucket, land in front of it
    Product(ProductRef),
}

impl DropTarget {
    /// Resolve the drop target against the current assignment
    ///
    /// # Errors
    /// A product anchor that no bucket holds is an invalid destination.
    pub fn resolve(&self, assignment: &TierAssignment) -> Result<Destination, MoveRejected> {
        match self {
            DropTarget::Bucket(name) => Ok(Destination::end_of(name.clone())),
            DropTarget::Product(anchor) => {
                let location = assignment
                    .locate(anchor)
                    .ok_or_else(|| MoveRejected::InvalidDestination(anchor.to_string()))?;
                Ok(Destination::before(
                    assignment.bucket_name(location.bucket),
                    anchor.clone(),
                ))
            }
        }
    }
}

/// A drag in progress, holding the dragged ref explicitly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession {
    product: ProductRef,
}

impl DragSession {
    /// Begin dragging `product`
    pub fn start(product: ProductRef) -> Self {
        Self { product }
    }

    /// The ref being dragged
    pub fn product(&self) -> &ProductRef {
        &self.product
    }

    /// Complete the drag by dropping onto `target`
    pub fn drop_on(
        self,
        target: DropTarget,
        assignment: &mut TierAssignment,
    ) -> Result<MoveEffect, MoveRejected> {
        if !assignment.contains(&self.product) {
            return Err(MoveRejected::RefNotFound(self.product));
        }
        let destination = target.resolve(assignment)?;
        assignment.move_product(&self.product, &destination)
    }

    /// Abandon the drag; nothing is moved
    pub fn cancel(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::to_document;
    use crate::tier::{Bucket, UNRANKED};

    fn refs(ids: &[&str]) -> Vec<ProductRef> {
        ids.iter().map(|s| ProductRef::from(*s)).collect()
    }

    fn standard(ids: &[&str]) -> TierAssignment {
        TierAssignment::initialize(["S", "A", "B", "C", "D"], refs(ids)).unwrap()
    }

    #[test]
    fn test_move_to_tier_end() {
        let mut a = standard(&["p1", "p2", "p3"]);

        let effect = a
            .move_product(&ProductRef::from("p2"), &Destination::end_of("S"))
            .unwrap();

        assert_eq!(a.bucket("S").unwrap(), refs(&["p2"]).as_slice());
        assert_eq!(a.bucket(UNRANKED).unwrap(), refs(&["p1", "p3"]).as_slice());
        assert_eq!(
            effect,
            MoveEffect::Moved {
                from: Location { bucket: Bucket::Unranked, index: 1 },
                to: Location { bucket: Bucket::Ranked(0), index: 0 },
            }
        );

        let doc = to_document(&a);
        assert_eq!(doc.get("S").unwrap(), refs(&["p2"]).as_slice());
        for tier in ["A", "B", "C", "D"] {
            assert!(doc.get(tier).unwrap().is_empty());
        }
    }

    #[test]
    fn test_move_before_anchor() {
        let mut a = standard(&["p1", "p2", "p3"]);
        a.move_product(&ProductRef::from("p1"), &Destination::end_of("A")).unwrap();
        a.move_product(&ProductRef::from("p2"), &Destination::end_of("A")).unwrap();

        a.move_product(
            &ProductRef::from("p3"),
            &Destination::before("A", ProductRef::from("p2")),
        )
        .unwrap();

        assert_eq!(a.bucket("A").unwrap(), refs(&["p1", "p3", "p2"]).as_slice());
        assert!(a.bucket(UNRANKED).unwrap().is_empty());
    }

    #[test]
    fn test_anchor_outside_destination_appends() {
        let mut a = standard(&["p1", "p2", "p3"]);
        a.move_product(&ProductRef::from("p1"), &Destination::end_of("A")).unwrap();

        // p3 sits in unranked, not in A
        a.move_product(
            &ProductRef::from("p2"),
            &Destination::before("A", ProductRef::from("p3")),
        )
        .unwrap();

        assert_eq!(a.bucket("A").unwrap(), refs(&["p1", "p2"]).as_slice());
    }

    #[test]
    fn test_move_unknown_ref_is_rejected() {
        let mut a = standard(&["p1", "p2", "p3"]);
        a.move_product(&ProductRef::from("p2"), &Destination::end_of("S")).unwrap();
        let before = a.clone();

        let result = a.move_product(&ProductRef::from("p9"), &Destination::end_of("A"));

        assert_eq!(result, Err(MoveRejected::RefNotFound(ProductRef::from("p9"))));
        assert_eq!(a, before);
    }

    #[test]
    fn test_move_to_unknown_bucket_is_rejected() {
        let mut a = standard(&["p1"]);
        let before = a.clone();

        let result = a.move_product(&ProductRef::from("p1"), &Destination::end_of("F"));

        assert_eq!(result, Err(MoveRejected::InvalidDestination("F".to_string())));
        assert_eq!(a, before);
    }

    #[test]
    fn test_same_bucket_is_noop() {
        let mut a = standard(&["p1", "p2"]);
        a.move_product(&ProductRef::from("p1"), &Destination::end_of("B")).unwrap();
        a.move_product(&ProductRef::from("p2"), &Destination::end_of("B")).unwrap();
        let before = a.clone();

        let effect = a
            .move_product(
                &ProductRef::from("p2"),
                &Destination::before("B", ProductRef::from("p1")),
            )
            .unwrap();

        assert_eq!(effect, MoveEffect::Unchanged);
        assert_eq!(a, before);
    }

    #[test]
    fn test_move_back_to_unranked() {
        let mut a = standard(&["p1", "p2"]);
        a.move_product(&ProductRef::from("p1"), &Destination::end_of("C")).unwrap();
        a.move_product(
            &ProductRef::from("p1"),
            &Destination::before(UNRANKED, ProductRef::from("p2")),
        )
        .unwrap();

        assert!(a.bucket("C").unwrap().is_empty());
        assert_eq!(a.bucket(UNRANKED).unwrap(), refs(&["p1", "p2"]).as_slice());
    }

    #[test]
    fn test_moved_leaves_input_untouched() {
        let a = standard(&["p1"]);
        let (next, result) = a.moved(&ProductRef::from("p1"), &Destination::end_of("D"));

        assert!(result.is_ok());
        assert_eq!(a.bucket(UNRANKED).unwrap().len(), 1);
        assert_eq!(next.bucket("D").unwrap(), refs(&["p1"]).as_slice());
    }

    #[test]
    fn test_drag_session_drop_on_product() {
        let mut a = standard(&["p1", "p2", "p3"]);
        a.move_product(&ProductRef::from("p1"), &Destination::end_of("S")).unwrap();

        DragSession::start(ProductRef::from("p3"))
            .drop_on(DropTarget::Product(ProductRef::from("p1")), &mut a)
            .unwrap();

        assert_eq!(a.bucket("S").unwrap(), refs(&["p3", "p1"]).as_slice());
    }

    #[test]
    fn test_drag_session_drop_on_bucket() {
        let mut a = standard(&["p1"]);
        let session = DragSession::start(ProductRef::from("p1"));
        assert_eq!(session.product().as_str(), "p1");

        session
            .drop_on(DropTarget::Bucket("A".to_string()), &mut a)
            .unwrap();

        assert_eq!(a.bucket("A").unwrap(), refs(&["p1"]).as_slice());
    }

    #[test]
    fn test_drag_session_unknown_anchor() {
        let mut a = standard(&["p1"]);
        let before = a.clone();

        let result = DragSession::start(ProductRef::from("p1"))
            .drop_on(DropTarget::Product(ProductRef::from("ghost")), &mut a);

        assert_eq!(
            result,
            Err(MoveRejected::InvalidDestination("ghost".to_string()))
        );
        assert_eq!(a, before);
    }

    #[test]
    fn test_drag_session_unknown_product_reported_first() {
        let mut a = standard(&["p1"]);
        let result = DragSession::start(ProductRef::from("p9"))
            .drop_on(DropTarget::Product(ProductRef::from("ghost")), &mut a);

        assert_eq!(result, Err(MoveRejected::RefNotFound(ProductRef::from("p9"))));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::document::to_document;
    use crate::tier::UNRANKED;
    use proptest::prelude::*;
    use std::collections::HashSet;

    const BUCKETS: [&str; 7] = ["S", "A", "B", "C", "D", UNRANKED, "X"];

    fn move_strategy() -> impl Strategy<Value = (usize, usize, Option<usize>)> {
        (0usize..10, 0usize..BUCKETS.len(), proptest::option::of(0usize..10))
    }

    fn apply(a: &mut TierAssignment, (product, bucket, anchor): (usize, usize, Option<usize>)) {
        let destination = Destination {
            bucket: BUCKETS[bucket].to_string(),
            before: anchor.map(|i| ProductRef::new(format!("p{}", i))),
        };
        // Refs p8 and p9 are never in the catalog
        let _ = a.move_product(&ProductRef::new(format!("p{}", product)), &destination);
    }

    fn catalog() -> Vec<ProductRef> {
        (0..8).map(|i| ProductRef::new(format!("p{}", i))).collect()
    }

    proptest! {
        /// Property: every ref sits in exactly one bucket after any move sequence
        #[test]
        fn test_partition_invariant(moves in proptest::collection::vec(move_strategy(), 0..40)) {
            let mut a = TierAssignment::initialize(["S", "A", "B", "C", "D"], catalog()).unwrap();
            for m in moves {
                apply(&mut a, m);
            }

            let snapshot = a.snapshot();
            let mut seen = HashSet::new();
            for (_, refs) in snapshot.iter() {
                for r in refs {
                    prop_assert!(seen.insert(r.clone()), "duplicate ref {}", r);
                }
            }
            let expected: HashSet<ProductRef> = catalog().into_iter().collect();
            prop_assert_eq!(seen, expected);

            for r in catalog() {
                let loc = a.locate(&r).unwrap();
                let bucket = snapshot.get(a.bucket_name(loc.bucket)).unwrap();
                prop_assert_eq!(&bucket[loc.index], &r);
            }
        }

        /// Property: document round-trip reproduces the assignment
        #[test]
        fn test_document_roundtrip(moves in proptest::collection::vec(move_strategy(), 0..40)) {
            let mut a = TierAssignment::initialize(["S", "A", "B", "C", "D"], catalog()).unwrap();
            for m in moves {
                apply(&mut a, m);
            }

            let doc = to_document(&a);
            let loaded = TierAssignment::from_document(
                &doc,
                ["S", "A", "B", "C", "D"],
                a.catalog(),
            ).unwrap();

            prop_assert!(loaded.stale.is_empty());
            prop_assert_eq!(loaded.assignment, a);
        }

        /// Property: rejected moves never change the assignment
        #[test]
        fn test_rejected_moves_are_noops(moves in proptest::collection::vec(move_strategy(), 0..20)) {
            let mut a = TierAssignment::initialize(["S", "A", "B", "C", "D"], catalog()).unwrap();
            for (product, bucket, anchor) in moves {
                let before = a.clone();
                let destination = Destination {
                    bucket: BUCKETS[bucket].to_string(),
                    before: anchor.map(|i| ProductRef::new(format!("p{}", i))),
                };
                let result = a.move_product(&ProductRef::new(format!("p{}", product)), &destination);
                if matches!(result, Err(_) | Ok(MoveEffect::Unchanged)) {
                    prop_assert_eq!(&a, &before);
                }
            }
        }
    }
}
