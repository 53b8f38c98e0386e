//! Tier bucket store - the partition of product refs across tiers
//!
//! A [`TierAssignment`] owns one ordered bucket per configured tier plus the
//! unranked bucket. Every ref it knows appears in exactly one bucket, and the
//! order within a bucket is the user's ranking inside that tier.
//!
//! A reverse index (`ProductRef -> Bucket`) is kept alongside the buckets so
//! locating a ref only scans the one bucket that holds it.

use crate::error::DomainError;
use crate::product::ProductRef;
use crate::tier::{Bucket, TierSet};
use std::collections::HashMap;

/// Where a ref currently sits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    /// Bucket holding the ref
    pub bucket: Bucket,
    /// Position within that bucket
    pub index: usize,
}

/// Read-only export of every bucket, tiers in rank order then unranked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    entries: Vec<(String, Vec<ProductRef>)>,
}

impl Snapshot {
    /// Contents of the bucket with the given name
    pub fn get(&self, name: &str) -> Option<&[ProductRef]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, refs)| refs.as_slice())
    }

    /// Iterate `(bucket name, refs)` pairs in display order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ProductRef])> {
        self.entries
            .iter()
            .map(|(n, refs)| (n.as_str(), refs.as_slice()))
    }

    /// Consume the snapshot into its entries
    pub fn into_entries(self) -> Vec<(String, Vec<ProductRef>)> {
        self.entries
    }
}

/// Partition of product refs across an ordered tier set plus unranked
#[derive(Debug, Clone)]
pub struct TierAssignment {
    tiers: TierSet,
    ranked: Vec<Vec<ProductRef>>,
    unranked: Vec<ProductRef>,
    index: HashMap<ProductRef, Bucket>,
}

impl PartialEq for TierAssignment {
    // The reverse index is derived from the buckets.
    fn eq(&self, other: &Self) -> bool {
        self.tiers == other.tiers
            && self.ranked == other.ranked
            && self.unranked == other.unranked
    }
}

impl Eq for TierAssignment {}

impl TierAssignment {
    /// Create an assignment with every ref in unranked, in the order given
    ///
    /// Repeated refs keep their first position only.
    ///
    /// # Errors
    /// Returns [`DomainError::Configuration`] if the tier names are invalid.
    ///
    /// # Examples
    ///
    /// ```
    /// use tierforge_domain::{ProductRef, TierAssignment, UNRANKED};
    ///
    /// let assignment = TierAssignment::initialize(
    ///     ["S", "A", "B", "C", "D"],
    ///     ["p1", "p2", "p3"].map(ProductRef::from),
    /// ).unwrap();
    ///
    /// assert_eq!(assignment.bucket(UNRANKED).unwrap().len(), 3);
    /// assert!(assignment.bucket("S").unwrap().is_empty());
    /// ```
    pub fn initialize<I, S, R>(tier_names: I, refs: R) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        R: IntoIterator<Item = ProductRef>,
    {
        let tiers = TierSet::new(tier_names)?;
        Ok(Self::with_tiers(tiers, refs))
    }

    /// Create an assignment over an already validated tier set
    pub fn with_tiers<R>(tiers: TierSet, refs: R) -> Self
    where
        R: IntoIterator<Item = ProductRef>,
    {
        let mut assignment = Self::empty(tiers);
        for r in refs {
            assignment.push(Bucket::Unranked, r);
        }
        assignment
    }

    pub(crate) fn empty(tiers: TierSet) -> Self {
        let ranked = vec![Vec::new(); tiers.len()];
        Self {
            tiers,
            ranked,
            unranked: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// The configured tier set
    pub fn tiers(&self) -> &TierSet {
        &self.tiers
    }

    /// Contents of the bucket with the given name (a tier or [`UNRANKED`](crate::UNRANKED))
    pub fn bucket(&self, name: &str) -> Option<&[ProductRef]> {
        self.tiers
            .bucket(name)
            .map(|bucket| self.refs_in(bucket).as_slice())
    }

    /// Name of a bucket of this assignment
    pub fn bucket_name(&self, bucket: Bucket) -> &str {
        self.tiers.bucket_name(bucket)
    }

    /// Find the bucket and position holding `product`
    pub fn locate(&self, product: &ProductRef) -> Option<Location> {
        let bucket = *self.index.get(product)?;
        let index = self.refs_in(bucket).iter().position(|r| r == product)?;
        Some(Location { bucket, index })
    }

    /// True if `product` is held by any bucket
    pub fn contains(&self, product: &ProductRef) -> bool {
        self.index.contains_key(product)
    }

    /// Total number of refs across all buckets
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// True if the assignment holds no refs
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Export every bucket by name
    pub fn snapshot(&self) -> Snapshot {
        let entries = self
            .tiers
            .buckets()
            .map(|b| (self.bucket_name(b).to_string(), self.refs_in(b).clone()))
            .collect();
        Snapshot { entries }
    }

    /// All refs in bucket order: tiers first, then unranked
    pub fn catalog(&self) -> Vec<ProductRef> {
        self.ranked
            .iter()
            .flatten()
            .chain(self.unranked.iter())
            .cloned()
            .collect()
    }

    /// Return every ranked ref to unranked
    ///
    /// The new unranked order is [`catalog`](Self::catalog) order.
    pub fn reset(&mut self) {
        let all = self.catalog();
        let ranked_count: usize = self.ranked.iter().map(Vec::len).sum();
        for bucket in &mut self.ranked {
            bucket.clear();
        }
        for r in &all {
            self.index.insert(r.clone(), Bucket::Unranked);
        }
        self.unranked = all;
        tracing::debug!(returned = ranked_count, "Reset tier assignment");
    }

    pub(crate) fn refs_in(&self, bucket: Bucket) -> &Vec<ProductRef> {
        match bucket {
            Bucket::Ranked(i) => &self.ranked[i],
            Bucket::Unranked => &self.unranked,
        }
    }

    fn refs_in_mut(&mut self, bucket: Bucket) -> &mut Vec<ProductRef> {
        match bucket {
            Bucket::Ranked(i) => &mut self.ranked[i],
            Bucket::Unranked => &mut self.unranked,
        }
    }

    /// Append a ref to a bucket; returns false if the ref is already held
    pub(crate) fn push(&mut self, bucket: Bucket, product: ProductRef) -> bool {
        if self.index.contains_key(&product) {
            return false;
        }
        self.index.insert(product.clone(), bucket);
        self.refs_in_mut(bucket).push(product);
        true
    }

    /// Remove the ref at `location`, closing the gap
    pub(crate) fn take(&mut self, location: Location) -> ProductRef {
        let product = self.refs_in_mut(location.bucket).remove(location.index);
        self.index.remove(&product);
        product
    }

    /// Insert a ref not currently held, clamping the position to the bucket end
    pub(crate) fn insert(&mut self, bucket: Bucket, index: usize, product: ProductRef) -> usize {
        let refs = self.refs_in_mut(bucket);
        let index = index.min(refs.len());
        refs.insert(index, product.clone());
        self.index.insert(product, bucket);
        index
    }
}

impl Default for TierAssignment {
    fn default() -> Self {
        Self::empty(TierSet::standard())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tier::UNRANKED;

    fn refs(ids: &[&str]) -> Vec<ProductRef> {
        ids.iter().map(|s| ProductRef::from(*s)).collect()
    }

    #[test]
    fn test_initialize_places_all_in_unranked() {
        let a = TierAssignment::initialize(["S", "A", "B", "C", "D"], refs(&["p1", "p2", "p3"]))
            .unwrap();

        assert_eq!(a.bucket(UNRANKED).unwrap(), refs(&["p1", "p2", "p3"]).as_slice());
        for tier in ["S", "A", "B", "C", "D"] {
            assert!(a.bucket(tier).unwrap().is_empty());
        }
        assert_eq!(a.len(), 3);
    }

    #[test]
    fn test_initialize_rejects_duplicate_tiers() {
        let result = TierAssignment::initialize(["S", "S"], refs(&["p1"]));
        assert!(matches!(result, Err(DomainError::Configuration(_))));
    }

    #[test]
    fn test_initialize_collapses_repeated_refs() {
        let a = TierAssignment::initialize(["S"], refs(&["p1", "p2", "p1"])).unwrap();
        assert_eq!(a.bucket(UNRANKED).unwrap(), refs(&["p1", "p2"]).as_slice());
    }

    #[test]
    fn test_locate() {
        let a = TierAssignment::initialize(["S", "A"], refs(&["p1", "p2"])).unwrap();

        let loc = a.locate(&ProductRef::from("p2")).unwrap();
        assert_eq!(loc.bucket, Bucket::Unranked);
        assert_eq!(loc.index, 1);
        assert!(a.locate(&ProductRef::from("p9")).is_none());
    }

    #[test]
    fn test_snapshot_order() {
        let a = TierAssignment::initialize(["S", "A"], refs(&["p1"])).unwrap();
        let snapshot = a.snapshot();
        let names: Vec<&str> = snapshot.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["S", "A", UNRANKED]);
        assert_eq!(snapshot.get(UNRANKED).unwrap(), refs(&["p1"]).as_slice());
    }

    #[test]
    fn test_unknown_bucket_name() {
        let a = TierAssignment::default();
        assert!(a.bucket("Z").is_none());
        assert!(a.is_empty());
    }

    #[test]
    fn test_reset_returns_everything_to_unranked() {
        let mut a = TierAssignment::initialize(["S", "A"], refs(&["p1", "p2", "p3"])).unwrap();
        let loc = a.locate(&ProductRef::from("p3")).unwrap();
        let p3 = a.take(loc);
        a.insert(Bucket::Ranked(0), 0, p3);

        a.reset();

        assert!(a.bucket("S").unwrap().is_empty());
        assert_eq!(a.bucket(UNRANKED).unwrap(), refs(&["p3", "p1", "p2"]).as_slice());
        assert_eq!(
            a.locate(&ProductRef::from("p3")).unwrap().bucket,
            Bucket::Unranked
        );
    }
}
