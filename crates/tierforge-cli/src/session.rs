//! Editing sessions over a stored tier list.
//!
//! A session loads the category's catalog and the list's tier document,
//! rebuilds the assignment, applies edits in memory and writes the
//! document back on [`EditSession::save`].

use crate::error::{CliError, Result};
use tierforge_domain::traits::{ProductCatalog, TierListStore};
use tierforge_domain::{
    Destination, DragSession, DropTarget, MoveEffect, MoveRejected, ProductRef, RecordId,
    StaleReference, TierAssignment, TierList, TierSet,
};

/// An open tier list being edited by its owner.
#[derive(Debug)]
pub struct EditSession {
    list: TierList,
    assignment: TierAssignment,
    stale: Vec<StaleReference>,
    ignored_tiers: Vec<String>,
    dirty: bool,
}

impl EditSession {
    /// Open list `id` for editing by `owner`.
    ///
    /// # Errors
    /// [`CliError::NotFound`] if `owner` cannot read the list, and
    /// [`CliError::NotPermitted`] if it is someone else's public list.
    pub fn open<S>(store: &S, id: RecordId, owner: RecordId, tiers: TierSet) -> Result<Self>
    where
        S: ProductCatalog + TierListStore,
        CliError: From<<S as ProductCatalog>::Error> + From<<S as TierListStore>::Error>,
    {
        let list = store
            .get_tier_list(id, Some(owner))?
            .ok_or_else(|| CliError::NotFound(format!("tier list {}", id)))?;
        if list.owner != owner {
            return Err(CliError::NotPermitted(format!(
                "tier list {} belongs to another user",
                id
            )));
        }

        let catalog = store.catalog(list.category_id)?;
        let loaded = TierAssignment::load_document(&list.tiers, tiers, catalog);
        // Dropped entries and unknown tiers change what a save would write
        let dirty = !loaded.stale.is_empty() || !loaded.ignored_tiers.is_empty();

        tracing::debug!(
            tier_list = %id,
            products = loaded.assignment.len(),
            stale = loaded.stale.len(),
            "Opened editing session"
        );

        Ok(Self {
            list,
            assignment: loaded.assignment,
            stale: loaded.stale,
            ignored_tiers: loaded.ignored_tiers,
            dirty,
        })
    }

    /// The stored list as it was opened.
    pub fn list(&self) -> &TierList {
        &self.list
    }

    /// Current in-memory assignment.
    pub fn assignment(&self) -> &TierAssignment {
        &self.assignment
    }

    /// Document entries dropped while loading.
    pub fn stale(&self) -> &[StaleReference] {
        &self.stale
    }

    /// Document keys that name no configured tier.
    pub fn ignored_tiers(&self) -> &[String] {
        &self.ignored_tiers
    }

    /// True if a save would change the stored document.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Move `product` to `destination`.
    pub fn move_product(
        &mut self,
        product: &ProductRef,
        destination: &Destination,
    ) -> std::result::Result<MoveEffect, MoveRejected> {
        let effect = self.assignment.move_product(product, destination)?;
        self.mark(&effect);
        Ok(effect)
    }

    /// Drop `product` onto the card of `anchor`, landing in front of it.
    pub fn drop_onto(
        &mut self,
        product: &ProductRef,
        anchor: &ProductRef,
    ) -> std::result::Result<MoveEffect, MoveRejected> {
        let drag = DragSession::start(product.clone());
        let effect = drag.drop_on(DropTarget::Product(anchor.clone()), &mut self.assignment)?;
        self.mark(&effect);
        Ok(effect)
    }

    /// Return every ranked product to Unranked.
    pub fn reset(&mut self) {
        let before = self.assignment.to_document();
        self.assignment.reset();
        if self.assignment.to_document() != before {
            self.dirty = true;
        }
    }

    /// Write the document back if anything changed.
    ///
    /// Returns whether a write happened.
    pub fn save<S>(&mut self, store: &mut S) -> Result<bool>
    where
        S: TierListStore,
        CliError: From<S::Error>,
    {
        if !self.dirty {
            return Ok(false);
        }
        let document = self.assignment.to_document();
        store.save_tiers(self.list.id, self.list.owner, &document)?;
        self.list.tiers = document;
        self.dirty = false;
        Ok(true)
    }

    fn mark(&mut self, effect: &MoveEffect) {
        if matches!(effect, MoveEffect::Moved { .. }) {
            self.dirty = true;
        }
    }
}
