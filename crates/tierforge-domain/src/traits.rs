//! Trait definitions for external collaborators
//!
//! These traits define the boundaries between the domain and
//! infrastructure. Implementations live in other crates (tierforge-store).

use crate::document::TierDocument;
use crate::plan::{SubscriptionTier, Usage};
use crate::product::ProductRef;
use crate::record::RecordId;
use crate::tier_list::TierList;

/// Supplies the products of one category
pub trait ProductCatalog {
    /// Error type for catalog operations
    type Error;

    /// Product refs of a category, oldest first
    fn catalog(&self, category_id: RecordId) -> Result<Vec<ProductRef>, Self::Error>;
}

/// Stores tier lists and their counters
pub trait TierListStore {
    /// Error type for store operations
    type Error;

    /// Fetch a tier list readable by `viewer` (`None` for anonymous)
    fn get_tier_list(
        &self,
        id: RecordId,
        viewer: Option<RecordId>,
    ) -> Result<Option<TierList>, Self::Error>;

    /// Replace the tiers of a list owned by `owner`
    fn save_tiers(
        &mut self,
        id: RecordId,
        owner: RecordId,
        tiers: &TierDocument,
    ) -> Result<(), Self::Error>;

    /// Count one view; returns the new total
    fn record_view(&mut self, id: RecordId) -> Result<u64, Self::Error>;

    /// Like a list; false if `user` had already liked it
    fn like(&mut self, id: RecordId, user: RecordId) -> Result<bool, Self::Error>;

    /// Remove a like; false if there was none
    fn unlike(&mut self, id: RecordId, user: RecordId) -> Result<bool, Self::Error>;

    /// True if `user` likes the list
    fn has_liked(&self, id: RecordId, user: RecordId) -> Result<bool, Self::Error>;

    /// Search public tier lists
    fn explore(&self, query: &ExploreQuery) -> Result<Vec<TierList>, Self::Error>;
}

/// Reports what a user has created and which plan they are on
pub trait UsageSource {
    /// Error type for usage lookups
    type Error;

    /// Current record counts of `owner`
    fn usage(&self, owner: RecordId) -> Result<Usage, Self::Error>;

    /// Plan of `owner`
    fn subscription(&self, owner: RecordId) -> Result<SubscriptionTier, Self::Error>;
}

/// Ordering of public tier lists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExploreSort {
    /// Likes plus views, highest first
    #[default]
    Popular,
    /// Likes, highest first
    Likes,
    /// Views, highest first
    Views,
    /// Newest first
    Recent,
}

impl ExploreSort {
    /// Parse a sort name (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "popular" => Some(ExploreSort::Popular),
            "likes" => Some(ExploreSort::Likes),
            "views" => Some(ExploreSort::Views),
            "recent" => Some(ExploreSort::Recent),
            _ => None,
        }
    }
}

/// Criteria for browsing public tier lists
#[derive(Debug, Clone, Default)]
pub struct ExploreQuery {
    /// Case-insensitive match on title, description or category name
    pub search: Option<String>,

    /// Restrict to one category
    pub category_id: Option<RecordId>,

    /// Result ordering
    pub sort: ExploreSort,

    /// Maximum results to return
    pub limit: Option<usize>,
}
