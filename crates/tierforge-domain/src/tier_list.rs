//! Tier list records as kept by the persistence collaborator

use crate::document::TierDocument;
use crate::record::RecordId;
use serde::{Deserialize, Serialize};

/// A saved tier list
///
/// `likes` and `views` are owned by the store's counter operations; the
/// ranking model never touches them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierList {
    /// Unique identifier
    pub id: RecordId,
    /// Owning user
    pub owner: RecordId,
    /// Category whose products are ranked
    pub category_id: RecordId,
    /// Title
    pub title: String,
    /// Optional description
    pub description: Option<String>,
    /// Whether anonymous readers may fetch it
    pub is_public: bool,
    /// Ranked tiers
    pub tiers: TierDocument,
    /// Like counter
    pub likes: u64,
    /// View counter
    pub views: u64,
    /// Creation time (milliseconds since Unix epoch)
    pub created_at: u64,
    /// Last update time (milliseconds since Unix epoch)
    pub updated_at: u64,
}

impl TierList {
    /// True if `viewer` may read this list
    ///
    /// The owner always can; anyone else, signed in or not, only when the
    /// list is public.
    pub fn readable_by(&self, viewer: Option<RecordId>) -> bool {
        self.is_public || viewer == Some(self.owner)
    }

    /// Combined score used by the "popular" ordering
    pub fn popularity(&self) -> u64 {
        self.likes.saturating_add(self.views)
    }
}

/// Totals over every tier list of one user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    /// Tier lists owned
    pub tier_lists: u32,
    /// Of which public
    pub public_tier_lists: u32,
    /// Sum of view counters
    pub views: u64,
    /// Sum of like counters
    pub likes: u64,
}

impl Engagement {
    /// Add one list's counters
    pub fn record(&mut self, list: &TierList) {
        self.tier_lists += 1;
        if list.is_public {
            self.public_tier_lists += 1;
        }
        self.views = self.views.saturating_add(list.views);
        self.likes = self.likes.saturating_add(list.likes);
    }
}

impl<'a> FromIterator<&'a TierList> for Engagement {
    fn from_iter<I: IntoIterator<Item = &'a TierList>>(lists: I) -> Self {
        let mut engagement = Engagement::default();
        for list in lists {
            engagement.record(list);
        }
        engagement
    }
}
