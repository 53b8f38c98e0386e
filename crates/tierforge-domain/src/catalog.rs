//! Catalog records: profiles, categories and products

use crate::parameter::ParameterValue;
use crate::plan::SubscriptionTier;
use crate::product::ProductRef;
use crate::record::RecordId;
use std::collections::BTreeMap;

/// A registered user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    /// Unique identifier
    pub id: RecordId,
    /// Login email, unique
    pub email: String,
    /// Optional public handle
    pub username: Option<String>,
    /// Current plan
    pub subscription: SubscriptionTier,
}

/// A user-defined product category (e.g. "Gaming Mice")
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// Unique identifier
    pub id: RecordId,
    /// Owning user
    pub owner: RecordId,
    /// Display name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Creation time (milliseconds since Unix epoch)
    pub created_at: u64,
}

/// A cataloged product within a category
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Unique identifier
    pub id: RecordId,
    /// Owning user
    pub owner: RecordId,
    /// Category the product belongs to
    pub category_id: RecordId,
    /// Display name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Optional image location
    pub image_url: Option<String>,
    /// Values keyed by parameter name
    pub parameter_values: BTreeMap<String, ParameterValue>,
    /// Creation time (milliseconds since Unix epoch)
    pub created_at: u64,
}

impl Product {
    /// Identity of this product as seen by tier assignments
    pub fn product_ref(&self) -> ProductRef {
        ProductRef::new(self.id.to_string())
    }
}
