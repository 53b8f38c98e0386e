//! TierForge Domain Layer
//!
//! This crate contains the core domain model for TierForge: ranked comparisons
//! ("tier lists") of tech products. It performs no I/O and defines the value
//! objects, the tier assignment model, and the trait interfaces that the
//! storage and presentation layers depend upon.
//!
//! ## Key Concepts
//!
//! - **ProductRef**: Opaque identifier of a product owned by the catalog
//! - **Tier**: A named rank bucket (S, A, B, C, D by default)
//! - **TierAssignment**: Partition of product refs across tiers plus Unranked
//! - **Move**: The single mutation primitive relocating one ref between buckets
//! - **TierDocument**: Persisted form, tier name to ordered product ids
//! - **Parameters**: Typed, user-defined attributes attached to categories
//! - **Plan limits**: Per-subscription ceilings on what a user may create
//!
//! ## Architecture
//!
//! - Pure domain logic, no storage or network access
//! - Infrastructure implementations live in other crates
//! - Trait definitions for all external collaborators

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod assignment;
pub mod catalog;
pub mod document;
pub mod error;
pub mod moves;
pub mod parameter;
pub mod plan;
pub mod product;
pub mod record;
pub mod tier;
pub mod tier_list;
pub mod traits;

// Re-exports for convenience
pub use assignment::{Location, Snapshot, TierAssignment};
pub use catalog::{Category, Product, Profile};
pub use document::{LoadedAssignment, StaleReason, StaleReference, TierDocument};
pub use error::DomainError;
pub use moves::{Destination, DragSession, DropTarget, MoveEffect, MoveRejected};
pub use parameter::{ParameterDefinition, ParameterError, ParameterKind, ParameterValue};
pub use plan::{LimitExceeded, PlanLimits, Resource, SubscriptionTier, Usage};
pub use product::ProductRef;
pub use record::RecordId;
pub use tier::{Bucket, StandardTier, TierSet, UNRANKED};
pub use tier_list::{Engagement, TierList};
