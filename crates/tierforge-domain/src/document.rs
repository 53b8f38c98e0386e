//! Serialization adapter - tier assignments to and from tier-documents
//!
//! The persisted tier-document maps each tier name to its ordered product
//! ids. Unranked is never persisted: on load, every catalog product missing
//! from the document lands there in catalog order.
//!
//! Loading is tolerant. Missing tiers read as empty, unknown tier keys are
//! ignored, and ids that are no longer in the catalog are dropped and
//! reported as [`StaleReference`]s instead of failing the load.

use crate::assignment::TierAssignment;
use crate::error::DomainError;
use crate::product::ProductRef;
use crate::tier::{Bucket, TierSet};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Persisted tier-document: tier name to ordered product ids
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TierDocument(BTreeMap<String, Vec<ProductRef>>);

/// A tier array entry as found in stored documents
///
/// Early documents stored whole product objects; only their `id` is kept.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Id(String),
    Object { id: String },
}

impl RawEntry {
    fn into_ref(self) -> ProductRef {
        match self {
            RawEntry::Id(id) | RawEntry::Object { id } => ProductRef::new(id),
        }
    }
}

impl<'de> Deserialize<'de> for TierDocument {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<String, Option<Vec<RawEntry>>>::deserialize(deserializer)?;
        Ok(Self(
            raw.into_iter()
                .map(|(tier, entries)| {
                    let refs = entries
                        .unwrap_or_default()
                        .into_iter()
                        .map(RawEntry::into_ref)
                        .collect();
                    (tier, refs)
                })
                .collect(),
        ))
    }
}

impl TierDocument {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// A document with an empty array for every tier in `tiers`
    pub fn empty_for(tiers: &TierSet) -> Self {
        Self(
            tiers
                .names()
                .iter()
                .map(|name| (name.clone(), Vec::new()))
                .collect(),
        )
    }

    /// Refs stored under `tier`
    pub fn get(&self, tier: &str) -> Option<&[ProductRef]> {
        self.0.get(tier).map(Vec::as_slice)
    }

    /// Replace the refs stored under `tier`
    pub fn insert(&mut self, tier: impl Into<String>, refs: Vec<ProductRef>) {
        self.0.insert(tier.into(), refs);
    }

    /// Tier keys present in the document
    pub fn tier_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Iterate `(tier, refs)` entries
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ProductRef])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of ranked refs across all tiers
    pub fn ranked_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    /// Parse a document from JSON
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidDocument`] on malformed JSON or a shape
    /// other than an object of arrays.
    pub fn from_json(json: &str) -> Result<Self, DomainError> {
        serde_json::from_str(json).map_err(|e| DomainError::InvalidDocument(e.to_string()))
    }

    /// Decode a document from an already parsed JSON value
    pub fn from_value(value: serde_json::Value) -> Result<Self, DomainError> {
        serde_json::from_value(value).map_err(|e| DomainError::InvalidDocument(e.to_string()))
    }

    /// Encode the document as compact JSON
    pub fn to_json(&self) -> Result<String, DomainError> {
        serde_json::to_string(self).map_err(|e| DomainError::InvalidDocument(e.to_string()))
    }
}

/// Why a document entry was dropped during load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleReason {
    /// The product is no longer in the catalog
    NotInCatalog,
    /// The product was already placed by an earlier entry
    Duplicate,
}

/// A document entry dropped during load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleReference {
    /// The dropped ref
    pub product: ProductRef,
    /// Tier the ref was listed under
    pub tier: String,
    /// Why it was dropped
    pub reason: StaleReason,
}

impl fmt::Display for StaleReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            StaleReason::NotInCatalog => {
                write!(f, "{} in tier {} is not in the catalog", self.product, self.tier)
            }
            StaleReason::Duplicate => {
                write!(f, "{} in tier {} is listed more than once", self.product, self.tier)
            }
        }
    }
}

/// Result of hydrating an assignment from a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedAssignment {
    /// The hydrated assignment
    pub assignment: TierAssignment,
    /// Entries dropped during load
    pub stale: Vec<StaleReference>,
    /// Document keys that name no configured tier
    pub ignored_tiers: Vec<String>,
}

/// Emit one entry per configured tier, unranked excluded
///
/// Empty tiers are written as empty arrays, never omitted.
pub fn to_document(assignment: &TierAssignment) -> TierDocument {
    let tiers = assignment.tiers();
    TierDocument(
        (0..tiers.len())
            .map(|i| {
                let bucket = Bucket::Ranked(i);
                (
                    tiers.bucket_name(bucket).to_string(),
                    assignment.refs_in(bucket).clone(),
                )
            })
            .collect(),
    )
}

impl TierAssignment {
    /// Persisted form of this assignment; see [`to_document`]
    pub fn to_document(&self) -> TierDocument {
        to_document(self)
    }

    /// Hydrate an assignment from a stored document
    ///
    /// # Errors
    /// Returns [`DomainError::Configuration`] if the tier names are invalid.
    /// Stale entries never fail the load.
    ///
    /// # Examples
    ///
    /// ```
    /// use tierforge_domain::{ProductRef, TierAssignment, TierDocument, UNRANKED};
    ///
    /// let doc = TierDocument::from_json(r#"{"S": ["p2", "gone"]}"#).unwrap();
    /// let loaded = TierAssignment::from_document(
    ///     &doc,
    ///     ["S", "A"],
    ///     ["p1", "p2"].map(ProductRef::from),
    /// ).unwrap();
    ///
    /// assert_eq!(loaded.assignment.bucket("S").unwrap(), &[ProductRef::from("p2")]);
    /// assert_eq!(loaded.assignment.bucket(UNRANKED).unwrap(), &[ProductRef::from("p1")]);
    /// assert_eq!(loaded.stale.len(), 1);
    /// ```
    pub fn from_document<I, S, C>(
        doc: &TierDocument,
        tier_names: I,
        catalog: C,
    ) -> Result<LoadedAssignment, DomainError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        C: IntoIterator<Item = ProductRef>,
    {
        let tiers = TierSet::new(tier_names)?;
        Ok(Self::load_document(doc, tiers, catalog))
    }

    /// Hydrate an assignment over an already validated tier set
    pub fn load_document<C>(doc: &TierDocument, tiers: TierSet, catalog: C) -> LoadedAssignment
    where
        C: IntoIterator<Item = ProductRef>,
    {
        let catalog: Vec<ProductRef> = catalog.into_iter().collect();
        let known: HashSet<&ProductRef> = catalog.iter().collect();

        let ignored_tiers: Vec<String> = doc
            .tier_names()
            .filter(|name| !tiers.names().iter().any(|n| n == name))
            .map(str::to_string)
            .collect();
        for name in &ignored_tiers {
            tracing::warn!(tier = %name, "Ignoring unknown tier in tier document");
        }

        let mut assignment = Self::empty(tiers);
        let mut stale = Vec::new();

        for i in 0..assignment.tiers().len() {
            let bucket = Bucket::Ranked(i);
            let name = assignment.bucket_name(bucket).to_string();
            let Some(refs) = doc.get(&name) else {
                continue;
            };

            for product in refs {
                let reason = if !known.contains(product) {
                    StaleReason::NotInCatalog
                } else if !assignment.push(bucket, product.clone()) {
                    StaleReason::Duplicate
                } else {
                    continue;
                };

                tracing::warn!(
                    product = %product,
                    tier = %name,
                    reason = ?reason,
                    "Dropping stale reference from tier document"
                );
                stale.push(StaleReference {
                    product: product.clone(),
                    tier: name.clone(),
                    reason,
                });
            }
        }

        for product in catalog.iter().cloned() {
            assignment.push(Bucket::Unranked, product);
        }

        LoadedAssignment {
            assignment,
            stale,
            ignored_tiers,
        }
    }
}
