//! Tier module - named rank buckets and the configured tier set

use crate::error::DomainError;
use std::collections::HashSet;

/// Name of the implicit bucket holding refs not yet assigned to a tier.
///
/// Reserved: no configured tier may use it (compared case-insensitively).
pub const UNRANKED: &str = "unranked";

/// The default rank ladder, S best and D worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardTier {
    /// Top tier
    S,
    /// Excellent
    A,
    /// Good
    B,
    /// Mediocre
    C,
    /// Bottom tier
    D,
}

impl StandardTier {
    /// All standard tiers, best first
    pub const ALL: [StandardTier; 5] = [
        StandardTier::S,
        StandardTier::A,
        StandardTier::B,
        StandardTier::C,
        StandardTier::D,
    ];

    /// Get the tier name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            StandardTier::S => "S",
            StandardTier::A => "A",
            StandardTier::B => "B",
            StandardTier::C => "C",
            StandardTier::D => "D",
        }
    }
}

/// One bucket of an assignment, addressed by stable integer key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    /// A configured tier, by its position in the [`TierSet`]
    Ranked(usize),
    /// The implicit unranked bucket
    Unranked,
}

/// Validated, ordered list of distinct tier names
///
/// Fixed for the lifetime of an assignment. The unranked bucket is not part
/// of the set; it always exists alongside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TierSet {
    names: Vec<String>,
}

impl TierSet {
    /// Create a tier set from an ordered list of names
    ///
    /// # Errors
    /// Returns [`DomainError::Configuration`] if a name is blank, duplicated,
    /// or collides with the reserved unranked name.
    pub fn new<I, S>(names: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let mut seen = HashSet::with_capacity(names.len());

        for name in &names {
            if name.trim().is_empty() {
                return Err(DomainError::Configuration(
                    "Tier names cannot be blank".to_string(),
                ));
            }
            if name.eq_ignore_ascii_case(UNRANKED) {
                return Err(DomainError::Configuration(format!(
                    "'{}' is reserved for the unranked bucket",
                    name
                )));
            }
            if !seen.insert(name.as_str()) {
                return Err(DomainError::Configuration(format!(
                    "Duplicate tier name: {}",
                    name
                )));
            }
        }

        Ok(Self { names })
    }

    /// The default S, A, B, C, D ladder
    pub fn standard() -> Self {
        Self {
            names: StandardTier::ALL
                .iter()
                .map(|t| t.as_str().to_string())
                .collect(),
        }
    }

    /// Tier names in rank order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of configured tiers (unranked excluded)
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True when no tiers are configured
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Resolve a bucket name (a tier name or [`UNRANKED`]); exact match
    pub fn bucket(&self, name: &str) -> Option<Bucket> {
        if name == UNRANKED {
            return Some(Bucket::Unranked);
        }
        self.names.iter().position(|n| n == name).map(Bucket::Ranked)
    }

    /// Name of a bucket
    ///
    /// Panics if `bucket` is a ranked index outside this set.
    pub fn bucket_name(&self, bucket: Bucket) -> &str {
        match bucket {
            Bucket::Ranked(i) => &self.names[i],
            Bucket::Unranked => UNRANKED,
        }
    }

    /// All buckets in display order: tiers first, then unranked
    pub fn buckets(&self) -> impl Iterator<Item = Bucket> + '_ {
        (0..self.names.len())
            .map(Bucket::Ranked)
            .chain(std::iter::once(Bucket::Unranked))
    }
}

impl Default for TierSet {
    fn default() -> Self {
        Self::standard()
    }
}
