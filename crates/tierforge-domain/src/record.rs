//! Record identifiers for profiles, categories, parameters, products and tier lists

use crate::error::DomainError;
use std::fmt;

/// Unique identifier for a stored record, based on UUIDv7
///
/// UUIDv7 provides:
/// - Chronological sortability (newest-first listings sort by id)
/// - 128-bit uniqueness
/// - No coordination required for generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(u128);

impl RecordId {
    /// Generate a new UUIDv7-based RecordId
    ///
    /// # Examples
    ///
    /// ```
    /// use tierforge_domain::RecordId;
    ///
    /// let id = RecordId::new();
    /// assert!(id.value() > 0);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create a RecordId from a raw u128 value
    ///
    /// This is primarily for storage layer deserialization.
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse a RecordId from its hyphenated UUID string
    ///
    /// # Examples
    ///
    /// ```
    /// use tierforge_domain::RecordId;
    ///
    /// let id = RecordId::new();
    /// let parsed = RecordId::parse(&id.to_string()).unwrap();
    /// assert_eq!(id, parsed);
    /// ```
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        uuid::Uuid::parse_str(s.trim())
            .map(|u| Self(u.as_u128()))
            .map_err(|e| DomainError::InvalidId(format!("'{}': {}", s, e)))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }

    /// Milliseconds since the Unix epoch encoded in the top 48 bits
    pub fn timestamp(&self) -> u64 {
        (self.0 >> 80) as u64
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

impl std::str::FromStr for RecordId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_ordering() {
        let a = RecordId::from_value(1000);
        let b = RecordId::from_value(2000);
        assert!(a < b);
    }

    #[test]
    fn test_record_id_chronological() {
        let first = RecordId::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = RecordId::new();

        assert!(first < second);
        assert!(first.timestamp() <= second.timestamp());
    }

    #[test]
    fn test_record_id_display_and_parse() {
        let id = RecordId::new();
        let s = id.to_string();
        assert_eq!(s.len(), 36);
        assert_eq!(RecordId::parse(&s).unwrap(), id);
        assert_eq!(s.parse::<RecordId>().unwrap(), id);
    }

    #[test]
    fn test_record_id_invalid_string() {
        assert!(RecordId::parse("not-a-uuid").is_err());
        assert!(RecordId::parse("").is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: string form parses back to the same id
        #[test]
        fn test_record_id_string_roundtrip(value: u128) {
            let id = RecordId::from_value(value);
            match RecordId::parse(&id.to_string()) {
                Ok(parsed) => prop_assert_eq!(id, parsed),
                Err(e) => return Err(TestCaseError::fail(e.to_string())),
            }
        }
    }
}
