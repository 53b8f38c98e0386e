//! Command implementations.

pub mod account;
pub mod category;
pub mod param;
pub mod product;
pub mod tier_list;

pub use self::account::{
    execute_analytics, execute_plan, execute_signup, execute_usage, execute_whoami,
};
pub use self::category::execute_category;
pub use self::param::execute_param;
pub use self::product::execute_product;
pub use self::tier_list::execute_tier_list;

use crate::error::{CliError, Result};
use tierforge_domain::RecordId;

/// Parse a record ID argument, naming what it should identify on failure.
pub(crate) fn parse_id(input: &str, what: &str) -> Result<RecordId> {
    RecordId::parse(input)
        .map_err(|_| CliError::InvalidInput(format!("'{}' is not a valid {} ID", input, what)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        let id = RecordId::new();
        assert_eq!(parse_id(&id.to_string(), "category").unwrap(), id);

        let err = parse_id("mice", "category").unwrap_err();
        assert!(err.to_string().contains("category"));
    }
}
