//! Category command implementation.

use crate::cli::{CategoryAction, CategoryArgs};
use crate::commands::parse_id;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use tierforge_store::SqliteStore;

/// Execute the category command.
pub fn execute_category(
    args: CategoryArgs,
    store: &mut SqliteStore,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    let owner = config.active_user()?;

    match args.action {
        CategoryAction::Add { name, description } => {
            let category = store.create_category(owner, &name, description.as_deref())?;
            println!("{}", formatter.created("Category", &category.id.to_string()));
        }
        CategoryAction::List => {
            let categories = store.list_categories(owner)?;
            println!("{}", formatter.format_categories(&categories)?);
        }
        CategoryAction::Edit {
            id,
            name,
            description,
        } => {
            if name.is_none() && description.is_none() {
                return Err(CliError::InvalidInput(
                    "Nothing to change; pass --name or --description".to_string(),
                ));
            }
            let category = store.update_category(
                owner,
                parse_id(&id, "category")?,
                name.as_deref(),
                description.as_deref(),
            )?;
            println!("{}", formatter.format_categories(&[category])?);
        }
        CategoryAction::Delete { id } => {
            store.delete_category(owner, parse_id(&id, "category")?)?;
            println!("{}", formatter.success("Category deleted"));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use tierforge_domain::SubscriptionTier;

    fn signed_in() -> (SqliteStore, Config) {
        let mut store = SqliteStore::new(":memory:").unwrap();
        let owner = store
            .create_profile("ana@example.com", None, SubscriptionTier::Standard)
            .unwrap()
            .id;
        let config = Config {
            active_user: Some(owner.to_string()),
            ..Default::default()
        };
        (store, config)
    }

    #[test]
    fn test_edit_and_delete_category() {
        let (mut store, config) = signed_in();
        let owner = config.active_user().unwrap();
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let id = store.create_category(owner, "Mice", None).unwrap().id;

        execute_category(
            CategoryArgs {
                action: CategoryAction::Edit {
                    id: id.to_string(),
                    name: Some("Gaming Mice".to_string()),
                    description: None,
                },
            },
            &mut store,
            &config,
            &formatter,
        )
        .unwrap();
        assert_eq!(store.get_category(id).unwrap().unwrap().name, "Gaming Mice");

        execute_category(
            CategoryArgs {
                action: CategoryAction::Delete { id: id.to_string() },
            },
            &mut store,
            &config,
            &formatter,
        )
        .unwrap();
        assert!(store.list_categories(owner).unwrap().is_empty());
    }

    #[test]
    fn test_edit_without_changes() {
        let (mut store, config) = signed_in();
        let id = store
            .create_category(config.active_user().unwrap(), "Mice", None)
            .unwrap()
            .id;
        let result = execute_category(
            CategoryArgs {
                action: CategoryAction::Edit {
                    id: id.to_string(),
                    name: None,
                    description: None,
                },
            },
            &mut store,
            &config,
            &Formatter::new(OutputFormat::Quiet, false),
        );
        assert!(matches!(result, Err(CliError::InvalidInput(_))));
    }
}
