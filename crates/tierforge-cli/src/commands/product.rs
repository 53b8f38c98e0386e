//! Product command implementation.

use crate::cli::{ProductAction, ProductArgs};
use crate::commands::parse_id;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use tierforge_store::{NewProduct, ProductUpdate, SqliteStore};

/// Execute the product command.
pub fn execute_product(
    args: ProductArgs,
    store: &mut SqliteStore,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    match args.action {
        ProductAction::Add {
            category,
            name,
            description,
            image_url,
            values,
        } => {
            let owner = config.active_user()?;
            let values = values
                .iter()
                .map(|v| parse_value_pair(v))
                .collect::<Result<Vec<_>>>()?;
            let product = store.add_product(
                owner,
                NewProduct {
                    category_id: parse_id(&category, "category")?,
                    name,
                    description,
                    image_url,
                    values,
                },
            )?;
            println!("{}", formatter.created("Product", &product.id.to_string()));
        }
        ProductAction::List { category } => {
            let products = store.list_products(parse_id(&category, "category")?)?;
            println!("{}", formatter.format_products(&products)?);
        }
        ProductAction::Show { id } => {
            let id = parse_id(&id, "product")?;
            let product = store
                .get_product(id)?
                .ok_or_else(|| CliError::NotFound(format!("product {}", id)))?;
            println!("{}", formatter.format_products(&[product])?);
        }
        ProductAction::Edit {
            id,
            name,
            description,
            image_url,
            values,
            unset,
        } => {
            let owner = config.active_user()?;
            let values = values
                .iter()
                .map(|v| parse_value_pair(v))
                .collect::<Result<Vec<_>>>()?;
            let product = store.update_product(
                owner,
                parse_id(&id, "product")?,
                ProductUpdate {
                    name,
                    description,
                    image_url,
                    values,
                    unset,
                },
            )?;
            println!("{}", formatter.format_products(&[product])?);
        }
        ProductAction::Delete { id } => {
            store.delete_product(config.active_user()?, parse_id(&id, "product")?)?;
            println!("{}", formatter.success("Product deleted"));
        }
    }

    Ok(())
}

/// Split a `NAME=VALUE` argument.
fn parse_value_pair(input: &str) -> Result<(String, String)> {
    let (name, value) = input.split_once('=').ok_or_else(|| {
        CliError::InvalidInput(format!(
            "Invalid value '{}'. Expected 'NAME=VALUE'",
            input
        ))
    })?;
    let name = name.trim();
    if name.is_empty() {
        return Err(CliError::InvalidInput(format!(
            "Missing parameter name in '{}'",
            input
        )));
    }
    Ok((name.to_string(), value.to_string()))
}
