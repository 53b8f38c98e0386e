//! Parameter command implementation.

use crate::cli::{KindArg, ParamAction, ParamArgs};
use crate::commands::parse_id;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use tierforge_domain::parameter::parse_options;
use tierforge_domain::ParameterKind;
use tierforge_store::{ParameterUpdate, SqliteStore};

/// Execute the param command.
pub fn execute_param(
    args: ParamArgs,
    store: &mut SqliteStore,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    let owner = config.active_user()?;

    match args.action {
        ParamAction::Add {
            name,
            kind,
            options,
            description,
        } => {
            let options = options.as_deref().map(parse_options).unwrap_or_default();
            let kind = ParameterKind::from_parts(kind.type_name(), options)?;
            let parameter = store.create_parameter(owner, &name, description.as_deref(), kind)?;
            println!("{}", formatter.created("Parameter", &parameter.id.to_string()));
        }
        ParamAction::Edit {
            id,
            name,
            kind,
            options,
            description,
        } => {
            let id = parse_id(&id, "parameter")?;
            let current = store
                .get_parameter(id)?
                .ok_or_else(|| CliError::NotFound(format!("parameter {}", id)))?;
            let update = ParameterUpdate {
                name,
                description,
                kind: edited_kind(&current.kind, kind, options.as_deref())?,
            };
            let parameter = store.update_parameter(owner, id, update)?;
            println!("{}", formatter.format_parameters(&[parameter])?);
        }
        ParamAction::Delete { id } => {
            store.delete_parameter(owner, parse_id(&id, "parameter")?)?;
            println!("{}", formatter.success("Parameter deleted"));
        }
        ParamAction::Attach {
            category,
            parameter,
        } => {
            let category = parse_id(&category, "category")?;
            let parameter = parse_id(&parameter, "parameter")?;
            store.attach_parameter(owner, category, parameter)?;
            println!("{}", formatter.success("Parameter attached"));
        }
        ParamAction::Detach {
            category,
            parameter,
        } => {
            let category = parse_id(&category, "category")?;
            let parameter = parse_id(&parameter, "parameter")?;
            if store.detach_parameter(owner, category, parameter)? {
                println!("{}", formatter.success("Parameter detached"));
            } else {
                println!("{}", formatter.info("Parameter was not attached"));
            }
        }
        ParamAction::Set {
            category,
            parameters,
        } => {
            let category = parse_id(&category, "category")?;
            let parameters = parameters
                .iter()
                .map(|p| parse_id(p, "parameter"))
                .collect::<Result<Vec<_>>>()?;
            store.set_category_parameters(owner, category, &parameters)?;
            println!(
                "{}",
                formatter.format_parameters(&store.category_parameters(category)?)?
            );
        }
        ParamAction::List { category } => {
            let parameters = match category {
                Some(category) => store.category_parameters(parse_id(&category, "category")?)?,
                None => store.list_parameters(owner)?,
            };
            println!("{}", formatter.format_parameters(&parameters)?);
        }
    }

    Ok(())
}

/// New kind for an edit, or `None` to keep the current one.
///
/// Options alone replace the choices of a select parameter. A new select
/// kind without options keeps the current choices.
fn edited_kind(
    current: &ParameterKind,
    kind: Option<KindArg>,
    options: Option<&str>,
) -> Result<Option<ParameterKind>> {
    let options = options.map(parse_options);
    match (kind, options) {
        (None, None) => Ok(None),
        (None, Some(options)) => match current {
            ParameterKind::Select { .. } => Ok(Some(ParameterKind::Select { options })),
            _ => Err(CliError::InvalidInput(
                "--options only applies to select parameters".to_string(),
            )),
        },
        (Some(kind), options) => {
            let options = options.unwrap_or_else(|| current.options().to_vec());
            Ok(Some(ParameterKind::from_parts(kind.type_name(), options)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use tierforge_domain::SubscriptionTier;

    fn select(options: &[&str]) -> ParameterKind {
        ParameterKind::Select {
            options: options.iter().map(|o| o.to_string()).collect(),
        }
    }

    #[test]
    fn test_edited_kind() {
        let current = select(&["Wired", "Wireless"]);
        assert_eq!(edited_kind(&current, None, None).unwrap(), None);
        assert_eq!(
            edited_kind(&current, None, Some("Wired, Bluetooth")).unwrap(),
            Some(select(&["Wired", "Bluetooth"]))
        );
        assert_eq!(
            edited_kind(&current, Some(KindArg::Select), None).unwrap(),
            Some(current.clone())
        );
        assert_eq!(
            edited_kind(&current, Some(KindArg::Number), None).unwrap(),
            Some(ParameterKind::Number)
        );
        assert!(edited_kind(&ParameterKind::Text, None, Some("a,b")).is_err());
    }

    #[test]
    fn test_set_and_detach() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        let owner = store
            .create_profile("ana@example.com", None, SubscriptionTier::Standard)
            .unwrap()
            .id;
        let config = Config {
            active_user: Some(owner.to_string()),
            ..Default::default()
        };
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let category = store.create_category(owner, "Mice", None).unwrap().id;
        let dpi = store
            .create_parameter(owner, "DPI", None, ParameterKind::Number)
            .unwrap()
            .id;

        execute_param(
            ParamArgs {
                action: ParamAction::Set {
                    category: category.to_string(),
                    parameters: vec![dpi.to_string()],
                },
            },
            &mut store,
            &config,
            &formatter,
        )
        .unwrap();
        assert_eq!(store.category_parameters(category).unwrap().len(), 1);

        execute_param(
            ParamArgs {
                action: ParamAction::Detach {
                    category: category.to_string(),
                    parameter: dpi.to_string(),
                },
            },
            &mut store,
            &config,
            &formatter,
        )
        .unwrap();
        assert!(store.category_parameters(category).unwrap().is_empty());
    }
}
