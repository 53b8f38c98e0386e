//! Signup, whoami, usage, plan and analytics commands.

use crate::cli::{PlanAction, PlanArgs, SignupArgs};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::path::Path;
use tierforge_domain::traits::UsageSource;
use tierforge_domain::SubscriptionTier;
use tierforge_store::SqliteStore;

/// Execute the signup command.
///
/// The new profile becomes the active user and the config is saved.
pub fn execute_signup(
    args: SignupArgs,
    store: &mut SqliteStore,
    config: &mut Config,
    config_path: &Path,
    formatter: &Formatter,
) -> Result<()> {
    let profile = store.create_profile(&args.email, args.username.as_deref(), args.plan.into())?;

    config.active_user = Some(profile.id.to_string());
    config.save(config_path)?;

    println!("{}", formatter.created("Profile", &profile.id.to_string()));
    Ok(())
}

/// Execute the whoami command.
pub fn execute_whoami(store: &SqliteStore, config: &Config, formatter: &Formatter) -> Result<()> {
    let id = config.active_user()?;
    let profile = store
        .get_profile(id)?
        .ok_or_else(|| CliError::NotFound(format!("profile {}", id)))?;
    println!("{}", formatter.format_profile(&profile)?);
    Ok(())
}

/// Execute the usage command.
pub fn execute_usage(store: &SqliteStore, config: &Config, formatter: &Formatter) -> Result<()> {
    let owner = config.active_user()?;
    let usage = store.usage(owner)?;
    let limits = store.subscription(owner)?.limits();
    println!("{}", formatter.format_usage(&usage, &limits)?);
    Ok(())
}

/// Execute the plan command.
pub fn execute_plan(
    args: PlanArgs,
    store: &mut SqliteStore,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    let owner = config.active_user()?;
    match args.action {
        PlanAction::Set { plan } => {
            let plan: SubscriptionTier = plan.into();
            store.set_subscription(owner, plan)?;
            println!("{}", formatter.success(&format!("Plan changed to {}", plan)));
            let usage = store.usage(owner)?;
            println!("{}", formatter.format_usage(&usage, &plan.limits())?);
        }
    }
    Ok(())
}

/// Execute the analytics command.
pub fn execute_analytics(
    store: &SqliteStore,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    let owner = config.active_user()?;
    let engagement = store.engagement(owner)?;
    let usage = store.usage(owner)?;
    println!("{}", formatter.format_engagement(&engagement, &usage)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::PlanArg;
    use crate::config::OutputFormat;

    #[test]
    fn test_signup_sets_active_user() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        let mut store = SqliteStore::new(":memory:").unwrap();
        let mut config = Config::default();
        let formatter = Formatter::new(OutputFormat::Quiet, false);

        execute_signup(
            SignupArgs {
                email: "ana@example.com".to_string(),
                username: Some("ana".to_string()),
                plan: PlanArg::Pro,
            },
            &mut store,
            &mut config,
            &config_path,
            &formatter,
        )
        .unwrap();

        let saved = Config::load(&config_path).unwrap();
        let id = saved.active_user().unwrap();
        let profile = store.get_profile(id).unwrap().unwrap();
        assert_eq!(profile.username.as_deref(), Some("ana"));
        assert!(execute_usage(&store, &saved, &formatter).is_ok());
    }

    #[test]
    fn test_plan_set_raises_limits() {
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

        execute_plan(
            PlanArgs {
                action: PlanAction::Set {
                    plan: PlanArg::Master,
                },
            },
            &mut store,
            &config,
            &formatter,
        )
        .unwrap();

        assert_eq!(
            store.subscription(owner).unwrap(),
            SubscriptionTier::Master
        );
        assert!(execute_analytics(&store, &config, &formatter).is_ok());
    }

    #[test]
    fn test_whoami_requires_signup() {
        let store = SqliteStore::new(":memory:").unwrap();
        let formatter = Formatter::new(OutputFormat::Table, false);
        let result = execute_whoami(&store, &Config::default(), &formatter);
        assert!(matches!(result, Err(CliError::NotSignedIn)));
    }
}
