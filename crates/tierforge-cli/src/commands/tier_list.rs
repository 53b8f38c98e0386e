//! Tier list command implementation.

use crate::cli::{TierListAction, TierListArgs};
use crate::commands::parse_id;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::session::EditSession;
use std::collections::HashMap;
use tierforge_domain::traits::{ExploreQuery, ProductCatalog, TierListStore};
use tierforge_domain::{
    Destination, MoveEffect, MoveRejected, Product, ProductRef, RecordId, TierAssignment,
    TierDocument, TierSet, UNRANKED,
};
use tierforge_store::{NewTierList, SqliteStore};

/// Execute the tierlist command.
pub fn execute_tier_list(
    args: TierListArgs,
    store: &mut SqliteStore,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    match args.action {
        TierListAction::Create {
            category,
            title,
            description,
            public,
        } => {
            let owner = config.active_user()?;
            let list = store.create_tier_list(
                owner,
                NewTierList {
                    category_id: parse_id(&category, "category")?,
                    title,
                    description,
                    is_public: public,
                    tiers: TierDocument::empty_for(&config.tier_set()?),
                },
            )?;
            println!("{}", formatter.created("Tier list", &list.id.to_string()));
        }
        TierListAction::List => {
            let lists = store.list_tier_lists(config.active_user()?)?;
            println!("{}", formatter.format_tier_lists(&lists)?);
        }
        TierListAction::Show { id } => show(store, config, formatter, parse_id(&id, "tier list")?)?,
        TierListAction::Move {
            id,
            product,
            to,
            before,
            onto,
        } => {
            let target = match (to, onto) {
                (_, Some(anchor)) => MoveTarget::Onto(anchor),
                (Some(bucket), None) => MoveTarget::Bucket { bucket, before },
                (None, None) => {
                    return Err(CliError::InvalidInput(
                        "Either --to or --onto is required".to_string(),
                    ))
                }
            };
            move_product(
                store,
                config,
                formatter,
                parse_id(&id, "tier list")?,
                &product,
                target,
            )?;
        }
        TierListAction::Reset { id } => {
            let owner = config.active_user()?;
            let mut session =
                EditSession::open(&*store, parse_id(&id, "tier list")?, owner, config.tier_set()?)?;
            report_load_issues(&session, formatter);
            session.reset();
            session.save(store)?;
            println!("{}", formatter.success("All products returned to unranked"));
        }
        TierListAction::Publish { id } => {
            store.set_public(config.active_user()?, parse_id(&id, "tier list")?, true)?;
            println!("{}", formatter.success("Tier list is now public"));
        }
        TierListAction::Unpublish { id } => {
            store.set_public(config.active_user()?, parse_id(&id, "tier list")?, false)?;
            println!("{}", formatter.success("Tier list is now private"));
        }
        TierListAction::Like { id } => {
            if store.like(parse_id(&id, "tier list")?, config.active_user()?)? {
                println!("{}", formatter.success("Liked"));
            } else {
                println!("{}", formatter.info("You already like this tier list"));
            }
        }
        TierListAction::Unlike { id } => {
            if store.unlike(parse_id(&id, "tier list")?, config.active_user()?)? {
                println!("{}", formatter.success("Like removed"));
            } else {
                println!("{}", formatter.info("You had not liked this tier list"));
            }
        }
        TierListAction::Delete { id } => {
            store.delete_tier_list(config.active_user()?, parse_id(&id, "tier list")?)?;
            println!("{}", formatter.success("Tier list deleted"));
        }
        TierListAction::Explore {
            search,
            category,
            sort,
            limit,
        } => {
            let query = ExploreQuery {
                search,
                category_id: category
                    .as_deref()
                    .map(|c| parse_id(c, "category"))
                    .transpose()?,
                sort: sort.into(),
                limit,
            };
            let lists = store.explore(&query)?;
            println!("{}", formatter.format_tier_lists(&lists)?);
        }
    }

    Ok(())
}

/// Where a `move` sends the product.
enum MoveTarget {
    /// A named bucket, optionally before another product
    Bucket {
        bucket: String,
        before: Option<String>,
    },
    /// Onto another product's card
    Onto(String),
}

/// Show a list; viewers other than the owner count as a view.
fn show(store: &mut SqliteStore, config: &Config, formatter: &Formatter, id: RecordId) -> Result<()> {
    let viewer = config.viewer()?;
    let mut list = store
        .get_tier_list(id, viewer)?
        .ok_or_else(|| CliError::NotFound(format!("tier list {}", id)))?;

    if viewer != Some(list.owner) {
        list.views = store.record_view(id)?;
    }

    let catalog = store.catalog(list.category_id)?;
    let loaded = TierAssignment::load_document(&list.tiers, config.tier_set()?, catalog);
    for stale in &loaded.stale {
        eprintln!("{}", formatter.warning(&stale.to_string()));
    }

    let liked = viewer.map(|user| store.has_liked(id, user)).transpose()?;
    let names = product_names(&store.list_products(list.category_id)?);
    println!(
        "{}",
        formatter.format_board(&list, &loaded.assignment.snapshot(), &names, liked)?
    );
    Ok(())
}

fn move_product(
    store: &mut SqliteStore,
    config: &Config,
    formatter: &Formatter,
    id: RecordId,
    product: &str,
    target: MoveTarget,
) -> Result<()> {
    let owner = config.active_user()?;
    let tiers = config.tier_set()?;
    let mut session = EditSession::open(&*store, id, owner, tiers.clone())?;
    report_load_issues(&session, formatter);

    let products = store.list_products(session.list().category_id)?;
    let product = resolve_product(&products, product)?;

    let result = match target {
        MoveTarget::Bucket { bucket, before } => {
            let before = before
                .as_deref()
                .map(|b| resolve_product(&products, b))
                .transpose()?;
            let destination = Destination {
                bucket: canonical_bucket(&tiers, &bucket),
                before,
            };
            session.move_product(&product, &destination)
        }
        MoveTarget::Onto(anchor) => {
            let anchor = resolve_product(&products, &anchor)?;
            session.drop_onto(&product, &anchor)
        }
    };

    let names = product_names(&products);
    let label = names
        .get(&product)
        .cloned()
        .unwrap_or_else(|| product.to_string());

    match result {
        Ok(MoveEffect::Moved { to, .. }) => {
            session.save(store)?;
            let bucket = session.assignment().bucket_name(to.bucket).to_string();
            println!("{}", formatter.success(&format!("Moved {} to {}", label, bucket)));
        }
        Ok(MoveEffect::Unchanged) => {
            println!("{}", formatter.info(&format!("{} is already there", label)));
        }
        Err(MoveRejected::RefNotFound(_)) => {
            eprintln!(
                "{}",
                formatter.warning(&format!("{} is not in this tier list", label))
            );
        }
        Err(MoveRejected::InvalidDestination(name)) => {
            eprintln!(
                "{}",
                formatter.warning(&format!("'{}' is not a tier of this list", name))
            );
        }
    }

    Ok(())
}

fn report_load_issues(session: &EditSession, formatter: &Formatter) {
    for stale in session.stale() {
        eprintln!("{}", formatter.warning(&format!("Dropping {}", stale)));
    }
    for tier in session.ignored_tiers() {
        eprintln!(
            "{}",
            formatter.warning(&format!("Ignoring unknown tier '{}'", tier))
        );
    }
}

fn product_names(products: &[Product]) -> HashMap<ProductRef, String> {
    products
        .iter()
        .map(|p| (p.product_ref(), p.name.clone()))
        .collect()
}

/// Resolve a product given by ID or by name (case-insensitive).
///
/// Input matching nothing is passed through so the move reports it.
fn resolve_product(products: &[Product], input: &str) -> Result<ProductRef> {
    let input = input.trim();
    if let Some(product) = products.iter().find(|p| p.id.to_string() == input) {
        return Ok(product.product_ref());
    }

    let mut matches = products.iter().filter(|p| p.name.eq_ignore_ascii_case(input));
    match (matches.next(), matches.next()) {
        (Some(product), None) => Ok(product.product_ref()),
        (Some(_), Some(_)) => Err(CliError::InvalidInput(format!(
            "'{}' matches several products; use the product ID",
            input
        ))),
        (None, _) => Ok(ProductRef::new(input)),
    }
}

/// Match a bucket name against the configured tiers ignoring case.
fn canonical_bucket(tiers: &TierSet, input: &str) -> String {
    let input = input.trim();
    if input.eq_ignore_ascii_case(UNRANKED) {
        return UNRANKED.to_string();
    }
    tiers
        .names()
        .iter()
        .find(|name| name.eq_ignore_ascii_case(input))
        .cloned()
        .unwrap_or_else(|| input.to_string())
}
