//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use std::collections::HashMap;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};
use tierforge_domain::{
    Category, Engagement, ParameterDefinition, PlanLimits, Product, ProductRef, Profile, Resource,
    Snapshot, TierList, Usage, UNRANKED,
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format a profile.
    pub fn format_profile(&self, profile: &Profile) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
                "id": profile.id.to_string(),
                "email": profile.email,
                "username": profile.username,
                "plan": profile.subscription.as_str(),
            }))?),
            OutputFormat::Quiet => Ok(profile.id.to_string()),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["ID", "Email", "Username", "Plan"]);
                builder.push_record([
                    profile.id.to_string(),
                    profile.email.clone(),
                    profile.username.clone().unwrap_or_default(),
                    profile.subscription.to_string(),
                ]);
                Ok(self.render(builder))
            }
        }
    }

    /// Format plan usage against the plan's limits.
    pub fn format_usage(&self, usage: &Usage, limits: &PlanLimits) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let rows: Vec<serde_json::Value> = Resource::ALL
                    .iter()
                    .map(|&r| {
                        serde_json::json!({
                            "resource": r.as_str(),
                            "used": usage.get(r),
                            "limit": limits.get(r),
                            "percentage": limits.usage_percentage(usage, r),
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&rows)?)
            }
            OutputFormat::Quiet => Ok(Resource::ALL
                .iter()
                .map(|&r| format!("{}={}/{}", r.as_str(), usage.get(r), limits.get(r)))
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Resource", "Used", "Limit", "Usage"]);
                for &resource in &Resource::ALL {
                    let percentage = limits.usage_percentage(usage, resource);
                    let cell = format!("{}%", percentage);
                    let cell = if limits.can_create(usage, resource) {
                        cell
                    } else {
                        self.colorize(&cell, "red")
                    };
                    builder.push_record([
                        resource.to_string(),
                        usage.get(resource).to_string(),
                        limits.get(resource).to_string(),
                        cell,
                    ]);
                }
                Ok(self.render(builder))
            }
        }
    }

    /// Format engagement totals next to catalog counts.
    pub fn format_engagement(&self, engagement: &Engagement, usage: &Usage) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
                "tier_lists": engagement.tier_lists,
                "public_tier_lists": engagement.public_tier_lists,
                "views": engagement.views,
                "likes": engagement.likes,
                "products": usage.products,
                "categories": usage.categories,
            }))?),
            OutputFormat::Quiet => Ok(format!(
                "views={}\nlikes={}",
                engagement.views, engagement.likes
            )),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record([
                    "Tier lists",
                    "Public",
                    "Views",
                    "Likes",
                    "Products",
                    "Categories",
                ]);
                builder.push_record([
                    engagement.tier_lists.to_string(),
                    engagement.public_tier_lists.to_string(),
                    engagement.views.to_string(),
                    engagement.likes.to_string(),
                    usage.products.to_string(),
                    usage.categories.to_string(),
                ]);
                Ok(self.render(builder))
            }
        }
    }

    /// Format categories output.
    pub fn format_categories(&self, categories: &[Category]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let json: Vec<serde_json::Value> = categories
                    .iter()
                    .map(|c| {
                        serde_json::json!({
                            "id": c.id.to_string(),
                            "name": c.name,
                            "description": c.description,
                            "created_at": c.created_at,
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&json)?)
            }
            OutputFormat::Quiet => Ok(join_ids(categories.iter().map(|c| c.id.to_string()))),
            OutputFormat::Table => {
                if categories.is_empty() {
                    return Ok(self.colorize("No categories found.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(["ID", "Name", "Description"]);
                for category in categories {
                    builder.push_record([
                        category.id.to_string(),
                        category.name.clone(),
                        category.description.clone().unwrap_or_default(),
                    ]);
                }
                Ok(self.render(builder))
            }
        }
    }

    /// Format parameter definitions output.
    pub fn format_parameters(&self, parameters: &[ParameterDefinition]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let json: Vec<serde_json::Value> = parameters
                    .iter()
                    .map(|p| {
                        serde_json::json!({
                            "id": p.id.to_string(),
                            "name": p.name,
                            "description": p.description,
                            "type": p.kind.type_name(),
                            "options": p.kind.options(),
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&json)?)
            }
            OutputFormat::Quiet => Ok(join_ids(parameters.iter().map(|p| p.id.to_string()))),
            OutputFormat::Table => {
                if parameters.is_empty() {
                    return Ok(self.colorize("No parameters found.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(["ID", "Name", "Type", "Options"]);
                for parameter in parameters {
                    builder.push_record([
                        parameter.id.to_string(),
                        parameter.name.clone(),
                        parameter.kind.type_name().to_string(),
                        parameter.kind.options().join(", "),
                    ]);
                }
                Ok(self.render(builder))
            }
        }
    }

    /// Format products output.
    pub fn format_products(&self, products: &[Product]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let json: Vec<serde_json::Value> = products
                    .iter()
                    .map(|p| {
                        serde_json::json!({
                            "id": p.id.to_string(),
                            "category_id": p.category_id.to_string(),
                            "name": p.name,
                            "description": p.description,
                            "image_url": p.image_url,
                            "parameters": p.parameter_values,
                            "created_at": p.created_at,
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&json)?)
            }
            OutputFormat::Quiet => Ok(join_ids(products.iter().map(|p| p.id.to_string()))),
            OutputFormat::Table => {
                if products.is_empty() {
                    return Ok(self.colorize("No products found.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(["ID", "Name", "Parameters"]);
                for product in products {
                    let parameters = product
                        .parameter_values
                        .iter()
                        .map(|(name, value)| format!("{}: {}", name, value))
                        .collect::<Vec<_>>()
                        .join(", ");
                    builder.push_record([product.id.to_string(), product.name.clone(), parameters]);
                }
                Ok(self.render(builder))
            }
        }
    }

    /// Format tier list summaries.
    pub fn format_tier_lists(&self, lists: &[TierList]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let json: Vec<serde_json::Value> = lists.iter().map(tier_list_json).collect();
                Ok(serde_json::to_string_pretty(&json)?)
            }
            OutputFormat::Quiet => Ok(join_ids(lists.iter().map(|l| l.id.to_string()))),
            OutputFormat::Table => {
                if lists.is_empty() {
                    return Ok(self.colorize("No tier lists found.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(["ID", "Title", "Public", "Ranked", "Likes", "Views"]);
                for list in lists {
                    builder.push_record([
                        list.id.to_string(),
                        list.title.clone(),
                        if list.is_public { "yes" } else { "no" }.to_string(),
                        list.tiers.ranked_count().to_string(),
                        list.likes.to_string(),
                        list.views.to_string(),
                    ]);
                }
                Ok(self.render(builder))
            }
        }
    }

    /// Format one tier list with its buckets.
    ///
    /// `names` maps product refs to display names; unknown refs show as-is.
    /// `liked` is the viewer's like state, `None` when nobody is signed in.
    pub fn format_board(
        &self,
        list: &TierList,
        board: &Snapshot,
        names: &HashMap<ProductRef, String>,
        liked: Option<bool>,
    ) -> Result<String> {
        let name_of = |r: &ProductRef| names.get(r).cloned().unwrap_or_else(|| r.to_string());

        match self.format {
            OutputFormat::Json => {
                let buckets: Vec<serde_json::Value> = board
                    .iter()
                    .map(|(bucket, refs)| {
                        let products: Vec<serde_json::Value> = refs
                            .iter()
                            .map(|r| serde_json::json!({ "id": r.as_str(), "name": name_of(r) }))
                            .collect();
                        serde_json::json!({ "tier": bucket, "products": products })
                    })
                    .collect();
                let mut json = tier_list_json(list);
                json["buckets"] = serde_json::Value::Array(buckets);
                json["liked"] = serde_json::json!(liked);
                Ok(serde_json::to_string_pretty(&json)?)
            }
            OutputFormat::Quiet => Ok(list.id.to_string()),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Tier", "Products"]);
                for (position, (bucket, refs)) in board.iter().enumerate() {
                    let label = if bucket == UNRANKED {
                        bucket.to_string()
                    } else {
                        self.colorize(bucket, tier_color(position))
                    };
                    let products = refs.iter().map(&name_of).collect::<Vec<_>>().join(", ");
                    builder.push_record([label, products]);
                }
                let header = format!(
                    "{}  ({} likes, {} views{}{})",
                    list.title,
                    list.likes,
                    list.views,
                    if list.is_public { "" } else { ", private" },
                    if liked == Some(true) { ", liked by you" } else { "" }
                );
                Ok(format!("{}\n{}", header, self.render(builder)))
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Format a created-record message, or the bare ID in quiet mode.
    pub fn created(&self, what: &str, id: &str) -> String {
        match self.format {
            OutputFormat::Quiet => id.to_string(),
            _ => self.success(&format!("{} created: {}", what, id)),
        }
    }

    fn render(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            "magenta" => text.magenta().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Label color for the tier at `position`, best first.
fn tier_color(position: usize) -> &'static str {
    match position {
        0 => "red",
        1 => "yellow",
        2 => "green",
        3 => "cyan",
        4 => "blue",
        _ => "magenta",
    }
}

fn tier_list_json(list: &TierList) -> serde_json::Value {
    serde_json::json!({
        "id": list.id.to_string(),
        "owner": list.owner.to_string(),
        "category_id": list.category_id.to_string(),
        "title": list.title,
        "description": list.description,
        "is_public": list.is_public,
        "tiers": list.tiers,
        "likes": list.likes,
        "views": list.views,
        "created_at": list.created_at,
        "updated_at": list.updated_at,
    })
}

fn join_ids(ids: impl Iterator<Item = String>) -> String {
    ids.collect::<Vec<_>>().join("\n")
}
