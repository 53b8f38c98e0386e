//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// TierForge CLI - Build and share product tier lists.
#[derive(Debug, Parser)]
#[command(name = "tierforge")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "TIERFORGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Database file path
    #[arg(long, global = true, env = "TIERFORGE_DATABASE")]
    pub database: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (IDs only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a profile and make it the active user
    Signup(SignupArgs),

    /// Show the active user
    Whoami,

    /// Show plan usage
    Usage,

    /// Change the active user's plan
    Plan(PlanArgs),

    /// Show view and like totals across your tier lists
    Analytics,

    /// Manage categories
    Category(CategoryArgs),

    /// Manage parameters
    Param(ParamArgs),

    /// Manage products
    Product(ProductArgs),

    /// Build, browse and react to tier lists
    #[command(name = "tierlist")]
    TierList(TierListArgs),
}

/// Arguments for the signup command.
#[derive(Debug, Parser)]
pub struct SignupArgs {
    /// Email address
    #[arg(short, long)]
    pub email: String,

    /// Display name
    #[arg(short, long)]
    pub username: Option<String>,

    /// Subscription plan
    #[arg(short, long, value_enum, default_value = "standard")]
    pub plan: PlanArg,
}

/// Arguments for category management.
#[derive(Debug, Parser)]
pub struct CategoryArgs {
    #[command(subcommand)]
    pub action: CategoryAction,
}

/// Category actions.
#[derive(Debug, Subcommand)]
pub enum CategoryAction {
    /// Create a category
    Add {
        /// Category name
        name: String,
        /// Description
        #[arg(short, long)]
        description: Option<String>,
    },

    /// List your categories
    List,

    /// Rename or redescribe a category
    Edit {
        /// Category ID
        id: String,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// New description
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Delete a category with its products and tier lists
    Delete {
        /// Category ID
        id: String,
    },
}

/// Arguments for the plan command.
#[derive(Debug, Parser)]
pub struct PlanArgs {
    #[command(subcommand)]
    pub action: PlanAction,
}

/// Plan actions.
#[derive(Debug, Subcommand)]
pub enum PlanAction {
    /// Switch to another plan
    Set {
        /// Plan name
        #[arg(value_enum)]
        plan: PlanArg,
    },
}

/// Arguments for parameter management.
#[derive(Debug, Parser)]
pub struct ParamArgs {
    #[command(subcommand)]
    pub action: ParamAction,
}

/// Parameter actions.
#[derive(Debug, Subcommand)]
pub enum ParamAction {
    /// Define a parameter
    Add {
        /// Parameter name
        name: String,
        /// Value type
        #[arg(short, long, value_enum, default_value = "text")]
        kind: KindArg,
        /// Comma-separated options (select parameters)
        #[arg(short, long)]
        options: Option<String>,
        /// Description
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Change a parameter's name, description, type or options
    Edit {
        /// Parameter ID
        id: String,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// New value type
        #[arg(short, long, value_enum)]
        kind: Option<KindArg>,
        /// New comma-separated options (select parameters)
        #[arg(short, long)]
        options: Option<String>,
        /// New description
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Delete a parameter and its product values
    Delete {
        /// Parameter ID
        id: String,
    },

    /// Attach a parameter to a category
    Attach {
        /// Category ID
        category: String,
        /// Parameter ID
        parameter: String,
    },

    /// Detach a parameter from a category
    Detach {
        /// Category ID
        category: String,
        /// Parameter ID
        parameter: String,
    },

    /// Replace the parameters attached to a category
    Set {
        /// Category ID
        category: String,
        /// Parameter IDs (none clears the set)
        parameters: Vec<String>,
    },

    /// List your parameters, or those attached to a category
    List {
        /// Category ID
        #[arg(long)]
        category: Option<String>,
    },
}

/// Arguments for product management.
#[derive(Debug, Parser)]
pub struct ProductArgs {
    #[command(subcommand)]
    pub action: ProductAction,
}

/// Product actions.
#[derive(Debug, Subcommand)]
pub enum ProductAction {
    /// Add a product to a category
    Add {
        /// Category ID
        category: String,
        /// Product name
        name: String,
        /// Description
        #[arg(short, long)]
        description: Option<String>,
        /// Image URL
        #[arg(long)]
        image_url: Option<String>,
        /// Parameter value as NAME=VALUE (repeatable)
        #[arg(long = "value")]
        values: Vec<String>,
    },

    /// List products of a category
    List {
        /// Category ID
        category: String,
    },

    /// Show one product
    Show {
        /// Product ID
        id: String,
    },

    /// Edit a product
    Edit {
        /// Product ID
        id: String,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// New description
        #[arg(short, long)]
        description: Option<String>,
        /// New image URL
        #[arg(long)]
        image_url: Option<String>,
        /// Parameter value as NAME=VALUE (repeatable)
        #[arg(long = "value")]
        values: Vec<String>,
        /// Remove the value of a parameter (repeatable)
        #[arg(long)]
        unset: Vec<String>,
    },

    /// Delete a product; tier lists drop it on next load
    Delete {
        /// Product ID
        id: String,
    },
}

/// Arguments for tier list commands.
#[derive(Debug, Parser)]
pub struct TierListArgs {
    #[command(subcommand)]
    pub action: TierListAction,
}

/// Tier list actions.
#[derive(Debug, Subcommand)]
pub enum TierListAction {
    /// Create a tier list over a category
    Create {
        /// Category ID
        category: String,
        /// Title
        title: String,
        /// Description
        #[arg(short, long)]
        description: Option<String>,
        /// Make the list public
        #[arg(long)]
        public: bool,
    },

    /// List your tier lists
    List,

    /// Show a tier list
    Show {
        /// Tier list ID
        id: String,
    },

    /// Move a product between tiers
    Move {
        /// Tier list ID
        id: String,
        /// Product ID or name
        product: String,
        /// Destination tier, or "unranked"
        #[arg(short, long, required_unless_present = "onto")]
        to: Option<String>,
        /// Insert before this product (ID or name)
        #[arg(short, long, requires = "to")]
        before: Option<String>,
        /// Drop onto this product's card (ID or name)
        #[arg(long, conflicts_with_all = ["to", "before"])]
        onto: Option<String>,
    },

    /// Return every product to unranked
    Reset {
        /// Tier list ID
        id: String,
    },

    /// Make a tier list public
    Publish {
        /// Tier list ID
        id: String,
    },

    /// Make a tier list private
    Unpublish {
        /// Tier list ID
        id: String,
    },

    /// Like a tier list
    Like {
        /// Tier list ID
        id: String,
    },

    /// Remove your like
    Unlike {
        /// Tier list ID
        id: String,
    },

    /// Delete a tier list
    Delete {
        /// Tier list ID
        id: String,
    },

    /// Browse public tier lists
    Explore {
        /// Match title, description or category name
        #[arg(short, long)]
        search: Option<String>,
        /// Restrict to a category ID
        #[arg(long)]
        category: Option<String>,
        /// Ordering
        #[arg(long, value_enum, default_value = "popular")]
        sort: SortArg,
        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

/// Subscription plan argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum PlanArg {
    /// 2 categories, 20 products, 6 parameters, 2 tier lists
    Standard,
    /// 10 categories, 50 products, 10 parameters, 10 tier lists
    Pro,
    /// 30 categories, 50 products, 15 parameters, 50 tier lists
    Master,
}

/// Parameter kind argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum KindArg {
    /// Free text
    Text,
    /// Numeric value
    Number,
    /// Yes/no
    Boolean,
    /// One of a list of options
    Select,
}

/// Explore ordering argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SortArg {
    /// Likes plus views
    Popular,
    /// Most liked
    Likes,
    /// Most viewed
    Views,
    /// Newest
    Recent,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl From<PlanArg> for tierforge_domain::SubscriptionTier {
    fn from(plan: PlanArg) -> Self {
        match plan {
            PlanArg::Standard => tierforge_domain::SubscriptionTier::Standard,
            PlanArg::Pro => tierforge_domain::SubscriptionTier::Pro,
            PlanArg::Master => tierforge_domain::SubscriptionTier::Master,
        }
    }
}

impl From<SortArg> for tierforge_domain::traits::ExploreSort {
    fn from(sort: SortArg) -> Self {
        use tierforge_domain::traits::ExploreSort;
        match sort {
            SortArg::Popular => ExploreSort::Popular,
            SortArg::Likes => ExploreSort::Likes,
            SortArg::Views => ExploreSort::Views,
            SortArg::Recent => ExploreSort::Recent,
        }
    }
}

impl KindArg {
    /// Stored type name of this kind
    pub fn type_name(self) -> &'static str {
        match self {
            KindArg::Text => "text",
            KindArg::Number => "number",
            KindArg::Boolean => "boolean",
            KindArg::Select => "select",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_move_command() {
        let cli = Cli::try_parse_from([
            "tierforge", "tierlist", "move", "list-id", "Viper", "--to", "S", "--before", "G Pro",
        ])
        .unwrap();
        match cli.command {
            Command::TierList(TierListArgs {
                action: TierListAction::Move { to, before, onto, .. },
            }) => {
                assert_eq!(to.as_deref(), Some("S"));
                assert_eq!(before.as_deref(), Some("G Pro"));
                assert!(onto.is_none());
            }
            _ => panic!("Expected tierlist move"),
        }
    }

    #[test]
    fn test_move_needs_destination() {
        let result = Cli::try_parse_from(["tierforge", "tierlist", "move", "list-id", "Viper"]);
        assert!(result.is_err());

        let result = Cli::try_parse_from([
            "tierforge", "tierlist", "move", "list-id", "Viper", "--to", "S", "--onto", "G Pro",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from([
            "tierforge", "-vv", "--format", "json", "--database", "t.db", "whoami",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.format, Some(CliFormat::Json)));
        assert_eq!(cli.database, Some(PathBuf::from("t.db")));
        assert!(matches!(cli.command, Command::Whoami));
    }

    #[test]
    fn test_product_values() {
        let cli = Cli::try_parse_from([
            "tierforge", "product", "add", "cat-id", "Viper", "--value", "DPI=20000", "--value",
            "Connection=Wireless",
        ])
        .unwrap();
        match cli.command {
            Command::Product(ProductArgs {
                action: ProductAction::Add { values, .. },
            }) => assert_eq!(values, vec!["DPI=20000", "Connection=Wireless"]),
            _ => panic!("Expected product add"),
        }
    }

    #[test]
    fn test_param_set_accepts_empty_list() {
        let cli = Cli::try_parse_from(["tierforge", "param", "set", "cat-id"]).unwrap();
        match cli.command {
            Command::Param(ParamArgs {
                action: ParamAction::Set { parameters, .. },
            }) => assert!(parameters.is_empty()),
            _ => panic!("Expected param set"),
        }
    }

    #[test]
    fn test_product_edit_unset() {
        let cli = Cli::try_parse_from([
            "tierforge", "product", "edit", "prod-id", "--unset", "DPI", "--value", "Weight=58",
        ])
        .unwrap();
        match cli.command {
            Command::Product(ProductArgs {
                action: ProductAction::Edit { unset, values, name, .. },
            }) => {
                assert_eq!(unset, vec!["DPI"]);
                assert_eq!(values, vec!["Weight=58"]);
                assert!(name.is_none());
            }
            _ => panic!("Expected product edit"),
        }
    }

    #[test]
    fn test_plan_set() {
        let cli = Cli::try_parse_from(["tierforge", "plan", "set", "master"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Plan(PlanArgs {
                action: PlanAction::Set { plan: PlanArg::Master }
            })
        ));
        assert!(Cli::try_parse_from(["tierforge", "plan", "set", "gold"]).is_err());
    }

    #[test]
    fn test_plan_conversion() {
        let plan: tierforge_domain::SubscriptionTier = PlanArg::Pro.into();
        assert_eq!(plan, tierforge_domain::SubscriptionTier::Pro);
    }
}
