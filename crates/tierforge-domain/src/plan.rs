//! Subscription plans and the creation limits they impose

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Subscription level of a user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    /// Free plan
    #[default]
    Standard,
    /// Professional plan
    Pro,
    /// Top plan
    Master,
}

impl SubscriptionTier {
    /// Stored name of the plan
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionTier::Standard => "standard",
            SubscriptionTier::Pro => "pro",
            SubscriptionTier::Master => "master",
        }
    }

    /// Parse a stored plan name; `professional` is accepted for `pro`
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Some(SubscriptionTier::Standard),
            "pro" | "professional" => Some(SubscriptionTier::Pro),
            "master" => Some(SubscriptionTier::Master),
            _ => None,
        }
    }

    /// Parse a stored plan name, falling back to `Standard`
    pub fn parse_or_standard(s: &str) -> Self {
        Self::parse(s).unwrap_or_default()
    }

    /// Limits granted by this plan
    pub fn limits(&self) -> PlanLimits {
        match self {
            SubscriptionTier::Standard => PlanLimits {
                categories: 2,
                products: 20,
                parameters: 6,
                tier_lists: 2,
            },
            SubscriptionTier::Pro => PlanLimits {
                categories: 10,
                products: 50,
                parameters: 10,
                tier_lists: 10,
            },
            SubscriptionTier::Master => PlanLimits {
                categories: 30,
                products: 50,
                parameters: 15,
                tier_lists: 50,
            },
        }
    }
}

impl fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SubscriptionTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid plan: {}", s))
    }
}

/// Something a plan limits the number of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    /// Categories
    Categories,
    /// Products
    Products,
    /// Parameters
    Parameters,
    /// Tier lists
    TierLists,
}

impl Resource {
    /// All limited resources
    pub const ALL: [Resource; 4] = [
        Resource::Categories,
        Resource::Products,
        Resource::Parameters,
        Resource::TierLists,
    ];

    /// Plural display name
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Categories => "categories",
            Resource::Products => "products",
            Resource::Parameters => "parameters",
            Resource::TierLists => "tier lists",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Creation refused by the plan
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Plan limit reached: {limit} {resource}")]
pub struct LimitExceeded {
    /// The limited resource
    pub resource: Resource,
    /// The plan's ceiling
    pub limit: u32,
}

/// Current counts of a user's records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Categories owned
    pub categories: u32,
    /// Products owned
    pub products: u32,
    /// Parameters owned
    pub parameters: u32,
    /// Tier lists owned
    pub tier_lists: u32,
}

impl Usage {
    /// Count for one resource
    pub fn get(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Categories => self.categories,
            Resource::Products => self.products,
            Resource::Parameters => self.parameters,
            Resource::TierLists => self.tier_lists,
        }
    }
}

/// Ceilings on record counts for one plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanLimits {
    /// Maximum categories
    pub categories: u32,
    /// Maximum products
    pub products: u32,
    /// Maximum parameters
    pub parameters: u32,
    /// Maximum tier lists
    pub tier_lists: u32,
}

impl PlanLimits {
    /// Ceiling for one resource
    pub fn get(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Categories => self.categories,
            Resource::Products => self.products,
            Resource::Parameters => self.parameters,
            Resource::TierLists => self.tier_lists,
        }
    }

    /// True if one more `resource` may be created
    pub fn can_create(&self, usage: &Usage, resource: Resource) -> bool {
        usage.get(resource) < self.get(resource)
    }

    /// Usage as a whole percentage of the ceiling, rounded to nearest
    pub fn usage_percentage(&self, usage: &Usage, resource: Resource) -> u32 {
        let limit = self.get(resource);
        if limit == 0 {
            return 0;
        }
        (f64::from(usage.get(resource)) / f64::from(limit) * 100.0).round() as u32
    }

    /// Refuse creation when the ceiling is reached
    pub fn check(&self, usage: &Usage, resource: Resource) -> Result<(), LimitExceeded> {
        if self.can_create(usage, resource) {
            Ok(())
        } else {
            Err(LimitExceeded {
                resource,
                limit: self.get(resource),
            })
        }
    }
}

impl Default for PlanLimits {
    fn default() -> Self {
        SubscriptionTier::Standard.limits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_parsing() {
        assert_eq!(SubscriptionTier::parse("PRO"), Some(SubscriptionTier::Pro));
        assert_eq!(
            SubscriptionTier::parse("professional"),
            Some(SubscriptionTier::Pro)
        );
        assert_eq!(
            SubscriptionTier::parse_or_standard("enterprise"),
            SubscriptionTier::Standard
        );
    }

    #[test]
    fn test_plan_limits() {
        let standard = SubscriptionTier::Standard.limits();
        assert_eq!(standard.categories, 2);
        assert_eq!(standard.products, 20);
        assert_eq!(SubscriptionTier::Master.limits().tier_lists, 50);
        assert_eq!(PlanLimits::default(), standard);
    }

    #[test]
    fn test_can_create_and_check() {
        let limits = SubscriptionTier::Standard.limits();
        let usage = Usage {
            categories: 2,
            products: 3,
            ..Default::default()
        };

        assert!(!limits.can_create(&usage, Resource::Categories));
        assert!(limits.can_create(&usage, Resource::Products));
        assert_eq!(
            limits.check(&usage, Resource::Categories),
            Err(LimitExceeded {
                resource: Resource::Categories,
                limit: 2
            })
        );
        assert!(limits.check(&usage, Resource::TierLists).is_ok());
    }

    #[test]
    fn test_usage_percentage() {
        let limits = SubscriptionTier::Standard.limits();
        let usage = Usage {
            parameters: 1,
            products: 7,
            ..Default::default()
        };
        assert_eq!(limits.usage_percentage(&usage, Resource::Parameters), 17);
        assert_eq!(limits.usage_percentage(&usage, Resource::Products), 35);

        let zero = PlanLimits {
            categories: 0,
            products: 0,
            parameters: 0,
            tier_lists: 0,
        };
        assert_eq!(zero.usage_percentage(&usage, Resource::Products), 0);
    }

    #[test]
    fn test_limit_exceeded_message() {
        let err = LimitExceeded {
            resource: Resource::TierLists,
            limit: 2,
        };
        assert_eq!(err.to_string(), "Plan limit reached: 2 tier lists");
    }
}
