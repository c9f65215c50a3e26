use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Discovery,
    Analytics,
    Recommendation,
    Support,
    Strategy,
}

impl Category {
    /// Every category, in tie-break priority order.
    pub const PRIORITY: [Category; 5] = [
        Category::Discovery,
        Category::Recommendation,
        Category::Analytics,
        Category::Support,
        Category::Strategy,
    ];

    /// Category used whenever classification fails.
    pub const FALLBACK: Category = Category::Analytics;

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Discovery => "discovery",
            Self::Analytics => "analytics",
            Self::Recommendation => "recommendation",
            Self::Support => "support",
            Self::Strategy => "strategy",
        }
    }

    pub fn priority(self) -> usize {
        Self::PRIORITY.iter().position(|category| *category == self).unwrap_or(usize::MAX)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value
            .trim()
            .trim_matches(|ch: char| !ch.is_ascii_alphanumeric())
            .to_ascii_lowercase()
            .replace([' ', '-'], "_");
        match normalized.as_str() {
            "discovery" | "content_discovery" | "search" => Ok(Self::Discovery),
            "analytics" | "analysis" | "data_analytics" => Ok(Self::Analytics),
            "recommendation" | "recommendations" => Ok(Self::Recommendation),
            "support" | "customer_support" | "faq" => Ok(Self::Support),
            "strategy" | "business_strategy" => Ok(Self::Strategy),
            _ => Err(value.trim().to_owned()),
        }
    }
}
