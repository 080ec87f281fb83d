//! Item model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::list::double_option;
use crate::ids::{CategoryId, ItemId};

/// Packing priority of an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Essential,
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Essential => "essential",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "essential" => Ok(Priority::Essential),
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(format!("unknown priority: {}", other)),
        }
    }
}

/// A single packable thing within a category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub category_id: CategoryId,
    pub name: String,
    pub quantity: i32,
    pub packed: bool,
    pub priority: Priority,
    pub notes: Option<String>,
    pub description: Option<String>,
    pub weight: Option<f64>,
    pub tags: Vec<String>,
    pub order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New item creation payload
#[derive(Debug, Clone)]
pub struct NewItem {
    pub category_id: CategoryId,
    pub name: String,
    pub quantity: i32,
    pub packed: bool,
    pub priority: Priority,
    pub notes: Option<String>,
    pub description: Option<String>,
    pub weight: Option<f64>,
    pub tags: Vec<String>,
    pub order: i32,
}

/// Item update payload
///
/// Moving an item to another category goes through the dedicated move
/// operation, never through a patch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub quantity: Option<i32>,
    pub packed: Option<bool>,
    pub priority: Option<Priority>,
    #[serde(default, with = "double_option")]
    pub notes: Option<Option<String>>,
    #[serde(default, with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, with = "double_option")]
    pub weight: Option<Option<f64>>,
    pub tags: Option<Vec<String>>,
    pub order: Option<i32>,
}
