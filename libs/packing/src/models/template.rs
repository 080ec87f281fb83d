//! Template model
//!
//! A template mirrors the list → category → item structure as plain values.
//! Categories and items carry no foreign keys and no packed state; they get
//! identities only when the template is applied.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::item::Priority;
use crate::ids::{TemplateId, UserId};

/// Who authored a template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "user_id", rename_all = "lowercase")]
pub enum TemplateCreator {
    /// Built-in template shipped with the application
    System,
    User(UserId),
}

/// Item blueprint inside a template category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateItem {
    pub name: String,
    pub quantity: i32,
    pub priority: Priority,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Category blueprint; items are kept in authored order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateCategory {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub items: Vec<TemplateItem>,
}

/// Reusable list blueprint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    pub id: TemplateId,
    pub name: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub is_public: bool,
    pub creator: TemplateCreator,
    pub usage_count: i64,
    pub difficulty: Option<String>,
    pub season: Option<String>,
    pub duration: Option<String>,
    pub categories: Vec<TemplateCategory>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Template {
    pub fn is_builtin(&self) -> bool {
        self.creator == TemplateCreator::System
    }

    /// Whether the given user authored this template
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.creator == TemplateCreator::User(user_id)
    }

    pub fn item_count(&self) -> usize {
        self.categories.iter().map(|c| c.items.len()).sum()
    }
}

/// New template creation payload
#[derive(Debug, Clone)]
pub struct NewTemplate {
    pub name: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub is_public: bool,
    pub creator_id: UserId,
    pub difficulty: Option<String>,
    pub season: Option<String>,
    pub duration: Option<String>,
    pub categories: Vec<TemplateCategory>,
}
