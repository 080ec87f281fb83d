//! Category model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::list::double_option;
use crate::ids::{CategoryId, ListId};

/// Named grouping of items within a list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub list_id: ListId,
    pub name: String,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub order: i32,
    /// UI collapse state, persisted server-side
    pub collapsed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New category creation payload
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub list_id: ListId,
    pub name: String,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub order: i32,
    pub collapsed: bool,
}

/// Category update payload
///
/// The parent list is not patchable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryPatch {
    pub name: Option<String>,
    #[serde(default, with = "double_option")]
    pub color: Option<Option<String>>,
    #[serde(default, with = "double_option")]
    pub icon: Option<Option<String>>,
    pub order: Option<i32>,
    pub collapsed: Option<bool>,
}
