//! Packing list model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ListId, TemplateId, UserId};

/// A named collection of categories owned by exactly one user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackingList {
    pub id: ListId,
    pub user_id: UserId,
    pub name: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub is_template: bool,
    pub is_public: bool,
    /// Template this list was instantiated from, if any
    pub template_id: Option<TemplateId>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New list creation payload
#[derive(Debug, Clone)]
pub struct NewList {
    pub user_id: UserId,
    pub name: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub is_template: bool,
    pub is_public: bool,
    pub template_id: Option<TemplateId>,
}

/// List update payload
///
/// The owning user is not patchable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListPatch {
    pub name: Option<String>,
    #[serde(default, with = "double_option")]
    pub description: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub is_template: Option<bool>,
    pub is_public: Option<bool>,
    #[serde(skip)]
    pub completed_at: Option<Option<DateTime<Utc>>>,
}

/// Distinguishes an absent field from an explicit `null` when deserializing
/// `Option<Option<T>>` patch fields.
pub(crate) mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}
