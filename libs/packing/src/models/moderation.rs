//! Moderation records and their history trail

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ids::{ModerationId, UserId};

/// Kind of content a moderation record points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    List,
    Template,
    User,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::List => "list",
            ContentType::Template => "template",
            ContentType::User => "user",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "list" => Ok(ContentType::List),
            "template" => Ok(ContentType::Template),
            "user" => Ok(ContentType::User),
            other => Err(format!("unknown content type: {}", other)),
        }
    }
}

/// Review status of a moderation record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationStatus {
    Pending,
    Approved,
    Rejected,
    Flagged,
}

impl ModerationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationStatus::Pending => "pending",
            ModerationStatus::Approved => "approved",
            ModerationStatus::Rejected => "rejected",
            ModerationStatus::Flagged => "flagged",
        }
    }
}

impl fmt::Display for ModerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModerationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ModerationStatus::Pending),
            "approved" => Ok(ModerationStatus::Approved),
            "rejected" => Ok(ModerationStatus::Rejected),
            "flagged" => Ok(ModerationStatus::Flagged),
            other => Err(format!("unknown moderation status: {}", other)),
        }
    }
}

/// One record per `(content_id, content_type)` pair
///
/// `content_id` is kept as a raw string: moderation spans several content
/// kinds and must survive the referenced content being deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationRecord {
    pub id: ModerationId,
    pub content_id: String,
    pub content_type: ContentType,
    pub status: ModerationStatus,
    pub reason: Option<String>,
    pub reported_by: Option<UserId>,
    pub reviewed_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewModerationRecord {
    pub content_id: String,
    pub content_type: ContentType,
    pub status: ModerationStatus,
    pub reason: Option<String>,
    pub reported_by: Option<UserId>,
}

#[derive(Debug, Clone, Default)]
pub struct ModerationPatch {
    pub status: Option<ModerationStatus>,
    pub reason: Option<Option<String>>,
    pub reviewed_by: Option<UserId>,
}

/// Entry in a record's history trail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationHistoryEntry {
    pub id: Uuid,
    pub moderation_id: ModerationId,
    pub status: ModerationStatus,
    pub reason: Option<String>,
    pub actor_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewModerationHistory {
    pub moderation_id: ModerationId,
    pub status: ModerationStatus,
    pub reason: Option<String>,
    pub actor_id: Option<UserId>,
}
