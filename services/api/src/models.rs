//! API models for request and response payloads
//!
//! Create/update bodies reuse the library's input and patch types; the
//! ones below cover everything else.

use packing::models::{ContentType, ModerationStatus};
use packing::{CategoryId, ItemId};
use serde::{Deserialize, Serialize};

/// Response carrying the id of a created entity
#[derive(Debug, Serialize)]
pub struct IdResponse<T> {
    pub id: T,
}

#[derive(Debug, Default, Deserialize)]
pub struct DuplicateListRequest {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApplyTemplateRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ReorderCategoriesRequest {
    pub ids: Vec<CategoryId>,
}

#[derive(Debug, Deserialize)]
pub struct ReorderItemsRequest {
    pub ids: Vec<ItemId>,
}

#[derive(Debug, Deserialize)]
pub struct MoveItemRequest {
    pub category_id: CategoryId,
}

#[derive(Debug, Deserialize)]
pub struct ReportContentRequest {
    pub content_id: String,
    pub content_type: ContentType,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ModerationStatusRequest {
    pub status: ModerationStatus,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ModerationQuery {
    #[serde(default)]
    pub status: Option<ModerationStatus>,
}
