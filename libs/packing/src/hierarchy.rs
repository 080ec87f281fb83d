//! Cascade deletion across list → category → item
//!
//! Children are always deleted before their parent. Callers run these inside
//! a store transaction so an interrupted cascade leaves nothing behind.

use serde::Serialize;
use tracing::info;

use crate::error::PackingResult;
use crate::ids::{CategoryId, ListId};
use crate::store::EntityStore;

/// Rows removed by a cascade
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CascadeReport {
    pub categories: usize,
    pub items: usize,
}

/// Delete a category and every item under it. Returns the number of items
/// removed.
pub async fn delete_category_cascade<S: EntityStore>(
    store: &S,
    category_id: CategoryId,
) -> PackingResult<usize> {
    let items = store.items_by_category(category_id).await?;
    for item in &items {
        store.delete_item(item.id).await?;
    }
    store.delete_category(category_id).await?;
    Ok(items.len())
}

/// Delete a list, its categories and their items
pub async fn delete_list_cascade<S: EntityStore>(
    store: &S,
    list_id: ListId,
) -> PackingResult<CascadeReport> {
    let mut report = CascadeReport::default();

    for category in store.categories_by_list(list_id).await? {
        report.items += delete_category_cascade(store, category.id).await?;
        report.categories += 1;
    }
    store.delete_list(list_id).await?;

    info!(
        "Deleted list {} with {} categories and {} items",
        list_id, report.categories, report.items
    );
    Ok(report)
}
