use serde::Deserialize;
use tracing::{debug, info};

use super::PackingService;
use crate::error::PackingResult;
use crate::guard::{authorize_list_children, require_category, Principal};
use crate::hierarchy::delete_category_cascade;
use crate::ids::{CategoryId, ListId};
use crate::models::{CategoryPatch, NewCategory};
use crate::ordering::{next_order, reorder_assignments};
use crate::store::EntityStore;
use crate::validation::{normalize_text, validate_color, validate_name};

/// Fields accepted by [`PackingService::add_category`]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddCategoryInput {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    /// Appended after the last sibling when absent
    #[serde(default)]
    pub order: Option<i32>,
}

fn checked_color(color: Option<String>) -> PackingResult<Option<String>> {
    let color = normalize_text(color);
    if let Some(color) = &color {
        validate_color(color)?;
    }
    Ok(color)
}

fn sanitize_category_patch(mut patch: CategoryPatch) -> PackingResult<CategoryPatch> {
    if let Some(name) = patch.name.take() {
        patch.name = Some(validate_name("Category name", &name)?);
    }
    if let Some(color) = patch.color.take() {
        patch.color = Some(checked_color(color)?);
    }
    if let Some(icon) = patch.icon.take() {
        patch.icon = Some(normalize_text(icon));
    }
    Ok(patch)
}

impl<S: EntityStore> PackingService<S> {
    pub async fn add_category(
        &self,
        actor: &Principal,
        list_id: ListId,
        input: AddCategoryInput,
    ) -> PackingResult<CategoryId> {
        authorize_list_children(&self.store, self.policy, actor, list_id).await?;

        let name = validate_name("Category name", &input.name)?;
        let color = checked_color(input.color)?;
        let order = match input.order {
            Some(order) => order,
            None => next_order(&self.store.categories_by_list(list_id).await?),
        };

        let category_id = self
            .store
            .insert_category(NewCategory {
                list_id,
                name,
                color,
                icon: normalize_text(input.icon),
                order,
                collapsed: false,
            })
            .await?;

        info!(
            "Added category {} to list {} at order {}",
            category_id, list_id, order
        );
        Ok(category_id)
    }

    pub async fn update_category(
        &self,
        actor: &Principal,
        category_id: CategoryId,
        patch: CategoryPatch,
    ) -> PackingResult<CategoryId> {
        let category = require_category(&self.store, category_id).await?;
        self.guard_descendant(&self.store, actor, category.list_id)
            .await?;

        let patch = sanitize_category_patch(patch)?;
        self.store.patch_category(category_id, patch).await?;
        info!("Updated category {}", category_id);
        Ok(category_id)
    }

    /// Delete a category and its items. Returns the number of items removed.
    pub async fn delete_category(
        &self,
        actor: &Principal,
        category_id: CategoryId,
    ) -> PackingResult<usize> {
        let category = require_category(&self.store, category_id).await?;
        self.guard_descendant(&self.store, actor, category.list_id)
            .await?;

        let tx = self.store.begin().await?;
        let items = delete_category_cascade(&tx, category_id).await?;
        tx.commit().await?;

        info!("Deleted category {} with {} items", category_id, items);
        Ok(items)
    }

    /// Flip the persisted collapsed state. Returns the new state.
    pub async fn toggle_category_collapse(
        &self,
        actor: &Principal,
        category_id: CategoryId,
    ) -> PackingResult<bool> {
        let category = require_category(&self.store, category_id).await?;
        self.guard_descendant(&self.store, actor, category.list_id)
            .await?;

        let collapsed = !category.collapsed;
        self.store
            .patch_category(
                category_id,
                CategoryPatch {
                    collapsed: Some(collapsed),
                    ..Default::default()
                },
            )
            .await?;
        Ok(collapsed)
    }

    /// Assign `order = index` to every listed category of the list. Ids
    /// from other lists are skipped; unlisted categories keep their order.
    pub async fn reorder_categories(
        &self,
        actor: &Principal,
        list_id: ListId,
        ordered_ids: &[CategoryId],
    ) -> PackingResult<()> {
        authorize_list_children(&self.store, self.policy, actor, list_id).await?;

        let tx = self.store.begin().await?;
        let siblings: Vec<CategoryId> = tx
            .categories_by_list(list_id)
            .await?
            .into_iter()
            .map(|c| c.id)
            .collect();

        let assignments = reorder_assignments(&siblings, ordered_ids);
        if assignments.len() < ordered_ids.len() {
            debug!(
                "Reorder of list {} skipped {} ids from other lists",
                list_id,
                ordered_ids.len() - assignments.len()
            );
        }

        for (id, order) in &assignments {
            tx.patch_category(
                *id,
                CategoryPatch {
                    order: Some(*order),
                    ..Default::default()
                },
            )
            .await?;
        }
        tx.commit().await?;

        info!(
            "Reordered {} categories in list {}",
            assignments.len(),
            list_id
        );
        Ok(())
    }
}
