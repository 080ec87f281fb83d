use serde::Deserialize;
use tracing::{debug, info};

use super::PackingService;
use crate::error::PackingResult;
use crate::guard::{require_category, require_item, Principal};
use crate::ids::{CategoryId, ItemId};
use crate::models::{Item, ItemPatch, NewItem, Priority};
use crate::ordering::{next_order, reorder_assignments};
use crate::store::EntityStore;
use crate::validation::{
    normalize_tags, normalize_text, validate_name, validate_quantity, validate_weight,
};

fn default_quantity() -> i32 {
    1
}

/// Fields accepted by [`PackingService::add_item`]
#[derive(Debug, Clone, Deserialize)]
pub struct AddItemInput {
    pub name: String,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub packed: bool,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Appended after the last sibling when absent
    #[serde(default)]
    pub order: Option<i32>,
}

impl AddItemInput {
    pub fn new(name: impl Into<String>, quantity: i32, priority: Priority) -> Self {
        Self {
            name: name.into(),
            quantity,
            priority,
            packed: false,
            notes: None,
            description: None,
            weight: None,
            tags: Vec::new(),
            order: None,
        }
    }
}

fn sanitize_item_patch(mut patch: ItemPatch) -> PackingResult<ItemPatch> {
    if let Some(name) = patch.name.take() {
        patch.name = Some(validate_name("Item name", &name)?);
    }
    if let Some(quantity) = patch.quantity {
        validate_quantity(quantity)?;
    }
    if let Some(Some(weight)) = patch.weight {
        validate_weight(weight)?;
    }
    if let Some(notes) = patch.notes.take() {
        patch.notes = Some(normalize_text(notes));
    }
    if let Some(description) = patch.description.take() {
        patch.description = Some(normalize_text(description));
    }
    if let Some(tags) = patch.tags.take() {
        patch.tags = Some(normalize_tags(tags)?);
    }
    Ok(patch)
}

impl<S: EntityStore> PackingService<S> {
    /// Ownership check for an item through its category, under a strict
    /// policy only.
    async fn guard_item(&self, store: &S, actor: &Principal, item: &Item) -> PackingResult<()> {
        if self.policy.trust_caller_for_children {
            return Ok(());
        }
        let category = require_category(store, item.category_id).await?;
        self.guard_descendant(store, actor, category.list_id).await
    }

    pub async fn add_item(
        &self,
        actor: &Principal,
        category_id: CategoryId,
        input: AddItemInput,
    ) -> PackingResult<ItemId> {
        let category = require_category(&self.store, category_id).await?;
        self.guard_descendant(&self.store, actor, category.list_id)
            .await?;

        let name = validate_name("Item name", &input.name)?;
        validate_quantity(input.quantity)?;
        if let Some(weight) = input.weight {
            validate_weight(weight)?;
        }
        let order = match input.order {
            Some(order) => order,
            None => next_order(&self.store.items_by_category(category_id).await?),
        };

        let item_id = self
            .store
            .insert_item(NewItem {
                category_id,
                name,
                quantity: input.quantity,
                packed: input.packed,
                priority: input.priority,
                notes: normalize_text(input.notes),
                description: normalize_text(input.description),
                weight: input.weight,
                tags: normalize_tags(input.tags)?,
                order,
            })
            .await?;

        info!(
            "Added item {} to category {} at order {}",
            item_id, category_id, order
        );
        Ok(item_id)
    }

    pub async fn update_item(
        &self,
        actor: &Principal,
        item_id: ItemId,
        patch: ItemPatch,
    ) -> PackingResult<ItemId> {
        let item = require_item(&self.store, item_id).await?;
        self.guard_item(&self.store, actor, &item).await?;

        let patch = sanitize_item_patch(patch)?;
        self.store.patch_item(item_id, patch).await?;
        info!("Updated item {}", item_id);
        Ok(item_id)
    }

    pub async fn delete_item(&self, actor: &Principal, item_id: ItemId) -> PackingResult<()> {
        let item = require_item(&self.store, item_id).await?;
        self.guard_item(&self.store, actor, &item).await?;

        self.store.delete_item(item_id).await?;
        info!("Deleted item {}", item_id);
        Ok(())
    }

    /// Flip the packed flag. Returns the new state.
    pub async fn toggle_item_packed(
        &self,
        actor: &Principal,
        item_id: ItemId,
    ) -> PackingResult<bool> {
        let item = require_item(&self.store, item_id).await?;
        self.guard_item(&self.store, actor, &item).await?;

        let packed = !item.packed;
        self.store
            .patch_item(
                item_id,
                ItemPatch {
                    packed: Some(packed),
                    ..Default::default()
                },
            )
            .await?;
        Ok(packed)
    }

    /// Assign `order = index` to every listed item of the category. Ids
    /// from other categories are skipped; unlisted items keep their order.
    pub async fn reorder_items(
        &self,
        actor: &Principal,
        category_id: CategoryId,
        ordered_ids: &[ItemId],
    ) -> PackingResult<()> {
        let category = require_category(&self.store, category_id).await?;
        self.guard_descendant(&self.store, actor, category.list_id)
            .await?;

        let tx = self.store.begin().await?;
        let siblings: Vec<ItemId> = tx
            .items_by_category(category_id)
            .await?
            .into_iter()
            .map(|i| i.id)
            .collect();

        let assignments = reorder_assignments(&siblings, ordered_ids);
        if assignments.len() < ordered_ids.len() {
            debug!(
                "Reorder of category {} skipped {} ids from other categories",
                category_id,
                ordered_ids.len() - assignments.len()
            );
        }

        for (id, order) in &assignments {
            tx.patch_item(
                *id,
                ItemPatch {
                    order: Some(*order),
                    ..Default::default()
                },
            )
            .await?;
        }
        tx.commit().await?;

        info!(
            "Reordered {} items in category {}",
            assignments.len(),
            category_id
        );
        Ok(())
    }

    /// Move an item under another category, appended after its last item.
    /// Returns the order the item was given.
    pub async fn move_item(
        &self,
        actor: &Principal,
        item_id: ItemId,
        target_category_id: CategoryId,
    ) -> PackingResult<i32> {
        let item = require_item(&self.store, item_id).await?;
        let target = require_category(&self.store, target_category_id).await?;
        self.guard_item(&self.store, actor, &item).await?;
        self.guard_descendant(&self.store, actor, target.list_id)
            .await?;

        if item.category_id == target_category_id {
            return Ok(item.order);
        }

        let tx = self.store.begin().await?;
        let order = next_order(&tx.items_by_category(target_category_id).await?);
        tx.move_item(item_id, target_category_id, order).await?;
        tx.commit().await?;

        info!(
            "Moved item {} from category {} to {}",
            item_id, item.category_id, target_category_id
        );
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PackingError;

    #[test]
    fn item_patch_validates_quantity_and_weight() {
        let zero = ItemPatch {
            quantity: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            sanitize_item_patch(zero),
            Err(PackingError::Validation(_))
        ));

        let negative = ItemPatch {
            weight: Some(Some(-1.0)),
            ..Default::default()
        };
        assert!(sanitize_item_patch(negative).is_err());

        let cleared = ItemPatch {
            weight: Some(None),
            notes: Some(Some("  ".to_string())),
            ..Default::default()
        };
        let cleared = sanitize_item_patch(cleared).unwrap();
        assert_eq!(cleared.weight, Some(None));
        assert_eq!(cleared.notes, Some(None));
    }

    #[test]
    fn add_item_input_defaults() {
        let input: AddItemInput = serde_json::from_str(r#"{"name": "Socks"}"#).unwrap();
        assert_eq!(input.quantity, 1);
        assert_eq!(input.priority, Priority::Medium);
        assert!(!input.packed);
        assert!(input.order.is_none());
    }
}
