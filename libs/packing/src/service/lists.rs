use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use super::PackingService;
use crate::duplication::copy_list_contents;
use crate::error::{PackingError, PackingResult};
use crate::guard::{assert_owns_list, require_list, resolve_user, Principal};
use crate::hierarchy::{delete_list_cascade, CascadeReport};
use crate::ids::ListId;
use crate::models::{ItemPatch, ListPatch, NewList};
use crate::store::EntityStore;
use crate::validation::{normalize_tags, normalize_text, validate_name};

/// Fields accepted by [`PackingService::create_list`]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateListInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_template: bool,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl CreateListInput {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

fn sanitize_list_patch(mut patch: ListPatch) -> PackingResult<ListPatch> {
    if let Some(name) = patch.name.take() {
        patch.name = Some(validate_name("List name", &name)?);
    }
    if let Some(description) = patch.description.take() {
        patch.description = Some(normalize_text(description));
    }
    if let Some(tags) = patch.tags.take() {
        patch.tags = Some(normalize_tags(tags)?);
    }
    // Completion only moves through mark_list_completed/incomplete
    patch.completed_at = None;
    Ok(patch)
}

impl<S: EntityStore> PackingService<S> {
    pub async fn create_list(
        &self,
        actor: &Principal,
        input: CreateListInput,
    ) -> PackingResult<ListId> {
        let user = resolve_user(&self.store, actor).await?;
        let name = validate_name("List name", &input.name)?;

        let list_id = self
            .store
            .insert_list(NewList {
                user_id: user.id,
                name,
                description: normalize_text(input.description),
                tags: normalize_tags(input.tags)?,
                is_template: input.is_template,
                is_public: input.is_public,
                template_id: None,
            })
            .await?;

        info!("User {} created list {}", user.id, list_id);
        Ok(list_id)
    }

    pub async fn update_list(
        &self,
        actor: &Principal,
        list_id: ListId,
        patch: ListPatch,
    ) -> PackingResult<ListId> {
        assert_owns_list(&self.store, actor, list_id).await?;
        let patch = sanitize_list_patch(patch)?;

        self.store.patch_list(list_id, patch).await?;
        info!("Updated list {}", list_id);
        Ok(list_id)
    }

    pub async fn mark_list_completed(
        &self,
        actor: &Principal,
        list_id: ListId,
    ) -> PackingResult<ListId> {
        self.set_completed_at(actor, list_id, Some(Utc::now())).await
    }

    pub async fn mark_list_incomplete(
        &self,
        actor: &Principal,
        list_id: ListId,
    ) -> PackingResult<ListId> {
        self.set_completed_at(actor, list_id, None).await
    }

    async fn set_completed_at(
        &self,
        actor: &Principal,
        list_id: ListId,
        completed_at: Option<chrono::DateTime<Utc>>,
    ) -> PackingResult<ListId> {
        assert_owns_list(&self.store, actor, list_id).await?;
        self.store
            .patch_list(
                list_id,
                ListPatch {
                    completed_at: Some(completed_at),
                    ..Default::default()
                },
            )
            .await?;

        info!(
            "List {} marked {}",
            list_id,
            if completed_at.is_some() {
                "completed"
            } else {
                "incomplete"
            }
        );
        Ok(list_id)
    }

    /// Delete a list with all its categories and items
    pub async fn delete_list(
        &self,
        actor: &Principal,
        list_id: ListId,
    ) -> PackingResult<CascadeReport> {
        assert_owns_list(&self.store, actor, list_id).await?;

        let tx = self.store.begin().await?;
        let report = delete_list_cascade(&tx, list_id).await?;
        tx.commit().await?;
        Ok(report)
    }

    /// Copy a list the actor owns, or any public list.
    ///
    /// The copy is private, not a template, and every item in it starts
    /// unpacked.
    pub async fn duplicate_list(
        &self,
        actor: &Principal,
        list_id: ListId,
        new_name: Option<String>,
    ) -> PackingResult<ListId> {
        let user = resolve_user(&self.store, actor).await?;
        let source = require_list(&self.store, list_id).await?;

        if source.user_id != user.id && !source.is_public {
            return Err(PackingError::Unauthorized);
        }

        let name = match new_name {
            Some(name) => validate_name("List name", &name)?,
            None => format!("Copy of {}", source.name),
        };

        let tx = self.store.begin().await?;
        let copy_id = tx
            .insert_list(NewList {
                user_id: user.id,
                name,
                description: source.description,
                tags: source.tags,
                is_template: false,
                is_public: false,
                template_id: None,
            })
            .await?;
        let items = copy_list_contents(&tx, list_id, copy_id).await?;
        tx.commit().await?;

        info!(
            "User {} duplicated list {} into {} ({} items)",
            user.id, list_id, copy_id, items
        );
        Ok(copy_id)
    }

    /// Unpack every item of a list and clear its completion. Returns the
    /// number of items that were packed.
    pub async fn reset_list_packing(
        &self,
        actor: &Principal,
        list_id: ListId,
    ) -> PackingResult<usize> {
        assert_owns_list(&self.store, actor, list_id).await?;

        let tx = self.store.begin().await?;
        let mut unpacked = 0;
        for category in tx.categories_by_list(list_id).await? {
            for item in tx.items_by_category(category.id).await? {
                if !item.packed {
                    continue;
                }
                tx.patch_item(
                    item.id,
                    ItemPatch {
                        packed: Some(false),
                        ..Default::default()
                    },
                )
                .await?;
                unpacked += 1;
            }
        }
        tx.patch_list(
            list_id,
            ListPatch {
                completed_at: Some(None),
                ..Default::default()
            },
        )
        .await?;
        tx.commit().await?;

        info!("Reset packing state of list {} ({} items)", list_id, unpacked);
        Ok(unpacked)
    }
}
