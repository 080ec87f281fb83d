//! In-memory store
//!
//! Backs the test-suite and embedded use. A transaction holds the parent's
//! lock for its whole lifetime and works on a staged copy of the tables,
//! written back through that lock on commit. Other callers wait until the
//! transaction commits or is dropped.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::error::{DatabaseError, DatabaseResult};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::EntityStore;
use crate::ids::{CategoryId, ItemId, ListId, ModerationId, TemplateId, UserId};
use crate::models::{
    Category, CategoryPatch, ContentType, EntityCounts, Item, ItemPatch, ListPatch,
    ModerationHistoryEntry, ModerationPatch, ModerationRecord, ModerationStatus, NewCategory,
    NewItem, NewList, NewModerationHistory, NewModerationRecord, NewTemplate, NewUser,
    PackingList, Template, TemplateCreator, User, UserPatch,
};

#[derive(Debug, Clone, Default)]
struct Tables {
    users: HashMap<UserId, User>,
    lists: HashMap<ListId, PackingList>,
    categories: HashMap<CategoryId, Category>,
    items: HashMap<ItemId, Item>,
    templates: HashMap<TemplateId, Template>,
    moderation: HashMap<ModerationId, ModerationRecord>,
    history: Vec<ModerationHistoryEntry>,
}

/// Store keeping every table in process memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    /// Set on stores returned by `begin`; holds the parent's tables locked
    parent: Option<Arc<Mutex<OwnedMutexGuard<Tables>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn begin(&self) -> DatabaseResult<Self> {
        let held = self.tables.clone().lock_owned().await;
        let staged = Tables::clone(&held);
        Ok(Self {
            tables: Arc::new(Mutex::new(staged)),
            parent: Some(Arc::new(Mutex::new(held))),
        })
    }

    async fn commit(self) -> DatabaseResult<()> {
        let parent = self.parent.ok_or_else(|| {
            DatabaseError::Transaction("commit called outside of a transaction".to_string())
        })?;
        let staged = self.tables.lock().await.clone();
        let mut held = parent.lock().await;
        **held = staged;
        Ok(())
    }

    async fn get_user(&self, id: UserId) -> DatabaseResult<Option<User>> {
        Ok(self.tables.lock().await.users.get(&id).cloned())
    }

    async fn find_user_by_external_id(&self, external_id: &str) -> DatabaseResult<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.external_id == external_id)
            .cloned())
    }

    async fn insert_user(&self, user: NewUser) -> DatabaseResult<UserId> {
        let now = Utc::now();
        let id = UserId::new();
        self.tables.lock().await.users.insert(
            id,
            User {
                id,
                external_id: user.external_id,
                display_name: user.display_name,
                email: user.email,
                role: user.role,
                preferences: serde_json::Value::Object(serde_json::Map::new()),
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn patch_user(&self, id: UserId, patch: UserPatch) -> DatabaseResult<()> {
        let mut tables = self.tables.lock().await;
        if let Some(user) = tables.users.get_mut(&id) {
            if let Some(display_name) = patch.display_name {
                user.display_name = display_name;
            }
            if let Some(email) = patch.email {
                user.email = email;
            }
            if let Some(role) = patch.role {
                user.role = role;
            }
            if let Some(preferences) = patch.preferences {
                user.preferences = preferences;
            }
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn get_list(&self, id: ListId) -> DatabaseResult<Option<PackingList>> {
        Ok(self.tables.lock().await.lists.get(&id).cloned())
    }

    async fn lists_by_user(&self, user_id: UserId) -> DatabaseResult<Vec<PackingList>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .lists
            .values()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn insert_list(&self, list: NewList) -> DatabaseResult<ListId> {
        let now = Utc::now();
        let id = ListId::new();
        self.tables.lock().await.lists.insert(
            id,
            PackingList {
                id,
                user_id: list.user_id,
                name: list.name,
                description: list.description,
                tags: list.tags,
                is_template: list.is_template,
                is_public: list.is_public,
                template_id: list.template_id,
                completed_at: None,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn patch_list(&self, id: ListId, patch: ListPatch) -> DatabaseResult<()> {
        let mut tables = self.tables.lock().await;
        if let Some(list) = tables.lists.get_mut(&id) {
            if let Some(name) = patch.name {
                list.name = name;
            }
            if let Some(description) = patch.description {
                list.description = description;
            }
            if let Some(tags) = patch.tags {
                list.tags = tags;
            }
            if let Some(is_template) = patch.is_template {
                list.is_template = is_template;
            }
            if let Some(is_public) = patch.is_public {
                list.is_public = is_public;
            }
            if let Some(completed_at) = patch.completed_at {
                list.completed_at = completed_at;
            }
            list.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn delete_list(&self, id: ListId) -> DatabaseResult<()> {
        self.tables.lock().await.lists.remove(&id);
        Ok(())
    }

    async fn get_category(&self, id: CategoryId) -> DatabaseResult<Option<Category>> {
        Ok(self.tables.lock().await.categories.get(&id).cloned())
    }

    async fn categories_by_list(&self, list_id: ListId) -> DatabaseResult<Vec<Category>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .categories
            .values()
            .filter(|c| c.list_id == list_id)
            .cloned()
            .collect())
    }

    async fn insert_category(&self, category: NewCategory) -> DatabaseResult<CategoryId> {
        let now = Utc::now();
        let id = CategoryId::new();
        self.tables.lock().await.categories.insert(
            id,
            Category {
                id,
                list_id: category.list_id,
                name: category.name,
                color: category.color,
                icon: category.icon,
                order: category.order,
                collapsed: category.collapsed,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn patch_category(&self, id: CategoryId, patch: CategoryPatch) -> DatabaseResult<()> {
        let mut tables = self.tables.lock().await;
        if let Some(category) = tables.categories.get_mut(&id) {
            if let Some(name) = patch.name {
                category.name = name;
            }
            if let Some(color) = patch.color {
                category.color = color;
            }
            if let Some(icon) = patch.icon {
                category.icon = icon;
            }
            if let Some(order) = patch.order {
                category.order = order;
            }
            if let Some(collapsed) = patch.collapsed {
                category.collapsed = collapsed;
            }
            category.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn delete_category(&self, id: CategoryId) -> DatabaseResult<()> {
        self.tables.lock().await.categories.remove(&id);
        Ok(())
    }

    async fn get_item(&self, id: ItemId) -> DatabaseResult<Option<Item>> {
        Ok(self.tables.lock().await.items.get(&id).cloned())
    }

    async fn items_by_category(&self, category_id: CategoryId) -> DatabaseResult<Vec<Item>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .items
            .values()
            .filter(|i| i.category_id == category_id)
            .cloned()
            .collect())
    }

    async fn insert_item(&self, item: NewItem) -> DatabaseResult<ItemId> {
        let now = Utc::now();
        let id = ItemId::new();
        self.tables.lock().await.items.insert(
            id,
            Item {
                id,
                category_id: item.category_id,
                name: item.name,
                quantity: item.quantity,
                packed: item.packed,
                priority: item.priority,
                notes: item.notes,
                description: item.description,
                weight: item.weight,
                tags: item.tags,
                order: item.order,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn patch_item(&self, id: ItemId, patch: ItemPatch) -> DatabaseResult<()> {
        let mut tables = self.tables.lock().await;
        if let Some(item) = tables.items.get_mut(&id) {
            if let Some(name) = patch.name {
                item.name = name;
            }
            if let Some(quantity) = patch.quantity {
                item.quantity = quantity;
            }
            if let Some(packed) = patch.packed {
                item.packed = packed;
            }
            if let Some(priority) = patch.priority {
                item.priority = priority;
            }
            if let Some(notes) = patch.notes {
                item.notes = notes;
            }
            if let Some(description) = patch.description {
                item.description = description;
            }
            if let Some(weight) = patch.weight {
                item.weight = weight;
            }
            if let Some(tags) = patch.tags {
                item.tags = tags;
            }
            if let Some(order) = patch.order {
                item.order = order;
            }
            item.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn move_item(
        &self,
        id: ItemId,
        category_id: CategoryId,
        order: i32,
    ) -> DatabaseResult<()> {
        let mut tables = self.tables.lock().await;
        if let Some(item) = tables.items.get_mut(&id) {
            item.category_id = category_id;
            item.order = order;
            item.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn delete_item(&self, id: ItemId) -> DatabaseResult<()> {
        self.tables.lock().await.items.remove(&id);
        Ok(())
    }

    async fn get_template(&self, id: TemplateId) -> DatabaseResult<Option<Template>> {
        Ok(self.tables.lock().await.templates.get(&id).cloned())
    }

    async fn templates_by_creator(&self, creator_id: UserId) -> DatabaseResult<Vec<Template>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .templates
            .values()
            .filter(|t| t.is_owned_by(creator_id))
            .cloned()
            .collect())
    }

    async fn public_templates(&self) -> DatabaseResult<Vec<Template>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .templates
            .values()
            .filter(|t| t.is_public)
            .cloned()
            .collect())
    }

    async fn insert_template(&self, template: NewTemplate) -> DatabaseResult<TemplateId> {
        let now = Utc::now();
        let id = TemplateId::new();
        self.tables.lock().await.templates.insert(
            id,
            Template {
                id,
                name: template.name,
                description: template.description,
                tags: template.tags,
                is_public: template.is_public,
                creator: TemplateCreator::User(template.creator_id),
                usage_count: 0,
                difficulty: template.difficulty,
                season: template.season,
                duration: template.duration,
                categories: template.categories,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn increment_template_usage(&self, id: TemplateId) -> DatabaseResult<()> {
        let mut tables = self.tables.lock().await;
        if let Some(template) = tables.templates.get_mut(&id) {
            template.usage_count += 1;
            template.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn delete_template(&self, id: TemplateId) -> DatabaseResult<()> {
        self.tables.lock().await.templates.remove(&id);
        Ok(())
    }

    async fn get_moderation(&self, id: ModerationId) -> DatabaseResult<Option<ModerationRecord>> {
        Ok(self.tables.lock().await.moderation.get(&id).cloned())
    }

    async fn find_moderation(
        &self,
        content_id: &str,
        content_type: ContentType,
    ) -> DatabaseResult<Option<ModerationRecord>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .moderation
            .values()
            .filter(|r| r.content_id == content_id && r.content_type == content_type)
            .min_by_key(|r| (r.created_at, r.id))
            .cloned())
    }

    async fn moderation_records(
        &self,
        status: Option<ModerationStatus>,
    ) -> DatabaseResult<Vec<ModerationRecord>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .moderation
            .values()
            .filter(|r| status.is_none_or(|s| r.status == s))
            .cloned()
            .collect())
    }

    async fn insert_moderation(
        &self,
        record: NewModerationRecord,
    ) -> DatabaseResult<ModerationId> {
        let now = Utc::now();
        let id = ModerationId::new();
        self.tables.lock().await.moderation.insert(
            id,
            ModerationRecord {
                id,
                content_id: record.content_id,
                content_type: record.content_type,
                status: record.status,
                reason: record.reason,
                reported_by: record.reported_by,
                reviewed_by: None,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn patch_moderation(
        &self,
        id: ModerationId,
        patch: ModerationPatch,
    ) -> DatabaseResult<()> {
        let mut tables = self.tables.lock().await;
        if let Some(record) = tables.moderation.get_mut(&id) {
            if let Some(status) = patch.status {
                record.status = status;
            }
            if let Some(reason) = patch.reason {
                record.reason = reason;
            }
            if let Some(reviewed_by) = patch.reviewed_by {
                record.reviewed_by = Some(reviewed_by);
            }
            record.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn delete_moderation(&self, id: ModerationId) -> DatabaseResult<()> {
        let mut tables = self.tables.lock().await;
        tables.moderation.remove(&id);
        tables.history.retain(|h| h.moderation_id != id);
        Ok(())
    }

    async fn insert_moderation_history(&self, entry: NewModerationHistory) -> DatabaseResult<()> {
        self.tables
            .lock()
            .await
            .history
            .push(ModerationHistoryEntry {
                id: Uuid::new_v4(),
                moderation_id: entry.moderation_id,
                status: entry.status,
                reason: entry.reason,
                actor_id: entry.actor_id,
                created_at: Utc::now(),
            });
        Ok(())
    }

    async fn moderation_history(
        &self,
        id: ModerationId,
    ) -> DatabaseResult<Vec<ModerationHistoryEntry>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .history
            .iter()
            .filter(|h| h.moderation_id == id)
            .cloned()
            .collect())
    }

    async fn orphaned_categories(&self) -> DatabaseResult<Vec<CategoryId>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .categories
            .values()
            .filter(|c| !tables.lists.contains_key(&c.list_id))
            .map(|c| c.id)
            .collect())
    }

    async fn orphaned_items(&self) -> DatabaseResult<Vec<ItemId>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .items
            .values()
            .filter(|i| !tables.categories.contains_key(&i.category_id))
            .map(|i| i.id)
            .collect())
    }

    async fn entity_counts(&self) -> DatabaseResult<EntityCounts> {
        let tables = self.tables.lock().await;
        Ok(EntityCounts {
            users: tables.users.len() as u64,
            lists: tables.lists.len() as u64,
            templates: tables.templates.len() as u64,
            items: tables.items.len() as u64,
            packed_items: tables.items.values().filter(|i| i.packed).count() as u64,
            pending_moderation: tables
                .moderation
                .values()
                .filter(|r| r.status == ModerationStatus::Pending)
                .count() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn new_user(external_id: &str) -> NewUser {
        NewUser {
            external_id: external_id.to_string(),
            display_name: "Tester".to_string(),
            email: None,
            role: Default::default(),
        }
    }

    #[tokio::test]
    async fn committed_transaction_is_visible() {
        let store = MemoryStore::new();
        let tx = store.begin().await.unwrap();
        let id = tx.insert_user(new_user("auth|1")).await.unwrap();

        let outside = tokio::time::timeout(Duration::from_millis(50), store.get_user(id)).await;
        assert!(outside.is_err(), "readers wait for the open transaction");
        tx.commit().await.unwrap();
        assert!(store.get_user(id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn dropped_transaction_is_discarded() {
        let store = MemoryStore::new();
        {
            let tx = store.begin().await.unwrap();
            tx.insert_user(new_user("auth|2")).await.unwrap();
        }
        assert!(
            store
                .find_user_by_external_id("auth|2")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn writes_queued_behind_a_transaction_survive_its_commit() {
        let store = MemoryStore::new();
        let tx = store.begin().await.unwrap();

        let writer = {
            let store = store.clone();
            tokio::spawn(async move { store.insert_user(new_user("auth|4")).await.unwrap() })
        };
        tx.insert_user(new_user("auth|5")).await.unwrap();
        tx.commit().await.unwrap();

        let queued = writer.await.unwrap();
        assert!(store.get_user(queued).await.unwrap().is_some());
        assert!(
            store
                .find_user_by_external_id("auth|5")
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn commit_without_begin_fails() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.commit().await,
            Err(DatabaseError::Transaction(_))
        ));
    }

    #[tokio::test]
    async fn patch_refreshes_updated_at() {
        let store = MemoryStore::new();
        let id = store.insert_user(new_user("auth|3")).await.unwrap();
        let before = store.get_user(id).await.unwrap().unwrap();

        store
            .patch_user(
                id,
                UserPatch {
                    display_name: Some("Renamed".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let after = store.get_user(id).await.unwrap().unwrap();
        assert_eq!(after.display_name, "Renamed");
        assert!(after.updated_at >= before.updated_at);
        assert_eq!(after.created_at, before.created_at);
    }
}
