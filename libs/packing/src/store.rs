//! Persistence contract the packing logic is written against
//!
//! Every lookup returns `Option`; turning an absent row into a `NotFound`
//! is the caller's job. Inserts assign the id and both timestamps, patches
//! refresh `updated_at`, deletes remove exactly one row. Cascades are
//! orchestrated by [`crate::hierarchy`], never by the store.

use async_trait::async_trait;
use common::error::DatabaseResult;

use crate::ids::{CategoryId, ItemId, ListId, ModerationId, TemplateId, UserId};
use crate::models::{
    Category, CategoryPatch, ContentType, EntityCounts, Item, ItemPatch, ListPatch,
    ModerationHistoryEntry, ModerationPatch, ModerationRecord, ModerationStatus, NewCategory,
    NewItem, NewList, NewModerationHistory, NewModerationRecord, NewTemplate, NewUser,
    PackingList, Template, User, UserPatch,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait EntityStore: Send + Sync + Sized + 'static {
    /// Open a unit of work. Writes made through the returned store become
    /// visible to others only once [`EntityStore::commit`] succeeds; dropping
    /// it uncommitted discards them.
    async fn begin(&self) -> DatabaseResult<Self>;

    /// Publish a unit of work opened with [`EntityStore::begin`].
    async fn commit(self) -> DatabaseResult<()>;

    // Users

    async fn get_user(&self, id: UserId) -> DatabaseResult<Option<User>>;
    async fn find_user_by_external_id(&self, external_id: &str) -> DatabaseResult<Option<User>>;
    async fn insert_user(&self, user: NewUser) -> DatabaseResult<UserId>;
    async fn patch_user(&self, id: UserId, patch: UserPatch) -> DatabaseResult<()>;

    // Lists

    async fn get_list(&self, id: ListId) -> DatabaseResult<Option<PackingList>>;
    async fn lists_by_user(&self, user_id: UserId) -> DatabaseResult<Vec<PackingList>>;
    async fn insert_list(&self, list: NewList) -> DatabaseResult<ListId>;
    async fn patch_list(&self, id: ListId, patch: ListPatch) -> DatabaseResult<()>;
    async fn delete_list(&self, id: ListId) -> DatabaseResult<()>;

    // Categories

    async fn get_category(&self, id: CategoryId) -> DatabaseResult<Option<Category>>;
    /// Unsorted; callers sort with [`crate::ordering::sort_siblings`].
    async fn categories_by_list(&self, list_id: ListId) -> DatabaseResult<Vec<Category>>;
    async fn insert_category(&self, category: NewCategory) -> DatabaseResult<CategoryId>;
    async fn patch_category(&self, id: CategoryId, patch: CategoryPatch) -> DatabaseResult<()>;
    async fn delete_category(&self, id: CategoryId) -> DatabaseResult<()>;

    // Items

    async fn get_item(&self, id: ItemId) -> DatabaseResult<Option<Item>>;
    /// Unsorted; callers sort with [`crate::ordering::sort_siblings`].
    async fn items_by_category(&self, category_id: CategoryId) -> DatabaseResult<Vec<Item>>;
    async fn insert_item(&self, item: NewItem) -> DatabaseResult<ItemId>;
    async fn patch_item(&self, id: ItemId, patch: ItemPatch) -> DatabaseResult<()>;
    /// Re-parent an item. The only write that changes `category_id`.
    async fn move_item(
        &self,
        id: ItemId,
        category_id: CategoryId,
        order: i32,
    ) -> DatabaseResult<()>;
    async fn delete_item(&self, id: ItemId) -> DatabaseResult<()>;

    // Templates (user-authored only; built-ins live in code)

    async fn get_template(&self, id: TemplateId) -> DatabaseResult<Option<Template>>;
    async fn templates_by_creator(&self, creator_id: UserId) -> DatabaseResult<Vec<Template>>;
    async fn public_templates(&self) -> DatabaseResult<Vec<Template>>;
    async fn insert_template(&self, template: NewTemplate) -> DatabaseResult<TemplateId>;
    async fn increment_template_usage(&self, id: TemplateId) -> DatabaseResult<()>;
    async fn delete_template(&self, id: TemplateId) -> DatabaseResult<()>;

    // Moderation

    async fn get_moderation(&self, id: ModerationId) -> DatabaseResult<Option<ModerationRecord>>;
    /// First record for the pair, oldest first, if any.
    async fn find_moderation(
        &self,
        content_id: &str,
        content_type: ContentType,
    ) -> DatabaseResult<Option<ModerationRecord>>;
    async fn moderation_records(
        &self,
        status: Option<ModerationStatus>,
    ) -> DatabaseResult<Vec<ModerationRecord>>;
    async fn insert_moderation(&self, record: NewModerationRecord)
    -> DatabaseResult<ModerationId>;
    async fn patch_moderation(&self, id: ModerationId, patch: ModerationPatch)
    -> DatabaseResult<()>;
    /// Deletes the record and its history trail.
    async fn delete_moderation(&self, id: ModerationId) -> DatabaseResult<()>;
    async fn insert_moderation_history(&self, entry: NewModerationHistory) -> DatabaseResult<()>;
    async fn moderation_history(
        &self,
        id: ModerationId,
    ) -> DatabaseResult<Vec<ModerationHistoryEntry>>;

    // Maintenance

    /// Categories whose list no longer exists.
    async fn orphaned_categories(&self) -> DatabaseResult<Vec<CategoryId>>;
    /// Items whose category no longer exists.
    async fn orphaned_items(&self) -> DatabaseResult<Vec<ItemId>>;
    async fn entity_counts(&self) -> DatabaseResult<EntityCounts>;
}
