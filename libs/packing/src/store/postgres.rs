//! PostgreSQL store
//!
//! A `PgStore` either runs each statement on the pool or, once returned by
//! `begin`, runs every statement inside one open transaction.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::{DatabaseError, DatabaseResult};
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder, Row, Transaction};
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use super::EntityStore;
use crate::ids::{CategoryId, ItemId, ListId, ModerationId, TemplateId, UserId};
use crate::models::{
    Category, CategoryPatch, ContentType, EntityCounts, Item, ItemPatch, ListPatch,
    ModerationHistoryEntry, ModerationPatch, ModerationRecord, ModerationStatus, NewCategory,
    NewItem, NewList, NewModerationHistory, NewModerationRecord, NewTemplate, NewUser,
    PackingList, Priority, Template, TemplateCategory, TemplateCreator, User, UserPatch,
    UserRole,
};

const USER_COLUMNS: &str =
    "id, external_id, display_name, email, role, preferences, created_at, updated_at";
const LIST_COLUMNS: &str = "id, user_id, name, description, tags, is_template, is_public, \
     template_id, completed_at, created_at, updated_at";
const CATEGORY_COLUMNS: &str =
    "id, list_id, name, color, icon, sort_order, collapsed, created_at, updated_at";
const ITEM_COLUMNS: &str = "id, category_id, name, quantity, packed, priority, notes, \
     description, weight, tags, sort_order, created_at, updated_at";
const TEMPLATE_COLUMNS: &str = "id, creator_id, name, description, tags, is_public, usage_count, \
     difficulty, season, duration, categories, created_at, updated_at";
const MODERATION_COLUMNS: &str = "id, content_id, content_type, status, reason, reported_by, \
     reviewed_by, created_at, updated_at";

#[derive(Clone)]
enum Connection {
    Pool(PgPool),
    /// `None` once committed
    Transaction(Arc<Mutex<Option<Transaction<'static, Postgres>>>>),
}

/// Store backed by PostgreSQL
#[derive(Clone)]
pub struct PgStore {
    conn: Connection,
}

impl PgStore {
    /// Create a new store on top of a connection pool
    pub fn new(pool: PgPool) -> Self {
        Self {
            conn: Connection::Pool(pool),
        }
    }

    /// Apply the bundled schema migrations
    pub async fn migrate(&self) -> DatabaseResult<()> {
        let Connection::Pool(pool) = &self.conn else {
            return Err(DatabaseError::Migration(
                "migrations cannot run inside a transaction".to_string(),
            ));
        };

        info!("Running packing schema migrations");
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .map_err(|e| DatabaseError::Migration(e.to_string()))?;
        Ok(())
    }

    fn closed() -> DatabaseError {
        DatabaseError::Transaction("transaction already committed".to_string())
    }

    async fn execute(&self, query: Query<'_, Postgres, PgArguments>) -> DatabaseResult<u64> {
        let result = match &self.conn {
            Connection::Pool(pool) => query.execute(pool).await?,
            Connection::Transaction(tx) => {
                let mut guard = tx.lock().await;
                let tx = guard.as_mut().ok_or_else(Self::closed)?;
                query.execute(&mut **tx).await?
            }
        };
        Ok(result.rows_affected())
    }

    async fn fetch_optional(
        &self,
        query: Query<'_, Postgres, PgArguments>,
    ) -> DatabaseResult<Option<PgRow>> {
        let row = match &self.conn {
            Connection::Pool(pool) => query.fetch_optional(pool).await?,
            Connection::Transaction(tx) => {
                let mut guard = tx.lock().await;
                let tx = guard.as_mut().ok_or_else(Self::closed)?;
                query.fetch_optional(&mut **tx).await?
            }
        };
        Ok(row)
    }

    async fn fetch_all(&self, query: Query<'_, Postgres, PgArguments>) -> DatabaseResult<Vec<PgRow>> {
        let rows = match &self.conn {
            Connection::Pool(pool) => query.fetch_all(pool).await?,
            Connection::Transaction(tx) => {
                let mut guard = tx.lock().await;
                let tx = guard.as_mut().ok_or_else(Self::closed)?;
                query.fetch_all(&mut **tx).await?
            }
        };
        Ok(rows)
    }

    async fn count(&self, sql: &str) -> DatabaseResult<u64> {
        let row = self
            .fetch_optional(sqlx::query(sql))
            .await?
            .ok_or_else(|| DatabaseError::Decode(format!("no row returned by: {}", sql)))?;
        let count: i64 = row.try_get(0)?;
        Ok(count.max(0) as u64)
    }
}

#[async_trait]
impl EntityStore for PgStore {
    async fn begin(&self) -> DatabaseResult<Self> {
        match &self.conn {
            Connection::Pool(pool) => {
                let tx = pool.begin().await?;
                Ok(Self {
                    conn: Connection::Transaction(Arc::new(Mutex::new(Some(tx)))),
                })
            }
            Connection::Transaction(_) => Err(DatabaseError::Transaction(
                "nested transactions are not supported".to_string(),
            )),
        }
    }

    async fn commit(self) -> DatabaseResult<()> {
        let Connection::Transaction(tx) = self.conn else {
            return Err(DatabaseError::Transaction(
                "commit called outside of a transaction".to_string(),
            ));
        };
        let tx = tx.lock().await.take().ok_or_else(Self::closed)?;
        tx.commit().await?;
        Ok(())
    }

    async fn get_user(&self, id: UserId) -> DatabaseResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        self.fetch_optional(sqlx::query(&sql).bind(id.as_uuid()))
            .await?
            .map(|row| row_to_user(&row))
            .transpose()
    }

    async fn find_user_by_external_id(&self, external_id: &str) -> DatabaseResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE external_id = $1", USER_COLUMNS);
        self.fetch_optional(sqlx::query(&sql).bind(external_id))
            .await?
            .map(|row| row_to_user(&row))
            .transpose()
    }

    async fn insert_user(&self, user: NewUser) -> DatabaseResult<UserId> {
        let id = UserId::new();
        self.execute(
            sqlx::query(
                r#"
                INSERT INTO users (id, external_id, display_name, email, role)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(id.as_uuid())
            .bind(user.external_id)
            .bind(user.display_name)
            .bind(user.email)
            .bind(user.role.as_str()),
        )
        .await?;
        Ok(id)
    }

    async fn patch_user(&self, id: UserId, patch: UserPatch) -> DatabaseResult<()> {
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE users SET updated_at = NOW()");
        if let Some(display_name) = patch.display_name {
            builder.push(", display_name = ").push_bind(display_name);
        }
        if let Some(email) = patch.email {
            builder.push(", email = ").push_bind(email);
        }
        if let Some(role) = patch.role {
            builder.push(", role = ").push_bind(role.as_str());
        }
        if let Some(preferences) = patch.preferences {
            builder.push(", preferences = ").push_bind(preferences);
        }
        builder.push(" WHERE id = ").push_bind(id.as_uuid());
        self.execute(builder.build()).await?;
        Ok(())
    }

    async fn get_list(&self, id: ListId) -> DatabaseResult<Option<PackingList>> {
        let sql = format!("SELECT {} FROM lists WHERE id = $1", LIST_COLUMNS);
        self.fetch_optional(sqlx::query(&sql).bind(id.as_uuid()))
            .await?
            .map(|row| row_to_list(&row))
            .transpose()
    }

    async fn lists_by_user(&self, user_id: UserId) -> DatabaseResult<Vec<PackingList>> {
        let sql = format!(
            "SELECT {} FROM lists WHERE user_id = $1 ORDER BY created_at DESC",
            LIST_COLUMNS
        );
        self.fetch_all(sqlx::query(&sql).bind(user_id.as_uuid()))
            .await?
            .iter()
            .map(row_to_list)
            .collect()
    }

    async fn insert_list(&self, list: NewList) -> DatabaseResult<ListId> {
        let id = ListId::new();
        self.execute(
            sqlx::query(
                r#"
                INSERT INTO lists (id, user_id, name, description, tags, is_template, is_public, template_id)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(id.as_uuid())
            .bind(list.user_id.as_uuid())
            .bind(list.name)
            .bind(list.description)
            .bind(list.tags)
            .bind(list.is_template)
            .bind(list.is_public)
            .bind(list.template_id.map(|t| t.as_uuid())),
        )
        .await?;
        Ok(id)
    }

    async fn patch_list(&self, id: ListId, patch: ListPatch) -> DatabaseResult<()> {
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE lists SET updated_at = NOW()");
        if let Some(name) = patch.name {
            builder.push(", name = ").push_bind(name);
        }
        if let Some(description) = patch.description {
            builder.push(", description = ").push_bind(description);
        }
        if let Some(tags) = patch.tags {
            builder.push(", tags = ").push_bind(tags);
        }
        if let Some(is_template) = patch.is_template {
            builder.push(", is_template = ").push_bind(is_template);
        }
        if let Some(is_public) = patch.is_public {
            builder.push(", is_public = ").push_bind(is_public);
        }
        if let Some(completed_at) = patch.completed_at {
            builder.push(", completed_at = ").push_bind(completed_at);
        }
        builder.push(" WHERE id = ").push_bind(id.as_uuid());
        self.execute(builder.build()).await?;
        Ok(())
    }

    async fn delete_list(&self, id: ListId) -> DatabaseResult<()> {
        self.execute(sqlx::query("DELETE FROM lists WHERE id = $1").bind(id.as_uuid()))
            .await?;
        Ok(())
    }

    async fn get_category(&self, id: CategoryId) -> DatabaseResult<Option<Category>> {
        let sql = format!("SELECT {} FROM categories WHERE id = $1", CATEGORY_COLUMNS);
        self.fetch_optional(sqlx::query(&sql).bind(id.as_uuid()))
            .await?
            .map(|row| row_to_category(&row))
            .transpose()
    }

    async fn categories_by_list(&self, list_id: ListId) -> DatabaseResult<Vec<Category>> {
        let sql = format!(
            "SELECT {} FROM categories WHERE list_id = $1",
            CATEGORY_COLUMNS
        );
        self.fetch_all(sqlx::query(&sql).bind(list_id.as_uuid()))
            .await?
            .iter()
            .map(row_to_category)
            .collect()
    }

    async fn insert_category(&self, category: NewCategory) -> DatabaseResult<CategoryId> {
        let id = CategoryId::new();
        self.execute(
            sqlx::query(
                r#"
                INSERT INTO categories (id, list_id, name, color, icon, sort_order, collapsed)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(id.as_uuid())
            .bind(category.list_id.as_uuid())
            .bind(category.name)
            .bind(category.color)
            .bind(category.icon)
            .bind(category.order)
            .bind(category.collapsed),
        )
        .await?;
        Ok(id)
    }

    async fn patch_category(&self, id: CategoryId, patch: CategoryPatch) -> DatabaseResult<()> {
        let mut builder =
            QueryBuilder::<Postgres>::new("UPDATE categories SET updated_at = NOW()");
        if let Some(name) = patch.name {
            builder.push(", name = ").push_bind(name);
        }
        if let Some(color) = patch.color {
            builder.push(", color = ").push_bind(color);
        }
        if let Some(icon) = patch.icon {
            builder.push(", icon = ").push_bind(icon);
        }
        if let Some(order) = patch.order {
            builder.push(", sort_order = ").push_bind(order);
        }
        if let Some(collapsed) = patch.collapsed {
            builder.push(", collapsed = ").push_bind(collapsed);
        }
        builder.push(" WHERE id = ").push_bind(id.as_uuid());
        self.execute(builder.build()).await?;
        Ok(())
    }

    async fn delete_category(&self, id: CategoryId) -> DatabaseResult<()> {
        self.execute(sqlx::query("DELETE FROM categories WHERE id = $1").bind(id.as_uuid()))
            .await?;
        Ok(())
    }

    async fn get_item(&self, id: ItemId) -> DatabaseResult<Option<Item>> {
        let sql = format!("SELECT {} FROM items WHERE id = $1", ITEM_COLUMNS);
        self.fetch_optional(sqlx::query(&sql).bind(id.as_uuid()))
            .await?
            .map(|row| row_to_item(&row))
            .transpose()
    }

    async fn items_by_category(&self, category_id: CategoryId) -> DatabaseResult<Vec<Item>> {
        let sql = format!("SELECT {} FROM items WHERE category_id = $1", ITEM_COLUMNS);
        self.fetch_all(sqlx::query(&sql).bind(category_id.as_uuid()))
            .await?
            .iter()
            .map(row_to_item)
            .collect()
    }

    async fn insert_item(&self, item: NewItem) -> DatabaseResult<ItemId> {
        let id = ItemId::new();
        self.execute(
            sqlx::query(
                r#"
                INSERT INTO items (id, category_id, name, quantity, packed, priority, notes,
                                   description, weight, tags, sort_order)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                "#,
            )
            .bind(id.as_uuid())
            .bind(item.category_id.as_uuid())
            .bind(item.name)
            .bind(item.quantity)
            .bind(item.packed)
            .bind(item.priority.as_str())
            .bind(item.notes)
            .bind(item.description)
            .bind(item.weight)
            .bind(item.tags)
            .bind(item.order),
        )
        .await?;
        Ok(id)
    }

    async fn patch_item(&self, id: ItemId, patch: ItemPatch) -> DatabaseResult<()> {
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE items SET updated_at = NOW()");
        if let Some(name) = patch.name {
            builder.push(", name = ").push_bind(name);
        }
        if let Some(quantity) = patch.quantity {
            builder.push(", quantity = ").push_bind(quantity);
        }
        if let Some(packed) = patch.packed {
            builder.push(", packed = ").push_bind(packed);
        }
        if let Some(priority) = patch.priority {
            builder.push(", priority = ").push_bind(priority.as_str());
        }
        if let Some(notes) = patch.notes {
            builder.push(", notes = ").push_bind(notes);
        }
        if let Some(description) = patch.description {
            builder.push(", description = ").push_bind(description);
        }
        if let Some(weight) = patch.weight {
            builder.push(", weight = ").push_bind(weight);
        }
        if let Some(tags) = patch.tags {
            builder.push(", tags = ").push_bind(tags);
        }
        if let Some(order) = patch.order {
            builder.push(", sort_order = ").push_bind(order);
        }
        builder.push(" WHERE id = ").push_bind(id.as_uuid());
        self.execute(builder.build()).await?;
        Ok(())
    }

    async fn move_item(
        &self,
        id: ItemId,
        category_id: CategoryId,
        order: i32,
    ) -> DatabaseResult<()> {
        self.execute(
            sqlx::query(
                "UPDATE items SET category_id = $1, sort_order = $2, updated_at = NOW() WHERE id = $3",
            )
            .bind(category_id.as_uuid())
            .bind(order)
            .bind(id.as_uuid()),
        )
        .await?;
        Ok(())
    }

    async fn delete_item(&self, id: ItemId) -> DatabaseResult<()> {
        self.execute(sqlx::query("DELETE FROM items WHERE id = $1").bind(id.as_uuid()))
            .await?;
        Ok(())
    }

    async fn get_template(&self, id: TemplateId) -> DatabaseResult<Option<Template>> {
        let sql = format!("SELECT {} FROM templates WHERE id = $1", TEMPLATE_COLUMNS);
        self.fetch_optional(sqlx::query(&sql).bind(id.as_uuid()))
            .await?
            .map(|row| row_to_template(&row))
            .transpose()
    }

    async fn templates_by_creator(&self, creator_id: UserId) -> DatabaseResult<Vec<Template>> {
        let sql = format!(
            "SELECT {} FROM templates WHERE creator_id = $1 ORDER BY created_at DESC",
            TEMPLATE_COLUMNS
        );
        self.fetch_all(sqlx::query(&sql).bind(creator_id.as_uuid()))
            .await?
            .iter()
            .map(row_to_template)
            .collect()
    }

    async fn public_templates(&self) -> DatabaseResult<Vec<Template>> {
        let sql = format!(
            "SELECT {} FROM templates WHERE is_public ORDER BY usage_count DESC, created_at DESC",
            TEMPLATE_COLUMNS
        );
        self.fetch_all(sqlx::query(&sql))
            .await?
            .iter()
            .map(row_to_template)
            .collect()
    }

    async fn insert_template(&self, template: NewTemplate) -> DatabaseResult<TemplateId> {
        let id = TemplateId::new();
        self.execute(
            sqlx::query(
                r#"
                INSERT INTO templates (id, creator_id, name, description, tags, is_public,
                                       difficulty, season, duration, categories)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                "#,
            )
            .bind(id.as_uuid())
            .bind(template.creator_id.as_uuid())
            .bind(template.name)
            .bind(template.description)
            .bind(template.tags)
            .bind(template.is_public)
            .bind(template.difficulty)
            .bind(template.season)
            .bind(template.duration)
            .bind(Json(template.categories)),
        )
        .await?;
        Ok(id)
    }

    async fn increment_template_usage(&self, id: TemplateId) -> DatabaseResult<()> {
        self.execute(
            sqlx::query(
                "UPDATE templates SET usage_count = usage_count + 1, updated_at = NOW() WHERE id = $1",
            )
            .bind(id.as_uuid()),
        )
        .await?;
        Ok(())
    }

    async fn delete_template(&self, id: TemplateId) -> DatabaseResult<()> {
        self.execute(sqlx::query("DELETE FROM templates WHERE id = $1").bind(id.as_uuid()))
            .await?;
        Ok(())
    }

    async fn get_moderation(&self, id: ModerationId) -> DatabaseResult<Option<ModerationRecord>> {
        let sql = format!("SELECT {} FROM moderation WHERE id = $1", MODERATION_COLUMNS);
        self.fetch_optional(sqlx::query(&sql).bind(id.as_uuid()))
            .await?
            .map(|row| row_to_moderation(&row))
            .transpose()
    }

    async fn find_moderation(
        &self,
        content_id: &str,
        content_type: ContentType,
    ) -> DatabaseResult<Option<ModerationRecord>> {
        let sql = format!(
            "SELECT {} FROM moderation WHERE content_id = $1 AND content_type = $2 \
             ORDER BY created_at ASC, id ASC LIMIT 1",
            MODERATION_COLUMNS
        );
        self.fetch_optional(
            sqlx::query(&sql)
                .bind(content_id)
                .bind(content_type.as_str()),
        )
        .await?
        .map(|row| row_to_moderation(&row))
        .transpose()
    }

    async fn moderation_records(
        &self,
        status: Option<ModerationStatus>,
    ) -> DatabaseResult<Vec<ModerationRecord>> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT ");
        builder.push(MODERATION_COLUMNS).push(" FROM moderation");
        if let Some(status) = status {
            builder.push(" WHERE status = ").push_bind(status.as_str());
        }
        self.fetch_all(builder.build())
            .await?
            .iter()
            .map(row_to_moderation)
            .collect()
    }

    async fn insert_moderation(
        &self,
        record: NewModerationRecord,
    ) -> DatabaseResult<ModerationId> {
        let id = ModerationId::new();
        self.execute(
            sqlx::query(
                r#"
                INSERT INTO moderation (id, content_id, content_type, status, reason, reported_by)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(id.as_uuid())
            .bind(record.content_id)
            .bind(record.content_type.as_str())
            .bind(record.status.as_str())
            .bind(record.reason)
            .bind(record.reported_by.map(|u| u.as_uuid())),
        )
        .await?;
        Ok(id)
    }

    async fn patch_moderation(
        &self,
        id: ModerationId,
        patch: ModerationPatch,
    ) -> DatabaseResult<()> {
        let mut builder =
            QueryBuilder::<Postgres>::new("UPDATE moderation SET updated_at = NOW()");
        if let Some(status) = patch.status {
            builder.push(", status = ").push_bind(status.as_str());
        }
        if let Some(reason) = patch.reason {
            builder.push(", reason = ").push_bind(reason);
        }
        if let Some(reviewed_by) = patch.reviewed_by {
            builder.push(", reviewed_by = ").push_bind(reviewed_by.as_uuid());
        }
        builder.push(" WHERE id = ").push_bind(id.as_uuid());
        self.execute(builder.build()).await?;
        Ok(())
    }

    async fn delete_moderation(&self, id: ModerationId) -> DatabaseResult<()> {
        self.execute(
            sqlx::query("DELETE FROM moderation_history WHERE moderation_id = $1")
                .bind(id.as_uuid()),
        )
        .await?;
        self.execute(sqlx::query("DELETE FROM moderation WHERE id = $1").bind(id.as_uuid()))
            .await?;
        Ok(())
    }

    async fn insert_moderation_history(&self, entry: NewModerationHistory) -> DatabaseResult<()> {
        self.execute(
            sqlx::query(
                r#"
                INSERT INTO moderation_history (id, moderation_id, status, reason, actor_id)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(entry.moderation_id.as_uuid())
            .bind(entry.status.as_str())
            .bind(entry.reason)
            .bind(entry.actor_id.map(|u| u.as_uuid())),
        )
        .await?;
        Ok(())
    }

    async fn moderation_history(
        &self,
        id: ModerationId,
    ) -> DatabaseResult<Vec<ModerationHistoryEntry>> {
        let rows = self
            .fetch_all(
                sqlx::query(
                    r#"
                    SELECT id, moderation_id, status, reason, actor_id, created_at
                    FROM moderation_history
                    WHERE moderation_id = $1
                    ORDER BY created_at ASC
                    "#,
                )
                .bind(id.as_uuid()),
            )
            .await?;

        rows.iter()
            .map(|row| -> DatabaseResult<ModerationHistoryEntry> {
                Ok(ModerationHistoryEntry {
                    id: row.try_get("id")?,
                    moderation_id: ModerationId::from_uuid(row.try_get("moderation_id")?),
                    status: parse_column(row, "status")?,
                    reason: row.try_get("reason")?,
                    actor_id: row
                        .try_get::<Option<Uuid>, _>("actor_id")?
                        .map(UserId::from_uuid),
                    created_at: row.try_get("created_at")?,
                })
            })
            .collect()
    }

    async fn orphaned_categories(&self) -> DatabaseResult<Vec<CategoryId>> {
        let rows = self
            .fetch_all(sqlx::query(
                r#"
                SELECT c.id
                FROM categories c
                LEFT JOIN lists l ON l.id = c.list_id
                WHERE l.id IS NULL
                "#,
            ))
            .await?;
        rows.iter()
            .map(|row| -> DatabaseResult<CategoryId> { Ok(CategoryId::from_uuid(row.try_get("id")?)) })
            .collect()
    }

    async fn orphaned_items(&self) -> DatabaseResult<Vec<ItemId>> {
        let rows = self
            .fetch_all(sqlx::query(
                r#"
                SELECT i.id
                FROM items i
                LEFT JOIN categories c ON c.id = i.category_id
                WHERE c.id IS NULL
                "#,
            ))
            .await?;
        rows.iter()
            .map(|row| -> DatabaseResult<ItemId> { Ok(ItemId::from_uuid(row.try_get("id")?)) })
            .collect()
    }

    async fn entity_counts(&self) -> DatabaseResult<EntityCounts> {
        Ok(EntityCounts {
            users: self.count("SELECT COUNT(*) FROM users").await?,
            lists: self.count("SELECT COUNT(*) FROM lists").await?,
            templates: self.count("SELECT COUNT(*) FROM templates").await?,
            items: self.count("SELECT COUNT(*) FROM items").await?,
            packed_items: self
                .count("SELECT COUNT(*) FROM items WHERE packed")
                .await?,
            pending_moderation: self
                .count("SELECT COUNT(*) FROM moderation WHERE status = 'pending'")
                .await?,
        })
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

/// Decode a text column into a domain enum
fn parse_column<T>(row: &PgRow, column: &str) -> DatabaseResult<T>
where
    T: std::str::FromStr<Err = String>,
{
    let raw: String = row.try_get(column)?;
    raw.parse::<T>().map_err(DatabaseError::Decode)
}

fn row_to_user(row: &PgRow) -> DatabaseResult<User> {
    Ok(User {
        id: UserId::from_uuid(row.try_get("id")?),
        external_id: row.try_get("external_id")?,
        display_name: row.try_get("display_name")?,
        email: row.try_get("email")?,
        role: parse_column::<UserRole>(row, "role")?,
        preferences: row.try_get("preferences")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_list(row: &PgRow) -> DatabaseResult<PackingList> {
    Ok(PackingList {
        id: ListId::from_uuid(row.try_get("id")?),
        user_id: UserId::from_uuid(row.try_get("user_id")?),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        tags: row.try_get("tags")?,
        is_template: row.try_get("is_template")?,
        is_public: row.try_get("is_public")?,
        template_id: row
            .try_get::<Option<Uuid>, _>("template_id")?
            .map(TemplateId::from_uuid),
        completed_at: row.try_get::<Option<DateTime<Utc>>, _>("completed_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_category(row: &PgRow) -> DatabaseResult<Category> {
    Ok(Category {
        id: CategoryId::from_uuid(row.try_get("id")?),
        list_id: ListId::from_uuid(row.try_get("list_id")?),
        name: row.try_get("name")?,
        color: row.try_get("color")?,
        icon: row.try_get("icon")?,
        order: row.try_get("sort_order")?,
        collapsed: row.try_get("collapsed")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_item(row: &PgRow) -> DatabaseResult<Item> {
    Ok(Item {
        id: ItemId::from_uuid(row.try_get("id")?),
        category_id: CategoryId::from_uuid(row.try_get("category_id")?),
        name: row.try_get("name")?,
        quantity: row.try_get("quantity")?,
        packed: row.try_get("packed")?,
        priority: parse_column::<Priority>(row, "priority")?,
        notes: row.try_get("notes")?,
        description: row.try_get("description")?,
        weight: row.try_get("weight")?,
        tags: row.try_get("tags")?,
        order: row.try_get("sort_order")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_template(row: &PgRow) -> DatabaseResult<Template> {
    let Json(categories): Json<Vec<TemplateCategory>> = row.try_get("categories")?;
    Ok(Template {
        id: TemplateId::from_uuid(row.try_get("id")?),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        tags: row.try_get("tags")?,
        is_public: row.try_get("is_public")?,
        creator: TemplateCreator::User(UserId::from_uuid(row.try_get("creator_id")?)),
        usage_count: row.try_get("usage_count")?,
        difficulty: row.try_get("difficulty")?,
        season: row.try_get("season")?,
        duration: row.try_get("duration")?,
        categories,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_moderation(row: &PgRow) -> DatabaseResult<ModerationRecord> {
    Ok(ModerationRecord {
        id: ModerationId::from_uuid(row.try_get("id")?),
        content_id: row.try_get("content_id")?,
        content_type: parse_column::<ContentType>(row, "content_type")?,
        status: parse_column::<ModerationStatus>(row, "status")?,
        reason: row.try_get("reason")?,
        reported_by: row
            .try_get::<Option<Uuid>, _>("reported_by")?
            .map(UserId::from_uuid),
        reviewed_by: row
            .try_get::<Option<Uuid>, _>("reviewed_by")?
            .map(UserId::from_uuid),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
