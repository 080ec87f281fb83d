use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::PackingService;
use crate::builtin_templates::find_builtin;
use crate::error::{EntityKind, PackingError, PackingResult};
use crate::guard::{assert_admin, resolve_user, Principal};
use crate::ids::{ListId, ModerationId, TemplateId, UserId};
use crate::models::{
    ContentType, ModerationHistoryEntry, ModerationPatch, ModerationRecord, ModerationStatus,
    NewModerationHistory, NewModerationRecord,
};
use crate::store::EntityStore;
use crate::validation::normalize_text;

/// Queue entry: a record with the title of the content it points at
#[derive(Debug, Clone, Serialize)]
pub struct ModerationEntry {
    #[serde(flatten)]
    pub record: ModerationRecord,
    pub content_title: String,
}

/// Title of the referenced content, or `None` once it is gone
async fn content_title<S: EntityStore>(
    store: &S,
    record: &ModerationRecord,
) -> PackingResult<Option<String>> {
    let title = match record.content_type {
        ContentType::List => match record.content_id.parse::<ListId>() {
            Ok(id) => store.get_list(id).await?.map(|l| l.name),
            Err(_) => None,
        },
        ContentType::Template => match record.content_id.parse::<TemplateId>() {
            Ok(id) => match find_builtin(id) {
                Some(builtin) => Some(builtin.name.clone()),
                None => store.get_template(id).await?.map(|t| t.name),
            },
            Err(_) => None,
        },
        ContentType::User => match record.content_id.parse::<UserId>() {
            Ok(id) => store.get_user(id).await?.map(|u| u.display_name),
            Err(_) => None,
        },
    };
    Ok(title)
}

impl<S: EntityStore> PackingService<S> {
    /// Report content for review. A second report for the same content
    /// returns the existing record's id.
    pub async fn create_moderation_record(
        &self,
        actor: &Principal,
        content_id: &str,
        content_type: ContentType,
        reason: Option<String>,
    ) -> PackingResult<ModerationId> {
        let reporter = resolve_user(&self.store, actor).await?;
        let content_id = content_id.trim();
        if content_id.is_empty() {
            return Err(PackingError::Validation(
                "Content id is required".to_string(),
            ));
        }

        if let Some(existing) = self.store.find_moderation(content_id, content_type).await? {
            debug!(
                "Moderation record {} already tracks {} {}",
                existing.id, content_type, content_id
            );
            return Ok(existing.id);
        }

        let reason = normalize_text(reason);
        let tx = self.store.begin().await?;
        let record_id = tx
            .insert_moderation(NewModerationRecord {
                content_id: content_id.to_string(),
                content_type,
                status: ModerationStatus::Pending,
                reason: reason.clone(),
                reported_by: Some(reporter.id),
            })
            .await?;
        tx.insert_moderation_history(NewModerationHistory {
            moderation_id: record_id,
            status: ModerationStatus::Pending,
            reason,
            actor_id: Some(reporter.id),
        })
        .await?;
        tx.commit().await?;

        info!(
            "User {} reported {} {} as {}",
            reporter.id, content_type, content_id, record_id
        );
        Ok(record_id)
    }

    pub async fn update_moderation_status(
        &self,
        actor: &Principal,
        moderation_id: ModerationId,
        status: ModerationStatus,
        reason: Option<String>,
    ) -> PackingResult<()> {
        let admin = assert_admin(&self.store, actor).await?;
        self.store
            .get_moderation(moderation_id)
            .await?
            .ok_or_else(|| PackingError::not_found(EntityKind::ModerationRecord, moderation_id))?;

        let reason = normalize_text(reason);
        let tx = self.store.begin().await?;
        tx.patch_moderation(
            moderation_id,
            ModerationPatch {
                status: Some(status),
                reason: Some(reason.clone()),
                reviewed_by: Some(admin.id),
            },
        )
        .await?;
        tx.insert_moderation_history(NewModerationHistory {
            moderation_id,
            status,
            reason,
            actor_id: Some(admin.id),
        })
        .await?;
        tx.commit().await?;

        info!(
            "Admin {} set moderation record {} to {}",
            admin.id, moderation_id, status
        );
        Ok(())
    }

    /// Records newest first, optionally filtered by status. Records whose
    /// content no longer exists are left out.
    pub async fn moderation_queue(
        &self,
        actor: &Principal,
        status: Option<ModerationStatus>,
    ) -> PackingResult<Vec<ModerationEntry>> {
        assert_admin(&self.store, actor).await?;

        let mut records = self.store.moderation_records(status).await?;
        records.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        let mut entries = Vec::with_capacity(records.len());
        for record in records {
            match content_title(&self.store, &record).await {
                Ok(Some(content_title)) => entries.push(ModerationEntry {
                    record,
                    content_title,
                }),
                Ok(None) => warn!(
                    "Skipping moderation record {}: {} {} no longer exists",
                    record.id, record.content_type, record.content_id
                ),
                Err(e) => warn!(
                    "Skipping moderation record {}: content lookup failed: {}",
                    record.id, e
                ),
            }
        }
        Ok(entries)
    }

    /// History trail of a record, oldest first
    pub async fn moderation_history(
        &self,
        actor: &Principal,
        moderation_id: ModerationId,
    ) -> PackingResult<Vec<ModerationHistoryEntry>> {
        assert_admin(&self.store, actor).await?;
        self.store
            .get_moderation(moderation_id)
            .await?
            .ok_or_else(|| PackingError::not_found(EntityKind::ModerationRecord, moderation_id))?;

        let mut history = self.store.moderation_history(moderation_id).await?;
        history.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(history)
    }

    /// Keep the oldest record per content pair and delete the others with
    /// their history. Returns the number of records removed.
    pub async fn cleanup_duplicate_moderation_records(
        &self,
        actor: &Principal,
    ) -> PackingResult<usize> {
        assert_admin(&self.store, actor).await?;
        self.remove_duplicate_moderation_records().await
    }

    /// Duplicate cleanup without an acting user, for the scheduled job
    pub async fn remove_duplicate_moderation_records(&self) -> PackingResult<usize> {
        let tx = self.store.begin().await?;

        let mut groups: HashMap<(String, ContentType), Vec<ModerationRecord>> = HashMap::new();
        for record in tx.moderation_records(None).await? {
            groups
                .entry((record.content_id.clone(), record.content_type))
                .or_default()
                .push(record);
        }

        let mut removed = 0;
        for mut records in groups.into_values().filter(|g| g.len() > 1) {
            records.sort_by(|a, b| {
                a.created_at
                    .cmp(&b.created_at)
                    .then_with(|| a.id.cmp(&b.id))
            });
            for duplicate in records.iter().skip(1) {
                tx.delete_moderation(duplicate.id).await?;
                removed += 1;
            }
        }
        tx.commit().await?;

        if removed > 0 {
            warn!("Removed {} duplicate moderation records", removed);
        }
        Ok(removed)
    }
}
