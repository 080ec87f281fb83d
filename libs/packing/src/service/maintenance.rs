use serde::Serialize;
use tracing::{info, warn};

use super::PackingService;
use crate::error::PackingResult;
use crate::guard::{assert_admin, Principal};
use crate::hierarchy::delete_category_cascade;
use crate::models::EntityCounts;
use crate::store::EntityStore;

/// Rows removed by an orphan sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub categories: usize,
    pub items: usize,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.categories == 0 && self.items == 0
    }
}

impl<S: EntityStore> PackingService<S> {
    /// Delete categories whose list is gone, with their items, then items
    /// whose category is gone. Running it again finds nothing.
    pub async fn sweep_orphans(&self) -> PackingResult<SweepReport> {
        let tx = self.store.begin().await?;
        let mut report = SweepReport::default();

        for category_id in tx.orphaned_categories().await? {
            report.items += delete_category_cascade(&tx, category_id).await?;
            report.categories += 1;
        }
        for item_id in tx.orphaned_items().await? {
            tx.delete_item(item_id).await?;
            report.items += 1;
        }
        tx.commit().await?;

        if report.is_empty() {
            info!("Orphan sweep found nothing to remove");
        } else {
            warn!(
                "Orphan sweep removed {} categories and {} items",
                report.categories, report.items
            );
        }
        Ok(report)
    }

    /// [`Self::sweep_orphans`] on behalf of an admin
    pub async fn sweep_orphans_as(&self, actor: &Principal) -> PackingResult<SweepReport> {
        assert_admin(&self.store, actor).await?;
        self.sweep_orphans().await
    }

    pub async fn platform_stats(&self, actor: &Principal) -> PackingResult<EntityCounts> {
        assert_admin(&self.store, actor).await?;
        Ok(self.store.entity_counts().await?)
    }
}
