//! Scheduled maintenance: orphan sweep and moderation duplicate cleanup

use anyhow::Result;
use packing::PackingService;
use packing::store::EntityStore;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

/// Run one maintenance pass, logging failures instead of propagating them
pub async fn run_once<S: EntityStore>(service: &PackingService<S>) {
    match service.sweep_orphans().await {
        Ok(report) => info!(
            "Maintenance sweep done: {} categories, {} items removed",
            report.categories, report.items
        ),
        Err(e) => error!("Orphan sweep failed: {}", e),
    }

    match service.remove_duplicate_moderation_records().await {
        Ok(removed) => info!("Maintenance removed {} duplicate moderation records", removed),
        Err(e) => error!("Moderation cleanup failed: {}", e),
    }
}

/// Start the maintenance job on a cron schedule. The returned scheduler
/// must be kept alive for the job to keep running.
pub async fn start<S: EntityStore>(
    service: Arc<PackingService<S>>,
    schedule: &str,
) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let job = Job::new_async(schedule, move |_, _| {
        let service = service.clone();
        Box::pin(async move {
            info!("Maintenance job executed");
            run_once(&service).await;
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;

    info!("Started maintenance scheduler with schedule: {}", schedule);
    Ok(scheduler)
}
