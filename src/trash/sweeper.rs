//! Scheduled trash cleanup

use std::sync::Arc;

use chrono::Utc;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use super::service::{SweepReport, TrashService};

/// Run one sweep across every owner, logging the outcome.
pub async fn run_sweep(service: &TrashService) -> Option<SweepReport> {
    match service.cleanup_expired(None, Utc::now()).await {
        Ok(report) => {
            for failure in &report.failures {
                tracing::warn!(loan_id = %failure.loan_id, reason = %failure.reason, "Purge failed during sweep");
            }
            Some(report)
        }
        Err(e) => {
            tracing::error!(error = %e, "Trash cleanup sweep failed");
            None
        }
    }
}

/// Schedule [`run_sweep`] on `cron` (six-field, seconds first).
/// The returned scheduler must be kept alive for the job to keep running.
pub async fn start_cleanup_job(
    service: Arc<TrashService>,
    cron: &str,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    let job = Job::new_async(cron, move |_id, _scheduler| {
        let service = service.clone();
        Box::pin(async move {
            tracing::info!("Trash cleanup job started");
            run_sweep(&service).await;
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;
    tracing::info!(cron = %cron, "Trash cleanup job scheduled");

    Ok(scheduler)
}
