//! Scheduled maintenance for the task store
//!
//! Soft-deleted tasks are retained for 30 days and then permanently
//! removed by a periodic sweep. The sweep only touches rows already in the
//! terminal `deleted` state, so it needs no coordination with request
//! handling.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::repositories::TaskRepository;

/// Days a soft-deleted task is retained before permanent removal
pub const RETENTION_DAYS: i64 = 30;

/// Sweeper configuration
#[derive(Debug, Clone)]
pub struct SweeperConfig {
    /// Cron schedule for the purge job (seconds-resolution cron)
    pub sweep_schedule: String,
    /// Cron schedule for the due-soon report
    pub notify_schedule: String,
}

impl SweeperConfig {
    /// Create a new SweeperConfig from environment variables
    ///
    /// # Environment Variables
    /// - `SWEEP_SCHEDULE`: purge cron (default: "0 0 0 * * *", daily at midnight)
    /// - `NOTIFY_SCHEDULE`: due-soon report cron (default: "0 0 * * * *", hourly)
    pub fn from_env() -> Self {
        let sweep_schedule =
            std::env::var("SWEEP_SCHEDULE").unwrap_or_else(|_| "0 0 0 * * *".to_string());
        let notify_schedule =
            std::env::var("NOTIFY_SCHEDULE").unwrap_or_else(|_| "0 0 * * * *".to_string());

        Self {
            sweep_schedule,
            notify_schedule,
        }
    }
}

/// Periodic removal of soft-deleted tasks past the retention window
#[derive(Clone)]
pub struct TaskSweeper {
    tasks: TaskRepository,
}

impl TaskSweeper {
    /// Create a new sweeper over the task store
    pub fn new(tasks: TaskRepository) -> Self {
        Self { tasks }
    }

    /// Remove soft-deleted tasks whose last update is older than the
    /// retention window. Idempotent; a second run right after the first
    /// removes nothing.
    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<u64> {
        let cutoff = now - Duration::days(RETENTION_DAYS);
        let removed = self.tasks.purge_deleted(cutoff).await?;

        if removed > 0 {
            info!("Cleaned up {} deleted tasks", removed);
        }

        Ok(removed)
    }

    /// Report how many pending tasks come due within the next day
    pub async fn notify_due_soon(&self, now: DateTime<Utc>) -> Result<i64> {
        let due = self.tasks.count_due_between(now, now + Duration::days(1)).await?;

        if due > 0 {
            info!("Found {} tasks due within the next day", due);
        }

        Ok(due)
    }

    /// Register both jobs and start the scheduler
    pub async fn start(&self, config: &SweeperConfig) -> Result<()> {
        let scheduler = JobScheduler::new().await?;

        let sweeper = self.clone();
        let sweep_job = Job::new_async(config.sweep_schedule.as_str(), move |_, _| {
            let sweeper = sweeper.clone();
            Box::pin(async move {
                if let Err(e) = sweeper.sweep(Utc::now()).await {
                    error!("Failed to sweep deleted tasks: {}", e);
                }
            })
        })?;
        scheduler.add(sweep_job).await?;

        let sweeper = self.clone();
        let notify_job = Job::new_async(config.notify_schedule.as_str(), move |_, _| {
            let sweeper = sweeper.clone();
            Box::pin(async move {
                if let Err(e) = sweeper.notify_due_soon(Utc::now()).await {
                    error!("Failed to report due tasks: {}", e);
                }
            })
        })?;
        scheduler.add(notify_job).await?;

        scheduler.start().await?;
        info!(
            "Started task maintenance scheduler (sweep: {}, notify: {})",
            config.sweep_schedule, config.notify_schedule
        );
        Ok(())
    }
}
