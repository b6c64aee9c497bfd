pub mod odds;
pub mod picks;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Local, Utc};
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

use crate::api::health::{HealthState, TaskKind};
use crate::config::{ODDS_REFRESH_CRON, PICKS_SCRAPE_CRON};
use crate::context::ServiceContext;
use crate::error::Result;

pub use odds::OddsRefresher;
pub use picks::PicksRefresher;

/// One unit of scheduled work. A cycle returns how many records it wrote.
#[async_trait]
pub trait RefreshTask: Send + Sync {
    fn kind(&self) -> TaskKind;
    async fn run_cycle(&self) -> Result<usize>;
}

/// Run one cycle and fold the outcome into `health`. Errors are logged here
/// and never reach the caller, so a failed cycle cannot stop the schedule.
pub async fn run_once(task: &dyn RefreshTask, health: &HealthState) -> bool {
    let kind = task.kind();
    match task.run_cycle().await {
        Ok(records) => {
            health.task(kind).record_success(Utc::now().timestamp(), records);
            true
        }
        Err(e) => {
            error!(task = %kind, "Refresh cycle failed: {e}");
            health.task(kind).record_failure();
            false
        }
    }
}

/// Register `task` to run on every tick of `cron`, evaluated in local time.
/// A tick that lands while the previous cycle is still running is skipped.
pub async fn register(
    sched: &JobScheduler,
    task: Arc<dyn RefreshTask>,
    cron: &str,
    health: Arc<HealthState>,
) -> Result<()> {
    let kind = task.kind();
    let running = Arc::new(Mutex::new(()));

    let job = Job::new_async_tz(cron, Local, move |_uuid, _sched| {
        let task = Arc::clone(&task);
        let health = Arc::clone(&health);
        let running = Arc::clone(&running);
        Box::pin(async move {
            let Ok(_guard) = running.try_lock() else {
                warn!(task = %task.kind(), "Previous cycle still running; tick skipped");
                return;
            };
            run_once(task.as_ref(), &health).await;
        })
    })?;
    sched.add(job).await?;

    info!(task = %kind, cron, "Refresh job registered");
    Ok(())
}

/// Build and start the scheduler for both refresh tasks. The returned handle
/// must stay alive for the jobs to keep firing.
pub async fn start(ctx: &ServiceContext) -> Result<JobScheduler> {
    let sched = JobScheduler::new().await?;

    register(
        &sched,
        Arc::new(OddsRefresher::from_context(ctx)),
        ODDS_REFRESH_CRON,
        Arc::clone(&ctx.health),
    )
    .await?;
    register(
        &sched,
        Arc::new(PicksRefresher::from_context(ctx)),
        PICKS_SCRAPE_CRON,
        Arc::clone(&ctx.health),
    )
    .await?;

    sched.start().await?;
    Ok(sched)
}
