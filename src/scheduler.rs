mod scheduler_jobs;
mod scheduler_task;
mod single_flight;
mod time_window;

pub use self::{
    scheduler_task::SchedulerTask,
    single_flight::{SingleFlight, SingleFlightGuard},
};

use crate::{
    api::Api,
    jobs::JobType,
    scheduler::scheduler_jobs::{CookiesRefreshJob, JobsScheduleJob, PunchBatchJob},
};
use chrono::Utc;
use std::sync::Arc;
use tokio_cron_scheduler::JobScheduler;
use tracing::{info, warn};

/// The scheduler is responsible for driving all periodic punch automation
/// tasks: next-execution assignment, the two punch batches, and session cookie
/// refresh. Every task runs under a single-flight guard shared between
/// scheduled ticks and manual triggers.
pub struct Scheduler {
    inner_scheduler: JobScheduler,
    api: Arc<Api>,
    single_flight: Arc<SingleFlight>,
}

impl Scheduler {
    /// Starts the scheduler, registering all periodic tasks.
    pub async fn start(api: Arc<Api>) -> anyhow::Result<Self> {
        let single_flight = Arc::new(SingleFlight::default());

        // Sessions are refreshed once before the first scheduled tick so the
        // first batch run never works with cookies that went stale while the
        // process was down.
        if let Err(err) = CookiesRefreshJob::execute(api.clone()).await {
            warn!("Failed to refresh Apollo cookies at startup: {err:?}");
        }

        let inner_scheduler = JobScheduler::new().await?;
        inner_scheduler
            .add(JobsScheduleJob::create(api.clone(), single_flight.clone())?)
            .await?;
        inner_scheduler
            .add(PunchBatchJob::create(
                api.clone(),
                single_flight.clone(),
                JobType::CheckIn,
            )?)
            .await?;
        inner_scheduler
            .add(PunchBatchJob::create(
                api.clone(),
                single_flight.clone(),
                JobType::CheckOut,
            )?)
            .await?;
        inner_scheduler
            .add(CookiesRefreshJob::create(api.clone(), single_flight.clone())?)
            .await?;
        inner_scheduler.start().await?;

        info!("Scheduler started.");

        Ok(Self {
            inner_scheduler,
            api,
            single_flight,
        })
    }

    /// Runs the given task once, outside its regular schedule. Returns `false`
    /// without running anything when an execution of the same task is already
    /// in flight.
    pub async fn execute(&self, task: SchedulerTask) -> anyhow::Result<bool> {
        let Some(_guard) = self.single_flight.try_acquire(task) else {
            warn!("Task ({task}) is already running, refusing manual trigger.");
            return Ok(false);
        };

        match task {
            SchedulerTask::JobsSchedule => {
                JobsScheduleJob::execute(self.api.clone(), Utc::now()).await?;
                Ok(true)
            }
            SchedulerTask::CheckIn => {
                PunchBatchJob::execute(self.api.clone(), JobType::CheckIn, Utc::now()).await
            }
            SchedulerTask::CheckOut => {
                PunchBatchJob::execute(self.api.clone(), JobType::CheckOut, Utc::now()).await
            }
            SchedulerTask::CookiesRefresh => CookiesRefreshJob::execute(self.api.clone()).await,
        }
    }

    /// Stops the scheduler.
    pub async fn shutdown(&mut self) -> anyhow::Result<()> {
        Ok(self.inner_scheduler.shutdown().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::{Scheduler, SchedulerTask};
    use crate::tests::mock_api;
    use sqlx::SqlitePool;
    use std::sync::Arc;

    #[sqlx::test]
    async fn manual_trigger_respects_single_flight(pool: SqlitePool) -> anyhow::Result<()> {
        let api = Arc::new(mock_api(pool)?);
        let mut scheduler = Scheduler::start(api).await?;

        // No due jobs, so the batch completes successfully right away.
        assert!(scheduler.execute(SchedulerTask::CheckIn).await?);

        // While a task is marked as running, manual triggers are refused.
        let guard = scheduler
            .single_flight
            .try_acquire(SchedulerTask::CheckOut)
            .unwrap();
        assert!(!scheduler.execute(SchedulerTask::CheckOut).await?);
        drop(guard);
        assert!(scheduler.execute(SchedulerTask::CheckOut).await?);

        scheduler.shutdown().await?;

        Ok(())
    }
}
