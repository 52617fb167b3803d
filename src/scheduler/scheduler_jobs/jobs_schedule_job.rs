use crate::{
    api::Api,
    jobs::PunchJob,
    scheduler::{
        SchedulerTask, SingleFlight,
        time_window::{parse_time_of_day, project_target_seconds, random_target_seconds},
    },
};
use anyhow::Context;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio_cron_scheduler::Job;
use tracing::{debug, error};

/// The job runs on a fast interval and assigns a randomized next-execution
/// instant to every active punch job awaiting (re)computation.
pub(crate) struct JobsScheduleJob;
impl JobsScheduleJob {
    /// Creates a new `JobsScheduleJob` job.
    pub fn create(api: Arc<Api>, single_flight: Arc<SingleFlight>) -> anyhow::Result<Job> {
        let job = Job::new_async(
            api.config.scheduler.jobs_schedule.clone(),
            move |_, _| {
                let api = api.clone();
                let single_flight = single_flight.clone();
                Box::pin(async move {
                    let Some(_guard) = single_flight.try_acquire(SchedulerTask::JobsSchedule)
                    else {
                        debug!("Jobs schedule task is already running, skipping tick.");
                        return;
                    };

                    if let Err(err) = Self::execute(api, Utc::now()).await {
                        error!("Failed to execute jobs schedule task: {err:?}");
                    }
                })
            },
        )?;

        Ok(job)
    }

    /// Executes a `JobsScheduleJob` job. A single job's failure never prevents
    /// scheduling of the remaining jobs.
    pub async fn execute(api: Arc<Api>, now: DateTime<Utc>) -> anyhow::Result<()> {
        let jobs = api.db.get_unscheduled_jobs().await?;
        for job in jobs {
            if let Err(err) = Self::assign_next_execution(&api, &job, now).await {
                error!(job.id = job.id, "Failed to assign next execution: {err:?}");
            }
        }

        Ok(())
    }

    async fn assign_next_execution(
        api: &Api,
        job: &PunchJob,
        now: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        let user = api
            .db
            .get_user(job.user_id)
            .await?
            .with_context(|| format!("A user ('{}') doesn't exist.", *job.user_id))?;
        let time_zone = user.tz();

        let start_seconds = parse_time_of_day(&job.start_at)?;
        let target_seconds = match job.end_at.as_deref() {
            Some(end_at) => random_target_seconds(start_seconds, parse_time_of_day(end_at)?),
            None => start_seconds,
        };

        let mut next_execution_at = project_target_seconds(target_seconds, now, time_zone)?;

        // A job that already ran today (user-local) must wait until tomorrow,
        // otherwise the fast polling interval would re-trigger it immediately.
        if let Some(last_executed_at) = job.last_executed_at {
            let last_local_date = last_executed_at.with_timezone(&time_zone).date_naive();
            while next_execution_at.with_timezone(&time_zone).date_naive() <= last_local_date {
                next_execution_at =
                    project_target_seconds(target_seconds, next_execution_at, time_zone)?;
            }
        }

        api.db
            .set_job_next_execution_at(job.id, Some(next_execution_at))
            .await?;
        debug!(
            job.id = job.id,
            "Scheduled next execution at {next_execution_at}."
        );

        Ok(())
    }
}
