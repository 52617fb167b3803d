use crate::{
    api::Api,
    apollo::{CalendarDay, StoredCookies},
    jobs::{ExecutionOutcome, JobType, PunchJob, SkipReason},
    scheduler::{SchedulerTask, SingleFlight},
    users::{User, UserId},
};
use anyhow::{Context, anyhow};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use std::{collections::HashMap, sync::Arc};
use tokio_cron_scheduler::Job;
use tracing::{debug, error, info};

/// Per-batch execution context. Cookies and calendar months are cached for the
/// lifetime of one batch run only, so multiple jobs of the same user don't
/// repeat upstream calls, and no state leaks across ticks.
#[derive(Default)]
struct ExecutionContext {
    cookies: HashMap<UserId, Arc<StoredCookies>>,
    calendars: HashMap<(UserId, i32, u32), Arc<HashMap<NaiveDate, CalendarDay>>>,
}

impl ExecutionContext {
    async fn cookies_for_user(
        &mut self,
        api: &Api,
        user_id: UserId,
    ) -> anyhow::Result<Arc<StoredCookies>> {
        if let Some(cookies) = self.cookies.get(&user_id) {
            return Ok(Arc::clone(cookies));
        }

        let record = api
            .db
            .get_apollo_cookie(user_id)
            .await?
            .context("Apollo cookie not found for user.")?;
        let cookies = Arc::new(StoredCookies::parse(&record.value)?);
        self.cookies.insert(user_id, Arc::clone(&cookies));

        Ok(cookies)
    }

    async fn calendar_for_user(
        &mut self,
        api: &Api,
        user_id: UserId,
        year: i32,
        month: u32,
        cookies: &StoredCookies,
    ) -> anyhow::Result<Arc<HashMap<NaiveDate, CalendarDay>>> {
        if let Some(calendar) = self.calendars.get(&(user_id, year, month)) {
            return Ok(Arc::clone(calendar));
        }

        let calendar = Arc::new(api.apollo.fetch_calendar(year, month, cookies).await?);
        self.calendars
            .insert((user_id, year, month), Arc::clone(&calendar));

        Ok(calendar)
    }
}

/// The job executes all due punch jobs of one type as a sequential batch.
pub(crate) struct PunchBatchJob;
impl PunchBatchJob {
    /// Creates a new `PunchBatchJob` job for the given punch type.
    pub fn create(
        api: Arc<Api>,
        single_flight: Arc<SingleFlight>,
        job_type: JobType,
    ) -> anyhow::Result<Job> {
        let (task, schedule) = match job_type {
            JobType::CheckIn => (SchedulerTask::CheckIn, &api.config.scheduler.check_in),
            JobType::CheckOut => (SchedulerTask::CheckOut, &api.config.scheduler.check_out),
        };
        let schedule = schedule.clone();

        let job = Job::new_async(schedule, move |_, _| {
            let api = api.clone();
            let single_flight = single_flight.clone();
            Box::pin(async move {
                let Some(_guard) = single_flight.try_acquire(task) else {
                    debug!("Punch batch task ({task}) is already running, skipping tick.");
                    return;
                };

                match Self::execute(api, job_type, Utc::now()).await {
                    Ok(true) => {}
                    Ok(false) => error!("Punch batch ({task}) completed with failed jobs."),
                    Err(err) => error!("Failed to execute punch batch ({task}): {err:?}"),
                }
            })
        })?;

        Ok(job)
    }

    /// Executes a `PunchBatchJob` job. Returns `false` if at least one due job
    /// failed; skipped jobs count as successful. Every due job is processed
    /// even when earlier ones fail.
    pub async fn execute(
        api: Arc<Api>,
        job_type: JobType,
        now: DateTime<Utc>,
    ) -> anyhow::Result<bool> {
        let due_jobs = api.db.get_due_jobs(job_type, now).await?;
        if due_jobs.is_empty() {
            debug!("No due {job_type} jobs to process.");
            return Ok(true);
        }

        let mut context = ExecutionContext::default();
        let mut has_failure = false;
        for job in due_jobs {
            let (time_zone, outcome) = match api.db.get_user(job.user_id).await {
                Ok(Some(user)) => {
                    let time_zone = user.tz();
                    let outcome = Self::attempt(&api, &job, &user, &mut context, now)
                        .await
                        .unwrap_or_else(ExecutionOutcome::failed);
                    (time_zone, outcome)
                }
                Ok(None) => (
                    Tz::UTC,
                    ExecutionOutcome::failed(format!(
                        "A user ('{}') doesn't exist.",
                        *job.user_id
                    )),
                ),
                Err(err) => (Tz::UTC, ExecutionOutcome::failed(err)),
            };

            if !outcome.is_success() {
                has_failure = true;
            }
            info!(
                job.id = job.id,
                user.id = *job.user_id,
                "Punch job ({job_type}) executed with status {}.",
                outcome.status().as_str()
            );

            // Bookkeeping failures must not abort the batch or lose the
            // remaining jobs' executions.
            if let Err(err) = api
                .db
                .record_job_execution(job.id, now, outcome.status(), &outcome.to_json_string())
                .await
            {
                error!(
                    job.id = job.id,
                    "Failed to persist execution result: {err:?}"
                );
            }

            if let Err(err) = api
                .notifications()
                .notify_job_execution(&job, &outcome, now, time_zone)
                .await
            {
                error!(job.id = job.id, "Failed to notify job execution: {err:?}");
            }
        }

        Ok(!has_failure)
    }

    /// Runs one job's pipeline: policy parsing, cookie resolution, skip-policy
    /// evaluation against the calendar, then the punch itself.
    async fn attempt(
        api: &Api,
        job: &PunchJob,
        user: &User,
        context: &mut ExecutionContext,
        executed_at: DateTime<Utc>,
    ) -> anyhow::Result<ExecutionOutcome> {
        let policy = job.policy()?;
        let cookies = context.cookies_for_user(api, job.user_id).await?;

        let time_zone = user.tz();
        let local_now = executed_at.with_timezone(&time_zone);
        let date = local_now.date_naive();

        if policy.skip_holiday || policy.skip_leaves {
            use chrono::Datelike;
            let calendar = context
                .calendar_for_user(api, job.user_id, date.year(), date.month(), &cookies)
                .await?;
            let calendar_day = calendar.get(&date).ok_or_else(|| {
                anyhow!(
                    "Calendar data for {date} ({}) is unavailable.",
                    time_zone.name()
                )
            })?;

            // Holiday takes precedence over the generic day-off reason; leave
            // only counts when it covers the whole scheduled shift.
            let mut reasons = vec![];
            if policy.skip_holiday {
                if calendar_day.is_holiday {
                    reasons.push(SkipReason::Holiday);
                } else if !calendar_day.is_working_day {
                    reasons.push(SkipReason::NonWorkingDay);
                }
            }
            if policy.skip_leaves && calendar_day.has_leave && calendar_day.is_fully_on_leave() {
                reasons.push(SkipReason::Leave);
            }

            if !reasons.is_empty() {
                return Ok(ExecutionOutcome::Skipped {
                    reasons,
                    policy,
                    calendar_day: Some(calendar_day.clone()),
                    time_zone: time_zone.name().to_string(),
                    date,
                });
            }
        }

        let punch_result = api
            .apollo
            .punch(job.job_type.attendance_type(), &cookies)
            .await;
        if punch_result.success {
            Ok(ExecutionOutcome::Success {
                punch_result,
                policy,
                time_zone: time_zone.name().to_string(),
            })
        } else {
            Ok(ExecutionOutcome::Failed {
                error: punch_result
                    .message
                    .unwrap_or_else(|| "Punch failed.".to_string()),
            })
        }
    }
}
