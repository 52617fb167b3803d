use cron::Schedule;

/// Configuration for the scheduler jobs.
#[derive(Clone, Debug)]
pub struct SchedulerJobsConfig {
    /// The schedule to use for the `JobsScheduleJob` job.
    pub jobs_schedule: Schedule,
    /// The schedule to use for the check-in `PunchBatchJob` job.
    pub check_in: Schedule,
    /// The schedule to use for the check-out `PunchBatchJob` job.
    pub check_out: Schedule,
    /// The schedule to use for the `CookiesRefreshJob` job.
    pub cookies_refresh: Schedule,
}
