mod cookies_refresh_job;
mod jobs_schedule_job;
mod punch_batch_job;

pub(crate) use self::{
    cookies_refresh_job::CookiesRefreshJob, jobs_schedule_job::JobsScheduleJob,
    punch_batch_job::PunchBatchJob,
};
