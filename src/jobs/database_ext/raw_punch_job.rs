use crate::jobs::PunchJob;
use anyhow::Context;
use chrono::DateTime;

#[derive(sqlx::FromRow, Debug, PartialEq, Clone)]
pub(super) struct RawPunchJob {
    pub id: i64,
    pub user_id: i64,
    pub job_type: String,
    pub start_at: String,
    pub end_at: Option<String>,
    pub is_active: bool,
    pub expired_at: Option<i64>,
    pub next_execution_at: Option<i64>,
    pub last_executed_at: Option<i64>,
    pub last_execution_status: Option<String>,
    pub last_execution_result: Option<String>,
    pub data: Option<String>,
    pub created_at: i64,
}

fn timestamp(value: i64) -> anyhow::Result<chrono::DateTime<chrono::Utc>> {
    DateTime::from_timestamp(value, 0).with_context(|| format!("Invalid timestamp: {value}"))
}

impl TryFrom<RawPunchJob> for PunchJob {
    type Error = anyhow::Error;

    fn try_from(raw_job: RawPunchJob) -> Result<Self, Self::Error> {
        Ok(PunchJob {
            id: raw_job.id,
            user_id: raw_job.user_id.try_into()?,
            job_type: raw_job.job_type.parse()?,
            start_at: raw_job.start_at,
            end_at: raw_job.end_at,
            is_active: raw_job.is_active,
            expired_at: raw_job.expired_at.map(timestamp).transpose()?,
            next_execution_at: raw_job.next_execution_at.map(timestamp).transpose()?,
            last_executed_at: raw_job.last_executed_at.map(timestamp).transpose()?,
            last_execution_status: raw_job
                .last_execution_status
                .as_deref()
                .map(str::parse)
                .transpose()?,
            last_execution_result: raw_job.last_execution_result,
            data: raw_job.data,
            created_at: timestamp(raw_job.created_at)?,
        })
    }
}

impl TryFrom<&PunchJob> for RawPunchJob {
    type Error = anyhow::Error;

    fn try_from(job: &PunchJob) -> Result<Self, Self::Error> {
        Ok(RawPunchJob {
            id: job.id,
            user_id: *job.user_id,
            job_type: job.job_type.as_str().to_string(),
            start_at: job.start_at.clone(),
            end_at: job.end_at.clone(),
            is_active: job.is_active,
            expired_at: job.expired_at.map(|at| at.timestamp()),
            next_execution_at: job.next_execution_at.map(|at| at.timestamp()),
            last_executed_at: job.last_executed_at.map(|at| at.timestamp()),
            last_execution_status: job
                .last_execution_status
                .map(|status| status.as_str().to_string()),
            last_execution_result: job.last_execution_result.clone(),
            data: job.data.clone(),
            created_at: job.created_at.timestamp(),
        })
    }
}
