use crate::{
    jobs::{JobPolicy, JobStatus, JobType},
    users::UserId,
};
use anyhow::Context;
use chrono::{DateTime, Utc};

/// A per-user scheduled punch instruction with a daily randomized time window.
#[derive(Debug, Clone, PartialEq)]
pub struct PunchJob {
    pub id: i64,
    pub user_id: UserId,
    pub job_type: JobType,
    /// Window start as a wall-clock `HH:mm` time in the owning user's timezone.
    pub start_at: String,
    /// Optional window end; `None` or equal to `start_at` means the job fires at `start_at` exactly.
    pub end_at: Option<String>,
    pub is_active: bool,
    pub expired_at: Option<DateTime<Utc>>,
    /// Next execution instant, or `None` when the job awaits (re)computation.
    pub next_execution_at: Option<DateTime<Utc>>,
    pub last_executed_at: Option<DateTime<Utc>>,
    pub last_execution_status: Option<JobStatus>,
    pub last_execution_result: Option<String>,
    /// Serialized execution policy, parsed lazily since malformed payloads must
    /// only fail the affected job at execution time.
    pub data: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl PunchJob {
    /// Parses the execution policy from the `data` column, treating an absent
    /// payload as the default policy and a malformed one as a hard failure.
    pub fn policy(&self) -> anyhow::Result<JobPolicy> {
        match self.data.as_deref() {
            None | Some("") => Ok(JobPolicy::default()),
            Some(raw) => serde_json::from_str(raw).context("Invalid job data payload."),
        }
    }
}
