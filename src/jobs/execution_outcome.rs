use crate::{
    apollo::{CalendarDay, PunchResult},
    jobs::{JobPolicy, JobStatus, SkipReason},
};
use chrono::NaiveDate;
use serde_derive::Serialize;
use serde_json::json;

/// Structured result of one punch job execution. Serialized into the job's
/// `last_execution_result` column and rendered into user notifications.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionOutcome {
    #[serde(rename_all = "camelCase")]
    Skipped {
        reasons: Vec<SkipReason>,
        policy: JobPolicy,
        #[serde(skip_serializing_if = "Option::is_none")]
        calendar_day: Option<CalendarDay>,
        time_zone: String,
        date: NaiveDate,
    },
    #[serde(rename_all = "camelCase")]
    Success {
        punch_result: PunchResult,
        policy: JobPolicy,
        time_zone: String,
    },
    Failed {
        error: String,
    },
}

impl ExecutionOutcome {
    pub fn failed(error: impl ToString) -> Self {
        Self::Failed {
            error: error.to_string(),
        }
    }

    pub fn status(&self) -> JobStatus {
        match self {
            Self::Skipped { .. } => JobStatus::Skipped,
            Self::Success { .. } => JobStatus::Success,
            Self::Failed { .. } => JobStatus::Failed,
        }
    }

    /// A skipped punch is expected behavior and counts as a successful batch item.
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }

    /// Serializes the outcome for persistence. Serialization itself must never
    /// fail the execution record, so errors are replaced with a descriptive
    /// fallback payload.
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|err| {
            json!({
                "message": "Failed to serialize job execution payload.",
                "error": err.to_string(),
            })
            .to_string()
        })
    }
}
