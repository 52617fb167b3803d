use crate::jobs::{ExecutionOutcome, JobStatus, JobType, SkipReason};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

fn job_type_label(job_type: JobType) -> &'static str {
    match job_type {
        JobType::CheckIn => "上班打卡",
        JobType::CheckOut => "下班打卡",
    }
}

fn job_status_label(status: JobStatus) -> &'static str {
    match status {
        JobStatus::Success => "成功",
        JobStatus::Failed => "失敗",
        JobStatus::Skipped => "已跳過",
        JobStatus::Pending => "待執行",
    }
}

fn skip_reason_label(reason: SkipReason) -> &'static str {
    match reason {
        SkipReason::Holiday => "假日",
        SkipReason::Leave => "請假",
        SkipReason::NonWorkingDay => "非工作日",
    }
}

fn detail(outcome: &ExecutionOutcome) -> String {
    match outcome {
        ExecutionOutcome::Skipped { reasons, .. } => {
            if reasons.is_empty() {
                "排程已跳過。".to_string()
            } else {
                let readable_reasons = reasons
                    .iter()
                    .map(|reason| skip_reason_label(*reason))
                    .collect::<Vec<_>>()
                    .join("、");
                format!("排程已跳過（{readable_reasons}）。")
            }
        }
        ExecutionOutcome::Failed { error } => {
            if error.is_empty() {
                "排程執行失敗，請檢查伺服器日誌。".to_string()
            } else {
                error.clone()
            }
        }
        ExecutionOutcome::Success { punch_result, .. } => {
            let mut parts = vec![];
            if let Some(location_name) = punch_result
                .location_name
                .as_deref()
                .filter(|name| !name.is_empty())
            {
                parts.push(format!("地點：{location_name}"));
            }
            if let Some(message) = punch_result
                .message
                .as_deref()
                .filter(|message| !message.is_empty())
            {
                parts.push(message.to_string());
            }
            if let Some(punch_date) = punch_result
                .punch_date
                .as_deref()
                .filter(|date| !date.is_empty())
            {
                parts.push(format!("日期：{punch_date}"));
            }

            if parts.is_empty() {
                "排程執行成功。".to_string()
            } else {
                parts.join("；")
            }
        }
    }
}

/// Renders a job execution outcome into the Telegram notification text.
pub fn job_execution_message(
    job_id: i64,
    job_type: JobType,
    outcome: &ExecutionOutcome,
    executed_at: DateTime<Utc>,
    time_zone: Tz,
) -> String {
    let executed_at_local = executed_at
        .with_timezone(&time_zone)
        .format("%Y-%m-%d %H:%M:%S");

    [
        "[Apollo Auto 通知]".to_string(),
        format!("排程：{} (#{job_id})", job_type_label(job_type)),
        format!("狀態：{}", job_status_label(outcome.status())),
        format!("執行時間：{executed_at_local} ({})", time_zone.name()),
        format!("說明：{}", detail(outcome)),
    ]
    .join("\n")
}
