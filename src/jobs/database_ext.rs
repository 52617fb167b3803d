mod raw_punch_job;

use self::raw_punch_job::RawPunchJob;
use crate::{
    database::Database,
    jobs::{JobStatus, JobType, PunchJob},
};
use anyhow::bail;
use chrono::{DateTime, Utc};
use sqlx::{query, query_as};

/// Extends the primary database with punch-job-related methods.
impl Database {
    /// Retrieves active jobs that have no `next_execution_at` assigned yet.
    pub async fn get_unscheduled_jobs(&self) -> anyhow::Result<Vec<PunchJob>> {
        query_as::<_, RawPunchJob>(
            r#"SELECT * FROM jobs WHERE is_active = 1 AND next_execution_at IS NULL"#,
        )
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(PunchJob::try_from)
        .collect()
    }

    /// Retrieves jobs of the given type that are due for execution, ordered by
    /// their scheduled execution instant.
    pub async fn get_due_jobs(
        &self,
        job_type: JobType,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Vec<PunchJob>> {
        query_as::<_, RawPunchJob>(
            r#"
SELECT * FROM jobs
WHERE job_type = ? AND is_active = 1
  AND (expired_at IS NULL OR expired_at > ?)
  AND next_execution_at IS NOT NULL AND next_execution_at <= ?
ORDER BY next_execution_at ASC
        "#,
        )
        .bind(job_type.as_str())
        .bind(now.timestamp())
        .bind(now.timestamp())
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(PunchJob::try_from)
        .collect()
    }

    /// Assigns or clears the next execution instant of a job.
    pub async fn set_job_next_execution_at(
        &self,
        id: i64,
        next_execution_at: Option<DateTime<Utc>>,
    ) -> anyhow::Result<()> {
        let result = query(r#"UPDATE jobs SET next_execution_at = ? WHERE id = ?"#)
            .bind(next_execution_at.map(|at| at.timestamp()))
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            bail!("A punch job ('{id}') doesn't exist.");
        }

        Ok(())
    }

    /// Persists the outcome of a job execution and unconditionally clears
    /// `next_execution_at` so that the status scheduler recomputes it.
    pub async fn record_job_execution(
        &self,
        id: i64,
        executed_at: DateTime<Utc>,
        status: JobStatus,
        result: &str,
    ) -> anyhow::Result<()> {
        let result = query(
            r#"
UPDATE jobs
SET last_executed_at = ?, last_execution_status = ?, last_execution_result = ?, next_execution_at = NULL
WHERE id = ?
        "#,
        )
        .bind(executed_at.timestamp())
        .bind(status.as_str())
        .bind(result)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            bail!("A punch job ('{id}') doesn't exist.");
        }

        Ok(())
    }

    /// Retrieves a single punch job using job ID.
    pub async fn get_punch_job(&self, id: i64) -> anyhow::Result<Option<PunchJob>> {
        query_as::<_, RawPunchJob>(r#"SELECT * FROM jobs WHERE id = ?"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(PunchJob::try_from)
            .transpose()
    }

    /// Inserts a new punch job, returning its ID.
    pub async fn insert_punch_job(&self, job: &PunchJob) -> anyhow::Result<i64> {
        let raw_job = RawPunchJob::try_from(job)?;
        let id = query(
            r#"
INSERT INTO jobs (user_id, job_type, start_at, end_at, is_active, expired_at, next_execution_at,
                  last_executed_at, last_execution_status, last_execution_result, data, created_at)
VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
        )
        .bind(raw_job.user_id)
        .bind(&raw_job.job_type)
        .bind(&raw_job.start_at)
        .bind(&raw_job.end_at)
        .bind(raw_job.is_active)
        .bind(raw_job.expired_at)
        .bind(raw_job.next_execution_at)
        .bind(raw_job.last_executed_at)
        .bind(&raw_job.last_execution_status)
        .bind(&raw_job.last_execution_result)
        .bind(&raw_job.data)
        .bind(raw_job.created_at)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(id)
    }
}
