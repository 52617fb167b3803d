use crate::{
    api::Api,
    jobs::{ExecutionOutcome, PunchJob},
    notifications::job_execution_message::job_execution_message,
};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::error;

/// API extension that works with user notifications.
pub struct NotificationsApi<'a> {
    api: &'a Api,
}

impl<'a> NotificationsApi<'a> {
    pub fn new(api: &'a Api) -> Self {
        Self { api }
    }

    /// Fans a job execution outcome out to all active Telegram targets of the
    /// job's owner. Delivery failures are logged per target and never fail the
    /// execution that triggered the notification.
    pub async fn notify_job_execution(
        &self,
        job: &PunchJob,
        outcome: &ExecutionOutcome,
        executed_at: DateTime<Utc>,
        time_zone: Tz,
    ) -> anyhow::Result<()> {
        let tokens = self.api.db.get_active_telegram_tokens(job.user_id).await?;
        if tokens.is_empty() {
            return Ok(());
        }

        let message = job_execution_message(job.id, job.job_type, outcome, executed_at, time_zone);
        for token in tokens {
            if let Err(err) = self
                .api
                .telegram
                .send_message(&token.bot_token, &token.chat_id, &message)
                .await
            {
                error!(
                    user.id = *job.user_id,
                    "Failed to notify Telegram chat for token ('{}'): {err:?}.", token.id
                );
            }
        }

        Ok(())
    }
}

impl Api {
    /// Returns an API to work with user notifications.
    pub fn notifications(&self) -> NotificationsApi<'_> {
        NotificationsApi::new(self)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        jobs::ExecutionOutcome,
        tests::{mock_api_with_telegram, mock_punch_job, mock_telegram_token, mock_user},
    };
    use chrono::Utc;
    use chrono_tz::Tz;
    use httpmock::MockServer;
    use serde_json::json;
    use sqlx::SqlitePool;

    #[sqlx::test]
    async fn notifies_every_active_target(pool: SqlitePool) -> anyhow::Result<()> {
        let server = MockServer::start();
        let api = mock_api_with_telegram(pool, &server)?;

        let user_id = api.db.upsert_user(&mock_user()).await?;
        let mut job = mock_punch_job(user_id);
        job.id = api.db.insert_punch_job(&job).await?;

        let mut token = mock_telegram_token(user_id);
        api.db.insert_telegram_token(&token).await?;
        token.chat_id = "other-chat".to_string();
        api.db.insert_telegram_token(&token).await?;
        token.is_active = false;
        api.db.insert_telegram_token(&token).await?;

        let send_mock = server
            .mock(|when, then| {
                when.method(httpmock::Method::POST)
                    .path("/bot12345:token/sendMessage");
                then.status(200).json_body(json!({ "ok": true }));
            });

        api.notifications()
            .notify_job_execution(
                &job,
                &ExecutionOutcome::failed("Apollo request timed out."),
                Utc::now(),
                Tz::Asia__Taipei,
            )
            .await?;

        // Two active targets, the inactive one is never contacted.
        send_mock.assert_calls(2);

        Ok(())
    }

    #[sqlx::test]
    async fn delivery_failures_do_not_bubble_up(pool: SqlitePool) -> anyhow::Result<()> {
        let server = MockServer::start();
        let api = mock_api_with_telegram(pool, &server)?;

        let user_id = api.db.upsert_user(&mock_user()).await?;
        let mut job = mock_punch_job(user_id);
        job.id = api.db.insert_punch_job(&job).await?;
        api.db
            .insert_telegram_token(&mock_telegram_token(user_id))
            .await?;

        server
            .mock(|when, then| {
                when.method(httpmock::Method::POST)
                    .path("/bot12345:token/sendMessage");
                then.status(400)
                    .json_body(json!({ "ok": false, "description": "chat not found" }));
            });

        api.notifications()
            .notify_job_execution(
                &job,
                &ExecutionOutcome::failed("err"),
                Utc::now(),
                Tz::UTC,
            )
            .await?;

        Ok(())
    }
}
