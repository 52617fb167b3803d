use crate::{
    api::Api,
    apollo::{ApolloCookie, StoredCookies},
    scheduler::{SchedulerTask, SingleFlight},
};
use chrono::Utc;
use std::sync::Arc;
use tokio_cron_scheduler::Job;
use tracing::{debug, error, info};

/// The job periodically re-validates every stored Apollo session against the
/// portal and persists rotated cookie values, keeping sessions alive between
/// manual extension uploads.
pub(crate) struct CookiesRefreshJob;
impl CookiesRefreshJob {
    /// Creates a new `CookiesRefreshJob` job.
    pub fn create(api: Arc<Api>, single_flight: Arc<SingleFlight>) -> anyhow::Result<Job> {
        let job = Job::new_async(
            api.config.scheduler.cookies_refresh.clone(),
            move |_, _| {
                let api = api.clone();
                let single_flight = single_flight.clone();
                Box::pin(async move {
                    let Some(_guard) = single_flight.try_acquire(SchedulerTask::CookiesRefresh)
                    else {
                        debug!("Cookies refresh task is already running, skipping tick.");
                        return;
                    };

                    match Self::execute(api).await {
                        Ok(true) => {}
                        Ok(false) => error!("Cookies refresh completed with failed records."),
                        Err(err) => error!("Failed to execute cookies refresh task: {err:?}"),
                    }
                })
            },
        )?;

        Ok(job)
    }

    /// Executes a `CookiesRefreshJob` job. Per-record failures are logged and
    /// counted, never stopping the remaining records.
    pub async fn execute(api: Arc<Api>) -> anyhow::Result<bool> {
        let records = api.db.get_apollo_cookies().await?;
        if records.is_empty() {
            return Ok(true);
        }

        let mut has_failure = false;
        for record in records {
            if let Err(err) = Self::refresh_record(&api, &record).await {
                error!(
                    user.id = *record.user_id,
                    "Failed to refresh Apollo cookies: {err:?}"
                );
                has_failure = true;
            }
        }

        Ok(!has_failure)
    }

    async fn refresh_record(api: &Api, record: &ApolloCookie) -> anyhow::Result<()> {
        let mut cookies = StoredCookies::parse(&record.value)?;
        let refreshed = api.apollo.refresh_session_cookies(&cookies).await?;
        if refreshed.is_empty() {
            debug!(
                user.id = *record.user_id,
                "Portal didn't rotate any session cookies."
            );
            return Ok(());
        }

        // Persist only when a value actually changed, so an effectless refresh
        // leaves the stored record byte-for-byte intact.
        if !cookies.apply_refreshed(&refreshed) {
            debug!(
                user.id = *record.user_id,
                "Apollo session cookies are already up to date."
            );
            return Ok(());
        }

        api.db
            .update_apollo_cookie_value(record.id, &cookies.serialize(), Utc::now())
            .await?;
        info!(
            user.id = *record.user_id,
            "Refreshed Apollo session cookies."
        );

        Ok(())
    }
}
