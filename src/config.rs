mod apollo_config;
mod database_config;
mod raw_config;
mod scheduler_jobs_config;
mod telegram_config;

pub use self::{
    apollo_config::ApolloConfig, database_config::DatabaseConfig, raw_config::RawConfig,
    scheduler_jobs_config::SchedulerJobsConfig, telegram_config::TelegramConfig,
};

use anyhow::Context;
use cron::Schedule;
use std::str::FromStr;

/// Main service config.
#[derive(Clone, Debug)]
pub struct Config {
    /// Database configuration.
    pub db: DatabaseConfig,
    /// Configuration for the Apollo portal client.
    pub apollo: ApolloConfig,
    /// Configuration for the Telegram Bot API client.
    pub telegram: TelegramConfig,
    /// Configuration for the scheduler jobs.
    pub scheduler: SchedulerJobsConfig,
}

impl AsRef<Config> for Config {
    fn as_ref(&self) -> &Config {
        self
    }
}

fn parse_schedule(name: &str, value: &str) -> anyhow::Result<Schedule> {
    Schedule::from_str(value)
        .with_context(|| format!("Cannot parse `{name}` schedule ('{value}')."))
}

impl TryFrom<RawConfig> for Config {
    type Error = anyhow::Error;

    fn try_from(raw_config: RawConfig) -> Result<Self, Self::Error> {
        Ok(Self {
            db: raw_config.db,
            apollo: raw_config.apollo,
            telegram: raw_config.telegram,
            scheduler: SchedulerJobsConfig {
                jobs_schedule: parse_schedule(
                    "jobs-schedule",
                    &raw_config.scheduler.jobs_schedule,
                )?,
                check_in: parse_schedule("check-in", &raw_config.scheduler.check_in)?,
                check_out: parse_schedule("check-out", &raw_config.scheduler.check_out)?,
                cookies_refresh: parse_schedule(
                    "cookies-refresh",
                    &raw_config.scheduler.cookies_refresh,
                )?,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{Config, RawConfig};

    #[test]
    fn conversion_parses_schedules() -> anyhow::Result<()> {
        let config = Config::try_from(RawConfig::default())?;
        assert_eq!(
            config.scheduler.jobs_schedule.to_string(),
            "*/1 * * * * *"
        );
        assert_eq!(config.scheduler.cookies_refresh.to_string(), "0 0 */6 * * *");

        Ok(())
    }

    #[test]
    fn conversion_fails_on_invalid_schedule() {
        let mut raw_config = RawConfig::default();
        raw_config.scheduler.check_in = "not-a-schedule".to_string();

        let error = Config::try_from(raw_config).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Cannot parse `check-in` schedule ('not-a-schedule')."
        );
    }
}
