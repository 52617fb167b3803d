use crate::config::{
    apollo_config::ApolloConfig, database_config::DatabaseConfig, telegram_config::TelegramConfig,
};
use figment::{Figment, Metadata, Profile, Provider, providers, providers::Format, value};
use serde_derive::{Deserialize, Serialize};

/// Raw scheduler job schedules as cron expressions.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct RawSchedulerJobsConfig {
    pub jobs_schedule: String,
    pub check_in: String,
    pub check_out: String,
    pub cookies_refresh: String,
}

impl Default for RawSchedulerJobsConfig {
    fn default() -> Self {
        Self {
            jobs_schedule: "*/1 * * * * *".to_string(),
            check_in: "*/10 * * * * *".to_string(),
            check_out: "*/10 * * * * *".to_string(),
            cookies_refresh: "0 0 */6 * * *".to_string(),
        }
    }
}

/// Raw configuration structure that is used to read the configuration from the file.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct RawConfig {
    /// Database configuration.
    pub db: DatabaseConfig,
    /// Configuration for the Apollo portal client.
    pub apollo: ApolloConfig,
    /// Configuration for the Telegram Bot API client.
    pub telegram: TelegramConfig,
    /// Configuration for the scheduler jobs.
    pub scheduler: RawSchedulerJobsConfig,
}

impl RawConfig {
    /// Reads the configuration from the file (TOML) and merges it with the default values.
    pub fn read_from_file(path: &str) -> anyhow::Result<Self> {
        Ok(Figment::from(RawConfig::default())
            .merge(providers::Toml::file(path))
            .merge(providers::Env::prefixed("APOLLO_").split("__"))
            .extract()?)
    }
}

impl Provider for RawConfig {
    fn metadata(&self) -> Metadata {
        Metadata::named("Apollo Auto main configuration")
    }

    fn data(&self) -> Result<value::Map<Profile, value::Dict>, figment::Error> {
        providers::Serialized::defaults(Self::default()).data()
    }
}

#[cfg(test)]
mod tests {
    use crate::config::RawConfig;
    use insta::{assert_debug_snapshot, assert_toml_snapshot};

    #[test]
    fn serialization_and_default() {
        assert_toml_snapshot!(RawConfig::default(), @r###"
        [db]
        path = 'apollo.db'

        [apollo]
        base-url = 'https://apollo.mayohr.com/'
        request-timeout-secs = 15

        [telegram]
        base-url = 'https://api.telegram.org/'
        request-timeout-secs = 10

        [scheduler]
        jobs-schedule = '*/1 * * * * *'
        check-in = '*/10 * * * * *'
        check-out = '*/10 * * * * *'
        cookies-refresh = '0 0 */6 * * *'
        "###);
    }

    #[test]
    fn deserialization() {
        let config: RawConfig = toml::from_str(
            r#"
        [db]
        path = '/var/lib/apollo/apollo.db'

        [apollo]
        base-url = 'https://apollo.example.com'
        request-timeout-secs = 5

        [telegram]
        base-url = 'https://api.telegram.org'
        request-timeout-secs = 10

        [scheduler]
        jobs-schedule = '*/5 * * * * *'
        check-in = '0 * * * * *'
        check-out = '0 * * * * *'
        cookies-refresh = '0 0 */12 * * *'
    "#,
        )
        .unwrap();

        assert_debug_snapshot!(config.scheduler, @r###"
        RawSchedulerJobsConfig {
            jobs_schedule: "*/5 * * * * *",
            check_in: "0 * * * * *",
            check_out: "0 * * * * *",
            cookies_refresh: "0 0 */12 * * *",
        }
        "###);
        assert_eq!(config.db.path, "/var/lib/apollo/apollo.db");
        assert_eq!(config.apollo.request_timeout_secs, 5);
    }
}
