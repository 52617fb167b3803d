use crate::{
    apollo::ApolloClient, config::Config, database::Database, notifications::TelegramClient,
};

/// Main APIs aggregate available to the scheduler jobs.
pub struct Api {
    pub config: Config,
    pub db: Database,
    pub apollo: ApolloClient,
    pub telegram: TelegramClient,
}

impl Api {
    /// Instantiates the APIs collection with the provided config and database.
    pub fn new(config: Config, db: Database) -> anyhow::Result<Self> {
        let apollo = ApolloClient::new(&config.apollo)?;
        let telegram = TelegramClient::new(&config.telegram)?;

        Ok(Self {
            config,
            db,
            apollo,
            telegram,
        })
    }
}

impl AsRef<Api> for Api {
    fn as_ref(&self) -> &Api {
        self
    }
}
