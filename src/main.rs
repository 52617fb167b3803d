mod api;
mod apollo;
mod config;
mod database;
mod jobs;
mod notifications;
mod scheduler;
mod users;


use crate::{
    api::Api,
    config::{Config, RawConfig},
    database::Database,
    scheduler::Scheduler,
};
use anyhow::anyhow;
use clap::{Arg, Command, crate_description, crate_version};
use std::{env, sync::Arc};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenvy::dotenv().ok();

    if env::var("RUST_LOG_FORMAT").is_ok_and(|format| format == "json") {
        tracing_subscriber::fmt().json().flatten_event(true).init();
    } else {
        tracing_subscriber::fmt::init();
    }

    let matches = Command::new("Apollo Auto punch scheduler")
        .version(crate_version!())
        .about(crate_description!())
        .arg(
            Arg::new("CONFIG")
                .env("APOLLO_CONFIG")
                .short('c')
                .long("config")
                .default_value("apollo.toml")
                .help("Path to the application configuration file."),
        )
        .get_matches();

    let raw_config = RawConfig::read_from_file(
        matches
            .get_one::<String>("CONFIG")
            .ok_or_else(|| anyhow!("<CONFIG> argument is not provided."))?,
    )?;

    info!("Apollo Auto raw configuration: {raw_config:?}.");

    let config = Config::try_from(raw_config)?;
    let db = Database::open(&config.db.path).await?;
    let api = Arc::new(Api::new(config, db)?);

    let mut scheduler = Scheduler::start(api).await?;

    tokio::signal::ctrl_c().await?;
    info!("Shutting down scheduler.");
    scheduler.shutdown().await?;

    Ok(())
}
