use anyhow::Context;
use sqlx::SqlitePool;

/// Primary database of the service. Module-specific operations live in the
/// per-module `database_ext` extensions.
#[derive(Clone)]
pub struct Database {
    pub(crate) pool: SqlitePool,
}

impl Database {
    /// Opens the SQLite database at the given path, creating the file if
    /// needed, and applies pending migrations.
    pub async fn open(path: &str) -> anyhow::Result<Self> {
        let pool = SqlitePool::connect(&format!("sqlite:{path}?mode=rwc"))
            .await
            .with_context(|| format!("Cannot open database at '{path}'."))?;
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }
}
