mod raw_apollo_cookie;

use self::raw_apollo_cookie::RawApolloCookie;
use crate::{apollo::ApolloCookie, database::Database, users::UserId};
use anyhow::bail;
use chrono::{DateTime, Utc};
use sqlx::{query, query_as};

/// Extends the primary database with Apollo-cookie-related methods.
impl Database {
    /// Retrieves the stored Apollo cookie for a user, if any.
    pub async fn get_apollo_cookie(&self, user_id: UserId) -> anyhow::Result<Option<ApolloCookie>> {
        query_as::<_, RawApolloCookie>(r#"SELECT * FROM apollo_cookies WHERE user_id = ?"#)
            .bind(*user_id)
            .fetch_optional(&self.pool)
            .await?
            .map(ApolloCookie::try_from)
            .transpose()
    }

    /// Retrieves all stored Apollo cookies (one per user).
    pub async fn get_apollo_cookies(&self) -> anyhow::Result<Vec<ApolloCookie>> {
        query_as::<_, RawApolloCookie>(r#"SELECT * FROM apollo_cookies ORDER BY user_id"#)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(ApolloCookie::try_from)
            .collect()
    }

    /// Inserts or replaces a user's Apollo cookie value.
    pub async fn upsert_apollo_cookie(
        &self,
        user_id: UserId,
        value: &str,
        updated_at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        query(
            r#"
INSERT INTO apollo_cookies (user_id, value, updated_at) VALUES (?, ?, ?)
ON CONFLICT(user_id) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
        "#,
        )
        .bind(*user_id)
        .bind(value)
        .bind(updated_at.timestamp())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Replaces the value of an existing cookie record.
    pub async fn update_apollo_cookie_value(
        &self,
        id: i64,
        value: &str,
        updated_at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        let result = query(r#"UPDATE apollo_cookies SET value = ?, updated_at = ? WHERE id = ?"#)
            .bind(value)
            .bind(updated_at.timestamp())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            bail!("An Apollo cookie ('{id}') doesn't exist.");
        }

        Ok(())
    }
}
