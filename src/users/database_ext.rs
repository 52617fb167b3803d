use crate::{
    database::Database,
    users::{User, UserId},
};
use anyhow::Context;
use chrono::DateTime;
use sqlx::query_as;

#[derive(sqlx::FromRow)]
struct RawUser {
    id: i64,
    account: String,
    display_name: Option<String>,
    timezone: String,
    created_at: i64,
}

impl TryFrom<RawUser> for User {
    type Error = anyhow::Error;

    fn try_from(raw_user: RawUser) -> Result<Self, Self::Error> {
        Ok(User {
            id: raw_user.id.try_into()?,
            account: raw_user.account,
            display_name: raw_user.display_name,
            timezone: raw_user.timezone,
            created_at: DateTime::from_timestamp(raw_user.created_at, 0)
                .context("Invalid user creation timestamp.")?,
        })
    }
}

/// Extends the primary database with user-related methods.
impl Database {
    /// Retrieves a user from the `users` table using user ID.
    pub async fn get_user(&self, id: UserId) -> anyhow::Result<Option<User>> {
        query_as::<_, RawUser>(
            r#"SELECT id, account, display_name, timezone, created_at FROM users WHERE id = ?"#,
        )
        .bind(*id)
        .fetch_optional(&self.pool)
        .await?
        .map(User::try_from)
        .transpose()
    }

    /// Inserts or updates a user in the `users` table.
    pub async fn upsert_user(&self, user: &User) -> anyhow::Result<UserId> {
        let id: i64 = sqlx::query_scalar(
            r#"
INSERT INTO users (account, display_name, timezone, created_at)
VALUES (?, ?, ?, ?)
ON CONFLICT(account) DO UPDATE SET display_name = excluded.display_name, timezone = excluded.timezone
RETURNING id
        "#,
        )
        .bind(&user.account)
        .bind(&user.display_name)
        .bind(&user.timezone)
        .bind(user.created_at.timestamp())
        .fetch_one(&self.pool)
        .await?;

        id.try_into()
    }
}
