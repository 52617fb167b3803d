mod raw_telegram_token;

use self::raw_telegram_token::RawTelegramToken;
use crate::{database::Database, notifications::TelegramToken, users::UserId};
use sqlx::{query, query_as};

/// Extends the primary database with Telegram-token-related methods.
impl Database {
    /// Retrieves the active Telegram delivery targets of a user.
    pub async fn get_active_telegram_tokens(
        &self,
        user_id: UserId,
    ) -> anyhow::Result<Vec<TelegramToken>> {
        query_as::<_, RawTelegramToken>(
            r#"SELECT * FROM telegram_tokens WHERE user_id = ? AND is_active = 1 ORDER BY created_at DESC"#,
        )
        .bind(*user_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(TelegramToken::try_from)
        .collect()
    }

    /// Inserts a new Telegram token, returning its ID.
    pub async fn insert_telegram_token(&self, token: &TelegramToken) -> anyhow::Result<i64> {
        let id = query(
            r#"
INSERT INTO telegram_tokens (user_id, name, bot_token, chat_id, is_active, created_at)
VALUES (?, ?, ?, ?, ?, ?)
        "#,
        )
        .bind(*token.user_id)
        .bind(&token.name)
        .bind(&token.bot_token)
        .bind(&token.chat_id)
        .bind(token.is_active)
        .bind(token.created_at.timestamp())
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use crate::tests::{mock_db, mock_telegram_token, mock_user};
    use sqlx::SqlitePool;

    #[sqlx::test]
    async fn retrieves_only_active_tokens(pool: SqlitePool) -> anyhow::Result<()> {
        let db = mock_db(pool);
        let user_id = db.upsert_user(&mock_user()).await?;

        let mut token = mock_telegram_token(user_id);
        let active_id = db.insert_telegram_token(&token).await?;

        token.is_active = false;
        db.insert_telegram_token(&token).await?;

        let tokens = db.get_active_telegram_tokens(user_id).await?;
        assert_eq!(
            tokens.into_iter().map(|token| token.id).collect::<Vec<_>>(),
            vec![active_id]
        );

        Ok(())
    }
}
