use crate::notifications::TelegramToken;
use anyhow::Context;
use chrono::DateTime;

#[derive(sqlx::FromRow, Debug, PartialEq, Clone)]
pub(super) struct RawTelegramToken {
    pub id: i64,
    pub user_id: i64,
    pub name: Option<String>,
    pub bot_token: String,
    pub chat_id: String,
    pub is_active: bool,
    pub created_at: i64,
}

impl TryFrom<RawTelegramToken> for TelegramToken {
    type Error = anyhow::Error;

    fn try_from(raw_token: RawTelegramToken) -> Result<Self, Self::Error> {
        Ok(TelegramToken {
            id: raw_token.id,
            user_id: raw_token.user_id.try_into()?,
            name: raw_token.name,
            bot_token: raw_token.bot_token,
            chat_id: raw_token.chat_id,
            is_active: raw_token.is_active,
            created_at: DateTime::from_timestamp(raw_token.created_at, 0)
                .with_context(|| format!("Invalid timestamp: {}", raw_token.created_at))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::RawTelegramToken;
    use crate::notifications::TelegramToken;
    use chrono::DateTime;

    #[test]
    fn can_convert_to_telegram_token() -> anyhow::Result<()> {
        assert_eq!(
            TelegramToken::try_from(RawTelegramToken {
                id: 1,
                user_id: 123,
                name: Some("personal".to_string()),
                bot_token: "12345:token".to_string(),
                chat_id: "67890".to_string(),
                is_active: true,
                created_at: 946720800,
            })?,
            TelegramToken {
                id: 1,
                user_id: 123.try_into()?,
                name: Some("personal".to_string()),
                bot_token: "12345:token".to_string(),
                chat_id: "67890".to_string(),
                is_active: true,
                created_at: DateTime::from_timestamp(946720800, 0).unwrap(),
            }
        );

        Ok(())
    }
}
