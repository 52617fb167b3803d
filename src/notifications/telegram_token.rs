use crate::users::UserId;
use chrono::{DateTime, Utc};

/// Telegram delivery target of a single user. Users can register several
/// bot/chat pairs and toggle them independently.
#[derive(Debug, Clone, PartialEq)]
pub struct TelegramToken {
    pub id: i64,
    pub user_id: UserId,
    pub name: Option<String>,
    pub bot_token: String,
    pub chat_id: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
