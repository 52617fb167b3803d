use crate::users::UserId;
use chrono::{DateTime, Utc};

/// Stored Apollo session cookie record for a single user. The `value` column
/// keeps the cookie set in whatever shape the extension uploaded it in.
#[derive(Debug, Clone, PartialEq)]
pub struct ApolloCookie {
    pub id: i64,
    pub user_id: UserId,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}
