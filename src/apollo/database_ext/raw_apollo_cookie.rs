use crate::apollo::ApolloCookie;
use anyhow::Context;
use chrono::DateTime;

#[derive(sqlx::FromRow, Debug, PartialEq, Clone)]
pub(super) struct RawApolloCookie {
    pub id: i64,
    pub user_id: i64,
    pub value: String,
    pub updated_at: i64,
}

impl TryFrom<RawApolloCookie> for ApolloCookie {
    type Error = anyhow::Error;

    fn try_from(raw_cookie: RawApolloCookie) -> Result<Self, Self::Error> {
        Ok(ApolloCookie {
            id: raw_cookie.id,
            user_id: raw_cookie.user_id.try_into()?,
            value: raw_cookie.value,
            updated_at: DateTime::from_timestamp(raw_cookie.updated_at, 0)
                .with_context(|| format!("Invalid timestamp: {}", raw_cookie.updated_at))?,
        })
    }
}
