use crate::users::UserId;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde_derive::Serialize;
use std::str::FromStr;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct User {
    #[serde(skip_serializing)]
    pub id: UserId,
    pub account: String,
    pub display_name: Option<String>,
    pub timezone: String,
    #[serde(skip_serializing)]
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Returns the user's IANA timezone, falling back to UTC if the stored value is invalid.
    pub fn tz(&self) -> Tz {
        Tz::from_str(&self.timezone).unwrap_or_else(|_| {
            tracing::warn!(
                user = *self.id,
                timezone = self.timezone,
                "Unknown user timezone, falling back to UTC."
            );
            Tz::UTC
        })
    }
}

impl AsRef<User> for User {
    fn as_ref(&self) -> &User {
        self
    }
}

#[cfg(test)]
mod tests {
    use crate::tests::mock_user;
    use chrono_tz::Tz;

    #[test]
    fn resolves_timezone() {
        let mut user = mock_user();
        assert_eq!(user.tz(), Tz::Asia__Taipei);

        user.timezone = "Not/AZone".to_string();
        assert_eq!(user.tz(), Tz::UTC);
    }
}
