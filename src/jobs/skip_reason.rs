use serde::{Deserialize, Serialize};

/// Why a punch was skipped instead of executed.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub enum SkipReason {
    #[serde(rename = "holiday")]
    Holiday,
    #[serde(rename = "non-working-day")]
    NonWorkingDay,
    #[serde(rename = "leave")]
    Leave,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Holiday => "holiday",
            Self::NonWorkingDay => "non-working-day",
            Self::Leave => "leave",
        }
    }
}
