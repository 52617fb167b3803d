use anyhow::anyhow;
use serde::{Deserialize, Serialize};

/// The kind of punch a job performs against the Apollo portal.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Hash, PartialEq, Eq)]
pub enum JobType {
    #[serde(rename = "CHECK_IN")]
    CheckIn,
    #[serde(rename = "CHECK_OUT")]
    CheckOut,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CheckIn => "CHECK_IN",
            Self::CheckOut => "CHECK_OUT",
        }
    }

    /// The portal-side attendance type code (1 = on-duty, 2 = off-duty).
    pub fn attendance_type(&self) -> u8 {
        match self {
            Self::CheckIn => 1,
            Self::CheckOut => 2,
        }
    }
}

impl std::str::FromStr for JobType {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "CHECK_IN" => Ok(Self::CheckIn),
            "CHECK_OUT" => Ok(Self::CheckOut),
            value => Err(anyhow!("Unknown job type: {value}")),
        }
    }
}

impl std::fmt::Display for JobType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
