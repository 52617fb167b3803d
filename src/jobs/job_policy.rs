use serde::{Deserialize, Serialize};

/// User-configurable execution policy stored in the job's `data` column.
#[derive(Serialize, Deserialize, Default, Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JobPolicy {
    /// Skip punching on national holidays and regular days off.
    #[serde(default)]
    pub skip_holiday: bool,
    /// Skip punching on days fully covered by approved leave.
    #[serde(default)]
    pub skip_leaves: bool,
}

#[cfg(test)]
mod tests {
    use super::JobPolicy;

    #[test]
    fn deserialization_defaults_missing_flags() -> anyhow::Result<()> {
        assert_eq!(
            serde_json::from_str::<JobPolicy>("{}")?,
            JobPolicy::default()
        );
        assert_eq!(
            serde_json::from_str::<JobPolicy>(r#"{"skipHoliday":true}"#)?,
            JobPolicy {
                skip_holiday: true,
                skip_leaves: false
            }
        );
        assert_eq!(
            serde_json::from_str::<JobPolicy>(r#"{"skipHoliday":true,"skipLeaves":true}"#)?,
            JobPolicy {
                skip_holiday: true,
                skip_leaves: true
            }
        );

        Ok(())
    }

    #[test]
    fn serialization() -> anyhow::Result<()> {
        assert_eq!(
            serde_json::to_string(&JobPolicy {
                skip_holiday: true,
                skip_leaves: false
            })?,
            r#"{"skipHoliday":true,"skipLeaves":false}"#
        );

        Ok(())
    }
}
