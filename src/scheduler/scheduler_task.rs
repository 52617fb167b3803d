use std::fmt;

/// Identifies the periodically scheduled tasks the scheduler drives. Each task
/// runs under its own single-flight guard.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
pub enum SchedulerTask {
    /// Assigns randomized next-execution instants to unscheduled jobs.
    JobsSchedule,
    /// Executes due check-in punch jobs.
    CheckIn,
    /// Executes due check-out punch jobs.
    CheckOut,
    /// Refreshes stored Apollo session cookies.
    CookiesRefresh,
}

impl SchedulerTask {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JobsSchedule => "jobs-schedule",
            Self::CheckIn => "check-in",
            Self::CheckOut => "check-out",
            Self::CookiesRefresh => "cookies-refresh",
        }
    }
}

impl fmt::Display for SchedulerTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::SchedulerTask;

    #[test]
    fn renders_task_names() {
        assert_eq!(SchedulerTask::JobsSchedule.to_string(), "jobs-schedule");
        assert_eq!(SchedulerTask::CheckIn.to_string(), "check-in");
        assert_eq!(SchedulerTask::CheckOut.to_string(), "check-out");
        assert_eq!(SchedulerTask::CookiesRefresh.to_string(), "cookies-refresh");
    }
}
