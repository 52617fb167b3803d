use crate::scheduler::SchedulerTask;
use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

/// Tracks which scheduler tasks are currently running, guaranteeing at most one
/// concurrent execution per task across scheduled ticks and manual triggers.
#[derive(Debug, Default)]
pub struct SingleFlight {
    running: Mutex<HashSet<SchedulerTask>>,
}

impl SingleFlight {
    /// Tries to mark the task as running. Returns a guard that releases the
    /// task on drop, or `None` if an execution is already in flight.
    pub fn try_acquire(self: &Arc<Self>, task: SchedulerTask) -> Option<SingleFlightGuard> {
        let mut running = self
            .running
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if !running.insert(task) {
            return None;
        }

        Some(SingleFlightGuard {
            registry: Arc::clone(self),
            task,
        })
    }

    pub fn is_running(&self, task: SchedulerTask) -> bool {
        self.running
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains(&task)
    }
}

/// Releases a task's single-flight slot on drop, including when the task
/// panics mid-run.
#[derive(Debug)]
pub struct SingleFlightGuard {
    registry: Arc<SingleFlight>,
    task: SchedulerTask,
}

impl Drop for SingleFlightGuard {
    fn drop(&mut self) {
        self.registry
            .running
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&self.task);
    }
}
