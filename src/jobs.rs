mod database_ext;
mod execution_outcome;
mod job_policy;
mod job_status;
mod job_type;
mod punch_job;
mod skip_reason;

pub use self::{
    execution_outcome::ExecutionOutcome, job_policy::JobPolicy, job_status::JobStatus,
    job_type::JobType, punch_job::PunchJob, skip_reason::SkipReason,
};
