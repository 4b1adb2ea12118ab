pub mod context;
pub mod job;
pub mod lifecycle;

pub use context::AppContext;
pub use job::{run_job, JobOptions, JobOutcome, JobReportFormat};
pub use lifecycle::run_standalone;
