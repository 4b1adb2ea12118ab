// Backend Application Layer

pub mod commands;
pub mod error;
pub mod metrics;
pub mod orchestrator;
pub mod queries;
pub mod registry;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::AppError;
pub use metrics::Metrics;
pub use orchestrator::ScanOrchestrator;
pub use registry::ScanRegistry;
pub use state::AppState;
