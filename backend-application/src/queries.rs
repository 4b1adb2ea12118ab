pub mod report_queries;
pub mod scan_queries;

pub use report_queries::*;
pub use scan_queries::*;
