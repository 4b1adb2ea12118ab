pub mod ops_handlers;
pub mod report_handlers;
pub mod scan_handlers;

pub use ops_handlers::*;
pub use report_handlers::*;
pub use scan_handlers::*;
