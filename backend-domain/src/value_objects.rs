// Domain value objects
pub mod identifiers;
pub mod report_format;
pub mod risk_level;
pub mod scan_state;
pub mod scan_type;

pub use identifiers::*;
pub use report_format::*;
pub use risk_level::*;
pub use scan_state::*;
pub use scan_type::*;
