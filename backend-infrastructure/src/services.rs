pub mod intent_service;
pub mod report_service;
pub mod upload_service;
pub mod zap_scanner;

pub use intent_service::*;
pub use report_service::*;
pub use upload_service::*;
pub use zap_scanner::*;
