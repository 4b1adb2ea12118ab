pub mod config;
pub mod repositories;
pub mod services;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::*;
pub use repositories::*;
pub use services::*;
pub use utils::*;
