// Port traits (interfaces)
// Define what the domain needs from the scan engine and other collaborators

pub mod scanner;
pub mod services;

pub use scanner::*;
pub use services::*;
