pub mod rules_files;

pub use rules_files::*;
