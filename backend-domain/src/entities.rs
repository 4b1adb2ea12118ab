// Domain entities

pub mod finding;
pub mod intent;
pub mod model;
pub mod report;
pub mod scan;

pub use finding::*;
pub use intent::*;
pub use model::*;
pub use report::*;
pub use scan::*;
