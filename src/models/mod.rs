pub mod merge;
pub mod segment;
pub mod statement;

pub use merge::*;
pub use segment::*;
pub use statement::*;
