pub mod dialect; // Pagination capabilities per database type
pub mod merge; // Shard cursors, pagination decorators and the result merger
pub mod merge_service;
pub mod pagination; // Pagination context engines

pub use merge_service::*;
