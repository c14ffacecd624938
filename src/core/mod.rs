//! Core rename engine.

pub mod backup;
pub mod executor;
pub mod filter;
pub mod oplog;
pub mod planner;
pub mod progress;
pub mod session;
pub mod transformer;
pub mod undo;
