//! Data models.

pub mod config;
pub mod oplog;
pub mod plan;
pub mod result;
pub mod rule;
