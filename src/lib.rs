//! Bulk Renamer Library
//!
//! Renames batches of files in a directory by composable rules. Every run
//! backs up the originals and writes an operation log, so the latest run
//! can always be undone.

pub mod cli;
pub mod core;
pub mod error;
pub mod models;
pub mod utils;

pub use crate::core::progress::{NoProgress, Progress};
pub use crate::core::session::{execute, preview, undo, Session};
pub use error::{Error, Result};
