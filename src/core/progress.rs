//! Progress reporting hooks.
//!
//! The engine is synchronous. Callers that want feedback pass a
//! [`Progress`] implementation; it is advanced once per resolved entry and
//! polled for cancellation between entries.

/// Receives progress from execute and undo.
pub trait Progress {
    /// Called once with the number of entries that will be processed.
    fn begin(&mut self, _total: usize) {}

    /// Called after each entry is resolved.
    fn advance(&mut self, _name: &str) {}

    /// Called when processing ends, including after cancellation.
    fn finish(&mut self) {}

    /// Checked between entries. Work already done is kept.
    fn cancelled(&self) -> bool {
        false
    }
}

/// Progress sink that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl Progress for NoProgress {}
