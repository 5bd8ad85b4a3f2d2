// src/progress.rs
use crate::core::geo::Cell;

/// Progress reporting for long-running refinements.
/// Frontends (CLI, tests) implement this to surface status to users.
pub trait Progress {
    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// A new depth is about to be fetched, `cells` queries in total.
    fn depth_begin(&mut self, _depth: u32, _cells: usize) {}

    /// One cell came back with `found` venues (after noise filtering).
    fn cell_done(&mut self, _cell: Cell, _found: usize) {}

    /// A request failed and is about to be retried; `attempt` counts failures so far.
    fn retry(&mut self, _attempt: u32, _reason: &str) {}

    /// Called at the end, successful or not.
    fn finish(&mut self) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}
