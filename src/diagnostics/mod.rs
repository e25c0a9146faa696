//! The diagnostic channel.
//!
//! The workflow turns every error into a one-line status message; the full
//! detail goes to a [`DiagnosticSink`] so it isn't lost.

pub mod journal;
pub mod reader;
pub mod types;

use std::sync::Mutex;

pub use journal::DiagnosticJournal;
pub use reader::JournalReader;
pub use types::*;

/// Receives diagnostic events from the workflow.
/// Implementations must not fail loudly: reporting is best effort.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, event: &DiagnosticEvent);
}

/// Discards everything (used when the journal is turned off).
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn report(&self, _event: &DiagnosticEvent) {}
}

/// Keeps events in memory. Handy for tests and for embedding the workflow.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<DiagnosticEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far.
    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn failures(&self) -> Vec<DiagnosticEvent> {
        self.events().into_iter().filter(|e| e.is_failure()).collect()
    }
}

impl DiagnosticSink for MemorySink {
    fn report(&self, event: &DiagnosticEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event.clone());
    }
}
