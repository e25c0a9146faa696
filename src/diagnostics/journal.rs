//! Diagnostic journal writer — append-only JSONL files.
//!
//! Writes to `~/.approvectl/logs/{session_id}.jsonl`, one JSON object per line.
//! Flushes after every write so a crash mid-approval still leaves the record.

use crate::diagnostics::types::DiagnosticEvent;
use crate::diagnostics::DiagnosticSink;
use crate::utils::paths;
use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Append-only journal for one workflow session.
pub struct DiagnosticJournal {
    log_path: PathBuf,
    inner: Mutex<JournalFile>,
}

struct JournalFile {
    file: File,
    entry_count: usize,
}

impl DiagnosticJournal {
    /// Open the journal for a session in the default log directory.
    pub fn new(session_id: &str) -> Result<Self> {
        let log_dir = Self::log_directory()?;
        fs::create_dir_all(&log_dir)
            .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;
        Self::with_path(log_dir.join(format!("{}.jsonl", session_id)))
    }

    /// Open a journal at a specific path.
    pub fn with_path(path: impl AsRef<Path>) -> Result<Self> {
        let log_path = path.as_ref().to_path_buf();
        if let Some(parent) = log_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;

        Ok(Self {
            log_path,
            inner: Mutex::new(JournalFile {
                file,
                entry_count: 0,
            }),
        })
    }

    /// Append an event and flush.
    pub fn append(&self, event: &DiagnosticEvent) -> Result<()> {
        let json = serde_json::to_string(event).context("Failed to serialize journal entry")?;
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        writeln!(inner.file, "{}", json).context("Failed to write journal entry")?;
        inner.file.flush().context("Failed to flush journal")?;
        inner.entry_count += 1;
        Ok(())
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Number of entries written through this handle.
    pub fn entry_count(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).entry_count
    }

    /// The default log directory (~/.approvectl/logs/).
    pub fn log_directory() -> Result<PathBuf> {
        paths::journal_directory()
    }
}

impl DiagnosticSink for DiagnosticJournal {
    fn report(&self, event: &DiagnosticEvent) {
        if let Err(e) = self.append(event) {
            tracing::warn!("Could not write to {}: {:#}", self.log_path.display(), e);
        }
    }
}
