//! Journal reader — filter and display session journals.
//!
//! Reads JSONL journal files and provides filtering, summarization,
//! and pretty-printing for the `approvectl log` command.

use crate::diagnostics::types::*;
use crate::diagnostics::DiagnosticJournal;
use crate::utils::format::short_address;
use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

/// Reads and queries journal files.
pub struct JournalReader {
    log_dir: PathBuf,
}

impl JournalReader {
    /// Create a reader using the default log directory.
    pub fn new() -> Result<Self> {
        let log_dir = DiagnosticJournal::log_directory()?;
        Ok(Self { log_dir })
    }

    /// Create a reader for a specific directory.
    pub fn with_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            log_dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Read all events from a session journal.
    pub fn read_session(&self, session_id: &str) -> Result<Vec<DiagnosticEvent>> {
        let path = self.log_dir.join(format!("{}.jsonl", session_id));
        self.read_file(&path)
    }

    fn read_file(&self, path: &Path) -> Result<Vec<DiagnosticEvent>> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read log file: {}", path.display()))?;

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .enumerate()
            .map(|(i, line)| {
                serde_json::from_str(line)
                    .with_context(|| format!("Failed to parse journal entry at line {}", i + 1))
            })
            .collect()
    }

    /// Read events from the most recent session.
    pub fn read_latest_session(&self) -> Result<Vec<DiagnosticEvent>> {
        match self.find_latest_session()? {
            Some(path) => self.read_file(&path),
            None => Ok(Vec::new()),
        }
    }

    fn journal_files(&self) -> Result<Vec<PathBuf>> {
        if !self.log_dir.exists() {
            return Ok(Vec::new());
        }
        Ok(fs::read_dir(&self.log_dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|e| e == "jsonl"))
            .collect())
    }

    fn find_latest_session(&self) -> Result<Option<PathBuf>> {
        let mut files = self.journal_files()?;
        // Most recently modified first
        files.sort_by(|a, b| {
            let a_time = fs::metadata(a).and_then(|m| m.modified()).ok();
            let b_time = fs::metadata(b).and_then(|m| m.modified()).ok();
            b_time.cmp(&a_time)
        });
        Ok(files.into_iter().next())
    }

    /// List all session IDs that have a journal.
    pub fn list_sessions(&self) -> Result<Vec<String>> {
        let mut sessions: Vec<String> = self
            .journal_files()?
            .iter()
            .filter_map(|p| p.file_stem().map(|s| s.to_string_lossy().to_string()))
            .collect();
        sessions.sort();
        Ok(sessions)
    }

    /// Apply a filter to a set of events.
    pub fn filter_events(events: &[DiagnosticEvent], filter: &EventFilter) -> Vec<DiagnosticEvent> {
        events
            .iter()
            .filter(|e| filter.operation.map_or(true, |op| e.operation == op))
            .filter(|e| !filter.failures_only || e.is_failure())
            .take(filter.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }

    /// Summarize a session's events.
    pub fn summarize(events: &[DiagnosticEvent]) -> JournalSummary {
        let mut summary = JournalSummary::default();

        if let Some(first) = events.first() {
            summary.session_id = first.session_id.clone();
            summary.start_time = Some(first.timestamp);
        }
        if let Some(last) = events.last() {
            summary.end_time = Some(last.timestamp);
        }

        summary.total_events = events.len();
        for event in events {
            match event.operation {
                Operation::Connect => {
                    summary.connects += 1;
                    if event.is_failure() {
                        summary.connect_failures += 1;
                    }
                }
                Operation::SubmitApproval => {
                    summary.approvals += 1;
                    if event.is_failure() {
                        summary.approval_failures += 1;
                    }
                }
            }
        }

        summary
    }

    /// Pretty-print an event for terminal display.
    pub fn format_event(event: &DiagnosticEvent) -> String {
        let timestamp = event.timestamp.format("%H:%M:%S").to_string();
        let outcome = match event.outcome {
            Outcome::Succeeded => "OK    ".green().to_string(),
            Outcome::Failed => "FAILED".red().to_string(),
        };

        let mut line = format!(
            "[{}] {} {}",
            timestamp.dimmed(),
            outcome,
            event.operation.to_string().bold()
        );

        if let (Some(token), Some(spender), Some(amount)) =
            (&event.token_address, &event.spender_address, &event.amount)
        {
            line.push_str(&format!(
                " {} of {} -> {}",
                amount,
                short_address(token),
                short_address(spender)
            ));
        }

        if let Some(ref hash) = event.tx_hash {
            line.push_str(&format!(" ({})", hash.dimmed()));
        }

        if event.is_failure() {
            line.push_str(&format!("\n      {}", event.detail.dimmed()));
        }

        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::WalletError;
    use tempfile::TempDir;

    fn sample_events() -> Vec<DiagnosticEvent> {
        vec![
            DiagnosticEvent::success("s1", Operation::Connect, "connected"),
            DiagnosticEvent::failure(
                "s1",
                Operation::SubmitApproval,
                &WalletError::Invocation("bad spender".into()),
            ),
            DiagnosticEvent::success("s1", Operation::SubmitApproval, "approved")
                .with_tx_hash(Some("0x01".into())),
        ]
    }

    #[test]
    fn test_summarize() {
        let summary = JournalReader::summarize(&sample_events());
        assert_eq!(summary.session_id, "s1");
        assert_eq!(summary.total_events, 3);
        assert_eq!(summary.connects, 1);
        assert_eq!(summary.approvals, 2);
        assert_eq!(summary.approval_failures, 1);
        assert_eq!(summary.connect_failures, 0);
    }

    #[test]
    fn test_filter_failures_and_operation() {
        let events = sample_events();

        let failures = JournalReader::filter_events(
            &events,
            &EventFilter {
                failures_only: true,
                ..Default::default()
            },
        );
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].error_kind.as_deref(), Some("invocation"));

        let approvals = JournalReader::filter_events(
            &events,
            &EventFilter {
                operation: Some(Operation::SubmitApproval),
                limit: Some(1),
                ..Default::default()
            },
        );
        assert_eq!(approvals.len(), 1);
        assert!(approvals[0].is_failure());
    }

    #[test]
    fn test_list_and_read_sessions() {
        let tmp = TempDir::new().unwrap();
        let journal = DiagnosticJournal::with_path(tmp.path().join("abc.jsonl")).unwrap();
        for event in sample_events() {
            journal.append(&event).unwrap();
        }
        fs::write(tmp.path().join("notes.txt"), "ignored").unwrap();

        let reader = JournalReader::with_dir(tmp.path());
        assert_eq!(reader.list_sessions().unwrap(), vec!["abc".to_string()]);
        assert_eq!(reader.read_session("abc").unwrap().len(), 3);
        assert_eq!(reader.read_latest_session().unwrap().len(), 3);
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let tmp = TempDir::new().unwrap();
        let reader = JournalReader::with_dir(tmp.path().join("does-not-exist"));
        assert!(reader.list_sessions().unwrap().is_empty());
        assert!(reader.read_latest_session().unwrap().is_empty());
    }

    #[test]
    fn test_format_event_shows_detail_for_failures() {
        let events = sample_events();
        let line = JournalReader::format_event(&events[1]);
        assert!(line.contains("bad spender"));
        let line = JournalReader::format_event(&events[2]);
        assert!(line.contains("0x01"));
    }
}
