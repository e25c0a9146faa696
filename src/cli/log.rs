//! `approvectl log` — browse the diagnostic journal.
//!
//! The form only ever shows a one-line status; this is where the full error
//! detail of a failed connect or approval ends up.

use crate::diagnostics::{EventFilter, JournalReader, Operation};
use anyhow::{Context, Result};
use colored::Colorize;

/// Options for `approvectl log`.
#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    pub session: Option<String>,
    pub operation: Option<String>,
    pub failures_only: bool,
    pub limit: Option<usize>,
    pub summary_only: bool,
}

/// Run the `approvectl log` command.
pub fn run_log(options: &LogOptions) -> Result<()> {
    let reader = JournalReader::new().context("Failed to initialize journal reader")?;
    run_log_with(&reader, options)
}

fn run_log_with(reader: &JournalReader, options: &LogOptions) -> Result<()> {
    let events = match options.session.as_deref() {
        Some(sid) => reader
            .read_session(sid)
            .with_context(|| format!("Failed to read session: {}", sid))?,
        None => reader.read_latest_session()?,
    };

    if events.is_empty() {
        println!();
        println!("  {} Nothing in the journal yet.", "ℹ".blue());
        println!("  Run an approval first:");
        println!(
            "    {}",
            "approvectl approve --token <addr> --amount <n> --spender <addr>".dimmed()
        );
        println!();
        return Ok(());
    }

    let summary = JournalReader::summarize(&events);

    if options.summary_only {
        println!();
        println!("  Session: {}", summary.session_id.cyan());
        println!();
        println!(
            "  {} connects ({} failed) | {} approvals ({} failed)",
            summary.connects.to_string().bold(),
            summary.connect_failures.to_string().red(),
            summary.approvals.to_string().bold(),
            summary.approval_failures.to_string().red(),
        );
        if let (Some(start), Some(end)) = (summary.start_time, summary.end_time) {
            println!("  Duration: {}", format_duration((end - start).num_seconds()));
        }
        println!();
        return Ok(());
    }

    let filter = EventFilter {
        operation: options.operation.as_deref().and_then(Operation::from_str_loose),
        failures_only: options.failures_only,
        limit: options.limit,
    };
    let filtered = JournalReader::filter_events(&events, &filter);

    println!();
    println!("  Session: {}", summary.session_id.cyan());
    println!();
    for event in &filtered {
        println!("  {}", JournalReader::format_event(event));
    }
    println!();
    println!(
        "  {} {}",
        "─".repeat(40).dimmed(),
        summary.one_line().dimmed()
    );
    println!();

    Ok(())
}

/// List available sessions.
pub fn run_log_list() -> Result<()> {
    let reader = JournalReader::new()?;
    let sessions = reader.list_sessions()?;

    println!();
    if sessions.is_empty() {
        println!("  {} No sessions found.", "ℹ".blue());
        println!();
        return Ok(());
    }

    println!("  Recorded sessions:");
    println!();
    for session in &sessions {
        println!("  • {}", session);
    }
    println!();
    println!("  View a session: {}", "approvectl log --session <id>".dimmed());
    println!();

    Ok(())
}

fn format_duration(seconds: i64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    }
}
