//! The interactive approval form (what `approvectl` runs with no subcommand).
//!
//! Asks for the three inputs, then shows a single action button:
//! - `Enter` presses it (connect, or approve once connected)
//! - `E` edits the inputs
//! - `Q` / `Esc` quits
//!
//! Key handling uses crossterm raw mode, like a one-key prompt; the text
//! fields are plain line input.

use crate::cli::{open_workflow, render};
use crate::config::Config;
use crate::workflow::ApprovalWorkflow;
use anyhow::Result;
use colored::Colorize;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::terminal;
use std::io::{self, Write};

/// What the user pressed at the action bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormKey {
    Primary,
    Edit,
    Quit,
}

/// Run the interactive form until the user quits.
pub async fn run_form(config: &Config) -> Result<()> {
    let workflow = open_workflow(config).await?;

    edit_fields(&workflow)?;

    loop {
        render::print_form(&workflow.state());
        print_key_help(&workflow);

        let key = tokio::task::spawn_blocking(read_form_key).await??;
        match key {
            FormKey::Primary => {
                render::with_progress(&workflow, workflow.trigger()).await;
            }
            FormKey::Edit => edit_fields(&workflow)?,
            FormKey::Quit => break,
        }
    }

    println!();
    Ok(())
}

fn print_key_help(workflow: &ApprovalWorkflow) {
    let action = workflow.primary_action();
    println!(
        "  {} {}    {} Edit    {} Quit",
        "[Enter]".green(),
        action.label(),
        "[E]".blue(),
        "[Q]".red()
    );
}

/// Prompt for all three inputs. An empty answer keeps the current value.
fn edit_fields(workflow: &ApprovalWorkflow) -> Result<()> {
    println!();
    if let Some(value) = prompt_field("Token address", &workflow.token_address())? {
        workflow.set_token_address(value);
    }
    if let Some(value) = prompt_field("Amount to approve", &workflow.amount())? {
        workflow.set_amount(value);
    }
    if let Some(value) = prompt_field("Address to approve", &workflow.spender_address())? {
        workflow.set_spender_address(value);
    }
    Ok(())
}

/// Read one line. Returns `None` to keep `current`.
fn prompt_field(label: &str, current: &str) -> Result<Option<String>> {
    if current.is_empty() {
        print!("  {}: ", label.bold());
    } else {
        print!("  {} [{}]: ", label.bold(), current.dimmed());
    }
    io::stdout().flush()?;

    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Ok(None);
    }
    Ok(parse_field_input(&input))
}

/// Strip the line ending only; the value is otherwise taken as typed.
fn parse_field_input(input: &str) -> Option<String> {
    let value = input.trim_end_matches(['\r', '\n']);
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Restores cooked mode even if reading a key fails.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn read_form_key() -> Result<FormKey> {
    let _raw = RawModeGuard::enable()?;
    loop {
        if let Event::Key(KeyEvent { code, kind, .. }) = event::read()? {
            if kind != KeyEventKind::Press {
                continue;
            }
            match code {
                KeyCode::Enter => return Ok(FormKey::Primary),
                KeyCode::Char('e') | KeyCode::Char('E') => return Ok(FormKey::Edit),
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                    return Ok(FormKey::Quit)
                }
                _ => continue,
            }
        }
    }
}
