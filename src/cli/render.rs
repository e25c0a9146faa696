//! Terminal rendering of the form state.

use crate::utils::format::{short_address, truncate};
use crate::workflow::{ApprovalFormState, ApprovalWorkflow, ConnectionStatus, SubmissionStatus};
use colored::Colorize;
use std::convert::Infallible;
use std::future::Future;

/// The status message, colored by how the last approval went.
pub fn status_line(state: &ApprovalFormState) -> String {
    let message = state.status_message.as_str();
    match state.submission_status {
        SubmissionStatus::Succeeded => format!("{} {}", "✓".green().bold(), message.green()),
        SubmissionStatus::Failed => format!("{} {}", "✗".red().bold(), message.red()),
        SubmissionStatus::Pending => format!("{} {}", "…".yellow(), message.yellow()),
        SubmissionStatus::Idle => format!("{} {}", "ℹ".blue(), message),
    }
}

/// One line describing the wallet connection.
pub fn connection_line(state: &ApprovalFormState) -> String {
    match (state.connection_status, state.account.as_deref()) {
        (ConnectionStatus::Connected, Some(account)) => format!(
            "{} {}",
            "connected".green(),
            short_address(account).cyan()
        ),
        (ConnectionStatus::Connected, None) => "connected".green().to_string(),
        (ConnectionStatus::Disconnected, _) => "not connected".yellow().to_string(),
    }
}

/// Draw the whole form.
pub fn print_form(state: &ApprovalFormState) {
    let field = |value: &str| {
        if value.is_empty() {
            "(empty)".dimmed().to_string()
        } else {
            truncate(value, 60)
        }
    };
    let action = state.primary_action();
    let button = if action.is_enabled() {
        format!("[ {} ]", action.label()).bold().to_string()
    } else {
        format!("[ {} ]", action.label()).dimmed().to_string()
    };

    println!();
    println!("  {}", "Token Approval".bold());
    println!("  {}", "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━".dimmed());
    println!("  Wallet:         {}", connection_line(state));
    println!("  Token address:  {}", field(&state.token_address));
    println!("  Amount:         {}", field(&state.amount));
    println!("  Spender:        {}", field(&state.spender_address));
    println!();
    println!("  {}", button);
    if !state.status_message.is_empty() {
        println!("  {}", status_line(state));
    }
    println!();
}

/// Run `fut` while echoing intermediate status messages from `workflow`.
/// The final state is left for the caller to render.
pub async fn with_progress<F: Future>(workflow: &ApprovalWorkflow, fut: F) -> F::Output {
    let mut rx = workflow.subscribe();
    rx.borrow_and_update();

    let progress = async {
        while rx.changed().await.is_ok() {
            let message = rx.borrow_and_update().status_message.clone();
            if !message.is_empty() {
                println!("  {} {}", "…".dimmed(), message.dimmed());
            }
        }
        std::future::pending::<Infallible>().await
    };

    tokio::select! {
        biased;
        out = fut => out,
        never = progress => match never {},
    }
}
