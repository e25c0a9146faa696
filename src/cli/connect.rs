//! `approvectl connect` — ask the wallet for an account and report it.

use crate::cli::{open_workflow, render};
use crate::config::Config;
use crate::workflow::ConnectionStatus;
use anyhow::{bail, Result};
use colored::Colorize;

/// Run the `approvectl connect` command.
pub async fn run_connect(config: &Config) -> Result<()> {
    let workflow = open_workflow(config).await?;

    let status = render::with_progress(&workflow, workflow.connect()).await;
    let state = workflow.state();

    println!();
    match status {
        ConnectionStatus::Connected => {
            println!("  {} {}", "✓".green().bold(), render::connection_line(&state));
            if let Some(ref account) = state.account {
                println!("  Account: {}", account.cyan());
            }
            println!();
            Ok(())
        }
        ConnectionStatus::Disconnected => bail!("{}", state.status_message),
    }
}
