//! `approvectl approve` — one approval, no prompts.
//!
//! Connects first if the wallet isn't connected yet, then submits and waits
//! for finalization. Exits non-zero if either step fails.

use crate::cli::{open_workflow, render};
use crate::config::Config;
use crate::workflow::{ConnectionStatus, SubmitOutcome};
use anyhow::{bail, Result};
use colored::Colorize;

/// Inputs for `approvectl approve`, passed through untouched.
#[derive(Debug, Clone)]
pub struct ApproveArgs {
    pub token: String,
    pub amount: String,
    pub spender: String,
}

/// Run the `approvectl approve` command.
pub async fn run_approve(config: &Config, args: ApproveArgs) -> Result<()> {
    let workflow = open_workflow(config).await?;
    workflow.set_token_address(args.token);
    workflow.set_amount(args.amount);
    workflow.set_spender_address(args.spender);

    println!();
    if workflow.connection_status() == ConnectionStatus::Disconnected {
        let status = render::with_progress(&workflow, workflow.connect()).await;
        if status == ConnectionStatus::Disconnected {
            bail!("{}", workflow.status_message());
        }
    }
    println!("  Wallet: {}", render::connection_line(&workflow.state()));

    let outcome = render::with_progress(&workflow, workflow.submit_approval()).await;
    let state = workflow.state();
    println!("  {}", render::status_line(&state));

    match outcome {
        SubmitOutcome::Succeeded(receipt) => {
            println!("  Transaction: {}", receipt.tx_hash.cyan());
            if let Some(block) = receipt.block_number {
                println!("  Block:       {}", block);
            }
            if let Some(gas) = receipt.gas_used {
                println!("  Gas used:    {}", gas);
            }
            println!();
            Ok(())
        }
        SubmitOutcome::Failed(error) => {
            if error.is_finalization() {
                println!(
                    "  {}",
                    "The transaction was sent. Check it on chain before approving again.".yellow()
                );
            }
            println!(
                "  {}",
                format!("Details: approvectl log --session {}", workflow.session_id()).dimmed()
            );
            println!();
            bail!("{}", state.status_message)
        }
        SubmitOutcome::Ignored => bail!("an approval is already pending"),
    }
}
