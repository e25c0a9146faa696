//! approvectl — connect a wallet and approve ERC-20 spenders.
//!
//! The library holds the approval workflow and the seams around it (wallet
//! capabilities, diagnostics, configuration) so the workflow can be driven by
//! the CLI in `main.rs` or by tests with scripted wallets.

pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod utils;
pub mod wallet;
pub mod workflow;
