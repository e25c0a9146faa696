//! approvectl — ERC-20 approvals from the terminal.
//!
//! Quick start:
//!   approvectl init       # write .approvectl.yaml
//!   approvectl            # interactive approval form
//!   approvectl log        # see what went wrong last time
//!
//! For more info: approvectl --help

use approvectl::cli;
use approvectl::config::{self, Config};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use url::Url;

/// approvectl — approve ERC-20 spenders from your terminal.
#[derive(Parser)]
#[command(
    name = "approvectl",
    version,
    about = "Approve ERC-20 spenders from your terminal",
    long_about = "approvectl connects to your wallet provider and sends an ERC-20\n\
                  approve(spender, amount) for any token address.\n\n\
                  Quick start:\n  \
                  approvectl init     # write a config file\n  \
                  approvectl          # interactive form\n  \
                  approvectl log      # see what happened"
)]
struct Cli {
    /// Config file (default: nearest .approvectl.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Wallet provider JSON-RPC endpoint (overrides the config file)
    #[arg(long, global = true, env = "APPROVECTL_RPC_URL")]
    rpc_url: Option<Url>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive approval form (the default)
    Form,

    /// Approve a spender without prompting
    Approve {
        /// Token contract address
        #[arg(long)]
        token: String,

        /// Amount in base units (decimal, or hex with 0x)
        #[arg(long)]
        amount: String,

        /// Address allowed to spend
        #[arg(long)]
        spender: String,
    },

    /// Connect to the wallet and show the account
    Connect,

    /// See what happened in past sessions
    Log {
        /// Show a specific session
        #[arg(short, long, help = "Session ID to view")]
        session: Option<String>,

        /// Filter by operation
        #[arg(short, long, help = "Filter: connect, approve")]
        operation: Option<String>,

        /// Only show failures
        #[arg(short, long)]
        failures: bool,

        /// Limit number of entries shown
        #[arg(short, long, help = "Max entries to show")]
        limit: Option<usize>,

        /// Show only the summary
        #[arg(long)]
        summary: bool,

        /// List all recorded sessions
        #[arg(long)]
        list: bool,
    },

    /// Write a starter config file
    Init {
        /// Template: local-node, local-key
        #[arg(short, long)]
        template: Option<String>,

        /// Output path (default: ./.approvectl.yaml)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() {
    // Quiet by default; RUST_LOG=approvectl=debug to see transitions
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("approvectl=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Log {
            session,
            operation,
            failures,
            limit,
            summary,
            list,
        }) => {
            if list {
                cli::log::run_log_list()
            } else {
                cli::log::run_log(&cli::log::LogOptions {
                    session,
                    operation,
                    failures_only: failures,
                    limit,
                    summary_only: summary,
                })
            }
        }

        Some(Commands::Init {
            template,
            output,
            force,
        }) => cli::init::run_init(&cli::init::InitOptions {
            template,
            rpc_url: cli.rpc_url,
            output,
            force,
        }),

        command => match load_config(cli.config, cli.rpc_url) {
            Ok(config) => match command {
                Some(Commands::Approve {
                    token,
                    amount,
                    spender,
                }) => {
                    cli::approve::run_approve(
                        &config,
                        cli::approve::ApproveArgs {
                            token,
                            amount,
                            spender,
                        },
                    )
                    .await
                }
                Some(Commands::Connect) => cli::connect::run_connect(&config).await,
                _ => cli::form::run_form(&config).await,
            },
            Err(e) => Err(e),
        },
    };

    if let Err(e) = result {
        eprintln!();
        eprintln!("  {} {}", "✗".red().bold(), e);
        for cause in e.chain().skip(1) {
            eprintln!("  {} {}", "caused by:".dimmed(), cause);
        }
        eprintln!();
        std::process::exit(1);
    }
}

/// Config file (explicit or discovered), then the command-line endpoint on top.
fn load_config(explicit: Option<PathBuf>, rpc_url: Option<Url>) -> anyhow::Result<Config> {
    let cwd = std::env::current_dir()?;
    Ok(config::load(explicit.as_deref(), &cwd)?.with_rpc_url(rpc_url))
}
