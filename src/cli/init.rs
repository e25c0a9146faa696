//! `approvectl init` — write a starter `.approvectl.yaml`.

use crate::config::{defaults, parse_config_str, CONFIG_FILE_NAME};
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;
use url::Url;

/// Options for `approvectl init`.
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    pub template: Option<String>,
    pub rpc_url: Option<Url>,
    pub output: Option<PathBuf>,
    pub force: bool,
}

/// Run the `approvectl init` command.
pub fn run_init(options: &InitOptions) -> Result<()> {
    let output_file = match &options.output {
        Some(path) => path.clone(),
        None => std::env::current_dir()
            .context("Failed to get current directory")?
            .join(CONFIG_FILE_NAME),
    };

    if output_file.exists() && !options.force {
        println!();
        println!(
            "  {} A config file already exists at {}",
            "⚠".yellow(),
            output_file.display()
        );
        println!("  Use --force to overwrite it, or edit it directly.");
        println!();
        return Ok(());
    }

    let template_name = options.template.as_deref().unwrap_or("local-node");
    let template = defaults::get_template(template_name).ok_or_else(|| {
        let available: Vec<String> = defaults::available_templates()
            .iter()
            .map(|(name, desc)| format!("  {} — {}", name.bold(), desc))
            .collect();
        anyhow::anyhow!(
            "Unknown template '{}'. Available templates:\n{}",
            template_name,
            available.join("\n")
        )
    })?;

    let yaml = render_template(template, options.rpc_url.as_ref());
    // Never write something `load` would reject.
    parse_config_str(&yaml).context("Generated config is invalid")?;

    if let Some(parent) = output_file.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    std::fs::write(&output_file, yaml)
        .with_context(|| format!("Failed to write config file: {}", output_file.display()))?;

    println!();
    println!(
        "  {} Created {}",
        "✓".green().bold(),
        output_file.display().to_string().bold()
    );
    println!("  Template: {}", template_name.cyan());
    println!();
    println!("  {} Next steps:", "→".blue());
    println!("    1. Check rpc_url points at your node or wallet endpoint");
    println!("    2. Connect: {}", "approvectl connect".dimmed());
    println!("    3. Approve: {}", "approvectl".dimmed());
    println!();

    Ok(())
}

/// Swap the template's `rpc_url` line for `rpc_url` when one is given.
fn render_template(template: &str, rpc_url: Option<&Url>) -> String {
    let Some(url) = rpc_url else {
        return template.to_string();
    };
    template
        .lines()
        .map(|line| {
            if line.starts_with("rpc_url:") {
                format!("rpc_url: {}", url)
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
        + "\n"
}
