//! Filesystem locations used by approvectl.
//!
//! Everything lives under `~/.approvectl/`; project config is found by
//! walking up from the working directory.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// `~/.approvectl`
pub fn app_home() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".approvectl"))
}

/// `~/.approvectl/logs`, where diagnostic journals are written.
pub fn journal_directory() -> Result<PathBuf> {
    Ok(app_home()?.join("logs"))
}

/// Find `file_name` in `start` or any of its ancestors.
pub fn find_walking_up(start: &Path, file_name: &str) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join(file_name);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}
