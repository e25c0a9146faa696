pub mod approve;
pub mod connect;
pub mod form;
pub mod init;
pub mod log;
pub mod render;

use crate::config::Config;
use crate::diagnostics::{DiagnosticJournal, DiagnosticSink, NullSink};
use crate::wallet;
use crate::workflow::{ApprovalWorkflow, WorkflowOptions};
use anyhow::Result;
use std::sync::Arc;
use uuid::Uuid;

/// Build a workflow for one CLI session: wallet from config, journal named
/// after the session.
pub async fn open_workflow(config: &Config) -> Result<ApprovalWorkflow> {
    let wallet = wallet::provider_from_config(config)?;
    let session_id = Uuid::new_v4().to_string();

    let diagnostics: Arc<dyn DiagnosticSink> = if config.journal {
        match DiagnosticJournal::new(&session_id) {
            Ok(journal) => {
                tracing::debug!("Journal at {}", journal.log_path().display());
                Arc::new(journal)
            }
            Err(e) => {
                tracing::warn!("Journal disabled: {:#}", e);
                Arc::new(NullSink)
            }
        }
    } else {
        Arc::new(NullSink)
    };

    Ok(ApprovalWorkflow::mount_with_session(
        session_id,
        wallet,
        diagnostics,
        WorkflowOptions::from(config),
    )
    .await)
}
