//! Types for the diagnostic journal.
//!
//! Every failure the workflow swallows (so the UI only shows a status line)
//! is recorded here in full, along with successful outcomes for context.

use crate::wallet::WalletError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which workflow operation produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Connect,
    SubmitApproval,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Connect => write!(f, "connect"),
            Operation::SubmitApproval => write!(f, "approve"),
        }
    }
}

impl Operation {
    /// Parse an operation name as typed on the command line.
    pub fn from_str_loose(s: &str) -> Option<Operation> {
        match s.to_lowercase().trim() {
            "connect" | "connection" => Some(Operation::Connect),
            "approve" | "approval" | "submit" | "submit_approval" => {
                Some(Operation::SubmitApproval)
            }
            _ => None,
        }
    }
}

/// How an operation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Succeeded,
    Failed,
}

/// A single entry in the diagnostic journal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticEvent {
    /// When the operation finished
    pub timestamp: DateTime<Utc>,

    /// Workflow session identifier (UUID, one per workflow instance)
    pub session_id: String,

    pub operation: Operation,

    pub outcome: Outcome,

    /// Stable error name (`WalletError::kind`) for failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,

    /// Full error text for failures, short note for successes
    pub detail: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub spender_address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
}

impl DiagnosticEvent {
    pub fn success(session_id: &str, operation: Operation, detail: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            session_id: session_id.to_string(),
            operation,
            outcome: Outcome::Succeeded,
            error_kind: None,
            detail: detail.into(),
            account: None,
            token_address: None,
            spender_address: None,
            amount: None,
            tx_hash: None,
        }
    }

    pub fn failure(session_id: &str, operation: Operation, error: &WalletError) -> Self {
        Self {
            outcome: Outcome::Failed,
            error_kind: Some(error.kind().to_string()),
            ..Self::success(session_id, operation, format!("{:?}: {}", error, error))
        }
    }

    /// Attach the approval inputs the operation ran with.
    pub fn with_request(mut self, token_address: &str, spender_address: &str, amount: &str) -> Self {
        self.token_address = Some(token_address.to_string());
        self.spender_address = Some(spender_address.to_string());
        self.amount = Some(amount.to_string());
        self
    }

    pub fn with_account(mut self, account: Option<String>) -> Self {
        self.account = account;
        self
    }

    pub fn with_tx_hash(mut self, tx_hash: Option<String>) -> Self {
        self.tx_hash = tx_hash;
        self
    }

    pub fn is_failure(&self) -> bool {
        self.outcome == Outcome::Failed
    }
}

/// Summary statistics for one session's journal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JournalSummary {
    pub session_id: String,
    pub total_events: usize,
    pub connects: usize,
    pub connect_failures: usize,
    pub approvals: usize,
    pub approval_failures: usize,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl JournalSummary {
    /// Format as a human-readable one-liner for terminal output.
    pub fn one_line(&self) -> String {
        format!(
            "{} events | {} connects ({} failed) | {} approvals ({} failed)",
            self.total_events,
            self.connects,
            self.connect_failures,
            self.approvals,
            self.approval_failures
        )
    }
}

/// Filter criteria for querying the journal.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub operation: Option<Operation>,
    pub failures_only: bool,
    pub limit: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_carries_kind_and_detail() {
        let err = WalletError::Reverted {
            tx_hash: "0xabc".to_string(),
        };
        let event = DiagnosticEvent::failure("s1", Operation::SubmitApproval, &err)
            .with_request("0xAAA", "0xBBB", "100");

        assert!(event.is_failure());
        assert_eq!(event.error_kind.as_deref(), Some("reverted"));
        assert!(event.detail.contains("0xabc"));
        assert_eq!(event.amount.as_deref(), Some("100"));
    }

    #[test]
    fn test_success_serializes_without_empty_fields() {
        let event = DiagnosticEvent::success("s1", Operation::Connect, "connected");
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"outcome\":\"succeeded\""));
        assert!(json.contains("\"operation\":\"connect\""));
        assert!(!json.contains("tx_hash"));
        assert!(!json.contains("error_kind"));
    }

    #[test]
    fn test_operation_from_str_loose() {
        assert_eq!(
            Operation::from_str_loose("Approve"),
            Some(Operation::SubmitApproval)
        );
        assert_eq!(Operation::from_str_loose("connect"), Some(Operation::Connect));
        assert_eq!(Operation::from_str_loose("transfer"), None);
    }
}
