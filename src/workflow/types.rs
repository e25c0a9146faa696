//! State types for the approval workflow.

use crate::wallet::Receipt;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Shown while an approval is in flight.
pub const APPROVING_MESSAGE: &str = "Approving...";
/// Shown after an approval finalizes.
pub const SUCCESS_MESSAGE: &str = "Tokens approved successfully!";
/// Prefix of the status shown when an approval fails.
pub const FAILURE_MESSAGE: &str = "Error approving tokens";
/// Shown after a successful connection.
pub const CONNECTED_MESSAGE: &str = "Wallet connected";

/// Whether a wallet account is authorised for this workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connected,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::Disconnected => write!(f, "disconnected"),
            ConnectionStatus::Connected => write!(f, "connected"),
        }
    }
}

/// Where the most recent approval stands.
///
/// `Pending` is the only state a call can be suspended in; `Succeeded` and
/// `Failed` end a call but are valid starting points for the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Pending,
    Succeeded,
    Failed,
}

impl SubmissionStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, SubmissionStatus::Pending)
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionStatus::Idle => write!(f, "idle"),
            SubmissionStatus::Pending => write!(f, "pending"),
            SubmissionStatus::Succeeded => write!(f, "succeeded"),
            SubmissionStatus::Failed => write!(f, "failed"),
        }
    }
}

/// What the single action button does right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryAction {
    /// No account yet: the button connects.
    Connect,
    /// Connected and idle: the button submits the approval.
    Approve,
    /// An approval is in flight: the button is disabled.
    Waiting,
}

impl PrimaryAction {
    pub fn label(&self) -> &'static str {
        match self {
            PrimaryAction::Connect => "Connect Wallet",
            PrimaryAction::Approve => "Approve Tokens",
            PrimaryAction::Waiting => APPROVING_MESSAGE,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, PrimaryAction::Waiting)
    }
}

/// Everything the form shows. Owned by one workflow; never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ApprovalFormState {
    pub token_address: String,
    pub amount: String,
    pub spender_address: String,
    pub connection_status: ConnectionStatus,
    pub submission_status: SubmissionStatus,
    pub status_message: String,
    /// The connected account, when the provider reports one.
    pub account: Option<String>,
    /// Receipt of the last successful approval.
    pub last_receipt: Option<Receipt>,
}

impl ApprovalFormState {
    pub fn new(connection_status: ConnectionStatus) -> Self {
        Self {
            connection_status,
            ..Self::default()
        }
    }

    pub fn primary_action(&self) -> PrimaryAction {
        if self.submission_status.is_pending() {
            PrimaryAction::Waiting
        } else if self.connection_status == ConnectionStatus::Disconnected {
            PrimaryAction::Connect
        } else {
            PrimaryAction::Approve
        }
    }

    /// The three inputs, as they stand right now.
    pub fn request(&self) -> ApprovalRequest {
        ApprovalRequest {
            token_address: self.token_address.clone(),
            spender_address: self.spender_address.clone(),
            amount: self.amount.clone(),
        }
    }
}

/// The inputs of one approval, captured when it is submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalRequest {
    pub token_address: String,
    pub spender_address: String,
    pub amount: String,
}
