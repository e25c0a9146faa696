//! The approval workflow — the only part of approvectl with transition logic.
//!
//! Holds the form state and moves it through two operations:
//! - `connect()`: Disconnected -> Connected (or stays Disconnected on failure)
//! - `submit_approval()`: Idle/Succeeded/Failed -> Pending -> Succeeded | Failed
//!
//! State lives in a `watch` channel so a front end can re-render on every
//! change. It is only ever mutated inside short closures, never across an
//! `.await`; the `Pending` status is what keeps a second approval out while
//! one is in flight.
//!
//! Errors never escape an operation. Each one becomes a status message, a
//! `tracing` event, and a [`DiagnosticEvent`] for the journal. An approval
//! whose future is dropped while pending is recorded as failed.

pub mod types;

use crate::config::Config;
use crate::diagnostics::{DiagnosticEvent, DiagnosticSink, Operation};
use crate::wallet::{Receipt, WalletError, WalletProvider};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use uuid::Uuid;

pub use types::*;

/// Tunables for a workflow instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkflowOptions {
    /// Stop waiting for finalization after this long. `None` waits forever.
    pub finalization_timeout: Option<Duration>,
}

impl From<&Config> for WorkflowOptions {
    fn from(config: &Config) -> Self {
        Self {
            finalization_timeout: config.finalization_timeout,
        }
    }
}

/// Result of one `submit_approval()` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Another approval was already pending; nothing was dispatched.
    Ignored,
    Succeeded(Receipt),
    Failed(WalletError),
}

/// A failed approval, with the transaction hash if it got that far.
struct Failure {
    error: WalletError,
    tx_hash: Option<String>,
}

impl From<WalletError> for Failure {
    fn from(error: WalletError) -> Self {
        Self {
            error,
            tx_hash: None,
        }
    }
}

/// Owns the form state and runs connect/approve against a wallet provider.
pub struct ApprovalWorkflow {
    wallet: Arc<dyn WalletProvider>,
    diagnostics: Arc<dyn DiagnosticSink>,
    options: WorkflowOptions,
    session_id: String,
    state: watch::Sender<ApprovalFormState>,
}

impl ApprovalWorkflow {
    /// Create a workflow, probing the provider once for an existing connection.
    pub async fn mount(
        wallet: Arc<dyn WalletProvider>,
        diagnostics: Arc<dyn DiagnosticSink>,
        options: WorkflowOptions,
    ) -> Self {
        Self::mount_with_session(Uuid::new_v4().to_string(), wallet, diagnostics, options).await
    }

    /// Like [`ApprovalWorkflow::mount`], with a caller-chosen session ID
    /// (so the journal file and the workflow share it).
    pub async fn mount_with_session(
        session_id: String,
        wallet: Arc<dyn WalletProvider>,
        diagnostics: Arc<dyn DiagnosticSink>,
        options: WorkflowOptions,
    ) -> Self {
        let connected = wallet.is_available() && wallet.is_connected().await;
        let mut initial = ApprovalFormState::new(if connected {
            ConnectionStatus::Connected
        } else {
            ConnectionStatus::Disconnected
        });
        if connected {
            initial.account = wallet.account().await;
        }

        tracing::debug!(
            "Workflow {} mounted ({})",
            session_id,
            initial.connection_status
        );

        let (state, _) = watch::channel(initial);
        Self {
            wallet,
            diagnostics,
            options,
            session_id,
            state,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> ApprovalFormState {
        self.state.borrow().clone()
    }

    /// Receive every state change, for re-rendering.
    pub fn subscribe(&self) -> watch::Receiver<ApprovalFormState> {
        self.state.subscribe()
    }

    pub fn token_address(&self) -> String {
        self.state.borrow().token_address.clone()
    }

    pub fn amount(&self) -> String {
        self.state.borrow().amount.clone()
    }

    pub fn spender_address(&self) -> String {
        self.state.borrow().spender_address.clone()
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        self.state.borrow().connection_status
    }

    pub fn submission_status(&self) -> SubmissionStatus {
        self.state.borrow().submission_status
    }

    pub fn status_message(&self) -> String {
        self.state.borrow().status_message.clone()
    }

    pub fn primary_action(&self) -> PrimaryAction {
        self.state.borrow().primary_action()
    }

    pub fn set_token_address(&self, value: impl Into<String>) {
        let value = value.into();
        self.state.send_modify(|s| s.token_address = value);
    }

    pub fn set_amount(&self, value: impl Into<String>) {
        let value = value.into();
        self.state.send_modify(|s| s.amount = value);
    }

    pub fn set_spender_address(&self, value: impl Into<String>) {
        let value = value.into();
        self.state.send_modify(|s| s.spender_address = value);
    }

    /// Press the action button: connect when disconnected, approve when
    /// connected, nothing while an approval is pending.
    pub async fn trigger(&self) -> PrimaryAction {
        let action = self.primary_action();
        match action {
            PrimaryAction::Connect => {
                self.connect().await;
            }
            PrimaryAction::Approve => {
                self.submit_approval().await;
            }
            PrimaryAction::Waiting => {}
        }
        action
    }

    /// Connect to the wallet. One attempt per call; never re-prompts when the
    /// provider already reports a connection.
    pub async fn connect(&self) -> ConnectionStatus {
        let pending = self.state.borrow().submission_status.is_pending();
        if pending {
            tracing::debug!("Approval pending; ignoring connect");
            return self.connection_status();
        }

        if !self.wallet.is_available() {
            let error = WalletError::ProviderUnavailable;
            self.state.send_modify(|s| {
                s.connection_status = ConnectionStatus::Disconnected;
                s.account = None;
                s.status_message = error.to_string();
            });
            self.report_connect_failure(&error);
            return ConnectionStatus::Disconnected;
        }

        if self.wallet.is_connected().await {
            let account = self.wallet.account().await;
            self.state.send_modify(|s| {
                // Replace a stale connect error, but not an approval status.
                if s.connection_status == ConnectionStatus::Disconnected
                    && !s.submission_status.is_pending()
                {
                    s.status_message = CONNECTED_MESSAGE.to_string();
                }
                s.connection_status = ConnectionStatus::Connected;
                s.account = account;
            });
            return ConnectionStatus::Connected;
        }

        match self.wallet.request_connection().await {
            Ok(()) => {
                let account = self.wallet.account().await;
                tracing::info!(
                    "Wallet connected: {}",
                    account.as_deref().unwrap_or("unknown account")
                );
                self.diagnostics.report(
                    &DiagnosticEvent::success(&self.session_id, Operation::Connect, CONNECTED_MESSAGE)
                        .with_account(account.clone()),
                );
                self.state.send_modify(|s| {
                    s.connection_status = ConnectionStatus::Connected;
                    s.account = account;
                    // An approval may have started while the prompt was open.
                    if !s.submission_status.is_pending() {
                        s.status_message = CONNECTED_MESSAGE.to_string();
                    }
                });
                ConnectionStatus::Connected
            }
            Err(error) => {
                let message = match error {
                    WalletError::ProviderUnavailable => error.to_string(),
                    _ => format!("Could not connect wallet: {}", error),
                };
                self.state.send_modify(|s| {
                    s.connection_status = ConnectionStatus::Disconnected;
                    s.account = None;
                    if !s.submission_status.is_pending() {
                        s.status_message = message;
                    }
                });
                self.report_connect_failure(&error);
                ConnectionStatus::Disconnected
            }
        }
    }

    /// Submit `approve(spender, amount)` on the token, using the three fields
    /// as they stand at call time.
    ///
    /// A no-op returning [`SubmitOutcome::Ignored`] while another approval is
    /// pending. Otherwise ends in exactly one of `Succeeded` or `Failed`.
    pub async fn submit_approval(&self) -> SubmitOutcome {
        let mut captured = None;
        self.state.send_if_modified(|s| {
            if s.submission_status.is_pending() {
                return false;
            }
            s.submission_status = SubmissionStatus::Pending;
            s.status_message = APPROVING_MESSAGE.to_string();
            captured = Some(s.request());
            true
        });

        let Some(request) = captured else {
            tracing::debug!("Approval already pending; ignoring submit");
            return SubmitOutcome::Ignored;
        };

        tracing::info!(
            "Approving {} of token {} for {}",
            request.amount,
            request.token_address,
            request.spender_address
        );

        let guard = PendingGuard {
            workflow: self,
            request: &request,
            armed: true,
        };
        let result = self.run_approval(&request).await;
        guard.disarm();
        self.finish(&request, result)
    }

    async fn run_approval(&self, request: &ApprovalRequest) -> Result<Receipt, Failure> {
        if !self.wallet.is_available() {
            return Err(WalletError::ProviderUnavailable.into());
        }

        let handle = self.wallet.signing_handle().await?;
        tracing::debug!("Signing as {}", handle.account());
        let client = handle.bind_token(&request.token_address)?;
        let pending = client
            .submit_approval(&request.spender_address, &request.amount)
            .await?;

        let tx_hash = pending.tx_hash();
        tracing::info!("Approval dispatched: {}", tx_hash);
        self.state.send_modify(|s| {
            s.status_message = format!("{} (tx {})", APPROVING_MESSAGE, tx_hash);
        });

        let finalized = match self.options.finalization_timeout {
            Some(limit) => match tokio::time::timeout(limit, pending.await_finalization()).await {
                Ok(result) => result,
                Err(_) => Err(WalletError::FinalizationTimeout {
                    seconds: limit.as_secs(),
                }),
            },
            None => pending.await_finalization().await,
        };

        finalized.map_err(|error| Failure {
            error,
            tx_hash: Some(tx_hash),
        })
    }

    fn finish(&self, request: &ApprovalRequest, result: Result<Receipt, Failure>) -> SubmitOutcome {
        let account = self.state.borrow().account.clone();

        match result {
            Ok(receipt) => {
                tracing::info!("Tokens approved: {}", receipt.tx_hash);
                self.diagnostics.report(
                    &DiagnosticEvent::success(&self.session_id, Operation::SubmitApproval, SUCCESS_MESSAGE)
                        .with_request(&request.token_address, &request.spender_address, &request.amount)
                        .with_account(account)
                        .with_tx_hash(Some(receipt.tx_hash.clone())),
                );
                let stored = receipt.clone();
                self.state.send_modify(|s| {
                    s.submission_status = SubmissionStatus::Succeeded;
                    s.status_message = SUCCESS_MESSAGE.to_string();
                    s.last_receipt = Some(stored);
                });
                SubmitOutcome::Succeeded(receipt)
            }
            Err(Failure { error, tx_hash }) => {
                tracing::error!("Error approving tokens: {}", error);
                self.diagnostics.report(
                    &DiagnosticEvent::failure(&self.session_id, Operation::SubmitApproval, &error)
                        .with_request(&request.token_address, &request.spender_address, &request.amount)
                        .with_account(account)
                        .with_tx_hash(tx_hash),
                );
                let message = match error {
                    WalletError::ProviderUnavailable => error.to_string(),
                    _ => format!("{}: {}", FAILURE_MESSAGE, error),
                };
                let lost_connection = error == WalletError::NotConnected;
                self.state.send_modify(|s| {
                    s.submission_status = SubmissionStatus::Failed;
                    s.status_message = message;
                    if lost_connection {
                        s.connection_status = ConnectionStatus::Disconnected;
                        s.account = None;
                    }
                });
                SubmitOutcome::Failed(error)
            }
        }
    }

    /// The `submit_approval` future was dropped before it resolved.
    fn abandon(&self, request: &ApprovalRequest) {
        let error = WalletError::Cancelled;
        tracing::warn!("Approval dropped while pending");
        let account = self.state.borrow().account.clone();
        self.diagnostics.report(
            &DiagnosticEvent::failure(&self.session_id, Operation::SubmitApproval, &error)
                .with_request(&request.token_address, &request.spender_address, &request.amount)
                .with_account(account),
        );
        let message = format!("{}: {}", FAILURE_MESSAGE, error);
        self.state.send_if_modified(|s| {
            if !s.submission_status.is_pending() {
                return false;
            }
            s.submission_status = SubmissionStatus::Failed;
            s.status_message = message;
            true
        });
    }

    fn report_connect_failure(&self, error: &WalletError) {
        tracing::error!("Wallet connection failed: {}", error);
        self.diagnostics
            .report(&DiagnosticEvent::failure(&self.session_id, Operation::Connect, error));
    }
}

/// Fails the in-flight approval if `submit_approval` is dropped before `finish`.
struct PendingGuard<'a> {
    workflow: &'a ApprovalWorkflow,
    request: &'a ApprovalRequest,
    armed: bool,
}

impl PendingGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.workflow.abandon(self.request);
        }
    }
}
