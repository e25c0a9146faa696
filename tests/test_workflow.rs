//! Integration tests for the approval workflow.
//!
//! A scripted wallet stands in for the provider, the signing handle, the
//! token client and the pending transaction, and records every call so the
//! tests can check what was (and wasn't) dispatched.

use approvectl::diagnostics::{MemorySink, Operation};
use approvectl::wallet::{
    NoWallet, PendingTransaction, Receipt, SigningHandle, TokenContractClient, WalletError,
    WalletProvider,
};
use approvectl::workflow::{
    ApprovalWorkflow, ConnectionStatus, PrimaryAction, SubmissionStatus, SubmitOutcome,
    WorkflowOptions,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

const TOKEN: &str = "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";
const SPENDER: &str = "0xBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBB";
const ACCOUNT: &str = "0xCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCC";
const TX_HASH: &str = "0x1111111111111111111111111111111111111111111111111111111111111111";

/// How the next approval resolves.
#[derive(Debug, Clone, Copy)]
enum Script {
    Succeed,
    Revert,
    RejectBeforeDispatch,
    /// Resolve successfully once the ledger's gate is opened.
    Gated,
    /// Never resolve.
    Hang,
}

/// Everything the fake collaborators saw.
#[derive(Default)]
struct Ledger {
    binds: AtomicUsize,
    submissions: Mutex<Vec<(String, String, String)>>,
    scripts: Mutex<VecDeque<Script>>,
    gate: Notify,
}

impl Ledger {
    fn next_script(&self) -> Script {
        self.scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Script::Succeed)
    }

    fn submissions(&self) -> Vec<(String, String, String)> {
        self.submissions.lock().unwrap().clone()
    }
}

struct ScriptedWallet {
    available: bool,
    connected: AtomicBool,
    accept_connection: bool,
    connection_requests: AtomicUsize,
    /// Authorise immediately but don't answer until `connection_gate` opens.
    hold_connection: bool,
    connection_gate: Notify,
    ledger: Arc<Ledger>,
}

impl ScriptedWallet {
    fn connected() -> Self {
        Self {
            available: true,
            connected: AtomicBool::new(true),
            accept_connection: true,
            connection_requests: AtomicUsize::new(0),
            hold_connection: false,
            connection_gate: Notify::new(),
            ledger: Arc::new(Ledger::default()),
        }
    }

    fn disconnected(accept_connection: bool) -> Self {
        Self {
            connected: AtomicBool::new(false),
            accept_connection,
            ..Self::connected()
        }
    }

    fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::disconnected(true)
        }
    }

    fn with_scripts(self, scripts: &[Script]) -> Self {
        self.ledger.scripts.lock().unwrap().extend(scripts.iter().copied());
        self
    }

    fn holding_connection(mut self) -> Self {
        self.hold_connection = true;
        self
    }

    fn connection_requests(&self) -> usize {
        self.connection_requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletProvider for ScriptedWallet {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn request_connection(&self) -> Result<(), WalletError> {
        self.connection_requests.fetch_add(1, Ordering::SeqCst);
        if self.accept_connection {
            self.connected.store(true, Ordering::SeqCst);
            if self.hold_connection {
                self.connection_gate.notified().await;
            }
            Ok(())
        } else {
            Err(WalletError::ConnectionRejected(
                "User rejected the request.".to_string(),
            ))
        }
    }

    async fn account(&self) -> Option<String> {
        self.connected
            .load(Ordering::SeqCst)
            .then(|| ACCOUNT.to_string())
    }

    async fn signing_handle(&self) -> Result<Box<dyn SigningHandle>, WalletError> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(WalletError::NotConnected);
        }
        Ok(Box::new(ScriptedHandle {
            ledger: self.ledger.clone(),
        }))
    }
}

struct ScriptedHandle {
    ledger: Arc<Ledger>,
}

impl SigningHandle for ScriptedHandle {
    fn account(&self) -> String {
        ACCOUNT.to_string()
    }

    fn bind_token(&self, token_address: &str) -> Result<Box<dyn TokenContractClient>, WalletError> {
        self.ledger.binds.fetch_add(1, Ordering::SeqCst);
        if !token_address.starts_with("0x") {
            return Err(WalletError::Invocation(format!(
                "invalid token address {:?}",
                token_address
            )));
        }
        Ok(Box::new(ScriptedClient {
            token: token_address.to_string(),
            ledger: self.ledger.clone(),
        }))
    }
}

struct ScriptedClient {
    token: String,
    ledger: Arc<Ledger>,
}

#[async_trait]
impl TokenContractClient for ScriptedClient {
    async fn submit_approval(
        &self,
        spender: &str,
        amount: &str,
    ) -> Result<Box<dyn PendingTransaction>, WalletError> {
        let script = self.ledger.next_script();
        if let Script::RejectBeforeDispatch = script {
            return Err(WalletError::Invocation(
                "invalid BigNumber string".to_string(),
            ));
        }
        self.ledger.submissions.lock().unwrap().push((
            self.token.clone(),
            spender.to_string(),
            amount.to_string(),
        ));
        Ok(Box::new(ScriptedPending {
            script,
            ledger: self.ledger.clone(),
        }))
    }
}

struct ScriptedPending {
    script: Script,
    ledger: Arc<Ledger>,
}

#[async_trait]
impl PendingTransaction for ScriptedPending {
    fn tx_hash(&self) -> String {
        TX_HASH.to_string()
    }

    async fn await_finalization(self: Box<Self>) -> Result<Receipt, WalletError> {
        match self.script {
            Script::Succeed => Ok(Receipt {
                tx_hash: TX_HASH.to_string(),
                block_number: Some(7),
                gas_used: Some(46_000),
            }),
            Script::Revert => Err(WalletError::Reverted {
                tx_hash: TX_HASH.to_string(),
            }),
            Script::Gated => {
                self.ledger.gate.notified().await;
                Ok(Receipt::new(TX_HASH))
            }
            Script::Hang => std::future::pending().await,
            Script::RejectBeforeDispatch => unreachable!("rejected before dispatch"),
        }
    }
}

/// Helper: mount a workflow with the fields filled in.
async fn mount(
    wallet: Arc<dyn WalletProvider>,
    options: WorkflowOptions,
) -> (ApprovalWorkflow, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let workflow = ApprovalWorkflow::mount(wallet, sink.clone(), options).await;
    workflow.set_token_address(TOKEN);
    workflow.set_amount("100");
    workflow.set_spender_address(SPENDER);
    (workflow, sink)
}

// ── Scenarios ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_scenario_a_approval_succeeds() {
    let wallet = Arc::new(ScriptedWallet::connected());
    let (workflow, sink) = mount(wallet.clone(), WorkflowOptions::default()).await;

    assert_eq!(workflow.connection_status(), ConnectionStatus::Connected);
    assert_eq!(workflow.submission_status(), SubmissionStatus::Idle);

    let outcome = workflow.submit_approval().await;
    assert!(matches!(outcome, SubmitOutcome::Succeeded(ref r) if r.tx_hash == TX_HASH));

    let state = workflow.state();
    assert_eq!(state.submission_status, SubmissionStatus::Succeeded);
    assert!(state.status_message.contains("successfully"));
    assert_eq!(state.last_receipt.unwrap().block_number, Some(7));

    assert_eq!(
        wallet.ledger.submissions(),
        vec![(TOKEN.to_string(), SPENDER.to_string(), "100".to_string())]
    );

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].operation, Operation::SubmitApproval);
    assert!(!events[0].is_failure());
    assert_eq!(events[0].tx_hash.as_deref(), Some(TX_HASH));
}

#[tokio::test]
async fn test_scenario_b_revert_fails_and_reports_detail() {
    let wallet = Arc::new(ScriptedWallet::connected().with_scripts(&[Script::Revert]));
    let (workflow, sink) = mount(wallet, WorkflowOptions::default()).await;

    let outcome = workflow.submit_approval().await;
    assert!(matches!(
        outcome,
        SubmitOutcome::Failed(WalletError::Reverted { .. })
    ));

    let state = workflow.state();
    assert_eq!(state.submission_status, SubmissionStatus::Failed);
    assert!(state.status_message.starts_with("Error approving tokens"));
    assert!(state.status_message.contains("reverted"));

    let failures = sink.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].error_kind.as_deref(), Some("reverted"));
    assert!(failures[0].detail.contains(TX_HASH));
    assert_eq!(failures[0].tx_hash.as_deref(), Some(TX_HASH));
    assert_eq!(failures[0].spender_address.as_deref(), Some(SPENDER));
}

#[tokio::test]
async fn test_scenario_c_connect_without_provider() {
    let (workflow, sink) = mount(Arc::new(NoWallet), WorkflowOptions::default()).await;

    let status = workflow.connect().await;

    assert_eq!(status, ConnectionStatus::Disconnected);
    assert_eq!(workflow.connection_status(), ConnectionStatus::Disconnected);
    assert_eq!(
        workflow.status_message(),
        WalletError::ProviderUnavailable.to_string()
    );
    assert!(workflow.status_message().contains("install"));

    let failures = sink.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].operation, Operation::Connect);
    assert_eq!(failures[0].error_kind.as_deref(), Some("provider_unavailable"));
}

#[tokio::test]
async fn test_scenario_d_connection_rejected() {
    let wallet = Arc::new(ScriptedWallet::disconnected(false));
    let (workflow, sink) = mount(wallet.clone(), WorkflowOptions::default()).await;

    assert_eq!(workflow.connection_status(), ConnectionStatus::Disconnected);
    let status = workflow.connect().await;

    assert_eq!(status, ConnectionStatus::Disconnected);
    assert_eq!(wallet.connection_requests(), 1);
    assert!(workflow.status_message().contains("User rejected"));
    assert_eq!(workflow.submission_status(), SubmissionStatus::Idle);
    assert_eq!(
        sink.failures()[0].error_kind.as_deref(),
        Some("connection_rejected")
    );

    // One attempt per call: the user can try again.
    workflow.connect().await;
    assert_eq!(wallet.connection_requests(), 2);
}

// ── Properties ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_connect_is_idempotent() {
    let wallet = Arc::new(ScriptedWallet::connected());
    let (workflow, _sink) = mount(wallet.clone(), WorkflowOptions::default()).await;

    assert_eq!(workflow.connect().await, ConnectionStatus::Connected);
    assert_eq!(workflow.connect().await, ConnectionStatus::Connected);
    assert_eq!(wallet.connection_requests(), 0);
    assert_eq!(workflow.state().account.as_deref(), Some(ACCOUNT));
}

#[tokio::test]
async fn test_connect_prompts_once_then_reuses_connection() {
    let wallet = Arc::new(ScriptedWallet::disconnected(true));
    let (workflow, sink) = mount(wallet.clone(), WorkflowOptions::default()).await;

    assert_eq!(workflow.connect().await, ConnectionStatus::Connected);
    assert_eq!(workflow.status_message(), "Wallet connected");
    assert_eq!(workflow.connect().await, ConnectionStatus::Connected);
    assert_eq!(wallet.connection_requests(), 1);
    assert_eq!(sink.events().len(), 1);
}

#[tokio::test]
async fn test_no_second_submission_while_pending() {
    let wallet = Arc::new(ScriptedWallet::connected().with_scripts(&[Script::Gated]));
    let (workflow, _sink) = mount(wallet.clone(), WorkflowOptions::default()).await;
    let workflow = Arc::new(workflow);
    let mut rx = workflow.subscribe();

    let first = {
        let workflow = workflow.clone();
        tokio::spawn(async move { workflow.submit_approval().await })
    };

    // Wait until the first approval has been dispatched.
    rx.wait_for(|s| s.status_message.contains(TX_HASH))
        .await
        .unwrap();
    assert_eq!(workflow.submission_status(), SubmissionStatus::Pending);
    assert_eq!(workflow.primary_action(), PrimaryAction::Waiting);

    assert_eq!(workflow.submit_approval().await, SubmitOutcome::Ignored);
    assert_eq!(workflow.trigger().await, PrimaryAction::Waiting);
    assert_eq!(workflow.connect().await, ConnectionStatus::Connected);
    assert_eq!(workflow.submission_status(), SubmissionStatus::Pending);
    assert_eq!(workflow.status_message(), format!("Approving... (tx {})", TX_HASH));

    wallet.ledger.gate.notify_one();
    let outcome = first.await.unwrap();

    assert!(matches!(outcome, SubmitOutcome::Succeeded(_)));
    assert_eq!(workflow.submission_status(), SubmissionStatus::Succeeded);
    assert_eq!(wallet.ledger.submissions().len(), 1);
    assert_eq!(wallet.ledger.binds.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_every_submission_ends_succeeded_or_failed() {
    let cases: Vec<(ScriptedWallet, &str, SubmissionStatus)> = vec![
        (
            ScriptedWallet::connected().with_scripts(&[Script::Succeed]),
            TOKEN,
            SubmissionStatus::Succeeded,
        ),
        (
            ScriptedWallet::connected().with_scripts(&[Script::Revert]),
            TOKEN,
            SubmissionStatus::Failed,
        ),
        (
            ScriptedWallet::connected().with_scripts(&[Script::RejectBeforeDispatch]),
            TOKEN,
            SubmissionStatus::Failed,
        ),
        (ScriptedWallet::connected(), "not-an-address", SubmissionStatus::Failed),
        (ScriptedWallet::disconnected(true), TOKEN, SubmissionStatus::Failed),
        (ScriptedWallet::unavailable(), TOKEN, SubmissionStatus::Failed),
    ];

    for (wallet, token, expected) in cases {
        let (workflow, sink) = mount(Arc::new(wallet), WorkflowOptions::default()).await;
        workflow.set_token_address(token);

        let outcome = workflow.submit_approval().await;

        assert_ne!(outcome, SubmitOutcome::Ignored);
        assert_eq!(workflow.submission_status(), expected, "token {}", token);
        assert!(!workflow.status_message().is_empty());
        assert_eq!(sink.events().len(), 1);
    }
}

#[tokio::test]
async fn test_missing_provider_fails_without_binding_a_client() {
    let wallet = Arc::new(ScriptedWallet::unavailable());
    let (workflow, sink) = mount(wallet.clone(), WorkflowOptions::default()).await;

    let outcome = workflow.submit_approval().await;

    assert_eq!(outcome, SubmitOutcome::Failed(WalletError::ProviderUnavailable));
    assert_eq!(workflow.submission_status(), SubmissionStatus::Failed);
    assert_eq!(
        workflow.status_message(),
        WalletError::ProviderUnavailable.to_string()
    );
    assert_eq!(wallet.ledger.binds.load(Ordering::SeqCst), 0);
    assert!(wallet.ledger.submissions().is_empty());
    assert_eq!(sink.failures().len(), 1);
}

// ── Edges ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_failed_then_retry_succeeds() {
    let wallet = Arc::new(
        ScriptedWallet::connected().with_scripts(&[Script::RejectBeforeDispatch, Script::Succeed]),
    );
    let (workflow, _sink) = mount(wallet, WorkflowOptions::default()).await;

    assert!(matches!(
        workflow.submit_approval().await,
        SubmitOutcome::Failed(WalletError::Invocation(_))
    ));
    assert!(workflow
        .status_message()
        .contains("invalid BigNumber string"));

    assert!(matches!(
        workflow.submit_approval().await,
        SubmitOutcome::Succeeded(_)
    ));
    assert_eq!(workflow.submission_status(), SubmissionStatus::Succeeded);
}

#[tokio::test]
async fn test_finalization_timeout() {
    let wallet = Arc::new(ScriptedWallet::connected().with_scripts(&[Script::Hang]));
    let options = WorkflowOptions {
        finalization_timeout: Some(Duration::from_millis(50)),
    };
    let (workflow, sink) = mount(wallet, options).await;

    let outcome = workflow.submit_approval().await;

    assert!(matches!(
        outcome,
        SubmitOutcome::Failed(WalletError::FinalizationTimeout { .. })
    ));
    assert_eq!(workflow.submission_status(), SubmissionStatus::Failed);
    assert_eq!(sink.failures()[0].tx_hash.as_deref(), Some(TX_HASH));
}

#[tokio::test]
async fn test_submit_while_disconnected_marks_disconnected() {
    let wallet = Arc::new(ScriptedWallet::disconnected(true));
    let (workflow, _sink) = mount(wallet, WorkflowOptions::default()).await;

    let outcome = workflow.submit_approval().await;

    assert_eq!(outcome, SubmitOutcome::Failed(WalletError::NotConnected));
    assert_eq!(workflow.connection_status(), ConnectionStatus::Disconnected);
    assert_eq!(workflow.primary_action(), PrimaryAction::Connect);
}

#[tokio::test]
async fn test_fields_are_passed_through_as_typed() {
    let wallet = Arc::new(ScriptedWallet::connected());
    let (workflow, _sink) = mount(wallet.clone(), WorkflowOptions::default()).await;
    workflow.set_amount(" 100 ");

    workflow.submit_approval().await;

    assert_eq!(wallet.ledger.submissions()[0].2, " 100 ");
}

#[tokio::test]
async fn test_trigger_connects_then_approves() {
    let wallet = Arc::new(ScriptedWallet::disconnected(true));
    let (workflow, _sink) = mount(wallet.clone(), WorkflowOptions::default()).await;

    assert_eq!(workflow.trigger().await, PrimaryAction::Connect);
    assert_eq!(workflow.connection_status(), ConnectionStatus::Connected);
    assert!(wallet.ledger.submissions().is_empty());

    assert_eq!(workflow.trigger().await, PrimaryAction::Approve);
    assert_eq!(workflow.submission_status(), SubmissionStatus::Succeeded);
    assert_eq!(wallet.ledger.submissions().len(), 1);
}

#[tokio::test]
async fn test_connect_after_rejection_clears_the_error() {
    let wallet = Arc::new(ScriptedWallet::disconnected(false));
    let (workflow, _sink) = mount(wallet.clone(), WorkflowOptions::default()).await;

    assert_eq!(workflow.connect().await, ConnectionStatus::Disconnected);
    assert!(workflow.status_message().starts_with("Could not connect wallet"));

    // Authorised outside the form, e.g. in the wallet itself.
    wallet.connected.store(true, Ordering::SeqCst);

    assert_eq!(workflow.connect().await, ConnectionStatus::Connected);
    assert_eq!(workflow.status_message(), "Wallet connected");
    assert_eq!(workflow.state().account.as_deref(), Some(ACCOUNT));
}

#[tokio::test]
async fn test_connect_finishing_during_approval_keeps_approval_status() {
    let wallet = Arc::new(
        ScriptedWallet::disconnected(true)
            .holding_connection()
            .with_scripts(&[Script::Gated]),
    );
    let (workflow, _sink) = mount(wallet.clone(), WorkflowOptions::default()).await;
    let workflow = Arc::new(workflow);
    let mut rx = workflow.subscribe();

    let connecting = {
        let workflow = workflow.clone();
        tokio::spawn(async move { workflow.connect().await })
    };
    while wallet.connection_requests() == 0 {
        tokio::task::yield_now().await;
    }

    let approving = {
        let workflow = workflow.clone();
        tokio::spawn(async move { workflow.submit_approval().await })
    };
    rx.wait_for(|s| s.status_message.contains(TX_HASH))
        .await
        .unwrap();

    wallet.connection_gate.notify_one();
    assert_eq!(connecting.await.unwrap(), ConnectionStatus::Connected);

    let state = workflow.state();
    assert_eq!(state.connection_status, ConnectionStatus::Connected);
    assert_eq!(state.submission_status, SubmissionStatus::Pending);
    assert!(state.status_message.contains(TX_HASH));

    wallet.ledger.gate.notify_one();
    assert!(matches!(
        approving.await.unwrap(),
        SubmitOutcome::Succeeded(_)
    ));
    assert_eq!(workflow.status_message(), "Tokens approved successfully!");
}

#[tokio::test]
async fn test_dropped_submission_fails_and_frees_the_workflow() {
    let wallet = Arc::new(ScriptedWallet::connected().with_scripts(&[Script::Hang, Script::Succeed]));
    let (workflow, sink) = mount(wallet.clone(), WorkflowOptions::default()).await;

    let elapsed = tokio::time::timeout(Duration::from_millis(50), workflow.submit_approval())
        .await
        .is_err();
    assert!(elapsed);

    assert_eq!(workflow.submission_status(), SubmissionStatus::Failed);
    assert!(workflow.status_message().starts_with("Error approving tokens"));
    assert!(workflow.status_message().contains("cancelled"));

    let failures = sink.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].error_kind.as_deref(), Some("cancelled"));
    assert_eq!(failures[0].token_address.as_deref(), Some(TOKEN));

    assert!(matches!(
        workflow.submit_approval().await,
        SubmitOutcome::Succeeded(_)
    ));
    assert_eq!(wallet.ledger.submissions().len(), 2);
}

#[tokio::test]
async fn test_aborted_submission_task_fails() {
    let wallet = Arc::new(ScriptedWallet::connected().with_scripts(&[Script::Hang]));
    let (workflow, sink) = mount(wallet, WorkflowOptions::default()).await;
    let workflow = Arc::new(workflow);
    let mut rx = workflow.subscribe();

    let task = {
        let workflow = workflow.clone();
        tokio::spawn(async move { workflow.submit_approval().await })
    };
    rx.wait_for(|s| s.status_message.contains(TX_HASH))
        .await
        .unwrap();

    task.abort();
    assert!(task.await.unwrap_err().is_cancelled());

    assert_eq!(workflow.submission_status(), SubmissionStatus::Failed);
    assert_eq!(workflow.primary_action(), PrimaryAction::Approve);
    assert_eq!(sink.failures().len(), 1);
}
