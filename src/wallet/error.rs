//! Errors raised by wallet collaborators.

/// Everything that can go wrong between "connect" and "finalized".
///
/// Each variant is recoverable by user action; none of them is fatal to the
/// process.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    /// No provider installed or configured.
    #[error("Ethereum provider not available. Please install a wallet extension or configure an RPC endpoint.")]
    ProviderUnavailable,

    /// The user or the provider declined the connection request.
    #[error("connection rejected: {0}")]
    ConnectionRejected(String),

    /// A signing handle was requested before connecting.
    #[error("wallet is not connected")]
    NotConnected,

    /// Malformed input, or the call was rejected before dispatch.
    #[error("{0}")]
    Invocation(String),

    /// The transaction was dispatched but did not finalize (dropped, network failure).
    #[error("{0}")]
    Finalization(String),

    /// The transaction was mined but reverted.
    #[error("transaction {tx_hash} reverted")]
    Reverted { tx_hash: String },

    /// Gave up waiting for finalization. The transaction may still land.
    #[error("no receipt after {seconds}s; the transaction may still be mined")]
    FinalizationTimeout { seconds: u64 },

    /// The caller stopped waiting before the approval resolved.
    #[error("approval cancelled before it finished; a dispatched transaction may still be mined")]
    Cancelled,
}

impl WalletError {
    /// Short, stable name used in the diagnostic journal.
    pub fn kind(&self) -> &'static str {
        match self {
            WalletError::ProviderUnavailable => "provider_unavailable",
            WalletError::ConnectionRejected(_) => "connection_rejected",
            WalletError::NotConnected => "not_connected",
            WalletError::Invocation(_) => "invocation",
            WalletError::Finalization(_) => "finalization",
            WalletError::Reverted { .. } => "reverted",
            WalletError::FinalizationTimeout { .. } => "finalization_timeout",
            WalletError::Cancelled => "cancelled",
        }
    }

    /// Whether the failure happened after the transaction was dispatched.
    pub fn is_finalization(&self) -> bool {
        matches!(
            self,
            WalletError::Finalization(_)
                | WalletError::Reverted { .. }
                | WalletError::FinalizationTimeout { .. }
        )
    }
}
