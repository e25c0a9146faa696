//! Capability traits for the wallet side of an approval.
//!
//! The workflow never talks to a node or an extension directly. It sees a
//! [`WalletProvider`] that can hand out a [`SigningHandle`], which binds a
//! [`TokenContractClient`] to one token, which in turn dispatches an approval
//! and returns a [`PendingTransaction`].
//!
//! Implementations:
//! - [`NoWallet`]: the absent provider (nothing installed or configured)
//! - [`RpcWallet`]: a JSON-RPC endpoint speaking EIP-1193 style account methods

pub mod absent;
pub mod error;
pub mod rpc;

use crate::config::Config;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use absent::NoWallet;
pub use error::WalletError;
pub use rpc::RpcWallet;

/// Pick the provider described by `config`: an [`RpcWallet`] when an endpoint
/// is configured, otherwise [`NoWallet`].
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WalletProvider>> {
    Ok(match RpcWallet::from_config(config)? {
        Some(wallet) => Arc::new(wallet),
        None => Arc::new(NoWallet),
    })
}

/// A wallet provider: the thing that holds the user's keys.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Whether a provider exists at all. Cheap; never prompts.
    fn is_available(&self) -> bool;

    /// Whether the provider has already authorised an account for us.
    async fn is_connected(&self) -> bool;

    /// Ask the provider for an account. May show a permission prompt.
    async fn request_connection(&self) -> Result<(), WalletError>;

    /// The authorised account, if any.
    async fn account(&self) -> Option<String>;

    /// Get a handle that can sign on the user's behalf.
    /// Fails with [`WalletError::NotConnected`] before a successful connection.
    async fn signing_handle(&self) -> Result<Box<dyn SigningHandle>, WalletError>;
}

/// Authorisation to send transactions for the current session.
pub trait SigningHandle: Send + Sync {
    /// The account transactions will be sent from.
    fn account(&self) -> String;

    /// Bind a contract client to `token_address`, exactly as the user typed it.
    fn bind_token(&self, token_address: &str) -> Result<Box<dyn TokenContractClient>, WalletError>;
}

/// A client for one token contract.
#[async_trait]
pub trait TokenContractClient: Send + Sync {
    /// Dispatch `approve(spender, amount)`.
    /// Fails with [`WalletError::Invocation`] if the input is malformed or the
    /// call is rejected before it reaches the network.
    async fn submit_approval(
        &self,
        spender: &str,
        amount: &str,
    ) -> Result<Box<dyn PendingTransaction>, WalletError>;
}

/// A dispatched transaction. Consumed by [`PendingTransaction::await_finalization`],
/// so it resolves exactly once.
#[async_trait]
pub trait PendingTransaction: Send {
    /// Hash of the dispatched transaction.
    fn tx_hash(&self) -> String;

    async fn await_finalization(self: Box<Self>) -> Result<Receipt, WalletError>;
}

/// Proof that an approval finalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub tx_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_used: Option<u64>,
}

impl Receipt {
    pub fn new(tx_hash: impl Into<String>) -> Self {
        Self {
            tx_hash: tx_hash.into(),
            block_number: None,
            gas_used: None,
        }
    }
}
