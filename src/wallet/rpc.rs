//! JSON-RPC wallet provider.
//!
//! Talks to an Ethereum node (or any endpoint that behaves like an injected
//! browser provider) over HTTP:
//! - `eth_accounts` to see whether an account is already authorised
//! - `eth_requestAccounts` to ask for one (may prompt on the wallet side)
//! - `eth_sendTransaction` (node-side signing) or a local key to send the approval
//!
//! The ERC-20 binding is generated with `sol!`, so nothing here encodes
//! calldata by hand.

use crate::config::Config;
use crate::wallet::{
    PendingTransaction, Receipt, SigningHandle, TokenContractClient, WalletError, WalletProvider,
};
use alloy_network::{Ethereum, EthereumWallet, ReceiptResponse};
use alloy_primitives::{Address, U256};
use alloy_provider::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder};
use alloy_signer_local::PrivateKeySigner;
use alloy_sol_types::sol;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::str::FromStr;
use std::sync::Mutex;
use url::Url;

sol! {
    #[sol(rpc)]
    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

/// Wallet provider backed by a JSON-RPC endpoint.
pub struct RpcWallet {
    provider: DynProvider,
    /// Set when transactions are signed locally; such a wallet is connected from the start.
    local_account: Option<Address>,
    /// The account authorised by the provider.
    account: Mutex<Option<Address>>,
    /// Blocks to wait for before a receipt counts as final.
    confirmations: u64,
}

impl RpcWallet {
    /// Use the node's own accounts (it signs `eth_sendTransaction`).
    pub fn new(endpoint: Url) -> Self {
        let provider = ProviderBuilder::new().connect_http(endpoint).erased();
        Self::from_parts(provider, None)
    }

    /// Sign locally with `signer` and only use the endpoint for broadcasting.
    pub fn with_signer(endpoint: Url, signer: PrivateKeySigner) -> Self {
        let address = signer.address();
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(endpoint)
            .erased();
        Self::from_parts(provider, Some(address))
    }

    fn from_parts(provider: DynProvider, local_account: Option<Address>) -> Self {
        Self {
            provider,
            local_account,
            account: Mutex::new(local_account),
            confirmations: 1,
        }
    }

    pub fn with_confirmations(mut self, confirmations: u64) -> Self {
        self.confirmations = confirmations.max(1);
        self
    }

    /// Build a wallet from config. Returns `None` when no endpoint is configured.
    pub fn from_config(config: &Config) -> Result<Option<Self>> {
        let Some(endpoint) = config.rpc_url.clone() else {
            return Ok(None);
        };

        let wallet = match &config.private_key_env {
            Some(var) => {
                let key = std::env::var(var).with_context(|| {
                    format!("{} is not set (named by private_key_env in your config)", var)
                })?;
                let signer = PrivateKeySigner::from_str(key.trim())
                    .with_context(|| format!("{} does not hold a valid private key", var))?;
                Self::with_signer(endpoint, signer)
            }
            None => Self::new(endpoint),
        };

        Ok(Some(wallet.with_confirmations(config.confirmations)))
    }

    fn current_account(&self) -> Option<Address> {
        *self.account.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_account(&self, account: Address) {
        *self.account.lock().unwrap_or_else(|e| e.into_inner()) = Some(account);
    }
}

#[async_trait]
impl WalletProvider for RpcWallet {
    fn is_available(&self) -> bool {
        true
    }

    async fn is_connected(&self) -> bool {
        if self.current_account().is_some() {
            return true;
        }

        match self.provider.get_accounts().await {
            Ok(accounts) => match accounts.first() {
                Some(account) => {
                    self.set_account(*account);
                    true
                }
                None => false,
            },
            Err(e) => {
                tracing::debug!("eth_accounts failed: {}", e);
                false
            }
        }
    }

    async fn request_connection(&self) -> Result<(), WalletError> {
        if let Some(account) = self.local_account {
            self.set_account(account);
            return Ok(());
        }

        let accounts: Vec<Address> = self
            .provider
            .raw_request("eth_requestAccounts".into(), serde_json::json!([]))
            .await
            .map_err(|e| WalletError::ConnectionRejected(e.to_string()))?;

        let account = accounts.first().copied().ok_or_else(|| {
            WalletError::ConnectionRejected("provider returned no accounts".to_string())
        })?;
        self.set_account(account);
        Ok(())
    }

    async fn account(&self) -> Option<String> {
        self.current_account().map(|a| a.to_string())
    }

    async fn signing_handle(&self) -> Result<Box<dyn SigningHandle>, WalletError> {
        let from = self.current_account().ok_or(WalletError::NotConnected)?;
        Ok(Box::new(RpcSigner {
            provider: self.provider.clone(),
            from,
            confirmations: self.confirmations,
        }))
    }
}

/// Signing handle for one authorised account.
struct RpcSigner {
    provider: DynProvider,
    from: Address,
    confirmations: u64,
}

impl SigningHandle for RpcSigner {
    fn account(&self) -> String {
        self.from.to_string()
    }

    fn bind_token(&self, token_address: &str) -> Result<Box<dyn TokenContractClient>, WalletError> {
        let token = parse_address("token", token_address)?;
        Ok(Box::new(Erc20Client {
            token,
            provider: self.provider.clone(),
            from: self.from,
            confirmations: self.confirmations,
        }))
    }
}

/// `approve` on one ERC-20 token.
struct Erc20Client {
    token: Address,
    provider: DynProvider,
    from: Address,
    confirmations: u64,
}

#[async_trait]
impl TokenContractClient for Erc20Client {
    async fn submit_approval(
        &self,
        spender: &str,
        amount: &str,
    ) -> Result<Box<dyn PendingTransaction>, WalletError> {
        let spender = parse_address("spender", spender)?;
        let amount = parse_amount(amount)?;

        let contract = IERC20::new(self.token, &self.provider);
        let pending = contract
            .approve(spender, amount)
            .from(self.from)
            .send()
            .await
            .map_err(|e| WalletError::Invocation(e.to_string()))?;

        tracing::debug!("approve dispatched: {}", pending.tx_hash());

        Ok(Box::new(RpcPendingTransaction {
            inner: pending,
            confirmations: self.confirmations,
        }))
    }
}

struct RpcPendingTransaction {
    inner: PendingTransactionBuilder<Ethereum>,
    confirmations: u64,
}

#[async_trait]
impl PendingTransaction for RpcPendingTransaction {
    fn tx_hash(&self) -> String {
        self.inner.tx_hash().to_string()
    }

    async fn await_finalization(self: Box<Self>) -> Result<Receipt, WalletError> {
        let this = *self;
        let tx_hash = *this.inner.tx_hash();

        let receipt = this
            .inner
            .with_required_confirmations(this.confirmations)
            .get_receipt()
            .await
            .map_err(|e| WalletError::Finalization(e.to_string()))?;

        if !receipt.status() {
            return Err(WalletError::Reverted {
                tx_hash: tx_hash.to_string(),
            });
        }

        Ok(Receipt {
            tx_hash: receipt.transaction_hash().to_string(),
            block_number: receipt.block_number(),
            gas_used: Some(receipt.gas_used()),
        })
    }
}

fn parse_address(field: &str, value: &str) -> Result<Address, WalletError> {
    Address::from_str(value)
        .map_err(|e| WalletError::Invocation(format!("invalid {} address {:?}: {}", field, value, e)))
}

/// Amounts are base units: decimal, or hex with a `0x` prefix.
fn parse_amount(value: &str) -> Result<U256, WalletError> {
    if value.is_empty() {
        return Err(WalletError::Invocation("amount is empty".to_string()));
    }
    U256::from_str(value)
        .map_err(|e| WalletError::Invocation(format!("invalid amount {:?}: {}", value, e)))
}
