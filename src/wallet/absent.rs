//! The absent provider: used when no RPC endpoint is configured.

use crate::wallet::{SigningHandle, WalletError, WalletProvider};
use async_trait::async_trait;

/// A provider that isn't there. Every capability fails with
/// [`WalletError::ProviderUnavailable`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NoWallet;

#[async_trait]
impl WalletProvider for NoWallet {
    fn is_available(&self) -> bool {
        false
    }

    async fn is_connected(&self) -> bool {
        false
    }

    async fn request_connection(&self) -> Result<(), WalletError> {
        Err(WalletError::ProviderUnavailable)
    }

    async fn account(&self) -> Option<String> {
        None
    }

    async fn signing_handle(&self) -> Result<Box<dyn SigningHandle>, WalletError> {
        Err(WalletError::ProviderUnavailable)
    }
}
