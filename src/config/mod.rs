//! Configuration for approvectl.
//!
//! Settings live in a `.approvectl.yaml` file found by walking up from the
//! current directory. Everything is optional; with no file at all there is no
//! RPC endpoint, so the wallet provider is absent.

pub mod defaults;
pub mod parser;

use std::time::Duration;
use url::Url;

pub use parser::{load, parse_config_file, parse_config_str};

/// File name searched for when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = ".approvectl.yaml";

/// Resolved configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// JSON-RPC endpoint of the wallet provider. `None` means no provider.
    pub rpc_url: Option<Url>,

    /// Name of the environment variable holding a private key for local signing.
    /// When unset, the node signs with its own accounts.
    pub private_key_env: Option<String>,

    /// Blocks to wait for before an approval counts as final.
    pub confirmations: u64,

    /// Give up waiting for a receipt after this long. `None` waits forever.
    pub finalization_timeout: Option<Duration>,

    /// Write failures and outcomes to the diagnostic journal.
    pub journal: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: None,
            private_key_env: None,
            confirmations: 1,
            finalization_timeout: None,
            journal: true,
        }
    }
}

impl Config {
    /// Override the endpoint (from `--rpc-url` or `APPROVECTL_RPC_URL`).
    pub fn with_rpc_url(mut self, rpc_url: Option<Url>) -> Self {
        if rpc_url.is_some() {
            self.rpc_url = rpc_url;
        }
        self
    }
}
