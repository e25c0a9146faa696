//! Config templates written by `approvectl init`.

/// Local development node (anvil, hardhat) that signs with its own accounts.
pub const LOCAL_NODE_YAML: &str = r#"# approvectl config
# Approvals go through this JSON-RPC endpoint. The node signs with its own
# unlocked accounts, the same way a browser wallet signs for the page.

rpc_url: http://127.0.0.1:8545

# Blocks to wait before an approval counts as final.
confirmations: 1

# Stop waiting for a receipt after this many seconds.
# Remove the line to wait as long as it takes.
# finalization_timeout_secs: 300

# Record failures and outcomes in ~/.approvectl/logs/
journal: true
"#;

/// Remote endpoint, signing locally with a key taken from the environment.
pub const LOCAL_KEY_YAML: &str = r#"# approvectl config
# Approvals are signed locally and broadcast through rpc_url.
# The key itself never goes in this file: export it instead, e.g.
#   export APPROVECTL_PRIVATE_KEY=0x...

rpc_url: https://rpc.example.org

private_key_env: APPROVECTL_PRIVATE_KEY

# Blocks to wait before an approval counts as final.
confirmations: 2

# Stop waiting for a receipt after this many seconds.
finalization_timeout_secs: 600

journal: true
"#;

/// Get a template by name.
pub fn get_template(name: &str) -> Option<&'static str> {
    match name {
        "local-node" | "node" | "anvil" => Some(LOCAL_NODE_YAML),
        "local-key" | "key" => Some(LOCAL_KEY_YAML),
        _ => None,
    }
}

/// List available template names with descriptions.
pub fn available_templates() -> Vec<(&'static str, &'static str)> {
    vec![
        ("local-node", "Development node that signs with its own accounts"),
        ("local-key", "Remote endpoint, key from an environment variable"),
    ]
}
