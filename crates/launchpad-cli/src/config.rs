use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use launchpad_chain::SubmitterConfig;
use launchpad_core::constants::{DEFAULT_CONFIRMATION_TIMEOUT_SECS, DEFAULT_RECEIPT_POLL_INTERVAL_MS};
use launchpad_core::types::Bytes;
use launchpad_ops::ContractArtifacts;

/// Operator configuration, read from a JSON file. Every field is optional
/// in the file; command-line flags override what it says.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchpadConfig {
    /// Chain JSON-RPC endpoint with a signer behind `eth_sendTransaction`.
    pub rpc_url: String,
    /// Fixed sender address; otherwise the endpoint's first account.
    pub sender: Option<String>,
    /// Base URL of the project REST store.
    pub store_url: String,
    /// Bearer token for store writes.
    pub store_token: Option<String>,
    /// Etherscan-compatible verification endpoint.
    pub verifier_url: Option<String>,
    pub verifier_api_key: Option<String>,
    pub compiler_version: String,
    pub confirmation_timeout_secs: u64,
    pub receipt_poll_interval_ms: u64,
    /// Hex-encoded creation bytecode files.
    pub token_bytecode_path: Option<PathBuf>,
    pub locker_bytecode_path: Option<PathBuf>,
}

impl Default for LaunchpadConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:8545".into(),
            sender: None,
            store_url: "http://127.0.0.1:3000/api".into(),
            store_token: None,
            verifier_url: None,
            verifier_api_key: None,
            compiler_version: "v0.8.24+commit.e11b9ed9".into(),
            confirmation_timeout_secs: DEFAULT_CONFIRMATION_TIMEOUT_SECS,
            receipt_poll_interval_ms: DEFAULT_RECEIPT_POLL_INTERVAL_MS,
            token_bytecode_path: None,
            locker_bytecode_path: None,
        }
    }
}

impl LaunchpadConfig {
    /// Read `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&json).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn submitter_config(&self) -> SubmitterConfig {
        SubmitterConfig {
            confirmation_timeout: Duration::from_secs(self.confirmation_timeout_secs),
            poll_interval: Duration::from_millis(self.receipt_poll_interval_ms.max(1)),
        }
    }

    /// Load the configured bytecode. Unset paths stay empty; the
    /// orchestrator rejects an empty artifact before deploying.
    pub fn artifacts(&self) -> anyhow::Result<ContractArtifacts> {
        Ok(ContractArtifacts {
            token_bytecode: read_bytecode(self.token_bytecode_path.as_deref())?,
            locker_bytecode: read_bytecode(self.locker_bytecode_path.as_deref())?,
        })
    }
}

fn read_bytecode(path: Option<&Path>) -> anyhow::Result<Bytes> {
    let Some(path) = path else {
        return Ok(Bytes::new());
    };
    let path = expand_tilde(path);
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("reading bytecode {}", path.display()))?;
    parse_bytecode(&text).with_context(|| format!("decoding bytecode {}", path.display()))
}

fn parse_bytecode(text: &str) -> anyhow::Result<Bytes> {
    let trimmed = text.trim();
    let hex_str = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    Ok(hex::decode(hex_str)?.into())
}

pub fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Ok(home) = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")) {
            return PathBuf::from(home).join(stripped);
        }
    }
    path.to_path_buf()
}
