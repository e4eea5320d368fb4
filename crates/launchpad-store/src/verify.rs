//! Contract source verification (Etherscan-compatible API).
//!
//! Submission is fire-and-forget from the deployment's point of view: the
//! service's answer is logged and its failures never undo a deployment.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use launchpad_core::types::{Address, Bytes};

use crate::error::StoreError;

/// Everything the verification service needs for one contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationRequest {
    pub contract_address: Address,
    pub contract_name: String,
    /// ABI-encoded constructor arguments.
    pub constructor_args: Bytes,
    pub source: String,
    /// e.g. `v0.8.24+commit.e11b9ed9`.
    pub compiler_version: String,
}

#[async_trait]
pub trait SourceVerifier: Send + Sync {
    /// Submit a verification job. Returns the service's job reference.
    async fn submit(&self, request: &VerificationRequest) -> Result<String, StoreError>;
}

pub struct EtherscanVerifier {
    url: String,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct EtherscanResponse {
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    result: serde_json::Value,
}

impl EtherscanVerifier {
    pub fn new(url: &str, api_key: &str) -> Self {
        Self {
            url: url.to_string(),
            api_key: api_key.to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn form(&self, req: &VerificationRequest) -> Vec<(&'static str, String)> {
        vec![
            ("module", "contract".to_string()),
            ("action", "verifysourcecode".to_string()),
            ("apikey", self.api_key.clone()),
            ("contractaddress", req.contract_address.to_string()),
            ("contractname", req.contract_name.clone()),
            ("codeformat", "solidity-single-file".to_string()),
            ("sourceCode", req.source.clone()),
            ("compilerversion", req.compiler_version.clone()),
            ("optimizationUsed", "0".to_string()),
            // Spelling is the API's.
            ("constructorArguements", hex::encode(&req.constructor_args)),
        ]
    }
}

fn interpret(resp: EtherscanResponse) -> Result<String, StoreError> {
    let result = match &resp.result {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    if resp.status == "1" {
        Ok(result)
    } else {
        Err(StoreError::Rejected(format!("{}: {}", resp.message, result)))
    }
}

#[async_trait]
impl SourceVerifier for EtherscanVerifier {
    async fn submit(&self, request: &VerificationRequest) -> Result<String, StoreError> {
        let resp = self
            .client
            .post(&self.url)
            .form(&self.form(request))
            .send()
            .await
            .map_err(|e| StoreError::Transport {
                url: self.url.clone(),
                reason: e.to_string(),
            })?;
        let body: EtherscanResponse = resp
            .json()
            .await
            .map_err(|e| StoreError::Decode(format!("verification response: {e}")))?;
        let guid = interpret(body)?;
        info!(contract = %request.contract_address, %guid, "source verification submitted");
        Ok(guid)
    }
}
