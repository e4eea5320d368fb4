use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use launchpad_core::types::{Address, Bytes, TxHash};

use crate::client::{ChainClient, TxReceipt, TxRequest};
use crate::failure::ChainFailure;

/// Ethereum JSON-RPC 2.0 client over HTTP.
///
/// Signing is delegated to the endpoint (`eth_sendTransaction`), which fits
/// a local signer proxy or a development node with unlocked accounts. RPC
/// error objects are passed through untouched so the decoder sees the
/// revert data exactly where the node put it.
pub struct JsonRpcChain {
    url: String,
    client: reqwest::Client,
    /// Fixed sender; otherwise the first of `eth_accounts`.
    from: Option<Address>,
}

impl JsonRpcChain {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            client: reqwest::Client::new(),
            from: None,
        }
    }

    pub fn with_sender(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    /// Call a JSON-RPC method and return the `result` field.
    async fn call_method(&self, method: &str, params: Value) -> Result<Value, ChainFailure> {
        let body = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });

        let resp = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChainFailure::message(format!("connecting to {}: {e}", self.url)))?;

        let json: Value = resp
            .json()
            .await
            .map_err(|e| ChainFailure::message(format!("parsing {method} response: {e}")))?;

        if let Some(err) = json.get("error") {
            return Err(ChainFailure(err.clone()));
        }
        Ok(json["result"].clone())
    }

    fn tx_object(from: Option<Address>, tx: &TxRequest) -> Value {
        let mut obj = json!({
            "data": tx.data,
            "value": tx.value,
        });
        if let Some(from) = from {
            obj["from"] = json!(from);
        }
        if let Some(to) = tx.to {
            obj["to"] = json!(to);
        }
        obj
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReceipt {
    transaction_hash: TxHash,
    status: Option<String>,
    contract_address: Option<Address>,
    block_number: Option<String>,
}

fn parse_quantity(s: &str) -> Option<u64> {
    u64::from_str_radix(s.trim_start_matches("0x"), 16).ok()
}

impl From<RawReceipt> for TxReceipt {
    fn from(r: RawReceipt) -> Self {
        Self {
            transaction_hash: r.transaction_hash,
            // Pre-Byzantium receipts carry no status; treat as success.
            status: r.status.as_deref().and_then(parse_quantity).map_or(true, |s| s == 1),
            contract_address: r.contract_address,
            block_number: r.block_number.as_deref().and_then(parse_quantity),
        }
    }
}

#[async_trait]
impl ChainClient for JsonRpcChain {
    async fn signer(&self) -> Result<Option<Address>, ChainFailure> {
        if let Some(from) = self.from {
            return Ok(Some(from));
        }
        let result = self.call_method("eth_accounts", json!([])).await?;
        let accounts: Vec<Address> = serde_json::from_value(result)
            .map_err(|e| ChainFailure::message(format!("parsing eth_accounts: {e}")))?;
        Ok(accounts.into_iter().next())
    }

    async fn send_transaction(&self, from: Address, tx: &TxRequest) -> Result<TxHash, ChainFailure> {
        let result = self
            .call_method("eth_sendTransaction", json!([Self::tx_object(Some(from), tx)]))
            .await?;
        serde_json::from_value(result)
            .map_err(|e| ChainFailure::message(format!("parsing transaction hash: {e}")))
    }

    async fn transaction_receipt(&self, hash: TxHash) -> Result<Option<TxReceipt>, ChainFailure> {
        let result = self
            .call_method("eth_getTransactionReceipt", json!([hash]))
            .await?;
        if result.is_null() {
            return Ok(None);
        }
        let raw: RawReceipt = serde_json::from_value(result)
            .map_err(|e| ChainFailure::message(format!("parsing receipt: {e}")))?;
        Ok(Some(raw.into()))
    }

    async fn block_number(&self) -> Result<u64, ChainFailure> {
        let result = self.call_method("eth_blockNumber", json!([])).await?;
        result
            .as_str()
            .and_then(parse_quantity)
            .ok_or_else(|| ChainFailure::message(format!("parsing eth_blockNumber result: {result}")))
    }

    async fn call(
        &self,
        from: Option<Address>,
        tx: &TxRequest,
        block: Option<u64>,
    ) -> Result<Bytes, ChainFailure> {
        let tag = block.map_or_else(|| "latest".to_string(), |n| format!("0x{n:x}"));
        let result = self
            .call_method("eth_call", json!([Self::tx_object(from, tx), tag]))
            .await?;
        serde_json::from_value(result)
            .map_err(|e| ChainFailure::message(format!("parsing eth_call result: {e}")))
    }
}
