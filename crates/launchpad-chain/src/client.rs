use async_trait::async_trait;
use serde::Serialize;

use launchpad_core::types::{Address, Bytes, TxHash, U256};

use crate::failure::ChainFailure;

/// A contract call or contract creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TxRequest {
    /// `None` for contract creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    pub data: Bytes,
    pub value: U256,
}

impl TxRequest {
    pub fn call(to: Address, data: impl Into<Bytes>) -> Self {
        Self {
            to: Some(to),
            data: data.into(),
            value: U256::ZERO,
        }
    }

    /// Creation transaction: bytecode followed by encoded constructor args.
    pub fn create(bytecode: &[u8], constructor_args: &[u8]) -> Self {
        Self {
            to: None,
            data: [bytecode, constructor_args].concat().into(),
            value: U256::ZERO,
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    pub fn is_creation(&self) -> bool {
        self.to.is_none()
    }
}

/// Mined transaction receipt, reduced to what the core needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxReceipt {
    pub transaction_hash: TxHash,
    /// `true` on success.
    pub status: bool,
    /// Set for contract creations.
    pub contract_address: Option<Address>,
    pub block_number: Option<u64>,
}

/// Injected chain capability.
///
/// Implementations may wrap a browser wallet bridge, a node's JSON-RPC, or a
/// test double. Failures are returned raw; `failure::classify` normalises
/// them.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// The connected signer, if any.
    async fn signer(&self) -> Result<Option<Address>, ChainFailure>;

    /// Ask the signer to sign and broadcast `tx`. Returns once broadcast.
    async fn send_transaction(&self, from: Address, tx: &TxRequest) -> Result<TxHash, ChainFailure>;

    /// Receipt for `hash`, or `None` while it is still pending.
    async fn transaction_receipt(&self, hash: TxHash) -> Result<Option<TxReceipt>, ChainFailure>;

    /// Number of the latest block.
    async fn block_number(&self) -> Result<u64, ChainFailure>;

    /// Read-only call at `block`, or against the latest block when `None`.
    async fn call(
        &self,
        from: Option<Address>,
        tx: &TxRequest,
        block: Option<u64>,
    ) -> Result<Bytes, ChainFailure>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creation_concatenates_bytecode_and_args() {
        let tx = TxRequest::create(&[0x60, 0x80], &[0x01, 0x02]);
        assert!(tx.is_creation());
        assert_eq!(tx.data.as_ref(), &[0x60, 0x80, 0x01, 0x02]);
    }

    #[test]
    fn call_serializes_with_to() {
        let to = Address::repeat_byte(0x11);
        let tx = TxRequest::call(to, vec![0xde, 0xad]).with_value(U256::from(16u64));
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["data"], "0xdead");
        assert_eq!(json["value"], "0x10");
        assert!(json["to"].as_str().unwrap().to_lowercase().ends_with("1111"));
    }
}
