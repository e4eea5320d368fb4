//! Boundary adapter between chain-client failures and `TxError`.

use std::fmt;

use serde_json::{json, Value};

use launchpad_core::error::TxError;

use crate::decode::decode_failure;

/// Raw failure as produced by a chain client.
///
/// Clients disagree on the shape (JSON-RPC error objects, wallet-provider
/// errors, wrapped library errors), so it is kept as JSON and only
/// interpreted by `classify` and the decoder.
#[derive(Clone, Debug, PartialEq)]
pub struct ChainFailure(pub Value);

impl ChainFailure {
    /// Failure carrying only a message (transport errors, bad responses).
    pub fn message(msg: impl Into<String>) -> Self {
        Self(json!({ "message": msg.into() }))
    }
}

impl fmt::Display for ChainFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&decode_failure(&self.0))
    }
}

/// EIP-1193 "user rejected request".
const CODE_USER_REJECTED: i64 = 4001;
/// EIP-1193 "unauthorized" and "disconnected".
const CODE_UNAUTHORIZED: i64 = 4100;
const CODE_DISCONNECTED: i64 = 4900;

/// Normalise a client failure into the error taxonomy.
pub fn classify(failure: &ChainFailure) -> TxError {
    let v = &failure.0;

    match find_code(v, 0) {
        Some(Code::Number(CODE_USER_REJECTED)) => return TxError::UserRejected,
        Some(Code::Number(CODE_UNAUTHORIZED | CODE_DISCONNECTED)) => return TxError::NotConnected,
        Some(Code::Text(ref t)) if t == "ACTION_REJECTED" => return TxError::UserRejected,
        _ => {}
    }

    let text = ["shortMessage", "message", "reason"]
        .iter()
        .filter_map(|k| v.get(*k).and_then(Value::as_str))
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    if text.contains("user rejected") || text.contains("user denied") {
        return TxError::UserRejected;
    }
    if text.contains("not connected") || text.contains("no signer") {
        return TxError::NotConnected;
    }

    TxError::ContractReverted {
        message: decode_failure(v),
    }
}

#[derive(Debug, PartialEq)]
enum Code {
    Number(i64),
    Text(String),
}

/// First `code` field, top level first, then inside common wrappers.
fn find_code(v: &Value, depth: usize) -> Option<Code> {
    if depth > 4 {
        return None;
    }
    let map = v.as_object()?;
    match map.get("code") {
        Some(Value::Number(n)) => {
            if let Some(n) = n.as_i64() {
                if n == CODE_USER_REJECTED || n == CODE_UNAUTHORIZED || n == CODE_DISCONNECTED {
                    return Some(Code::Number(n));
                }
            }
        }
        Some(Value::String(s)) if s == "ACTION_REJECTED" => return Some(Code::Text(s.clone())),
        _ => {}
    }
    ["error", "cause", "info", "originalError"]
        .iter()
        .filter_map(|k| map.get(*k))
        .find_map(|inner| find_code(inner, depth + 1))
}
