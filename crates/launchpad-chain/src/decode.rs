//! Error decoder: turns an arbitrary chain-client failure into a single
//! displayable string.
//!
//! 1. Find the revert payload wherever the client nested it.
//! 2. Decode it against the registry (custom errors), then the standard
//!    `Error(string)` and `Panic(uint256)` reverts.
//! 3. Otherwise use `shortMessage`, then `message`.
//! 4. Otherwise `"Unknown transaction error"`.
//!
//! Never panics; always returns a message.

use alloy_sol_types::{Panic, Revert, SolError};
use serde_json::Value;
use tracing::debug;

use launchpad_core::constants::UNKNOWN_TX_ERROR;

use crate::registry;

/// Keys under which client libraries nest the underlying error.
const NESTED_KEYS: &[&str] = &["error", "cause", "info", "originalError", "innerError", "revert"];

/// Limits recursion on pathological failure objects.
const MAX_DEPTH: usize = 8;

/// Decode a failure object to a user-facing message.
pub fn decode_failure(failure: &Value) -> String {
    if let Some(payload) = extract_revert_data(failure) {
        if let Some(message) = decode_revert(&payload) {
            return message;
        }
        debug!(payload = %hex::encode(&payload), "revert payload not decodable");
    }
    find_text(failure, "shortMessage", 0)
        .or_else(|| find_text(failure, "message", 0))
        .unwrap_or_else(|| UNKNOWN_TX_ERROR.to_string())
}

/// Decode raw revert bytes. `None` when the payload matches nothing known.
pub fn decode_revert(payload: &[u8]) -> Option<String> {
    if let Some(entry) = registry::lookup(payload) {
        return Some(entry.display().to_string());
    }
    if payload.starts_with(&Revert::SELECTOR) {
        return Revert::abi_decode(payload, true)
            .ok()
            .map(|r| r.reason)
            .filter(|r| !r.trim().is_empty());
    }
    if payload.starts_with(&Panic::SELECTOR) {
        return Panic::abi_decode(payload, true)
            .ok()
            .map(|p| format!("Panic(0x{:x})", p.code));
    }
    None
}

/// Locate the revert payload inside a failure object.
///
/// Checks `data` first at each level (as a hex string or an object carrying
/// its own `data`), then descends into the usual wrapper keys.
pub fn extract_revert_data(failure: &Value) -> Option<Vec<u8>> {
    find_payload(failure, 0)
}

fn find_payload(value: &Value, depth: usize) -> Option<Vec<u8>> {
    if depth > MAX_DEPTH {
        return None;
    }
    match value {
        Value::String(s) => parse_hex_payload(s),
        Value::Object(map) => {
            if let Some(found) = map.get("data").and_then(|d| find_payload(d, depth + 1)) {
                return Some(found);
            }
            NESTED_KEYS
                .iter()
                .filter_map(|k| map.get(*k))
                .find_map(|inner| find_payload(inner, depth + 1))
        }
        _ => None,
    }
}

fn parse_hex_payload(s: &str) -> Option<Vec<u8>> {
    let digits = s.trim().strip_prefix("0x")?;
    if digits.len() < 8 || digits.len() % 2 != 0 {
        return None;
    }
    hex::decode(digits).ok()
}

/// First non-blank string under `key`, returned as given, searching the top level before
/// nested wrappers.
fn find_text(value: &Value, key: &str, depth: usize) -> Option<String> {
    if depth > MAX_DEPTH {
        return None;
    }
    let map = value.as_object()?;
    if let Some(text) = map.get(key).and_then(Value::as_str) {
        if !text.trim().is_empty() {
            return Some(text.to_string());
        }
    }
    std::iter::once("data")
        .chain(NESTED_KEYS.iter().copied())
        .filter_map(|k| map.get(k))
        .find_map(|inner| find_text(inner, key, depth + 1))
}
