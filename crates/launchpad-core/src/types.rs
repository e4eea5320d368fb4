use std::str::FromStr;

pub use alloy_primitives::{Address, Bytes, TxHash, U256};

use crate::error::TxError;

/// Unix timestamp (seconds, UTC).
pub type Timestamp = i64;

/// Monetary amount in base units of the relevant token.
pub type Amount = U256;

// ── Amount parsing ───────────────────────────────────────────────────────────

/// Parse an amount given as a decimal string or a `0x`-prefixed hex string.
pub fn parse_amount(raw: &str) -> Result<Amount, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("empty amount".to_string());
    }
    U256::from_str(trimmed).map_err(|e| format!("invalid amount {trimmed:?}: {e}"))
}

/// Serde adapter for [`Amount`] fields carried as strings in REST JSON.
///
/// Serialises as a decimal string; accepts decimal strings, hex strings and
/// plain JSON integers.
pub mod amount_serde {
    use serde::{de, Deserialize, Deserializer, Serializer};

    use super::{parse_amount, Amount, U256};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    pub fn serialize<S: Serializer>(value: &Amount, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Amount, D::Error> {
        match Raw::deserialize(d)? {
            Raw::Text(s) => parse_amount(&s).map_err(de::Error::custom),
            Raw::Number(n) => Ok(U256::from(n)),
        }
    }
}

// ── Address parsing ──────────────────────────────────────────────────────────

/// Parse an address taken from an off-chain record.
///
/// A missing, malformed or zero address is a configuration error: it is
/// caught here, before any transaction is built.
pub fn parse_address(field: &str, raw: Option<&str>) -> Result<Address, TxError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| TxError::config(format!("{field} is not set")))?;
    let addr = Address::from_str(raw)
        .map_err(|e| TxError::config(format!("{field} {raw:?} is not a valid address: {e}")))?;
    if addr == Address::ZERO {
        return Err(TxError::config(format!("{field} is the zero address")));
    }
    Ok(addr)
}
