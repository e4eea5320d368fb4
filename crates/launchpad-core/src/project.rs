//! Off-chain project records.
//!
//! The REST store is authoritative for presentation metadata and mirrors
//! deployment addresses. Money and time facts always come from the chain.
//! Addresses stay as strings here and are parsed where they are used, so a
//! bad record surfaces as a configuration error instead of a decode failure.

use serde::{Deserialize, Serialize};

use crate::types::{amount_serde, Amount, Timestamp};

// ── Allocation ───────────────────────────────────────────────────────────────

/// One slice of the token supply.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    pub name: String,
    /// Share of total supply, in percent (two decimal places significant).
    pub supply: f64,
    /// Vesting length in months. Zero means unlocked at start.
    #[serde(default)]
    pub vesting: u32,
    /// Vesting start (Unix seconds).
    #[serde(default)]
    pub start_date: Timestamp,
    /// Locker contract for this allocation once deployed.
    #[serde(default)]
    pub contract_address: Option<String>,
    /// The presale allocation is sold, not locked.
    #[serde(default)]
    pub is_presale: bool,
}

impl Allocation {
    /// Non-presale allocations with a vesting period get a locker.
    pub fn needs_locker(&self) -> bool {
        !self.is_presale && self.vesting > 0
    }
}

// ── PresaleRecord ────────────────────────────────────────────────────────────

/// The active presale attached to a project.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresaleRecord {
    /// Quote currency symbol, display only.
    pub unit: String,
    /// Display copy of the hard cap; the contract value is authoritative.
    pub hardcap: String,
    pub price: String,
    #[serde(default)]
    pub whitelist_contract: Option<String>,
    #[serde(default)]
    pub contract_address: Option<String>,
}

// ── ProjectRecord ────────────────────────────────────────────────────────────

/// Project record as served by the REST store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    pub id: String,
    pub name: String,
    pub ticker: String,
    /// Total token supply in base units.
    #[serde(with = "amount_serde")]
    pub total_supply: Amount,
    /// Token contract, `None` until deployed.
    #[serde(default)]
    pub contract_address: Option<String>,
    #[serde(default)]
    pub factory_address: Option<String>,
    /// Locker contract, `None` until deployed.
    #[serde(default)]
    pub locker_address: Option<String>,
    #[serde(default)]
    pub locker_distributed: bool,
    #[serde(default)]
    pub locker_distribute_hash: Option<String>,
    #[serde(default)]
    pub allocations: Vec<Allocation>,
    pub presales: PresaleRecord,
}

impl ProjectRecord {
    /// Allocations that are (or will be) held by a locker, with their index
    /// in `allocations`.
    pub fn locker_allocations(&self) -> impl Iterator<Item = (usize, &Allocation)> {
        self.allocations
            .iter()
            .enumerate()
            .filter(|(_, a)| a.needs_locker())
    }

    pub fn has_token(&self) -> bool {
        is_set(&self.contract_address)
    }

    pub fn has_locker(&self) -> bool {
        is_set(&self.locker_address)
    }
}

fn is_set(field: &Option<String>) -> bool {
    field.as_deref().map(|s| !s.trim().is_empty()).unwrap_or(false)
}

// ── Deployment metadata ──────────────────────────────────────────────────────

/// Partial update written back to the store after an on-chain confirmation.
/// `None` fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deploy_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locker_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locker_distributed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locker_distribute_hash: Option<String>,
}

impl DeploymentUpdate {
    /// Apply this update to a local copy of the record.
    pub fn apply_to(&self, project: &mut ProjectRecord) {
        if let Some(a) = &self.contract_address {
            project.contract_address = Some(a.clone());
        }
        if let Some(a) = &self.locker_address {
            project.locker_address = Some(a.clone());
        }
        if let Some(d) = self.locker_distributed {
            project.locker_distributed = d;
        }
        if let Some(h) = &self.locker_distribute_hash {
            project.locker_distribute_hash = Some(h.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROJECT_JSON: &str = r#"{
        "id": "p1",
        "name": "Moon",
        "ticker": "MOON",
        "totalSupply": "1000000",
        "contractAddress": null,
        "factoryAddress": "0x00000000000000000000000000000000000000f1",
        "lockerDistributed": false,
        "allocations": [
            { "name": "Presale", "supply": 40, "vesting": 0, "startDate": 0, "isPresale": true },
            { "name": "Team", "supply": 20.5, "vesting": 12, "startDate": 1700000000 },
            { "name": "Liquidity", "supply": 39.5, "vesting": 0, "startDate": 1700000000 }
        ],
        "presales": { "unit": "ETH", "hardcap": "100", "price": "0.001" }
    }"#;

    #[test]
    fn parses_project_and_filters_lockers() {
        let p: ProjectRecord = serde_json::from_str(PROJECT_JSON).unwrap();
        assert!(!p.has_token());
        assert!(!p.has_locker());
        let lockers: Vec<_> = p.locker_allocations().map(|(i, a)| (i, a.name.as_str())).collect();
        assert_eq!(lockers, vec![(1, "Team")]);
    }

    #[test]
    fn update_applies_only_set_fields() {
        let mut p: ProjectRecord = serde_json::from_str(PROJECT_JSON).unwrap();
        let up = DeploymentUpdate {
            locker_address: Some("0x00000000000000000000000000000000000000bb".into()),
            ..Default::default()
        };
        up.apply_to(&mut p);
        assert!(p.has_locker());
        assert!(!p.has_token());
        assert!(!p.locker_distributed);

        let json = serde_json::to_value(&up).unwrap();
        assert!(json.get("contractAddress").is_none());
        assert!(json.get("lockerAddress").is_some());
    }
}
