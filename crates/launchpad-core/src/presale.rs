use serde::{Deserialize, Serialize};

use crate::types::{amount_serde, Amount, Timestamp};

// ── PresaleOnChainState ──────────────────────────────────────────────────────

/// Presale facts as read from the presale contract.
///
/// Only `total_raised` and `finalized` change after deployment. `finalized`
/// is terminal: once set, contribution is closed for good.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresaleOnChainState {
    /// Contribution window opens.
    pub start_time: Timestamp,
    /// Contribution window closes (inclusive).
    pub end_time: Timestamp,
    /// Seconds after `start_time` during which only whitelisted wallets may
    /// contribute.
    pub whitelist_duration: i64,
    /// Seconds after `end_time` before claiming opens.
    pub claim_delay: i64,
    pub finalized: bool,
    #[serde(with = "amount_serde")]
    pub hard_cap: Amount,
    #[serde(with = "amount_serde")]
    pub total_raised: Amount,
    /// Sale tokens required to cover the hard cap at the sale price.
    #[serde(with = "amount_serde")]
    pub tokens_needed: Amount,
}

impl PresaleOnChainState {
    /// `end_time + claim_delay`.
    pub fn claim_time(&self) -> Timestamp {
        self.end_time.saturating_add(self.claim_delay)
    }

    /// `start_time + whitelist_duration`: first second of public contribution.
    pub fn public_start(&self) -> Timestamp {
        self.start_time.saturating_add(self.whitelist_duration.max(0))
    }

    /// A zero hard cap can never be contributed to.
    pub fn is_misconfigured(&self) -> bool {
        self.hard_cap.is_zero()
    }

    pub fn hardcap_reached(&self) -> bool {
        !self.is_misconfigured() && self.total_raised >= self.hard_cap
    }

    /// Hard cap minus amount raised; zero when reached or misconfigured.
    pub fn remaining_capacity(&self) -> Amount {
        self.hard_cap.saturating_sub(self.total_raised)
    }
}

// ── ContributionRecord ───────────────────────────────────────────────────────

/// One wallet's position in one presale.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionRecord {
    /// Cumulative amount contributed.
    #[serde(with = "amount_serde")]
    pub contribution: Amount,
    /// Sale tokens claimable right now.
    #[serde(with = "amount_serde")]
    pub claimable: Amount,
    /// Sale tokens already claimed.
    #[serde(with = "amount_serde")]
    pub claimed_token: Amount,
    /// Terminal once true.
    pub is_refunded: bool,
}

impl ContributionRecord {
    pub fn has_contribution(&self) -> bool {
        !self.contribution.is_zero()
    }
}
