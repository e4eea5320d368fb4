//! Presale phase evaluator.
//!
//! Every derived timestamp and predicate over `PresaleOnChainState` lives
//! here, defined once, so the client never offers an action the contract
//! would reject for timing or cap reasons.
//!
//! Phase precedence (first match wins):
//!
//!   Finalized            finalized == true
//!   NotStarted           now <  start_time
//!   HardcapReached       total_raised == hard_cap (hard_cap > 0)
//!   EndedPendingFinalize now >  end_time
//!   WhitelistOnly        now <  start_time + whitelist_duration
//!   Active               otherwise (public window, cap not reached)

use serde::{Deserialize, Serialize};
use thiserror::Error;

use launchpad_core::constants::BPS_DENOMINATOR;
use launchpad_core::presale::{ContributionRecord, PresaleOnChainState};
use launchpad_core::types::{Amount, Timestamp, U256};

// ── Phases ───────────────────────────────────────────────────────────────────

/// Lifecycle phase including the hard-cap overlay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    NotStarted,
    WhitelistOnly,
    Active,
    HardcapReached,
    EndedPendingFinalize,
    Finalized,
}

/// The five mutually exclusive time-window phases, without the hard-cap
/// overlay. Exactly one holds for any state and instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Window {
    NotStarted,
    WhitelistOnly,
    Active,
    EndedPendingFinalize,
    Finalized,
}

impl From<Window> for Phase {
    fn from(w: Window) -> Self {
        match w {
            Window::NotStarted => Phase::NotStarted,
            Window::WhitelistOnly => Phase::WhitelistOnly,
            Window::Active => Phase::Active,
            Window::EndedPendingFinalize => Phase::EndedPendingFinalize,
            Window::Finalized => Phase::Finalized,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Phase::NotStarted => "not started",
            Phase::WhitelistOnly => "whitelist only",
            Phase::Active => "active",
            Phase::HardcapReached => "hard cap reached",
            Phase::EndedPendingFinalize => "ended, pending finalize",
            Phase::Finalized => "finalized",
        };
        f.write_str(s)
    }
}

/// Time-window phase of `state` at `now`.
pub fn window(state: &PresaleOnChainState, now: Timestamp) -> Window {
    if state.finalized {
        Window::Finalized
    } else if now < state.start_time {
        Window::NotStarted
    } else if now > state.end_time {
        Window::EndedPendingFinalize
    } else if now < state.public_start() {
        Window::WhitelistOnly
    } else {
        Window::Active
    }
}

/// Lifecycle phase of `state` at `now`.
pub fn phase(state: &PresaleOnChainState, now: Timestamp) -> Phase {
    match window(state, now) {
        Window::Finalized => Phase::Finalized,
        Window::NotStarted => Phase::NotStarted,
        _ if state.hardcap_reached() => Phase::HardcapReached,
        w => w.into(),
    }
}

// ── Predicates ───────────────────────────────────────────────────────────────

/// Public contribution is open. Never true for a zero hard cap.
pub fn contribution_allowed(state: &PresaleOnChainState, now: Timestamp) -> bool {
    !state.is_misconfigured() && phase(state, now) == Phase::Active
}

/// The whitelist-only window is open. Membership is checked by the caller.
pub fn whitelist_contribution_window(state: &PresaleOnChainState, now: Timestamp) -> bool {
    !state.is_misconfigured() && phase(state, now) == Phase::WhitelistOnly
}

/// Claims are open: finalized and `now >= claim_time`.
pub fn claim_allowed(state: &PresaleOnChainState, now: Timestamp) -> bool {
    state.finalized && now >= state.claim_time()
}

/// The sale ended without being finalized; contributors may exit.
pub fn refund_allowed(state: &PresaleOnChainState, now: Timestamp) -> bool {
    !state.finalized && now > state.end_time
}

/// An administrator may finalize once the window closed or the cap filled.
pub fn finalize_allowed(state: &PresaleOnChainState, now: Timestamp) -> bool {
    !state.finalized && (now > state.end_time || state.hardcap_reached())
}

/// The whitelist contract accepts changes until `end_time`.
pub fn whitelist_management_allowed(state: &PresaleOnChainState, now: Timestamp) -> bool {
    !state.finalized && now <= state.end_time
}

// ── Wallet-level eligibility ─────────────────────────────────────────────────

/// Why an action is not offered to a wallet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum Ineligible {
    #[error("contribution is not open in the current phase")]
    ContributionClosed,
    #[error("presale hard cap is zero; the sale is misconfigured")]
    Misconfigured,
    #[error("wallet is not whitelisted for the whitelist window")]
    NotWhitelisted,
    #[error("amount must be greater than zero")]
    ZeroAmount,
    #[error("amount exceeds the remaining hard cap capacity")]
    ExceedsCapacity,
    #[error("claiming is not open yet")]
    ClaimClosed,
    #[error("refunds are only available after the sale ends without finalizing")]
    RefundClosed,
    #[error("this wallet has not contributed")]
    NoContribution,
    #[error("this wallet has already been refunded")]
    AlreadyRefunded,
    #[error("nothing to claim")]
    NothingToClaim,
    #[error("the presale cannot be finalized yet")]
    FinalizeNotAllowed,
    #[error("the whitelist can no longer be changed")]
    WhitelistClosed,
}

/// Presale claim for one wallet: the claim predicate plus the wallet's own
/// record.
pub fn wallet_can_claim(
    state: &PresaleOnChainState,
    record: &ContributionRecord,
    now: Timestamp,
) -> Result<(), Ineligible> {
    if !claim_allowed(state, now) {
        return Err(Ineligible::ClaimClosed);
    }
    if !record.has_contribution() {
        return Err(Ineligible::NoContribution);
    }
    if record.is_refunded {
        return Err(Ineligible::AlreadyRefunded);
    }
    if record.claimable.is_zero() {
        return Err(Ineligible::NothingToClaim);
    }
    Ok(())
}

/// Refund for one wallet.
pub fn wallet_can_refund(
    state: &PresaleOnChainState,
    record: &ContributionRecord,
    now: Timestamp,
) -> Result<(), Ineligible> {
    if !refund_allowed(state, now) {
        return Err(Ineligible::RefundClosed);
    }
    if !record.has_contribution() {
        return Err(Ineligible::NoContribution);
    }
    if record.is_refunded {
        return Err(Ineligible::AlreadyRefunded);
    }
    Ok(())
}

// ── Status snapshot ──────────────────────────────────────────────────────────

/// Everything a caller needs to render or gate presale actions at one
/// instant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PresaleStatus {
    pub phase: Phase,
    pub window: Window,
    pub hardcap_reached: bool,
    pub misconfigured: bool,
    pub contribution_allowed: bool,
    pub whitelist_window: bool,
    pub claim_allowed: bool,
    pub refund_allowed: bool,
    pub finalize_allowed: bool,
    pub claim_time: Timestamp,
    /// Raised as basis points of the hard cap (0 when misconfigured).
    pub progress_bps: u64,
    #[serde(with = "launchpad_core::types::amount_serde")]
    pub remaining_capacity: Amount,
    /// Next instant at which the evaluation changes on time alone.
    pub next_transition: Option<Timestamp>,
}

impl PresaleStatus {
    pub fn evaluate(state: &PresaleOnChainState, now: Timestamp) -> Self {
        Self {
            phase: phase(state, now),
            window: window(state, now),
            hardcap_reached: state.hardcap_reached(),
            misconfigured: state.is_misconfigured(),
            contribution_allowed: contribution_allowed(state, now),
            whitelist_window: whitelist_contribution_window(state, now),
            claim_allowed: claim_allowed(state, now),
            refund_allowed: refund_allowed(state, now),
            finalize_allowed: finalize_allowed(state, now),
            claim_time: state.claim_time(),
            progress_bps: progress_bps(state),
            remaining_capacity: state.remaining_capacity(),
            next_transition: next_transition(state, now),
        }
    }
}

fn progress_bps(state: &PresaleOnChainState) -> u64 {
    if state.is_misconfigured() {
        return 0;
    }
    let bps = U256::from(BPS_DENOMINATOR);
    let scaled = state.total_raised.saturating_mul(bps) / state.hard_cap;
    scaled.min(bps).saturating_to::<u64>()
}

fn next_transition(state: &PresaleOnChainState, now: Timestamp) -> Option<Timestamp> {
    match window(state, now) {
        Window::NotStarted => Some(state.start_time),
        Window::WhitelistOnly => Some(state.public_start()),
        Window::Active => Some(state.end_time.saturating_add(1)),
        Window::EndedPendingFinalize => None,
        Window::Finalized => (now < state.claim_time()).then(|| state.claim_time()),
    }
}
