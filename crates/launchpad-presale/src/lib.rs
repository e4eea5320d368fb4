//! launchpad-presale
//!
//! Pure presale lifecycle logic: phase derivation from on-chain state plus
//! wall-clock time, the action predicates that mirror contract-side checks,
//! allocation vesting schedules, and operator-facing status text.
//!
//! Nothing here performs I/O. Every predicate is advisory: the contract is
//! the final arbiter and a previously allowed action may still revert.

pub mod describe;
pub mod phase;
pub mod vesting;

pub use describe::{describe, describe_vesting};
pub use phase::{
    claim_allowed, contribution_allowed, finalize_allowed, phase, refund_allowed,
    wallet_can_claim, wallet_can_refund, whitelist_contribution_window,
    whitelist_management_allowed, window, Ineligible, Phase, PresaleStatus, Window,
};
pub use vesting::{allocation_amount, next_release, vested_at, VestingRelease};
