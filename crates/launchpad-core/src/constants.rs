/// ─── Launchpad client constants ─────────────────────────────────────────────
///
/// Time values are Unix seconds, amounts are base units of the relevant
/// token (wei for native quote currency).

// ── Time ─────────────────────────────────────────────────────────────────────

/// Seconds in one day.
pub const DAY_SECS: i64 = 24 * 3600;

/// Seconds in one vesting month. Lockers count months as 30 days.
pub const MONTH_SECS: i64 = 30 * DAY_SECS;

// ── Percentages ──────────────────────────────────────────────────────────────

/// Basis-point denominator (100.00%).
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Allocation percentages carry two decimal places.
pub const PERCENT_SCALE: f64 = 100.0;

// ── Transaction submission ───────────────────────────────────────────────────

/// Default time to wait for a submitted transaction to be mined.
pub const DEFAULT_CONFIRMATION_TIMEOUT_SECS: u64 = 300;

/// Default interval between receipt polls.
pub const DEFAULT_RECEIPT_POLL_INTERVAL_MS: u64 = 2_000;

// ── Error decoding ───────────────────────────────────────────────────────────

/// Final fallback message when a failure carries nothing displayable.
pub const UNKNOWN_TX_ERROR: &str = "Unknown transaction error";

/// Message used when a mined receipt reports failure and no reason could be
/// recovered by replaying the call.
pub const GENERIC_REVERT_MESSAGE: &str = "Transaction reverted on-chain";
