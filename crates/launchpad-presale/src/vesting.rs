//! Allocation vesting schedule.
//!
//! Lockers release an allocation linearly, one tranche per 30-day month,
//! starting one month after `start_date`. An allocation with zero vesting
//! months unlocks in full at `start_date`.
//!
//!   tranche_k = total / months      (k = 1..=months)
//!   unlock_k  = start + k × MONTH_SECS
//!
//! Integer division dust is added to the first tranche so the tranches sum
//! exactly to `total`. Everything is computed arithmetically; no schedule is
//! materialized. These figures are for display and advisory checks only,
//! the locker contract's own math decides what is actually paid.

use launchpad_core::constants::{BPS_DENOMINATOR, MONTH_SECS, PERCENT_SCALE};
use launchpad_core::types::{Amount, Timestamp, U256};

/// One scheduled tranche.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VestingRelease {
    /// 1-based tranche index (0 for an unvested allocation's single release).
    pub index: u32,
    pub amount: Amount,
    pub unlock_at: Timestamp,
}

/// Token units for an allocation given as a percentage of total supply.
///
/// The percentage is rounded to two decimals and clamped to `0..=100`.
pub fn allocation_amount(total_supply: Amount, supply_percent: f64) -> Amount {
    let bps = if supply_percent.is_finite() {
        (supply_percent * PERCENT_SCALE)
            .round()
            .clamp(0.0, BPS_DENOMINATOR as f64) as u64
    } else {
        0
    };
    total_supply.saturating_mul(U256::from(bps)) / U256::from(BPS_DENOMINATOR)
}

/// Whole months elapsed since `start`, capped at `months`.
fn elapsed_months(months: u32, start: Timestamp, now: Timestamp) -> u32 {
    if now < start {
        return 0;
    }
    let elapsed = now.saturating_sub(start) / MONTH_SECS;
    u32::try_from(elapsed).unwrap_or(u32::MAX).min(months)
}

/// Per-tranche amount and the dust carried by the first tranche.
fn tranche(total: Amount, months: u32) -> (Amount, Amount) {
    let n = U256::from(months);
    let per = total / n;
    (per, total - per * n)
}

/// Cumulative amount unlocked at `now`.
pub fn vested_at(total: Amount, months: u32, start: Timestamp, now: Timestamp) -> Amount {
    if months == 0 {
        return if now >= start { total } else { U256::ZERO };
    }
    let elapsed = elapsed_months(months, start, now);
    if elapsed == 0 {
        return U256::ZERO;
    }
    let (per, dust) = tranche(total, months);
    per * U256::from(elapsed) + dust
}

/// The first tranche still locked at `now`, if any.
pub fn next_release(
    total: Amount,
    months: u32,
    start: Timestamp,
    now: Timestamp,
) -> Option<VestingRelease> {
    if months == 0 {
        return (now < start).then_some(VestingRelease {
            index: 0,
            amount: total,
            unlock_at: start,
        });
    }
    let elapsed = elapsed_months(months, start, now);
    if elapsed == months {
        return None;
    }
    let index = elapsed + 1;
    let (per, dust) = tranche(total, months);
    Some(VestingRelease {
        index,
        amount: if index == 1 { per + dust } else { per },
        unlock_at: start.saturating_add(i64::from(index).saturating_mul(MONTH_SECS)),
    })
}
