use chrono::DateTime;

use launchpad_core::presale::PresaleOnChainState;
use launchpad_core::types::{Amount, Timestamp};

use crate::phase::{Phase, PresaleStatus};
use crate::vesting::{next_release, vested_at};

/// Human-readable summary of a presale's state at `now`.
pub fn describe(state: &PresaleOnChainState, now: Timestamp) -> String {
    let status = PresaleStatus::evaluate(state, now);

    let detail = match status.phase {
        Phase::NotStarted => format!("opens {}", fmt_time(state.start_time)),
        Phase::WhitelistOnly => {
            format!("whitelisted wallets only until {}", fmt_time(state.public_start()))
        }
        Phase::Active if status.misconfigured => {
            "hard cap is zero, contributions disabled".to_string()
        }
        Phase::Active => format!("open until {}", fmt_time(state.end_time)),
        Phase::HardcapReached => "hard cap filled, awaiting finalize".to_string(),
        Phase::EndedPendingFinalize => "ended without finalize, refunds open".to_string(),
        Phase::Finalized if status.claim_allowed => "claims open".to_string(),
        Phase::Finalized => format!("claims open {}", fmt_time(state.claim_time())),
    };

    format!(
        "Presale {} | raised {} / {} ({}.{:02}%) | {}",
        status.phase,
        state.total_raised,
        state.hard_cap,
        status.progress_bps / 100,
        status.progress_bps % 100,
        detail
    )
}

/// Vesting progress of one locked allocation at `now`, as the schedule
/// predicts it.
pub fn describe_vesting(total: Amount, months: u32, start: Timestamp, now: Timestamp) -> String {
    let vested = vested_at(total, months, start, now);
    match next_release(total, months, start, now) {
        Some(next) => format!(
            "vested {vested} / {total} | next {} at {}",
            next.amount,
            fmt_time(next.unlock_at)
        ),
        None => format!("vested {vested} / {total} | fully unlocked"),
    }
}

fn fmt_time(ts: Timestamp) -> String {
    DateTime::from_timestamp(ts, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| format!("@{ts}"))
}
