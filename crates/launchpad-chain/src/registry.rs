//! Registry of custom errors raised by the presale/token/locker contracts.
//!
//! Adding a custom error to the contracts requires adding it here in the
//! same release and bumping `REGISTRY_VERSION`.

use std::collections::HashMap;

use alloy_sol_types::{sol, SolError};
use once_cell::sync::Lazy;

/// Bumped whenever an entry is added, removed or reworded.
pub const REGISTRY_VERSION: u32 = 1;

sol! {
    error HardCapExceeded();
    error NotWhitelisted();
    error PresaleFinalized();
    error NothingToClaim();
    error RefundNotAllowed();
    error ZeroAddress();
    error ZeroAmount();
    error PresaleNotStarted();
    error PresaleEnded();
    error ClaimNotStarted();
    error AlreadyRefunded();
    error AlreadyWhitelisted();
    error NotInWhitelist();
    error NotFinalized();
    error AlreadyDistributed();

    // Library errors the contracts inherit. Decodable, no fixed message.
    error OwnableUnauthorizedAccount(address account);
    error ERC20InsufficientBalance(address sender, uint256 balance, uint256 needed);
    error ERC20InsufficientAllowance(address spender, uint256 allowance, uint256 needed);
    error ReentrancyGuardReentrantCall();
}

/// One known custom error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevertEntry {
    pub selector: [u8; 4],
    /// Canonical signature, e.g. `PresaleFinalized()`.
    pub signature: &'static str,
    /// Fixed user-facing message; `None` falls back to the error name.
    pub message: Option<&'static str>,
}

impl RevertEntry {
    const fn of<E: SolError>(message: Option<&'static str>) -> Self {
        Self {
            selector: E::SELECTOR,
            signature: E::SIGNATURE,
            message,
        }
    }

    /// Error name without the parameter list.
    pub fn name(&self) -> &'static str {
        match self.signature.find('(') {
            Some(i) => &self.signature[..i],
            None => self.signature,
        }
    }

    /// Message shown to the user.
    pub fn display(&self) -> &'static str {
        self.message.unwrap_or_else(|| self.name())
    }
}

static ENTRIES: &[RevertEntry] = &[
    RevertEntry::of::<HardCapExceeded>(Some("Contribution exceeds the presale hard cap.")),
    RevertEntry::of::<NotWhitelisted>(Some("Your wallet is not whitelisted for this presale.")),
    RevertEntry::of::<PresaleFinalized>(Some("This presale has already been finalized.")),
    RevertEntry::of::<NothingToClaim>(Some("There is nothing to claim yet.")),
    RevertEntry::of::<RefundNotAllowed>(Some("Refunds are not allowed at this stage.")),
    RevertEntry::of::<ZeroAddress>(Some("Address must not be the zero address.")),
    RevertEntry::of::<ZeroAmount>(Some("Amount must be greater than zero.")),
    RevertEntry::of::<PresaleNotStarted>(Some("This presale has not started yet.")),
    RevertEntry::of::<PresaleEnded>(Some("This presale has already ended.")),
    RevertEntry::of::<ClaimNotStarted>(Some("Claiming has not opened yet.")),
    RevertEntry::of::<AlreadyRefunded>(Some("This wallet has already been refunded.")),
    RevertEntry::of::<AlreadyWhitelisted>(Some("Wallet is already whitelisted.")),
    RevertEntry::of::<NotInWhitelist>(Some("Wallet is not on the whitelist.")),
    RevertEntry::of::<NotFinalized>(Some("This presale has not been finalized yet.")),
    RevertEntry::of::<AlreadyDistributed>(Some("Locker allocations have already been distributed.")),
    RevertEntry::of::<OwnableUnauthorizedAccount>(None),
    RevertEntry::of::<ERC20InsufficientBalance>(None),
    RevertEntry::of::<ERC20InsufficientAllowance>(None),
    RevertEntry::of::<ReentrancyGuardReentrantCall>(None),
];

static BY_SELECTOR: Lazy<HashMap<[u8; 4], &'static RevertEntry>> =
    Lazy::new(|| ENTRIES.iter().map(|e| (e.selector, e)).collect());

/// Entry for the first four bytes of a revert payload.
pub fn lookup(payload: &[u8]) -> Option<&'static RevertEntry> {
    let selector: [u8; 4] = payload.get(..4)?.try_into().ok()?;
    BY_SELECTOR.get(&selector).copied()
}
