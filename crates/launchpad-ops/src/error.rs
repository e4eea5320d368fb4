use thiserror::Error;

use launchpad_core::error::TxError;
use launchpad_core::types::{Address, TxHash};
use launchpad_presale::Ineligible;
use launchpad_store::StoreError;

/// Failure of a deployment step.
///
/// The variants keep partial progress visible: a locker that exists but
/// was never funded, or a contract that is on-chain but missing from the
/// store, is never reported as a plain failure.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error(transparent)]
    Tx(#[from] TxError),

    #[error("project store: {0}")]
    Store(#[from] StoreError),

    /// The locker exists on-chain; only the distribution may be retried.
    #[error("locker deployed at {locker} but allocations were not distributed: {source}")]
    NotDistributed {
        locker: Address,
        #[source]
        source: TxError,
    },

    /// The step was mined but the store did not accept the new metadata.
    #[error("{what} {address} is on-chain (tx {tx_hash}) but was not recorded in the store: {source}")]
    NotPersisted {
        what: &'static str,
        address: Address,
        tx_hash: TxHash,
        #[source]
        source: StoreError,
    },
}

impl DeployError {
    /// Something irreversible happened on-chain before the error.
    pub fn is_partial(&self) -> bool {
        matches!(
            self,
            DeployError::NotDistributed { .. } | DeployError::NotPersisted { .. }
        )
    }
}

/// Failure of a wallet or administrator action.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Tx(#[from] TxError),

    /// Rejected locally; nothing was sent.
    #[error("{0}")]
    NotEligible(#[from] Ineligible),
}

impl ActionError {
    pub fn tx(&self) -> Option<&TxError> {
        match self {
            ActionError::Tx(e) => Some(e),
            ActionError::NotEligible(_) => None,
        }
    }
}
