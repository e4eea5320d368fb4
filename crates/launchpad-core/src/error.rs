use thiserror::Error;

use crate::types::TxHash;

/// Normalised outcome of a failed on-chain interaction.
///
/// Whatever the underlying chain client throws is classified into one of
/// these kinds before it reaches business logic or the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TxError {
    /// The signer declined to sign. Nothing was broadcast.
    #[error("transaction was rejected in the wallet")]
    UserRejected,

    /// No wallet/signer is available.
    #[error("no wallet connected")]
    NotConnected,

    /// The transaction (or its simulation) reverted. `message` is already
    /// decoded and safe to display.
    #[error("{message}")]
    ContractReverted { message: String },

    /// Mining was not observed in time. The transaction may still land.
    #[error("transaction {tx_hash} was not mined within the timeout; it may still be included later")]
    ConfirmationTimeout { tx_hash: TxHash },

    /// Missing or invalid address/parameter, detected before submission.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A non-fatal external service (e.g. source verification) failed.
    #[error("external service error: {0}")]
    ExternalService(String),
}

impl TxError {
    pub fn config(msg: impl Into<String>) -> Self {
        TxError::Configuration(msg.into())
    }

    pub fn reverted(msg: impl Into<String>) -> Self {
        TxError::ContractReverted { message: msg.into() }
    }

    /// True for errors raised before anything touched the network.
    pub fn is_pre_submission(&self) -> bool {
        matches!(self, TxError::Configuration(_) | TxError::NotConnected)
    }

    /// True when the outcome of a broadcast transaction is not yet known.
    pub fn is_pending(&self) -> bool {
        matches!(self, TxError::ConfirmationTimeout { .. })
    }
}
