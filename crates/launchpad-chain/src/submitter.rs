use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use launchpad_core::constants::{
    DEFAULT_CONFIRMATION_TIMEOUT_SECS, DEFAULT_RECEIPT_POLL_INTERVAL_MS, GENERIC_REVERT_MESSAGE,
};
use launchpad_core::error::TxError;
use launchpad_core::types::{Address, TxHash};

use crate::client::{ChainClient, TxReceipt, TxRequest};
use crate::decode::decode_failure;
use crate::failure::classify;

/// Timing knobs for waiting on mining.
#[derive(Debug, Clone, Copy)]
pub struct SubmitterConfig {
    /// How long to wait for a receipt before reporting a timeout.
    pub confirmation_timeout: Duration,
    /// Delay between receipt polls.
    pub poll_interval: Duration,
}

impl Default for SubmitterConfig {
    fn default() -> Self {
        Self {
            confirmation_timeout: Duration::from_secs(DEFAULT_CONFIRMATION_TIMEOUT_SECS),
            poll_interval: Duration::from_millis(DEFAULT_RECEIPT_POLL_INTERVAL_MS),
        }
    }
}

/// Submits transactions from the connected signer, one at a time.
///
/// The signer is a single shared resource: a second submission waits until
/// the first has been mined, failed, or timed out. Nothing is ever resent.
pub struct TxSubmitter {
    client: Arc<dyn ChainClient>,
    config: SubmitterConfig,
    in_flight: Mutex<()>,
}

impl TxSubmitter {
    pub fn new(client: Arc<dyn ChainClient>, config: SubmitterConfig) -> Self {
        Self {
            client,
            config,
            in_flight: Mutex::new(()),
        }
    }

    pub fn client(&self) -> &dyn ChainClient {
        self.client.as_ref()
    }

    /// The connected signer. `NotConnected` when there is none.
    pub async fn signer(&self) -> Result<Address, TxError> {
        match self.client.signer().await {
            Ok(Some(addr)) => Ok(addr),
            Ok(None) => Err(TxError::NotConnected),
            Err(f) => Err(match classify(&f) {
                TxError::UserRejected => TxError::UserRejected,
                _ => TxError::NotConnected,
            }),
        }
    }

    /// Sign and broadcast `tx`. The returned handle holds the signer slot
    /// until it is confirmed or dropped.
    pub async fn send(&self, label: &str, tx: TxRequest) -> Result<PendingTx<'_>, TxError> {
        let slot = self.in_flight.lock().await;
        let from = self.signer().await?;

        let tx_hash = self.client.send_transaction(from, &tx).await.map_err(|f| {
            let err = classify(&f);
            warn!(label, error = %err, "transaction not sent");
            err
        })?;
        info!(label, %from, %tx_hash, "transaction submitted");

        Ok(PendingTx {
            submitter: self,
            _slot: slot,
            label: label.to_string(),
            from,
            tx_hash,
            request: tx,
        })
    }

    /// `send` followed by `confirm`.
    pub async fn submit(&self, label: &str, tx: TxRequest) -> Result<TxReceipt, TxError> {
        self.send(label, tx).await?.confirm().await
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<TxReceipt, TxError> {
        let poll = async {
            loop {
                match self.client.transaction_receipt(tx_hash).await {
                    Ok(Some(receipt)) => return receipt,
                    Ok(None) => {}
                    Err(f) => debug!(%tx_hash, error = %f, "receipt poll failed"),
                }
                tokio::time::sleep(self.config.poll_interval).await;
            }
        };
        tokio::time::timeout(self.config.confirmation_timeout, poll)
            .await
            .map_err(|_| {
                warn!(%tx_hash, "confirmation timed out; transaction may still be mined");
                TxError::ConfirmationTimeout { tx_hash }
            })
    }

    /// Replay a failed transaction as a call to recover its revert reason.
    async fn revert_reason(&self, from: Address, tx: &TxRequest) -> String {
        match self.client.call(Some(from), tx, None).await {
            Err(f) => decode_failure(&f.0),
            Ok(_) => GENERIC_REVERT_MESSAGE.to_string(),
        }
    }
}

/// A broadcast transaction awaiting its receipt.
pub struct PendingTx<'a> {
    submitter: &'a TxSubmitter,
    _slot: MutexGuard<'a, ()>,
    label: String,
    pub from: Address,
    pub tx_hash: TxHash,
    request: TxRequest,
}

impl PendingTx<'_> {
    /// Wait until mined. A mined-but-failed receipt is `ContractReverted`.
    pub async fn confirm(self) -> Result<TxReceipt, TxError> {
        let receipt = self.submitter.wait_for_receipt(self.tx_hash).await?;
        if !receipt.status {
            let message = self.submitter.revert_reason(self.from, &self.request).await;
            warn!(label = %self.label, tx_hash = %self.tx_hash, %message, "transaction reverted");
            return Err(TxError::ContractReverted { message });
        }
        info!(
            label = %self.label,
            tx_hash = %self.tx_hash,
            block = ?receipt.block_number,
            "transaction mined"
        );
        Ok(receipt)
    }
}
