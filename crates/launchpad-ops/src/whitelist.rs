//! Whitelist management.
//!
//! The whitelist contract accepts changes until the presale's end time, so
//! that is the gate applied here. Changes made after contribution opened
//! are allowed but logged. Each address is its own transaction; a batch
//! reports one outcome per address and never stops early or retries.

use std::sync::Arc;

use alloy_sol_types::SolCall;
use tracing::{info, warn};

use launchpad_chain::contracts::IWhitelist;
use launchpad_chain::{PresaleReader, TxRequest, TxSubmitter, WhitelistReader};
use launchpad_core::error::TxError;
use launchpad_core::types::{Address, Timestamp, TxHash};
use launchpad_presale::{phase, whitelist_management_allowed, Ineligible, Phase};

use crate::error::ActionError;
use crate::target::PresaleTarget;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WhitelistOp {
    Add,
    Remove,
}

impl WhitelistOp {
    fn label(self) -> &'static str {
        match self {
            WhitelistOp::Add => "whitelist-add",
            WhitelistOp::Remove => "whitelist-remove",
        }
    }

    fn call(self, wallet: Address) -> Vec<u8> {
        match self {
            WhitelistOp::Add => IWhitelist::addToWhitelistCall { wallet }.abi_encode(),
            WhitelistOp::Remove => IWhitelist::removeFromWhitelistCall { wallet }.abi_encode(),
        }
    }

    /// Membership that makes this operation a no-op.
    fn satisfied_by(self, whitelisted: bool) -> bool {
        match self {
            WhitelistOp::Add => whitelisted,
            WhitelistOp::Remove => !whitelisted,
        }
    }
}

/// Per-address result of a whitelist change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WhitelistOutcome {
    Applied(TxHash),
    /// Already in the requested state; nothing was sent.
    Unchanged,
    Failed(TxError),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub results: Vec<(Address, WhitelistOutcome)>,
}

impl BatchReport {
    pub fn applied(&self) -> usize {
        self.count(|o| matches!(o, WhitelistOutcome::Applied(_)))
    }

    pub fn unchanged(&self) -> usize {
        self.count(|o| matches!(o, WhitelistOutcome::Unchanged))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, WhitelistOutcome::Failed(_)))
    }

    pub fn is_complete(&self) -> bool {
        self.failed() == 0
    }

    fn count(&self, pred: impl Fn(&WhitelistOutcome) -> bool) -> usize {
        self.results.iter().filter(|(_, o)| pred(o)).count()
    }
}

pub struct WhitelistManager {
    submitter: Arc<TxSubmitter>,
}

impl WhitelistManager {
    pub fn new(submitter: Arc<TxSubmitter>) -> Self {
        Self { submitter }
    }

    pub async fn add(
        &self,
        target: &PresaleTarget,
        wallet: Address,
        now: Timestamp,
    ) -> Result<WhitelistOutcome, ActionError> {
        self.change(target, WhitelistOp::Add, wallet, now).await
    }

    pub async fn remove(
        &self,
        target: &PresaleTarget,
        wallet: Address,
        now: Timestamp,
    ) -> Result<WhitelistOutcome, ActionError> {
        self.change(target, WhitelistOp::Remove, wallet, now).await
    }

    /// Apply `op` to each wallet in order, one transaction each.
    ///
    /// Errors that concern the whole batch (no whitelist contract, window
    /// closed, no signer) are returned before anything is sent.
    pub async fn apply_batch(
        &self,
        target: &PresaleTarget,
        op: WhitelistOp,
        wallets: &[Address],
        now: Timestamp,
    ) -> Result<BatchReport, ActionError> {
        let whitelist = self.preflight(target, now).await?;
        let mut report = BatchReport::default();
        for &wallet in wallets {
            let outcome = match self.apply(whitelist, op, wallet).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(%whitelist, %wallet, error = %e, "{} failed", op.label());
                    WhitelistOutcome::Failed(e)
                }
            };
            report.results.push((wallet, outcome));
        }
        info!(
            %whitelist,
            applied = report.applied(),
            unchanged = report.unchanged(),
            failed = report.failed(),
            "{} batch done",
            op.label()
        );
        Ok(report)
    }

    async fn change(
        &self,
        target: &PresaleTarget,
        op: WhitelistOp,
        wallet: Address,
        now: Timestamp,
    ) -> Result<WhitelistOutcome, ActionError> {
        let whitelist = self.preflight(target, now).await?;
        Ok(self.apply(whitelist, op, wallet).await?)
    }

    async fn preflight(&self, target: &PresaleTarget, now: Timestamp) -> Result<Address, ActionError> {
        let whitelist = target.require_whitelist()?;
        self.submitter.signer().await?;

        let state = PresaleReader::new(self.submitter.client(), target.presale)
            .state()
            .await?;
        if !whitelist_management_allowed(&state, now) {
            return Err(Ineligible::WhitelistClosed.into());
        }
        let current = phase(&state, now);
        if !matches!(current, Phase::NotStarted | Phase::WhitelistOnly) {
            warn!(presale = %target.presale, phase = %current, "changing the whitelist after contribution opened");
        }
        Ok(whitelist)
    }

    async fn apply(
        &self,
        whitelist: Address,
        op: WhitelistOp,
        wallet: Address,
    ) -> Result<WhitelistOutcome, TxError> {
        if wallet == Address::ZERO {
            return Err(TxError::config("wallet is the zero address"));
        }
        let member = WhitelistReader::new(self.submitter.client(), whitelist)
            .is_whitelisted(wallet)
            .await?;
        if op.satisfied_by(member) {
            return Ok(WhitelistOutcome::Unchanged);
        }
        let tx = TxRequest::call(whitelist, op.call(wallet));
        let receipt = self.submitter.submit(op.label(), tx).await?;
        Ok(WhitelistOutcome::Applied(receipt.transaction_hash))
    }
}
