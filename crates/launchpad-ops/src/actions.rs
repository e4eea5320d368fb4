//! Contribute, refund and finalize.
//!
//! Each action re-reads the presale after mining and returns what the
//! chain reports; `total_raised` and the wallet record are never patched
//! locally.

use std::sync::Arc;

use alloy_sol_types::SolCall;
use tracing::info;

use launchpad_chain::contracts::IPresale;
use launchpad_chain::{PresaleReader, TxRequest, TxSubmitter, WhitelistReader};
use launchpad_core::presale::{ContributionRecord, PresaleOnChainState};
use launchpad_core::types::{Address, Amount, Timestamp};
use launchpad_presale::{
    contribution_allowed, finalize_allowed, wallet_can_refund, whitelist_contribution_window,
    Ineligible, PresaleStatus,
};

use crate::error::ActionError;
use crate::target::PresaleTarget;

pub struct PresaleActions {
    submitter: Arc<TxSubmitter>,
}

impl PresaleActions {
    pub fn new(submitter: Arc<TxSubmitter>) -> Self {
        Self { submitter }
    }

    fn reader(&self, target: &PresaleTarget) -> PresaleReader<'_> {
        PresaleReader::new(self.submitter.client(), target.presale)
    }

    pub async fn state(&self, target: &PresaleTarget) -> Result<PresaleOnChainState, ActionError> {
        Ok(self.reader(target).state().await?)
    }

    pub async fn status(
        &self,
        target: &PresaleTarget,
        now: Timestamp,
    ) -> Result<PresaleStatus, ActionError> {
        Ok(PresaleStatus::evaluate(&self.state(target).await?, now))
    }

    pub async fn contribution(
        &self,
        target: &PresaleTarget,
        wallet: Address,
    ) -> Result<ContributionRecord, ActionError> {
        Ok(self.reader(target).contribution(wallet).await?)
    }

    /// Contribute `amount` from the connected wallet.
    ///
    /// Allowed in the public window, or in the whitelist window for a
    /// whitelisted wallet. An amount above the remaining capacity is
    /// rejected here rather than left to revert.
    pub async fn contribute(
        &self,
        target: &PresaleTarget,
        amount: Amount,
        now: Timestamp,
    ) -> Result<PresaleOnChainState, ActionError> {
        if amount.is_zero() {
            return Err(Ineligible::ZeroAmount.into());
        }
        let wallet = self.submitter.signer().await?;
        let reader = self.reader(target);
        let state = reader.state().await?;

        if state.is_misconfigured() {
            return Err(Ineligible::Misconfigured.into());
        }
        if !contribution_allowed(&state, now) {
            if !whitelist_contribution_window(&state, now) {
                return Err(Ineligible::ContributionClosed.into());
            }
            let listed = match target.whitelist {
                Some(whitelist) => {
                    WhitelistReader::new(self.submitter.client(), whitelist)
                        .is_whitelisted(wallet)
                        .await?
                }
                None => false,
            };
            if !listed {
                return Err(Ineligible::NotWhitelisted.into());
            }
        }
        if amount > state.remaining_capacity() {
            return Err(Ineligible::ExceedsCapacity.into());
        }

        let tx = TxRequest::call(target.presale, IPresale::contributeCall {}.abi_encode())
            .with_value(amount);
        let receipt = self.submitter.submit("contribute", tx).await?;

        let after = reader.state().await?;
        info!(
            presale = %target.presale,
            %wallet,
            %amount,
            tx_hash = %receipt.transaction_hash,
            total_raised = %after.total_raised,
            "contribution mined"
        );
        Ok(after)
    }

    /// Refund the connected wallet's contribution after a failed sale.
    pub async fn refund(
        &self,
        target: &PresaleTarget,
        now: Timestamp,
    ) -> Result<ContributionRecord, ActionError> {
        let wallet = self.submitter.signer().await?;
        let reader = self.reader(target);
        let state = reader.state().await?;
        let record = reader.contribution(wallet).await?;
        wallet_can_refund(&state, &record, now)?;

        let tx = TxRequest::call(target.presale, IPresale::refundCall {}.abi_encode());
        let receipt = self.submitter.submit("refund", tx).await?;

        let after = reader.contribution(wallet).await?;
        info!(
            presale = %target.presale,
            %wallet,
            tx_hash = %receipt.transaction_hash,
            refunded = after.is_refunded,
            "refund mined"
        );
        Ok(after)
    }

    /// Finalize the presale. Administrator only; the contract checks that.
    pub async fn finalize(
        &self,
        target: &PresaleTarget,
        now: Timestamp,
    ) -> Result<PresaleOnChainState, ActionError> {
        self.submitter.signer().await?;
        let reader = self.reader(target);
        let state = reader.state().await?;
        if !finalize_allowed(&state, now) {
            return Err(Ineligible::FinalizeNotAllowed.into());
        }

        let tx = TxRequest::call(target.presale, IPresale::finalizeCall {}.abi_encode());
        let receipt = self.submitter.submit("finalize", tx).await?;

        let after = reader.state().await?;
        info!(
            presale = %target.presale,
            tx_hash = %receipt.transaction_hash,
            finalized = after.finalized,
            "finalize mined"
        );
        Ok(after)
    }
}
