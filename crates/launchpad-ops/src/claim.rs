//! Presale and allocation claims.
//!
//! Preconditions mirror the contracts so obviously doomed claims are never
//! sent, but the contract stays authoritative. After a successful claim the
//! balances are read back from the chain instead of being adjusted locally.

use std::sync::Arc;

use alloy_sol_types::SolCall;
use tracing::{info, warn};

use launchpad_chain::contracts::{ILocker, IPresale};
use launchpad_chain::{LockerReader, PresaleReader, TxRequest, TxSubmitter};
use launchpad_core::error::TxError;
use launchpad_core::presale::ContributionRecord;
use launchpad_core::project::ProjectRecord;
use launchpad_core::types::{parse_address, Address, Amount, Timestamp, TxHash};
use launchpad_presale::{allocation_amount, vested_at, wallet_can_claim, Ineligible};

use crate::error::ActionError;
use crate::target::PresaleTarget;

/// Outcome of an allocation claim.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AllocationClaim {
    pub locker: Address,
    pub tx_hash: TxHash,
    /// Claimable balance read back after the claim was mined.
    pub claimable_after: Amount,
}

pub struct ClaimManager {
    submitter: Arc<TxSubmitter>,
}

impl ClaimManager {
    pub fn new(submitter: Arc<TxSubmitter>) -> Self {
        Self { submitter }
    }

    /// Claim the connected wallet's sale tokens from a finalized presale.
    /// Returns the wallet's record as read after the claim.
    pub async fn claim_presale(
        &self,
        target: &PresaleTarget,
        now: Timestamp,
    ) -> Result<ContributionRecord, ActionError> {
        let wallet = self.submitter.signer().await?;
        let reader = PresaleReader::new(self.submitter.client(), target.presale);
        let state = reader.state().await?;
        let record = reader.contribution(wallet).await?;
        wallet_can_claim(&state, &record, now)?;

        let tx = TxRequest::call(target.presale, IPresale::claimCall {}.abi_encode());
        let receipt = self.submitter.submit("claim-presale", tx).await?;

        let after = reader.contribution(wallet).await?;
        info!(
            presale = %target.presale,
            %wallet,
            tx_hash = %receipt.transaction_hash,
            claimed_total = %after.claimed_token,
            "presale tokens claimed"
        );
        Ok(after)
    }

    /// Claim the connected wallet's vested share of allocation `index`.
    ///
    /// The allocation's own locker address is used when set, otherwise the
    /// project locker. Only the locker's `claimable` decides whether a claim
    /// is sent; the record's start date is advisory.
    pub async fn claim_allocation(
        &self,
        project: &ProjectRecord,
        index: usize,
        now: Timestamp,
    ) -> Result<AllocationClaim, ActionError> {
        let allocation = project.allocations.get(index).ok_or_else(|| {
            TxError::config(format!(
                "project {} has no allocation #{index}",
                project.id
            ))
        })?;
        if allocation.is_presale {
            return Err(TxError::config(format!(
                "allocation {:?} is sold through the presale; claim it there",
                allocation.name
            ))
            .into());
        }
        if !allocation.needs_locker() {
            return Err(TxError::config(format!(
                "allocation {:?} has no vesting and is not held by a locker",
                allocation.name
            ))
            .into());
        }
        let raw = allocation
            .contract_address
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or(project.locker_address.as_deref());
        let locker = parse_address("allocation locker address", raw)?;

        let wallet = self.submitter.signer().await?;
        let reader = LockerReader::new(self.submitter.client(), locker);
        let claimable = reader.claimable(wallet).await?;
        let total = allocation_amount(project.total_supply, allocation.supply);
        let expected = vested_at(total, allocation.vesting, allocation.start_date, now);
        if expected.is_zero() && !claimable.is_zero() {
            warn!(
                project = %project.id,
                allocation = %allocation.name,
                start_date = allocation.start_date,
                %claimable,
                "locker reports a claimable balance the recorded schedule has not vested"
            );
        }
        if claimable.is_zero() {
            return Err(Ineligible::NothingToClaim.into());
        }

        let tx = TxRequest::call(locker, ILocker::claimCall {}.abi_encode());
        let receipt = self.submitter.submit("claim-allocation", tx).await?;

        let claimable_after = reader.claimable(wallet).await?;
        info!(
            project = %project.id,
            allocation = %allocation.name,
            %locker,
            %wallet,
            tx_hash = %receipt.transaction_hash,
            "allocation claimed"
        );
        Ok(AllocationClaim {
            locker,
            tx_hash: receipt.transaction_hash,
            claimable_after,
        })
    }
}
