//! Read-only views of the presale, whitelist and locker contracts.
//!
//! Return data is decoded as static 32-byte words. A response that is too
//! short means the address does not host the expected contract, which is
//! reported as a configuration error.

use alloy_sol_types::SolCall;
use tracing::debug;

use launchpad_core::error::TxError;
use launchpad_core::presale::{ContributionRecord, PresaleOnChainState};
use launchpad_core::types::{Address, Amount, Bytes, Timestamp, U256};

use crate::client::{ChainClient, TxRequest};
use crate::contracts::{ILocker, IPresale, IWhitelist};
use crate::failure::classify;

async fn read(
    client: &dyn ChainClient,
    contract: Address,
    call: impl SolCall,
    block: Option<u64>,
) -> Result<Bytes, TxError> {
    let req = TxRequest::call(contract, call.abi_encode());
    client.call(None, &req, block).await.map_err(|f| classify(&f))
}

fn word(data: &[u8], index: usize, what: &str, contract: Address) -> Result<U256, TxError> {
    let start = index * 32;
    data.get(start..start + 32)
        .map(U256::from_be_slice)
        .ok_or_else(|| {
            TxError::config(format!(
                "{contract} returned malformed data for {what}; is this the right contract?"
            ))
        })
}

fn to_timestamp(v: U256) -> Timestamp {
    i64::try_from(v.saturating_to::<u64>()).unwrap_or(i64::MAX)
}

// ── Presale ──────────────────────────────────────────────────────────────────

pub struct PresaleReader<'a> {
    client: &'a dyn ChainClient,
    address: Address,
}

impl<'a> PresaleReader<'a> {
    pub fn new(client: &'a dyn ChainClient, address: Address) -> Self {
        Self { client, address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    async fn uint(&self, call: impl SolCall, what: &str, block: u64) -> Result<U256, TxError> {
        let data = read(self.client, self.address, call, Some(block)).await?;
        word(&data, 0, what, self.address)
    }

    /// Fresh snapshot of the presale's on-chain state. Every field is read
    /// at the same block.
    pub async fn state(&self) -> Result<PresaleOnChainState, TxError> {
        let block = self.client.block_number().await.map_err(|f| classify(&f))?;
        let state = PresaleOnChainState {
            start_time: to_timestamp(self.uint(IPresale::startTimeCall {}, "startTime", block).await?),
            end_time: to_timestamp(self.uint(IPresale::endTimeCall {}, "endTime", block).await?),
            whitelist_duration: to_timestamp(
                self.uint(IPresale::whitelistDurationCall {}, "whitelistDuration", block)
                    .await?,
            ),
            claim_delay: to_timestamp(
                self.uint(IPresale::claimDelayCall {}, "claimDelay", block).await?,
            ),
            finalized: !self
                .uint(IPresale::finalizedCall {}, "finalized", block)
                .await?
                .is_zero(),
            hard_cap: self.uint(IPresale::hardCapCall {}, "hardCap", block).await?,
            total_raised: self.uint(IPresale::totalRaisedCall {}, "totalRaised", block).await?,
            tokens_needed: self.uint(IPresale::tokensNeededCall {}, "tokensNeeded", block).await?,
        };
        debug!(presale = %self.address, block, ?state, "presale state read");
        Ok(state)
    }

    /// The wallet's contribution record.
    pub async fn contribution(&self, wallet: Address) -> Result<ContributionRecord, TxError> {
        let data = read(self.client, self.address, IPresale::contributionsCall { wallet }, None).await?;
        Ok(ContributionRecord {
            contribution: word(&data, 0, "contributions", self.address)?,
            claimable: word(&data, 1, "contributions", self.address)?,
            claimed_token: word(&data, 2, "contributions", self.address)?,
            is_refunded: !word(&data, 3, "contributions", self.address)?.is_zero(),
        })
    }
}

// ── Whitelist ────────────────────────────────────────────────────────────────

pub struct WhitelistReader<'a> {
    client: &'a dyn ChainClient,
    address: Address,
}

impl<'a> WhitelistReader<'a> {
    pub fn new(client: &'a dyn ChainClient, address: Address) -> Self {
        Self { client, address }
    }

    pub async fn is_whitelisted(&self, wallet: Address) -> Result<bool, TxError> {
        let data =
            read(self.client, self.address, IWhitelist::isWhitelistedCall { wallet }, None).await?;
        Ok(!word(&data, 0, "isWhitelisted", self.address)?.is_zero())
    }
}

// ── Locker ───────────────────────────────────────────────────────────────────

pub struct LockerReader<'a> {
    client: &'a dyn ChainClient,
    address: Address,
}

impl<'a> LockerReader<'a> {
    pub fn new(client: &'a dyn ChainClient, address: Address) -> Self {
        Self { client, address }
    }

    /// Tokens the wallet can claim from this locker right now.
    pub async fn claimable(&self, wallet: Address) -> Result<Amount, TxError> {
        let data = read(self.client, self.address, ILocker::claimableCall { wallet }, None).await?;
        word(&data, 0, "claimable", self.address)
    }
}
