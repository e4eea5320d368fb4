//! In-memory chain, store and verifier used by the integration tests.
//!
//! `MockChain` simulates the presale, whitelist and locker contracts closely
//! enough to exercise the managers: it dispatches on call selectors, applies
//! state changes only on success and reverts with the registry's custom
//! errors.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy_sol_types::{Revert, SolCall, SolError};
use async_trait::async_trait;
use serde_json::json;

use launchpad_chain::contracts::{ILocker, IPresale, IWhitelist};
use launchpad_chain::registry::{
    AlreadyDistributed, AlreadyRefunded, AlreadyWhitelisted, ClaimNotStarted, HardCapExceeded,
    NotFinalized, NotInWhitelist, NotWhitelisted, NothingToClaim, PresaleEnded, PresaleFinalized,
    PresaleNotStarted, RefundNotAllowed, ZeroAddress, ZeroAmount,
};
use launchpad_chain::{ChainClient, ChainFailure, SubmitterConfig, TxReceipt, TxRequest, TxSubmitter};
use launchpad_core::presale::ContributionRecord;
use launchpad_core::project::{Allocation, DeploymentUpdate, PresaleRecord, ProjectRecord};
use launchpad_core::types::{Address, Bytes, Timestamp, TxHash, U256};
use launchpad_ops::{DeploymentEvent, DeploymentObserver, PresaleTarget};
use launchpad_store::{ProjectStore, SourceVerifier, StoreError, VerificationRequest};

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub const ADMIN: Address = Address::repeat_byte(0xad);
pub const ALICE: Address = Address::repeat_byte(0x11);
pub const BOB: Address = Address::repeat_byte(0x22);
pub const CAROL: Address = Address::repeat_byte(0x33);

pub const PRESALE: Address = Address::repeat_byte(0xa1);
pub const WHITELIST: Address = Address::repeat_byte(0xa2);
pub const TOKEN: Address = Address::repeat_byte(0x70);
pub const LOCKER: Address = Address::repeat_byte(0x10);

pub const TOKEN_CODE: [u8; 3] = [0x60, 0x80, 0x01];
pub const LOCKER_CODE: [u8; 3] = [0x60, 0x80, 0x02];

pub const START: Timestamp = 1_700_000_000;
pub const WHITELIST_SECS: i64 = 3_600;
pub const END: Timestamp = START + 7 * 24 * 3_600;
pub const CLAIM_DELAY: i64 = 600;

pub fn wei(n: u64) -> U256 {
    U256::from(n)
}

pub fn target() -> PresaleTarget {
    PresaleTarget::new(PRESALE, Some(WHITELIST))
}

pub fn project(id: &str) -> ProjectRecord {
    let alloc = |name: &str, supply: f64, vesting: u32, is_presale: bool| Allocation {
        name: name.to_string(),
        supply,
        vesting,
        start_date: START,
        contract_address: None,
        is_presale,
    };
    ProjectRecord {
        id: id.to_string(),
        name: "Moon".to_string(),
        ticker: "MOON".to_string(),
        total_supply: wei(1_000_000),
        contract_address: None,
        factory_address: None,
        locker_address: None,
        locker_distributed: false,
        locker_distribute_hash: None,
        allocations: vec![
            alloc("Presale", 40.0, 0, true),
            alloc("Team", 20.0, 12, false),
            alloc("Liquidity", 40.0, 0, false),
        ],
        presales: PresaleRecord {
            unit: "ETH".to_string(),
            hardcap: "1000".to_string(),
            price: "0.001".to_string(),
            whitelist_contract: Some(WHITELIST.to_string()),
            contract_address: Some(PRESALE.to_string()),
        },
    }
}

pub fn submitter(chain: &Arc<MockChain>) -> Arc<TxSubmitter> {
    submitter_with_timeout(chain, Duration::from_millis(200))
}

pub fn submitter_with_timeout(chain: &Arc<MockChain>, timeout: Duration) -> Arc<TxSubmitter> {
    let client: Arc<dyn ChainClient> = chain.clone();
    Arc::new(TxSubmitter::new(
        client,
        SubmitterConfig {
            confirmation_timeout: timeout,
            poll_interval: Duration::from_millis(1),
        },
    ))
}

// ── Chain ────────────────────────────────────────────────────────────────────

pub struct Sim {
    pub now: Timestamp,
    pub signer: Option<Address>,
    pub reject_signing: bool,
    /// Reject signing of any transaction whose calldata mentions this wallet.
    pub reject_wallet: Option<Address>,
    pub hold_receipts: bool,
    /// Revert during the pre-send simulation (true) or as a mined failure.
    pub revert_on_send: bool,
    pub fail_distribution: bool,
    pub fail_locker_creation: bool,

    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub whitelist_duration: i64,
    pub claim_delay: i64,
    pub finalized: bool,
    pub hard_cap: U256,
    pub total_raised: U256,
    pub tokens_needed: U256,
    pub contributions: HashMap<Address, ContributionRecord>,
    pub whitelist: HashSet<Address>,

    pub locker_claimable: HashMap<Address, U256>,
    pub locker_distributed: bool,

    pub sent: Vec<TxRequest>,
    /// Block tag of every view call, in order.
    pub call_blocks: Vec<Option<u64>>,
    receipts: HashMap<TxHash, TxReceipt>,
    replays: HashMap<(Option<Address>, Bytes), Vec<u8>>,
    nonce: u64,
}

impl Default for Sim {
    fn default() -> Self {
        Self {
            now: START + WHITELIST_SECS,
            signer: Some(ALICE),
            reject_signing: false,
            reject_wallet: None,
            hold_receipts: false,
            revert_on_send: true,
            fail_distribution: false,
            fail_locker_creation: false,
            start_time: START,
            end_time: END,
            whitelist_duration: WHITELIST_SECS,
            claim_delay: CLAIM_DELAY,
            finalized: false,
            hard_cap: wei(1_000),
            total_raised: U256::ZERO,
            tokens_needed: wei(400_000),
            contributions: HashMap::new(),
            whitelist: HashSet::new(),
            locker_claimable: HashMap::new(),
            locker_distributed: false,
            sent: Vec::new(),
            call_blocks: Vec::new(),
            receipts: HashMap::new(),
            replays: HashMap::new(),
            nonce: 0,
        }
    }
}

fn is<C: SolCall>(selector: &[u8]) -> bool {
    selector == C::SELECTOR.as_slice()
}

fn word(v: U256) -> Vec<u8> {
    v.to_be_bytes::<32>().to_vec()
}

fn flag(b: bool) -> Vec<u8> {
    word(U256::from(u8::from(b)))
}

fn revert<E: SolError>(e: E) -> Vec<u8> {
    e.abi_encode()
}

fn revert_failure(payload: &[u8]) -> ChainFailure {
    ChainFailure(json!({
        "code": 3,
        "message": "execution reverted",
        "data": format!("0x{}", hex::encode(payload)),
    }))
}

impl Sim {
    fn next_hash(&mut self) -> TxHash {
        self.nonce += 1;
        let mut bytes = [0u8; 32];
        bytes[0] = 0xee;
        bytes[24..].copy_from_slice(&self.nonce.to_be_bytes());
        TxHash::from(bytes)
    }

    fn record(&mut self, wallet: Address) -> &mut ContributionRecord {
        self.contributions.entry(wallet).or_default()
    }

    /// Apply `tx`. Returns the created contract, or the revert payload.
    fn execute(&mut self, from: Address, tx: &TxRequest) -> Result<Option<Address>, Vec<u8>> {
        let Some(to) = tx.to else {
            return self.create(tx);
        };
        let sel = tx.data.get(..4).unwrap_or_default();
        let now = self.now;

        if to == PRESALE && is::<IPresale::contributeCall>(sel) {
            let value = tx.value;
            if self.finalized {
                return Err(revert(PresaleFinalized {}));
            }
            if now < self.start_time {
                return Err(revert(PresaleNotStarted {}));
            }
            if now > self.end_time {
                return Err(revert(PresaleEnded {}));
            }
            if value.is_zero() {
                return Err(revert(ZeroAmount {}));
            }
            if now < self.start_time + self.whitelist_duration && !self.whitelist.contains(&from) {
                return Err(revert(NotWhitelisted {}));
            }
            if self.total_raised + value > self.hard_cap {
                return Err(revert(HardCapExceeded {}));
            }
            if self.record(from).is_refunded {
                return Err(revert(AlreadyRefunded {}));
            }
            self.total_raised += value;
            self.record(from).contribution += value;
            Ok(None)
        } else if to == PRESALE && is::<IPresale::claimCall>(sel) {
            if !self.finalized {
                return Err(revert(NotFinalized {}));
            }
            if now < self.end_time + self.claim_delay {
                return Err(revert(ClaimNotStarted {}));
            }
            let rec = self.record(from);
            if rec.claimable.is_zero() {
                return Err(revert(NothingToClaim {}));
            }
            rec.claimed_token += rec.claimable;
            rec.claimable = U256::ZERO;
            Ok(None)
        } else if to == PRESALE && is::<IPresale::refundCall>(sel) {
            if self.finalized || now <= self.end_time {
                return Err(revert(RefundNotAllowed {}));
            }
            let rec = self.record(from);
            if rec.is_refunded {
                return Err(revert(AlreadyRefunded {}));
            }
            if rec.contribution.is_zero() {
                return Err(revert(RefundNotAllowed {}));
            }
            rec.is_refunded = true;
            Ok(None)
        } else if to == PRESALE && is::<IPresale::finalizeCall>(sel) {
            if self.finalized {
                return Err(revert(PresaleFinalized {}));
            }
            self.finalized = true;
            let (needed, cap) = (self.tokens_needed, self.hard_cap);
            for rec in self.contributions.values_mut() {
                if !rec.is_refunded {
                    rec.claimable = rec.contribution * needed / cap;
                }
            }
            Ok(None)
        } else if to == WHITELIST && is::<IWhitelist::addToWhitelistCall>(sel) {
            let call = IWhitelist::addToWhitelistCall::abi_decode(&tx.data, true)
                .map_err(|_| revert(ZeroAddress {}))?;
            if call.wallet == Address::ZERO {
                return Err(revert(ZeroAddress {}));
            }
            if !self.whitelist.insert(call.wallet) {
                return Err(revert(AlreadyWhitelisted {}));
            }
            Ok(None)
        } else if to == WHITELIST && is::<IWhitelist::removeFromWhitelistCall>(sel) {
            let call = IWhitelist::removeFromWhitelistCall::abi_decode(&tx.data, true)
                .map_err(|_| revert(ZeroAddress {}))?;
            if !self.whitelist.remove(&call.wallet) {
                return Err(revert(NotInWhitelist {}));
            }
            Ok(None)
        } else if to == LOCKER && is::<ILocker::distributeCall>(sel) {
            if self.fail_distribution {
                return Err(Revert {
                    reason: "Ownable: caller is not the owner".to_string(),
                }
                .abi_encode());
            }
            if self.locker_distributed {
                return Err(revert(AlreadyDistributed {}));
            }
            self.locker_distributed = true;
            Ok(None)
        } else if to == LOCKER && is::<ILocker::claimCall>(sel) {
            let claimable = self.locker_claimable.entry(from).or_default();
            if claimable.is_zero() {
                return Err(revert(NothingToClaim {}));
            }
            *claimable = U256::ZERO;
            Ok(None)
        } else {
            Err(Revert {
                reason: "unknown function".to_string(),
            }
            .abi_encode())
        }
    }

    fn create(&mut self, tx: &TxRequest) -> Result<Option<Address>, Vec<u8>> {
        if tx.data.starts_with(&TOKEN_CODE) {
            Ok(Some(TOKEN))
        } else if tx.data.starts_with(&LOCKER_CODE) {
            if self.fail_locker_creation {
                return Err(revert(ZeroAddress {}));
            }
            Ok(Some(LOCKER))
        } else {
            Err(Revert {
                reason: "unknown bytecode".to_string(),
            }
            .abi_encode())
        }
    }

    fn view(&self, tx: &TxRequest) -> Result<Vec<u8>, ChainFailure> {
        let to = tx.to.ok_or_else(|| ChainFailure::message("view call without target"))?;
        let sel = tx.data.get(..4).unwrap_or_default();
        let ts = |t: Timestamp| word(U256::from(t as u64));

        let out = if to == PRESALE && is::<IPresale::startTimeCall>(sel) {
            ts(self.start_time)
        } else if to == PRESALE && is::<IPresale::endTimeCall>(sel) {
            ts(self.end_time)
        } else if to == PRESALE && is::<IPresale::whitelistDurationCall>(sel) {
            ts(self.whitelist_duration)
        } else if to == PRESALE && is::<IPresale::claimDelayCall>(sel) {
            ts(self.claim_delay)
        } else if to == PRESALE && is::<IPresale::finalizedCall>(sel) {
            flag(self.finalized)
        } else if to == PRESALE && is::<IPresale::hardCapCall>(sel) {
            word(self.hard_cap)
        } else if to == PRESALE && is::<IPresale::totalRaisedCall>(sel) {
            word(self.total_raised)
        } else if to == PRESALE && is::<IPresale::tokensNeededCall>(sel) {
            word(self.tokens_needed)
        } else if to == PRESALE && is::<IPresale::contributionsCall>(sel) {
            let call = IPresale::contributionsCall::abi_decode(&tx.data, true)
                .map_err(|e| ChainFailure::message(e.to_string()))?;
            let rec = self.contributions.get(&call.wallet).cloned().unwrap_or_default();
            [
                word(rec.contribution),
                word(rec.claimable),
                word(rec.claimed_token),
                flag(rec.is_refunded),
            ]
            .concat()
        } else if to == WHITELIST && is::<IWhitelist::isWhitelistedCall>(sel) {
            let call = IWhitelist::isWhitelistedCall::abi_decode(&tx.data, true)
                .map_err(|e| ChainFailure::message(e.to_string()))?;
            flag(self.whitelist.contains(&call.wallet))
        } else if to == LOCKER && is::<ILocker::claimableCall>(sel) {
            let call = ILocker::claimableCall::abi_decode(&tx.data, true)
                .map_err(|e| ChainFailure::message(e.to_string()))?;
            word(self.locker_claimable.get(&call.wallet).copied().unwrap_or_default())
        } else {
            // No code at the address.
            Vec::new()
        };
        Ok(out)
    }
}

#[derive(Default)]
pub struct MockChain {
    pub sim: Mutex<Sim>,
}

impl MockChain {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with(f: impl FnOnce(&mut Sim)) -> Arc<Self> {
        let chain = Self::default();
        f(&mut chain.sim.lock().unwrap());
        Arc::new(chain)
    }

    pub fn update(&self, f: impl FnOnce(&mut Sim)) {
        f(&mut self.sim.lock().unwrap());
    }

    pub fn now(&self) -> Timestamp {
        self.sim.lock().unwrap().now
    }

    pub fn sent_count(&self) -> usize {
        self.sim.lock().unwrap().sent.len()
    }

    pub fn creations(&self) -> usize {
        self.sim.lock().unwrap().sent.iter().filter(|t| t.is_creation()).count()
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn signer(&self) -> Result<Option<Address>, ChainFailure> {
        Ok(self.sim.lock().unwrap().signer)
    }

    async fn send_transaction(&self, from: Address, tx: &TxRequest) -> Result<TxHash, ChainFailure> {
        let mut sim = self.sim.lock().unwrap();
        let mentions_rejected = sim
            .reject_wallet
            .map(|w| tx.data.windows(20).any(|chunk| chunk == w.as_slice()))
            .unwrap_or(false);
        if sim.reject_signing || mentions_rejected {
            return Err(ChainFailure(json!({
                "code": 4001,
                "message": "User rejected the request."
            })));
        }
        sim.sent.push(tx.clone());

        let outcome = sim.execute(from, tx);
        let (status, contract_address) = match outcome {
            Ok(created) => (true, created),
            Err(payload) if sim.revert_on_send => return Err(revert_failure(&payload)),
            Err(payload) => {
                sim.replays.insert((tx.to, tx.data.clone()), payload);
                (false, None)
            }
        };
        let hash = sim.next_hash();
        let block_number = Some(sim.nonce);
        sim.receipts.insert(
            hash,
            TxReceipt {
                transaction_hash: hash,
                status,
                contract_address,
                block_number,
            },
        );
        Ok(hash)
    }

    async fn transaction_receipt(&self, hash: TxHash) -> Result<Option<TxReceipt>, ChainFailure> {
        let sim = self.sim.lock().unwrap();
        if sim.hold_receipts {
            return Ok(None);
        }
        Ok(sim.receipts.get(&hash).cloned())
    }

    async fn block_number(&self) -> Result<u64, ChainFailure> {
        Ok(self.sim.lock().unwrap().nonce)
    }

    async fn call(
        &self,
        _from: Option<Address>,
        tx: &TxRequest,
        block: Option<u64>,
    ) -> Result<Bytes, ChainFailure> {
        let mut sim = self.sim.lock().unwrap();
        sim.call_blocks.push(block);
        if let Some(payload) = sim.replays.get(&(tx.to, tx.data.clone())) {
            return Err(revert_failure(payload));
        }
        sim.view(tx).map(Bytes::from)
    }
}

// ── Store ────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockStore {
    pub projects: Mutex<HashMap<String, ProjectRecord>>,
    pub writes: Mutex<Vec<(String, DeploymentUpdate)>>,
    pub fail_writes: Mutex<bool>,
}

impl MockStore {
    pub fn with_project(project: ProjectRecord) -> Arc<Self> {
        let store = Self::default();
        store
            .projects
            .lock()
            .unwrap()
            .insert(project.id.clone(), project);
        Arc::new(store)
    }

    pub fn get(&self, id: &str) -> ProjectRecord {
        self.projects.lock().unwrap()[id].clone()
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }
}

#[async_trait]
impl ProjectStore for MockStore {
    async fn project(&self, id: &str) -> Result<ProjectRecord, StoreError> {
        self.projects
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn record_deployment(&self, id: &str, update: &DeploymentUpdate) -> Result<(), StoreError> {
        if *self.fail_writes.lock().unwrap() {
            return Err(StoreError::Status {
                url: format!("mock://projects/{id}/deployment"),
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        let mut projects = self.projects.lock().unwrap();
        let project = projects
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        update.apply_to(project);
        self.writes
            .lock()
            .unwrap()
            .push((id.to_string(), update.clone()));
        Ok(())
    }
}

// ── Verifier ─────────────────────────────────────────────────────────────────

pub struct MockVerifier {
    pub answer: Result<String, String>,
    pub requests: Mutex<Vec<VerificationRequest>>,
}

impl MockVerifier {
    pub fn answering(answer: Result<&str, &str>) -> Arc<Self> {
        Arc::new(Self {
            answer: answer.map(String::from).map_err(String::from),
            requests: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl SourceVerifier for MockVerifier {
    async fn submit(&self, request: &VerificationRequest) -> Result<String, StoreError> {
        self.requests.lock().unwrap().push(request.clone());
        self.answer.clone().map_err(StoreError::Rejected)
    }
}

// ── Observer ─────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct Recorder {
    pub events: Mutex<Vec<DeploymentEvent>>,
}

impl Recorder {
    pub fn events(&self) -> Vec<DeploymentEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn finished(&self) -> Vec<DeploymentEvent> {
        self.events()
            .into_iter()
            .filter(|e| matches!(e, DeploymentEvent::Finished { .. }))
            .collect()
    }
}

impl DeploymentObserver for Recorder {
    fn on_event(&self, event: DeploymentEvent) {
        self.events.lock().unwrap().push(event);
    }
}
