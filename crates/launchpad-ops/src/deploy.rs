//! Deployment orchestrator.
//!
//! Per project the deployment moves through
//!
//!   NoContract -> TokenDeployed -> LockerDeployed -> LockerDistributed
//!
//! where the last two are two separate transactions of one logical "deploy
//! locker" operation. Every step is mined before the store hears about it,
//! and no step is ever retried or repeated automatically: an existing
//! locker is never redeployed, only its distribution may be run again.
//! Steps on one orchestrator run one at a time, from the stage read to the
//! final store write.

use std::sync::Arc;

use alloy_sol_types::{SolCall, SolConstructor};
use tokio::sync::Mutex;
use tracing::{info, warn};

use launchpad_chain::contracts::{AllocationLocker, ILocker, LaunchToken};
use launchpad_chain::{TxReceipt, TxRequest, TxSubmitter};
use launchpad_core::error::TxError;
use launchpad_core::project::{DeploymentUpdate, ProjectRecord};
use launchpad_core::types::{parse_address, Address, Amount, Bytes, Timestamp, TxHash, U256};
use launchpad_presale::allocation_amount;
use launchpad_store::{ProjectStore, SourceVerifier, VerificationRequest};

use crate::error::DeployError;
use crate::progress::{DeployStep, DeploymentObserver, ProgressGuard};

/// Allocation percentages may overshoot 100 by rounding only.
const SUPPLY_PERCENT_TOLERANCE: f64 = 0.005;

// ── Stage ────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeploymentStage {
    NoContract,
    TokenDeployed,
    /// Locker exists but its allocations were never distributed.
    LockerDeployed,
    LockerDistributed,
}

impl DeploymentStage {
    pub fn of(project: &ProjectRecord) -> Self {
        if !project.has_token() {
            DeploymentStage::NoContract
        } else if !project.has_locker() {
            DeploymentStage::TokenDeployed
        } else if !project.locker_distributed {
            DeploymentStage::LockerDeployed
        } else {
            DeploymentStage::LockerDistributed
        }
    }
}

impl std::fmt::Display for DeploymentStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            DeploymentStage::NoContract => "no contract",
            DeploymentStage::TokenDeployed => "token deployed",
            DeploymentStage::LockerDeployed => "locker deployed, not distributed",
            DeploymentStage::LockerDistributed => "locker distributed",
        })
    }
}

// ── Inputs ───────────────────────────────────────────────────────────────────

/// Creation bytecode of the contracts the orchestrator deploys.
#[derive(Clone, Debug, Default)]
pub struct ContractArtifacts {
    pub token_bytecode: Bytes,
    pub locker_bytecode: Bytes,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenParams {
    pub name: String,
    pub ticker: String,
    pub total_supply: Amount,
}

impl TokenParams {
    pub fn from_project(project: &ProjectRecord) -> Self {
        Self {
            name: project.name.clone(),
            ticker: project.ticker.clone(),
            total_supply: project.total_supply,
        }
    }

    pub fn validate(&self) -> Result<(), TxError> {
        if self.name.trim().is_empty() {
            return Err(TxError::config("token name is empty"));
        }
        if self.ticker.trim().is_empty() {
            return Err(TxError::config("token ticker is empty"));
        }
        if self.total_supply.is_zero() {
            return Err(TxError::config("token total supply is zero"));
        }
        Ok(())
    }

    /// ABI-encoded constructor arguments.
    pub fn constructor_args(&self) -> Vec<u8> {
        LaunchToken::constructorCall {
            name: self.name.clone(),
            symbol: self.ticker.clone(),
            totalSupply: self.total_supply,
        }
        .abi_encode()
    }

    pub fn verification_request(
        &self,
        address: Address,
        source: String,
        compiler_version: String,
    ) -> VerificationRequest {
        VerificationRequest {
            contract_address: address,
            contract_name: "LaunchToken".to_string(),
            constructor_args: self.constructor_args().into(),
            source,
            compiler_version,
        }
    }
}

/// Verification request for a locker deployed for `token` and `owner`.
pub fn locker_verification_request(
    locker: Address,
    token: Address,
    owner: Address,
    source: String,
    compiler_version: String,
) -> VerificationRequest {
    VerificationRequest {
        contract_address: locker,
        contract_name: "AllocationLocker".to_string(),
        constructor_args: AllocationLocker::constructorCall { token, owner }
            .abi_encode()
            .into(),
        source,
        compiler_version,
    }
}

/// One locker share per vesting allocation, in allocation order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DistributionPlan {
    pub names: Vec<String>,
    pub amounts: Vec<Amount>,
    pub vesting_months: Vec<u32>,
    pub start_dates: Vec<Timestamp>,
}

impl DistributionPlan {
    pub fn of(project: &ProjectRecord) -> Result<Self, TxError> {
        let total_percent: f64 = project.allocations.iter().map(|a| a.supply).sum();
        if !total_percent.is_finite() || total_percent > 100.0 + SUPPLY_PERCENT_TOLERANCE {
            return Err(TxError::config(format!(
                "allocations add up to {total_percent}% of supply"
            )));
        }

        let mut plan = Self {
            names: Vec::new(),
            amounts: Vec::new(),
            vesting_months: Vec::new(),
            start_dates: Vec::new(),
        };
        for (_, alloc) in project.locker_allocations() {
            let amount = allocation_amount(project.total_supply, alloc.supply);
            if amount.is_zero() {
                return Err(TxError::config(format!(
                    "allocation {:?} has no supply",
                    alloc.name
                )));
            }
            if alloc.start_date < 0 {
                return Err(TxError::config(format!(
                    "allocation {:?} has a negative start date",
                    alloc.name
                )));
            }
            plan.names.push(alloc.name.clone());
            plan.amounts.push(amount);
            plan.vesting_months.push(alloc.vesting);
            plan.start_dates.push(alloc.start_date);
        }
        if plan.names.is_empty() {
            return Err(TxError::config("project has no vesting allocations to lock"));
        }
        Ok(plan)
    }

    pub fn total(&self) -> Amount {
        self.amounts.iter().fold(U256::ZERO, |acc, a| acc.saturating_add(*a))
    }

    fn call(&self) -> ILocker::distributeCall {
        ILocker::distributeCall {
            names: self.names.clone(),
            amounts: self.amounts.clone(),
            vestingMonths: self.vesting_months.iter().map(|m| U256::from(*m)).collect(),
            startDates: self
                .start_dates
                .iter()
                .map(|d| U256::from(u64::try_from(*d).unwrap_or(0)))
                .collect(),
        }
    }
}

// ── Outputs ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenDeployment {
    pub address: Address,
    pub tx_hash: TxHash,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LockerDeployment {
    pub locker: Address,
    pub deploy_hash: TxHash,
    pub distribute_hash: TxHash,
}

/// Result of a verification submission. Never an error for the deployment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerificationOutcome {
    Submitted { guid: String },
    Warning(TxError),
}

// ── Orchestrator ─────────────────────────────────────────────────────────────

pub struct DeploymentOrchestrator {
    submitter: Arc<TxSubmitter>,
    store: Arc<dyn ProjectStore>,
    verifier: Option<Arc<dyn SourceVerifier>>,
    artifacts: ContractArtifacts,
    /// Held for a whole step so a stage read can't go stale under it.
    step: Mutex<()>,
}

impl DeploymentOrchestrator {
    pub fn new(
        submitter: Arc<TxSubmitter>,
        store: Arc<dyn ProjectStore>,
        artifacts: ContractArtifacts,
    ) -> Self {
        Self {
            submitter,
            store,
            verifier: None,
            artifacts,
            step: Mutex::new(()),
        }
    }

    pub fn with_verifier(mut self, verifier: Arc<dyn SourceVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    pub async fn stage(&self, project_id: &str) -> Result<DeploymentStage, DeployError> {
        let project = self.store.project(project_id).await?;
        Ok(DeploymentStage::of(&project))
    }

    /// Deploy the project token and record its address once mined.
    pub async fn deploy_token(
        &self,
        project_id: &str,
        params: &TokenParams,
        observer: &dyn DeploymentObserver,
    ) -> Result<TokenDeployment, DeployError> {
        params.validate()?;
        let _step = self.step.lock().await;
        let project = self.store.project(project_id).await?;
        let stage = DeploymentStage::of(&project);
        if stage != DeploymentStage::NoContract {
            return Err(TxError::config(format!(
                "project {project_id} already has a token contract ({stage})"
            ))
            .into());
        }
        let bytecode = require_bytecode("token", &self.artifacts.token_bytecode)?;
        self.submitter.signer().await?;

        let guard = ProgressGuard::start(observer, DeployStep::Token);
        let tx = TxRequest::create(bytecode, &params.constructor_args());
        let receipt = self.execute(&guard, "deploy-token", tx).await?;
        let address = created_address(&receipt)?;
        let tx_hash = receipt.transaction_hash;

        self.persist(
            project_id,
            "token",
            address,
            tx_hash,
            DeploymentUpdate {
                contract_address: Some(address.to_string()),
                deploy_hash: Some(tx_hash.to_string()),
                ..Default::default()
            },
        )
        .await?;
        guard.complete();

        info!(project = %project_id, %address, %tx_hash, "token deployed");
        Ok(TokenDeployment { address, tx_hash })
    }

    /// Deploy the allocation locker, then distribute allocations into it.
    ///
    /// If the locker is mined but distribution fails the result is
    /// `DeployError::NotDistributed`; follow up with `distribute_locker`.
    pub async fn deploy_locker(
        &self,
        project_id: &str,
        observer: &dyn DeploymentObserver,
    ) -> Result<LockerDeployment, DeployError> {
        let _step = self.step.lock().await;
        let project = self.store.project(project_id).await?;
        match DeploymentStage::of(&project) {
            DeploymentStage::TokenDeployed => {}
            DeploymentStage::NoContract => {
                return Err(TxError::config("deploy the token before the locker").into())
            }
            DeploymentStage::LockerDeployed => {
                return Err(TxError::config(format!(
                    "locker already deployed at {}; run the distribution only",
                    project.locker_address.as_deref().unwrap_or_default()
                ))
                .into())
            }
            DeploymentStage::LockerDistributed => {
                return Err(TxError::config("locker already deployed and distributed").into())
            }
        }
        let token = parse_address("contractAddress", project.contract_address.as_deref())?;
        let plan = DistributionPlan::of(&project)?;
        let bytecode = require_bytecode("locker", &self.artifacts.locker_bytecode)?;
        let owner = self.submitter.signer().await?;

        let guard = ProgressGuard::start(observer, DeployStep::Locker);
        let args = AllocationLocker::constructorCall { token, owner }.abi_encode();
        let receipt = self
            .execute(&guard, "deploy-locker", TxRequest::create(bytecode, &args))
            .await?;
        let locker = created_address(&receipt)?;
        let deploy_hash = receipt.transaction_hash;

        self.persist(
            project_id,
            "locker",
            locker,
            deploy_hash,
            DeploymentUpdate {
                locker_address: Some(locker.to_string()),
                ..Default::default()
            },
        )
        .await?;
        guard.complete();
        info!(project = %project_id, %locker, %deploy_hash, "locker deployed");

        let distribute_hash = match self.distribute_to(project_id, locker, &plan, observer).await {
            Ok(hash) => hash,
            Err(DeployError::Tx(source)) => {
                warn!(project = %project_id, %locker, error = %source, "locker not distributed");
                return Err(DeployError::NotDistributed { locker, source });
            }
            Err(e) => return Err(e),
        };

        Ok(LockerDeployment {
            locker,
            deploy_hash,
            distribute_hash,
        })
    }

    /// Distribution half of `deploy_locker`, for a locker that exists but
    /// was never funded.
    pub async fn distribute_locker(
        &self,
        project_id: &str,
        observer: &dyn DeploymentObserver,
    ) -> Result<TxHash, DeployError> {
        let _step = self.step.lock().await;
        let project = self.store.project(project_id).await?;
        match DeploymentStage::of(&project) {
            DeploymentStage::LockerDeployed => {}
            DeploymentStage::LockerDistributed => {
                return Err(TxError::config("locker allocations were already distributed").into())
            }
            _ => return Err(TxError::config("no locker deployed for this project").into()),
        }
        let locker = parse_address("lockerAddress", project.locker_address.as_deref())?;
        let plan = DistributionPlan::of(&project)?;
        self.submitter.signer().await?;

        self.distribute_to(project_id, locker, &plan, observer).await
    }

    /// Hand a contract's source to the verification service.
    pub async fn submit_verification(&self, request: &VerificationRequest) -> VerificationOutcome {
        let Some(verifier) = &self.verifier else {
            let err = TxError::ExternalService("no verification service configured".into());
            warn!(contract = %request.contract_address, "{err}");
            return VerificationOutcome::Warning(err);
        };
        match verifier.submit(request).await {
            Ok(guid) => VerificationOutcome::Submitted { guid },
            Err(e) => {
                warn!(contract = %request.contract_address, error = %e, "source verification failed");
                VerificationOutcome::Warning(TxError::ExternalService(e.to_string()))
            }
        }
    }

    async fn distribute_to(
        &self,
        project_id: &str,
        locker: Address,
        plan: &DistributionPlan,
        observer: &dyn DeploymentObserver,
    ) -> Result<TxHash, DeployError> {
        let guard = ProgressGuard::start(observer, DeployStep::Distribution);
        let tx = TxRequest::call(locker, plan.call().abi_encode());
        let receipt = self.execute(&guard, "distribute-locker", tx).await?;
        let tx_hash = receipt.transaction_hash;

        self.persist(
            project_id,
            "locker",
            locker,
            tx_hash,
            DeploymentUpdate {
                locker_distributed: Some(true),
                locker_distribute_hash: Some(tx_hash.to_string()),
                ..Default::default()
            },
        )
        .await?;
        guard.complete();

        info!(
            project = %project_id,
            %locker,
            %tx_hash,
            allocations = plan.names.len(),
            total = %plan.total(),
            "locker distributed"
        );
        Ok(tx_hash)
    }

    async fn execute(
        &self,
        guard: &ProgressGuard<'_>,
        label: &str,
        tx: TxRequest,
    ) -> Result<TxReceipt, TxError> {
        let pending = self.submitter.send(label, tx).await?;
        guard.submitted(pending.tx_hash);
        let receipt = pending.confirm().await?;
        guard.mined(receipt.transaction_hash, receipt.contract_address);
        Ok(receipt)
    }

    async fn persist(
        &self,
        project_id: &str,
        what: &'static str,
        address: Address,
        tx_hash: TxHash,
        update: DeploymentUpdate,
    ) -> Result<(), DeployError> {
        self.store
            .record_deployment(project_id, &update)
            .await
            .map_err(|source| {
                warn!(project = %project_id, %address, %tx_hash, error = %source, "mined but not recorded");
                DeployError::NotPersisted {
                    what,
                    address,
                    tx_hash,
                    source,
                }
            })
    }
}

fn require_bytecode<'a>(what: &str, bytecode: &'a Bytes) -> Result<&'a [u8], TxError> {
    if bytecode.is_empty() {
        return Err(TxError::config(format!("{what} bytecode is not configured")));
    }
    Ok(bytecode.as_ref())
}

fn created_address(receipt: &TxReceipt) -> Result<Address, TxError> {
    receipt
        .contract_address
        .ok_or_else(|| TxError::reverted("contract creation produced no contract address"))
}
