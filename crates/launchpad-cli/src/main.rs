//! launchpad
//!
//! Operator CLI for the presale launchpad. Reads project records from the
//! REST store, talks to the chain through a JSON-RPC endpoint that signs
//! with the operator's account, and drives deployments, presale actions,
//! claims and whitelist changes.
//!
//! Usage:
//!   launchpad status           --project <id>
//!   launchpad deploy-token     --project <id> [--verify-source <path>]
//!   launchpad deploy-locker    --project <id> [--verify-source <path>]
//!   launchpad distribute       --project <id>
//!   launchpad verify           --project <id> --contract token|locker --source <path>
//!   launchpad contribute       --project <id> --amount <wei>
//!   launchpad refund           --project <id>
//!   launchpad finalize         --project <id>
//!   launchpad claim            --project <id>
//!   launchpad claim-allocation --project <id> --index <n>
//!   launchpad whitelist add    --project <id> --wallet <addr>...
//!   launchpad whitelist remove --project <id> --wallet <addr>...

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use launchpad_chain::{ChainClient, JsonRpcChain, TxSubmitter};
use launchpad_core::project::ProjectRecord;
use launchpad_core::types::{parse_address, parse_amount, Address, Amount, Timestamp};
use launchpad_ops::{
    locker_verification_request, ClaimManager, DeploymentEvent, DeploymentObserver,
    DeploymentOrchestrator, DeploymentStage, PresaleActions, PresaleTarget, TokenParams,
    VerificationOutcome, WhitelistManager, WhitelistOp, WhitelistOutcome,
};
use launchpad_presale::{allocation_amount, describe, describe_vesting, PresaleStatus};
use launchpad_store::{EtherscanVerifier, HttpProjectStore, ProjectStore, VerificationRequest};

mod config;
use config::{expand_tilde, LaunchpadConfig};

// ── CLI definition ───────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "launchpad", version, about = "Presale launchpad operator tool")]
struct Args {
    /// Configuration file (JSON).
    #[arg(long, global = true, default_value = "~/.launchpad/config.json")]
    config: PathBuf,

    /// Chain RPC endpoint. Overrides the config file.
    #[arg(long, global = true)]
    rpc: Option<String>,

    /// Project store base URL. Overrides the config file.
    #[arg(long, global = true)]
    store: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show deployment stage and presale phase.
    Status {
        #[arg(long)]
        project: String,
    },

    /// Deploy the project token.
    DeployToken {
        #[arg(long)]
        project: String,
        /// Submit this source for verification after deploying.
        #[arg(long)]
        verify_source: Option<PathBuf>,
    },

    /// Deploy the allocation locker and distribute allocations into it.
    DeployLocker {
        #[arg(long)]
        project: String,
        #[arg(long)]
        verify_source: Option<PathBuf>,
    },

    /// Retry only the distribution of an already deployed locker.
    Distribute {
        #[arg(long)]
        project: String,
    },

    /// Submit contract source for verification.
    Verify {
        #[arg(long)]
        project: String,
        #[arg(long, value_enum)]
        contract: ContractKind,
        #[arg(long)]
        source: PathBuf,
        /// Locker owner used at deployment. Defaults to the signer.
        #[arg(long, value_parser = parse_address_arg)]
        owner: Option<Address>,
    },

    /// Contribute to the presale from the signer.
    Contribute {
        #[arg(long)]
        project: String,
        /// Amount in base units (decimal or 0x hex).
        #[arg(long, value_parser = parse_amount_arg)]
        amount: Amount,
    },

    /// Refund the signer's contribution after a sale that was not finalized.
    Refund {
        #[arg(long)]
        project: String,
    },

    /// Finalize the presale (administrator).
    Finalize {
        #[arg(long)]
        project: String,
    },

    /// Claim the signer's presale tokens.
    Claim {
        #[arg(long)]
        project: String,
    },

    /// Claim the signer's vested share of an allocation.
    ClaimAllocation {
        #[arg(long)]
        project: String,
        /// Position of the allocation in the project record.
        #[arg(long)]
        index: usize,
    },

    /// Add or remove wallets from the presale whitelist.
    Whitelist {
        #[command(subcommand)]
        op: WhitelistCommand,
    },
}

#[derive(Subcommand, Debug)]
enum WhitelistCommand {
    Add {
        #[arg(long)]
        project: String,
        #[arg(long = "wallet", required = true, value_parser = parse_address_arg)]
        wallets: Vec<Address>,
    },
    Remove {
        #[arg(long)]
        project: String,
        #[arg(long = "wallet", required = true, value_parser = parse_address_arg)]
        wallets: Vec<Address>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ContractKind {
    Token,
    Locker,
}

fn parse_address_arg(raw: &str) -> Result<Address, String> {
    Address::from_str(raw.trim()).map_err(|e| format!("invalid address {raw:?}: {e}"))
}

fn parse_amount_arg(raw: &str) -> Result<Amount, String> {
    parse_amount(raw)
}

// ── Session ──────────────────────────────────────────────────────────────────

struct Session {
    config: LaunchpadConfig,
    store: Arc<dyn ProjectStore>,
    submitter: Arc<TxSubmitter>,
}

impl Session {
    fn new(args: &Args) -> anyhow::Result<Self> {
        let mut config = LaunchpadConfig::load(&expand_tilde(&args.config))?;
        if let Some(rpc) = &args.rpc {
            config.rpc_url = rpc.clone();
        }
        if let Some(store) = &args.store {
            config.store_url = store.clone();
        }

        let mut store = HttpProjectStore::new(&config.store_url);
        if let Some(token) = &config.store_token {
            store = store.with_token(token.clone());
        }

        let mut chain = JsonRpcChain::new(&config.rpc_url);
        if let Some(sender) = config.sender.as_deref() {
            chain = chain.with_sender(parse_address("sender", Some(sender))?);
        }
        let chain: Arc<dyn ChainClient> = Arc::new(chain);
        let submitter = Arc::new(TxSubmitter::new(chain, config.submitter_config()));

        Ok(Self {
            config,
            store: Arc::new(store),
            submitter,
        })
    }

    async fn project(&self, id: &str) -> anyhow::Result<ProjectRecord> {
        self.store
            .project(id)
            .await
            .with_context(|| format!("loading project {id}"))
    }

    async fn presale(&self, id: &str) -> anyhow::Result<PresaleTarget> {
        let project = self.project(id).await?;
        Ok(PresaleTarget::from_record(&project.presales)?)
    }

    fn orchestrator(&self) -> anyhow::Result<DeploymentOrchestrator> {
        let mut orch = DeploymentOrchestrator::new(
            self.submitter.clone(),
            self.store.clone(),
            self.config.artifacts()?,
        );
        if let (Some(url), Some(key)) = (&self.config.verifier_url, &self.config.verifier_api_key) {
            orch = orch.with_verifier(Arc::new(EtherscanVerifier::new(url, key)));
        }
        Ok(orch)
    }

    fn read_source(&self, path: &PathBuf) -> anyhow::Result<String> {
        let path = expand_tilde(path);
        std::fs::read_to_string(&path).with_context(|| format!("reading source {}", path.display()))
    }
}

/// Prints deployment progress as it happens.
struct PrintProgress;

impl DeploymentObserver for PrintProgress {
    fn on_event(&self, event: DeploymentEvent) {
        match event {
            DeploymentEvent::Started { step } => println!("{step}: waiting for signature..."),
            DeploymentEvent::Submitted { step, tx_hash } => {
                println!("{step}: submitted {tx_hash}, waiting to be mined...")
            }
            DeploymentEvent::Mined { step, contract_address: Some(addr), .. } => {
                println!("{step}: mined, contract at {addr}")
            }
            DeploymentEvent::Mined { step, tx_hash, .. } => println!("{step}: mined {tx_hash}"),
            DeploymentEvent::Finished { step, success: false } => println!("{step}: not completed"),
            DeploymentEvent::Finished { .. } => {}
        }
    }
}

fn now() -> Timestamp {
    chrono::Utc::now().timestamp()
}

// ── Main ─────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn,launchpad=info")),
        )
        .init();

    let args = Args::parse();
    let session = Session::new(&args)?;

    match args.command {
        Command::Status { project } => cmd_status(&session, &project).await,

        Command::DeployToken { project, verify_source } => {
            let orch = session.orchestrator()?;
            let record = session.project(&project).await?;
            let params = TokenParams::from_project(&record);
            let token = orch.deploy_token(&project, &params, &PrintProgress).await?;
            println!("Token deployed: {}  (tx {})", token.address, token.tx_hash);

            if let Some(path) = verify_source {
                let request = params.verification_request(
                    token.address,
                    session.read_source(&path)?,
                    session.config.compiler_version.clone(),
                );
                report_verification(orch.submit_verification(&request).await);
            }
            Ok(())
        }

        Command::DeployLocker { project, verify_source } => {
            let orch = session.orchestrator()?;
            let deployed = orch.deploy_locker(&project, &PrintProgress).await?;
            println!(
                "Locker deployed: {}  (tx {}), distributed in {}",
                deployed.locker, deployed.deploy_hash, deployed.distribute_hash
            );

            if let Some(path) = verify_source {
                let request = locker_request(&session, &project, &path, None).await?;
                report_verification(orch.submit_verification(&request).await);
            }
            Ok(())
        }

        Command::Distribute { project } => {
            let hash = session.orchestrator()?.distribute_locker(&project, &PrintProgress).await?;
            println!("Allocations distributed: {hash}");
            Ok(())
        }

        Command::Verify { project, contract, source, owner } => {
            let orch = session.orchestrator()?;
            let request = match contract {
                ContractKind::Token => {
                    let record = session.project(&project).await?;
                    let address =
                        parse_address("contractAddress", record.contract_address.as_deref())?;
                    TokenParams::from_project(&record).verification_request(
                        address,
                        session.read_source(&source)?,
                        session.config.compiler_version.clone(),
                    )
                }
                ContractKind::Locker => locker_request(&session, &project, &source, owner).await?,
            };
            report_verification(orch.submit_verification(&request).await);
            Ok(())
        }

        Command::Contribute { project, amount } => {
            let target = session.presale(&project).await?;
            let state = PresaleActions::new(session.submitter.clone())
                .contribute(&target, amount, now())
                .await?;
            println!("Contributed {amount}.");
            println!("{}", describe(&state, now()));
            Ok(())
        }

        Command::Refund { project } => {
            let target = session.presale(&project).await?;
            let record = PresaleActions::new(session.submitter.clone())
                .refund(&target, now())
                .await?;
            println!("Refunded {} (refunded: {}).", record.contribution, record.is_refunded);
            Ok(())
        }

        Command::Finalize { project } => {
            let target = session.presale(&project).await?;
            let state = PresaleActions::new(session.submitter.clone())
                .finalize(&target, now())
                .await?;
            println!("{}", describe(&state, now()));
            Ok(())
        }

        Command::Claim { project } => {
            let target = session.presale(&project).await?;
            let record = ClaimManager::new(session.submitter.clone())
                .claim_presale(&target, now())
                .await?;
            println!(
                "Claimed. Total claimed: {}, still claimable: {}",
                record.claimed_token, record.claimable
            );
            Ok(())
        }

        Command::ClaimAllocation { project, index } => {
            let record = session.project(&project).await?;
            let claim = ClaimManager::new(session.submitter.clone())
                .claim_allocation(&record, index, now())
                .await?;
            println!(
                "Claimed from locker {} (tx {}). Still claimable: {}",
                claim.locker, claim.tx_hash, claim.claimable_after
            );
            Ok(())
        }

        Command::Whitelist { op } => {
            let (op, project, wallets) = match op {
                WhitelistCommand::Add { project, wallets } => (WhitelistOp::Add, project, wallets),
                WhitelistCommand::Remove { project, wallets } => {
                    (WhitelistOp::Remove, project, wallets)
                }
            };
            let target = session.presale(&project).await?;
            let report = WhitelistManager::new(session.submitter.clone())
                .apply_batch(&target, op, &wallets, now())
                .await?;
            for (wallet, outcome) in &report.results {
                match outcome {
                    WhitelistOutcome::Applied(hash) => println!("{wallet}  ok       {hash}"),
                    WhitelistOutcome::Unchanged => println!("{wallet}  unchanged"),
                    WhitelistOutcome::Failed(e) => println!("{wallet}  FAILED   {e}"),
                }
            }
            if !report.is_complete() {
                bail!("{} of {} whitelist changes failed", report.failed(), report.results.len());
            }
            Ok(())
        }
    }
}

// ── Commands ─────────────────────────────────────────────────────────────────

async fn cmd_status(session: &Session, id: &str) -> anyhow::Result<()> {
    let project = session.project(id).await?;
    println!("Project:   {} ({})  [{}]", project.name, project.ticker, project.id);
    println!("Stage:     {}", DeploymentStage::of(&project));
    if let Some(token) = project.contract_address.as_deref() {
        println!("Token:     {token}");
    }
    if let Some(locker) = project.locker_address.as_deref() {
        println!("Locker:    {locker}");
    }
    let now = now();
    for (index, alloc) in project.locker_allocations() {
        let total = allocation_amount(project.total_supply, alloc.supply);
        println!(
            "  #{index} {:<12} {}",
            alloc.name,
            describe_vesting(total, alloc.vesting, alloc.start_date, now)
        );
    }

    let target = PresaleTarget::from_record(&project.presales)?;
    let state = PresaleActions::new(session.submitter.clone()).state(&target).await?;
    let status = PresaleStatus::evaluate(&state, now);
    println!("Presale:   {}", target.presale);
    println!("{}", describe(&state, now));
    println!("{}", serde_json::to_string_pretty(&status)?);
    info!(project = %id, phase = %status.phase, "status read");
    Ok(())
}

async fn locker_request(
    session: &Session,
    project: &str,
    source: &PathBuf,
    owner: Option<Address>,
) -> anyhow::Result<VerificationRequest> {
    let record = session.project(project).await?;
    let token = parse_address("contractAddress", record.contract_address.as_deref())?;
    let locker = parse_address("lockerAddress", record.locker_address.as_deref())?;
    let owner = match owner {
        Some(o) => o,
        None => session.submitter.signer().await?,
    };
    Ok(locker_verification_request(
        locker,
        token,
        owner,
        session.read_source(source)?,
        session.config.compiler_version.clone(),
    ))
}

fn report_verification(outcome: VerificationOutcome) {
    match outcome {
        VerificationOutcome::Submitted { guid } => println!("Verification submitted: {guid}"),
        VerificationOutcome::Warning(e) => println!("Warning: verification not submitted: {e}"),
    }
}
