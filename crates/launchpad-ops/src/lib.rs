//! launchpad-ops
//!
//! User-initiated operations against the presale contract family: the
//! deployment orchestrator, presale and allocation claims, whitelist
//! management, and the contribute/refund/finalize wallet actions.
//!
//! Every operation validates locally, submits through the shared
//! `TxSubmitter`, waits for mining and then re-reads chain state. Nothing is
//! retried automatically and no on-chain figure is ever updated locally.

pub mod actions;
pub mod claim;
pub mod deploy;
pub mod error;
pub mod progress;
pub mod target;
pub mod whitelist;

pub use actions::PresaleActions;
pub use claim::{AllocationClaim, ClaimManager};
pub use deploy::{
    locker_verification_request, ContractArtifacts, DeploymentOrchestrator, DeploymentStage,
    DistributionPlan, LockerDeployment, TokenDeployment, TokenParams, VerificationOutcome,
};
pub use error::{ActionError, DeployError};
pub use progress::{DeployStep, DeploymentEvent, DeploymentObserver};
pub use target::PresaleTarget;
pub use whitelist::{BatchReport, WhitelistManager, WhitelistOp, WhitelistOutcome};
