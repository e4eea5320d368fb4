//! launchpad-store
//!
//! Clients for the off-chain collaborators: the REST store that holds
//! project records and mirrors deployment metadata, and the contract
//! source-verification service.

pub mod error;
pub mod rest;
pub mod verify;

pub use error::StoreError;
pub use rest::{HttpProjectStore, ProjectStore};
pub use verify::{EtherscanVerifier, SourceVerifier, VerificationRequest};
