//! launchpad-chain
//!
//! Everything that touches the chain: the injected client capability, the
//! adapter that turns whatever the client throws into a `TxError`, the
//! revert-error registry and decoder, the serialised transaction submitter,
//! typed readers for the presale/whitelist/locker contracts, and a JSON-RPC
//! client over HTTP.

pub mod client;
pub mod contracts;
pub mod decode;
pub mod failure;
pub mod reader;
pub mod registry;
pub mod rpc;
pub mod submitter;

pub use client::{ChainClient, TxReceipt, TxRequest};
pub use decode::{decode_failure, decode_revert, extract_revert_data};
pub use failure::{classify, ChainFailure};
pub use reader::{LockerReader, PresaleReader, WhitelistReader};
pub use registry::{lookup, RevertEntry, REGISTRY_VERSION};
pub use rpc::JsonRpcChain;
pub use submitter::{PendingTx, SubmitterConfig, TxSubmitter};
