pub mod constants;
pub mod error;
pub mod types;
pub mod presale;
pub mod project;

pub use constants::*;
pub use error::TxError;
pub use types::*;
pub use presale::*;
pub use project::*;
