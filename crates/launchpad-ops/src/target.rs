use launchpad_core::error::TxError;
use launchpad_core::project::PresaleRecord;
use launchpad_core::types::{parse_address, Address};

/// On-chain addresses of one presale, parsed from its off-chain record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PresaleTarget {
    pub presale: Address,
    pub whitelist: Option<Address>,
}

impl PresaleTarget {
    pub fn new(presale: Address, whitelist: Option<Address>) -> Self {
        Self { presale, whitelist }
    }

    /// The presale address is required; the whitelist contract is optional
    /// but must be valid when present.
    pub fn from_record(record: &PresaleRecord) -> Result<Self, TxError> {
        let presale = parse_address("presales.contractAddress", record.contract_address.as_deref())?;
        let whitelist = match record
            .whitelist_contract
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            Some(raw) => Some(parse_address("presales.whitelistContract", Some(raw))?),
            None => None,
        };
        Ok(Self { presale, whitelist })
    }

    pub fn require_whitelist(&self) -> Result<Address, TxError> {
        self.whitelist
            .ok_or_else(|| TxError::config("presale has no whitelist contract"))
    }
}
