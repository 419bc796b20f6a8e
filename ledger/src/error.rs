use guild_types::{Address, ErrorKind, Timestamp};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("insufficient balance for {account}: need {needed}, have {available}")]
    InsufficientBalance {
        account: Address,
        needed: u128,
        available: u128,
    },

    #[error("insufficient allowance from {owner} to {spender}: need {needed}, have {available}")]
    InsufficientAllowance {
        owner: Address,
        spender: Address,
        needed: u128,
        available: u128,
    },

    #[error("share transfers are paused")]
    Paused,

    #[error("minting {amount} would exceed the supply cap")]
    SupplyOverflow { amount: u128 },

    #[error("voting power can only be queried strictly before now ({requested} >= {now})")]
    InvalidTimestamp { requested: Timestamp, now: Timestamp },
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InsufficientBalance { .. } | Self::SupplyOverflow { .. } => ErrorKind::Validation,
            Self::InsufficientAllowance { .. } => ErrorKind::Authorization,
            Self::Paused => ErrorKind::State,
            Self::InvalidTimestamp { .. } => ErrorKind::Timing,
        }
    }
}
