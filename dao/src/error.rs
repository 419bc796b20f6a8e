use crate::host::ContractError;
use guild_governance::GovernanceError;
use guild_ledger::LedgerError;
use guild_types::{Address, ErrorKind, Timestamp};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaoError {
    #[error("dao is not initialized")]
    NotInitialized,

    #[error("dao is already initialized")]
    AlreadyInitialized,

    #[error("reentrant call into a guarded entry point")]
    Reentrancy,

    #[error("{0} is not a whitelisted extension")]
    NotExtension(Address),

    #[error("{left_name} has {left} entries but {right_name} has {right}")]
    LengthMismatch {
        left_name: &'static str,
        left: usize,
        right_name: &'static str,
        right: usize,
    },

    #[error("insufficient native balance for {account}: need {needed}, have {available}")]
    InsufficientNative {
        account: Address,
        needed: u128,
        available: u128,
    },

    #[error("signature does not match the signed message")]
    InvalidSignature,

    #[error("message names signer {claimed} but was signed by {actual}")]
    SignerMismatch { claimed: Address, actual: Address },

    #[error("nonce {got} does not match expected {expected}")]
    InvalidNonce { expected: u64, got: u64 },

    #[error("signed message expired at {expiry} (now {now})")]
    SignatureExpired { expiry: Timestamp, now: Timestamp },

    #[error("call to {target} failed: {source}")]
    ExternalCall {
        target: Address,
        #[source]
        source: ContractError,
    },

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Governance(#[from] GovernanceError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl DaoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::LengthMismatch { .. } | Self::InsufficientNative { .. } | Self::Config(_) => {
                ErrorKind::Validation
            }
            Self::NotExtension(_) | Self::InvalidSignature | Self::SignerMismatch { .. } => {
                ErrorKind::Authorization
            }
            Self::SignatureExpired { .. } => ErrorKind::Timing,
            Self::NotInitialized
            | Self::AlreadyInitialized
            | Self::Reentrancy
            | Self::InvalidNonce { .. } => ErrorKind::State,
            Self::ExternalCall { .. } => ErrorKind::ExternalCall,
            Self::Governance(e) => e.kind(),
            Self::Ledger(e) => e.kind(),
        }
    }

    /// Follow failed external calls back into the DAO to the error that
    /// started the chain.
    pub fn innermost(&self) -> &DaoError {
        match self {
            Self::ExternalCall {
                source: ContractError::Dao(inner),
                ..
            } => inner.innermost(),
            other => other,
        }
    }
}
