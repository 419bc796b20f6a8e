use guild_ledger::LedgerError;
use guild_types::{Address, ErrorKind, Timestamp};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GovernanceError {
    // ── validation ──────────────────────────────────────────────────────
    #[error("parallel arrays differ in length: {targets} targets, {values} values, {payloads} payloads")]
    ArrayLengthMismatch {
        targets: usize,
        values: usize,
        payloads: usize,
    },

    #[error("voting period {0} outside 1..=31536000 seconds")]
    InvalidVotingPeriod(u128),

    #[error("grace period {0} exceeds 31536000 seconds")]
    InvalidGracePeriod(u128),

    #[error("quorum {0} exceeds 100 percent")]
    InvalidQuorum(u128),

    #[error("supermajority {0} outside 52..=100 percent")]
    InvalidSupermajority(u128),

    #[error("unknown proposal category {0}")]
    UnknownCategory(u128),

    #[error("unknown vote type {0}")]
    UnknownVoteType(u128),

    #[error("settings block must have 16 slots, got {0}")]
    InvalidSettingsLength(usize),

    #[error("malformed {category} proposal: {reason}")]
    MalformedAction {
        category: &'static str,
        reason: String,
    },

    #[error("proposal {0} cannot escape itself")]
    SelfEscape(u64),

    // ── authorization ───────────────────────────────────────────────────
    #[error("{0} is not a member")]
    NotMember(Address),

    #[error("only the proposer may cancel proposal {0}")]
    NotProposer(u64),

    // ── timing ──────────────────────────────────────────────────────────
    #[error("voting on proposal {0} has not started")]
    VotingNotStarted(u64),

    #[error("voting on proposal {0} has closed")]
    VotingClosed(u64),

    #[error("proposal {id} cannot be processed before {ready_at} (now {now})")]
    NotProcessable {
        id: u64,
        ready_at: Timestamp,
        now: Timestamp,
    },

    // ── state ───────────────────────────────────────────────────────────
    #[error("proposal {0} not found")]
    ProposalNotFound(u64),

    #[error("proposal {0} was cancelled")]
    ProposalCancelled(u64),

    #[error("proposal {0} is already sponsored")]
    AlreadySponsored(u64),

    #[error("proposal {0} is already processed")]
    AlreadyProcessed(u64),

    #[error("{voter} has already voted on proposal {id}")]
    AlreadyVoted { id: u64, voter: Address },

    #[error("proposal {id} must wait for earlier proposal {pending}")]
    OutOfOrder { id: u64, pending: u64 },

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl GovernanceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ArrayLengthMismatch { .. }
            | Self::InvalidVotingPeriod(_)
            | Self::InvalidGracePeriod(_)
            | Self::InvalidQuorum(_)
            | Self::InvalidSupermajority(_)
            | Self::UnknownCategory(_)
            | Self::UnknownVoteType(_)
            | Self::InvalidSettingsLength(_)
            | Self::MalformedAction { .. }
            | Self::SelfEscape(_) => ErrorKind::Validation,
            Self::NotMember(_) | Self::NotProposer(_) => ErrorKind::Authorization,
            Self::VotingNotStarted(_) | Self::VotingClosed(_) | Self::NotProcessable { .. } => {
                ErrorKind::Timing
            }
            Self::ProposalNotFound(_)
            | Self::ProposalCancelled(_)
            | Self::AlreadySponsored(_)
            | Self::AlreadyProcessed(_)
            | Self::AlreadyVoted { .. }
            | Self::OutOfOrder { .. } => ErrorKind::State,
            Self::Ledger(e) => e.kind(),
        }
    }
}
