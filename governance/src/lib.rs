//! Governance for the guild DAO.
//!
//! Proposal lifecycle: Draft → VotingOpen (sponsored) → Processed, or
//! Draft → Cancelled. Members vote with the voting power they held at the
//! instant voting opened. Once voting and the grace period have elapsed,
//! anyone may process the proposal; processing is strictly FIFO over the
//! unresolved ids (escape proposals excepted).
//!
//! Whether a proposal passes is decided by the vote type configured for its
//! category: simple majority or supermajority, each with or without quorum.

pub mod engine;
pub mod error;
pub mod event;
pub mod proposal;
pub mod settings;
pub mod tally;

pub use engine::{Decision, GovernanceEngine, VotingPower};
pub use error::GovernanceError;
pub use event::GovernanceEvent;
pub use proposal::{
    CallEntry, ExtensionEntry, Proposal, ProposalAction, ProposalCategory, ProposalDraft,
    ProposalStatus,
};
pub use settings::{GovernanceSettings, VoteTypeTable, MAX_PERIOD, SETTINGS_SLOTS};
pub use tally::VoteType;
