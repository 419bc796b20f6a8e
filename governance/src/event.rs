use crate::proposal::ProposalCategory;
use guild_types::Address;
use serde::{Deserialize, Serialize};

/// A lifecycle change, buffered by the engine until drained.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GovernanceEvent {
    ProposalCreated {
        id: u64,
        proposer: Address,
        category: ProposalCategory,
        self_sponsored: bool,
    },
    ProposalCancelled {
        id: u64,
        proposer: Address,
    },
    ProposalSponsored {
        id: u64,
        sponsor: Address,
    },
    VoteCast {
        id: u64,
        voter: Address,
        approve: bool,
        weight: u128,
    },
    ProposalProcessed {
        id: u64,
        passed: bool,
    },
    ProposalEscaped {
        id: u64,
    },
}
