//! Vote-type threshold policy.

use crate::error::GovernanceError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Approval rule applied to a proposal category.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum VoteType {
    /// More yes than no.
    #[default]
    SimpleMajority = 0,
    /// Simple majority, and turnout meets quorum.
    SimpleMajorityQuorum = 1,
    /// Yes share of votes cast meets the supermajority.
    Supermajority = 2,
    /// Supermajority, and turnout meets quorum.
    SupermajorityQuorum = 3,
}

impl VoteType {
    /// Whether a proposal with this tally passes.
    ///
    /// `supply` is the total share supply at voting start; `quorum` and
    /// `supermajority` are percentages. All comparisons are exact integer
    /// math. A proposal nobody voted on never passes.
    pub fn passes(self, yes: u128, no: u128, supply: u128, quorum: u8, supermajority: u8) -> bool {
        let cast = yes.saturating_add(no);
        if cast == 0 {
            return false;
        }
        let quorum_met = || cast.saturating_mul(100) >= supply.saturating_mul(u128::from(quorum));
        let supermajority_met =
            || yes.saturating_mul(100) >= cast.saturating_mul(u128::from(supermajority));

        match self {
            Self::SimpleMajority => yes > no,
            Self::SimpleMajorityQuorum => yes > no && quorum_met(),
            Self::Supermajority => supermajority_met(),
            Self::SupermajorityQuorum => supermajority_met() && quorum_met(),
        }
    }
}

impl TryFrom<u8> for VoteType {
    type Error = GovernanceError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Self::try_from(u128::from(raw))
    }
}

impl TryFrom<u128> for VoteType {
    type Error = GovernanceError;

    fn try_from(raw: u128) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Self::SimpleMajority),
            1 => Ok(Self::SimpleMajorityQuorum),
            2 => Ok(Self::Supermajority),
            3 => Ok(Self::SupermajorityQuorum),
            other => Err(GovernanceError::UnknownVoteType(other)),
        }
    }
}

impl From<VoteType> for u8 {
    fn from(vt: VoteType) -> u8 {
        vt as u8
    }
}

impl fmt::Display for VoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SimpleMajority => "simple-majority",
            Self::SimpleMajorityQuorum => "simple-majority+quorum",
            Self::Supermajority => "supermajority",
            Self::SupermajorityQuorum => "supermajority+quorum",
        };
        f.write_str(name)
    }
}
