//! Governance settings registry.
//!
//! One record of named thresholds plus the vote-type table, validated by a
//! single [`GovernanceSettings::validate`] whether the values arrive at init,
//! from a config file, or through a passed proposal.

use crate::error::GovernanceError;
use crate::proposal::{ProposalCategory, CATEGORY_COUNT};
use crate::tally::VoteType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound for voting and grace periods: one 365-day year.
pub const MAX_PERIOD: u64 = 31_536_000;

/// Length of the flat settings block:
/// `[votingPeriod, gracePeriod, quorum, supermajority, voteType0..voteType11]`.
pub const SETTINGS_SLOTS: usize = 4 + CATEGORY_COUNT;

/// Vote type for each proposal category.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoteTypeTable([VoteType; CATEGORY_COUNT]);

impl VoteTypeTable {
    pub fn new(entries: [VoteType; CATEGORY_COUNT]) -> Self {
        Self(entries)
    }

    pub fn get(&self, category: ProposalCategory) -> VoteType {
        self.0[category.index()]
    }

    pub fn set(&mut self, category: ProposalCategory, vote_type: VoteType) {
        self.0[category.index()] = vote_type;
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProposalCategory, VoteType)> + '_ {
        ProposalCategory::ALL.iter().map(|c| (*c, self.get(*c)))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceSettings {
    /// Seconds a sponsored proposal stays open for voting.
    pub voting_period: u64,
    /// Seconds after voting closes before processing is allowed.
    pub grace_period: u64,
    /// Minimum turnout, percent of supply at voting start.
    pub quorum: u8,
    /// Minimum yes share, percent of votes cast.
    pub supermajority: u8,
    #[serde(default)]
    pub vote_types: VoteTypeTable,
}

impl Default for GovernanceSettings {
    /// One-day voting, no grace period, no quorum, 52% supermajority, and
    /// simple majority for every category.
    fn default() -> Self {
        Self {
            voting_period: 86_400,
            grace_period: 0,
            quorum: 0,
            supermajority: 52,
            vote_types: VoteTypeTable::default(),
        }
    }
}

impl GovernanceSettings {
    pub fn validate(&self) -> Result<(), GovernanceError> {
        check_voting_period(u128::from(self.voting_period))?;
        check_grace_period(u128::from(self.grace_period))?;
        check_quorum(u128::from(self.quorum))?;
        check_supermajority(u128::from(self.supermajority))?;
        Ok(())
    }

    /// Parse and validate the flat 16-slot settings block.
    pub fn from_slots(slots: &[u64]) -> Result<Self, GovernanceError> {
        if slots.len() != SETTINGS_SLOTS {
            return Err(GovernanceError::InvalidSettingsLength(slots.len()));
        }
        let voting_period = check_voting_period(u128::from(slots[0]))?;
        let grace_period = check_grace_period(u128::from(slots[1]))?;
        let quorum = check_quorum(u128::from(slots[2]))?;
        let supermajority = check_supermajority(u128::from(slots[3]))?;

        let mut vote_types = VoteTypeTable::default();
        for (category, raw) in ProposalCategory::ALL.iter().zip(&slots[4..]) {
            vote_types.set(*category, VoteType::try_from(u128::from(*raw))?);
        }

        Ok(Self {
            voting_period,
            grace_period,
            quorum,
            supermajority,
            vote_types,
        })
    }

    /// The flat 16-slot form of these settings.
    pub fn to_slots(&self) -> Vec<u64> {
        let mut slots = vec![
            self.voting_period,
            self.grace_period,
            u64::from(self.quorum),
            u64::from(self.supermajority),
        ];
        slots.extend(self.vote_types.iter().map(|(_, vt)| u64::from(u8::from(vt))));
        slots
    }
}

pub(crate) fn check_voting_period(v: u128) -> Result<u64, GovernanceError> {
    match u64::try_from(v) {
        Ok(secs) if (1..=MAX_PERIOD).contains(&secs) => Ok(secs),
        _ => Err(GovernanceError::InvalidVotingPeriod(v)),
    }
}

pub(crate) fn check_grace_period(v: u128) -> Result<u64, GovernanceError> {
    match u64::try_from(v) {
        Ok(secs) if secs <= MAX_PERIOD => Ok(secs),
        _ => Err(GovernanceError::InvalidGracePeriod(v)),
    }
}

pub(crate) fn check_quorum(v: u128) -> Result<u8, GovernanceError> {
    match u8::try_from(v) {
        Ok(pct) if pct <= 100 => Ok(pct),
        _ => Err(GovernanceError::InvalidQuorum(v)),
    }
}

pub(crate) fn check_supermajority(v: u128) -> Result<u8, GovernanceError> {
    match u8::try_from(v) {
        Ok(pct) if (52..=100).contains(&pct) => Ok(pct),
        _ => Err(GovernanceError::InvalidSupermajority(v)),
    }
}

impl fmt::Display for GovernanceSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "voting period:  {}",
            guild_utils::format_duration(self.voting_period)
        )?;
        writeln!(
            f,
            "grace period:   {}",
            guild_utils::format_duration(self.grace_period)
        )?;
        writeln!(f, "quorum:         {}%", self.quorum)?;
        writeln!(f, "supermajority:  {}%", self.supermajority)?;
        for (category, vote_type) in self.vote_types.iter() {
            writeln!(f, "  {category:<14} {vote_type}")?;
        }
        Ok(())
    }
}
