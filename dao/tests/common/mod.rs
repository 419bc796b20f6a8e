#![allow(dead_code)]

use guild_dao::{Dao, DaoConfig, ProposalCategory, ProposalDraft};
use guild_nullables::NullClock;
use guild_types::{whole_shares, Address, Clock, Timestamp};
use std::rc::Rc;

pub const GENESIS: u64 = 1_000;

pub fn dao_address() -> Address {
    Address::repeat_byte(0xda)
}

pub fn alice() -> Address {
    Address::repeat_byte(0xa1)
}

pub fn bob() -> Address {
    Address::repeat_byte(0xb0)
}

pub fn carol() -> Address {
    Address::repeat_byte(0xc4)
}

pub fn outsider() -> Address {
    Address::repeat_byte(0xee)
}

/// `[votingPeriod, gracePeriod, quorum, supermajority]` followed by
/// simple-majority vote types.
pub fn slots(voting_period: u64, grace_period: u64, quorum: u64, supermajority: u64) -> Vec<u64> {
    let mut s = vec![voting_period, grace_period, quorum, supermajority];
    s.extend([0u64; 12]);
    s
}

pub struct Fixture {
    pub clock: Rc<NullClock>,
    pub dao: Dao,
}

impl Fixture {
    /// An uninitialized DAO at `GENESIS`.
    pub fn bare() -> Self {
        let clock = Rc::new(NullClock::new(GENESIS));
        let dao = Dao::new(dao_address(), clock.clone());
        Self { clock, dao }
    }

    /// Alice holds 10 shares and bob 5; 30s voting, no grace, 60% supermajority.
    pub fn standard() -> Self {
        Self::with(
            &[(alice(), whole_shares(10)), (bob(), whole_shares(5))],
            &slots(30, 0, 0, 60),
            false,
        )
    }

    pub fn with(members: &[(Address, u128)], settings: &[u64], paused: bool) -> Self {
        let mut fixture = Self::bare();
        let (addresses, shares): (Vec<_>, Vec<_>) = members.iter().copied().unzip();
        let config = DaoConfig::from_parts(
            "Guild", "GLD", "charter-v1", paused, &[], &[], &addresses, &shares, settings,
        )
        .unwrap();
        fixture.dao.init(config).unwrap();
        fixture
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn advance(&self, secs: u64) {
        self.clock.advance(secs);
    }

    /// Alice proposes (self-sponsoring), one second passes, and alice votes yes.
    pub fn propose_and_approve(&mut self, category: ProposalCategory, draft: ProposalDraft) -> u64 {
        let id = self.dao.propose(&alice(), category, draft).unwrap();
        self.advance(1);
        self.dao.vote(&alice(), id, true).unwrap();
        id
    }

    /// Move past voting end and grace period of the current settings.
    pub fn wait_out_voting(&self) {
        self.advance(self.dao.voting_period() + self.dao.grace_period());
    }

    /// Propose, approve, wait, and process. Returns whether it passed.
    pub fn pass(&mut self, category: ProposalCategory, draft: ProposalDraft) -> bool {
        let id = self.propose_and_approve(category, draft);
        self.wait_out_voting();
        self.dao.process_proposal(id).unwrap()
    }
}

pub fn single(value: u128) -> ProposalDraft {
    ProposalDraft::new("setting").entry(Address::ZERO, value, vec![])
}
