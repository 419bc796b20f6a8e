//! The proposal lifecycle manager.

use crate::error::GovernanceError;
use crate::event::GovernanceEvent;
use crate::proposal::{Proposal, ProposalAction, ProposalCategory, ProposalDraft, ProposalStatus};
use crate::settings::GovernanceSettings;
use guild_ledger::{LedgerError, ShareLedger};
use guild_types::{Address, Timestamp};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

/// Read access to checkpointed voting power.
pub trait VotingPower {
    fn current_votes(&self, account: &Address) -> u128;
    fn prior_votes(&self, account: &Address, at: Timestamp, now: Timestamp)
        -> Result<u128, LedgerError>;
    fn prior_supply(&self, at: Timestamp, now: Timestamp) -> Result<u128, LedgerError>;
}

impl VotingPower for ShareLedger {
    fn current_votes(&self, account: &Address) -> u128 {
        ShareLedger::current_votes(self, account)
    }

    fn prior_votes(
        &self,
        account: &Address,
        at: Timestamp,
        now: Timestamp,
    ) -> Result<u128, LedgerError> {
        ShareLedger::prior_votes(self, account, at, now)
    }

    fn prior_supply(&self, at: Timestamp, now: Timestamp) -> Result<u128, LedgerError> {
        ShareLedger::prior_supply(self, at, now)
    }
}

/// Outcome of a successful processing check, ready to be executed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decision {
    pub id: u64,
    pub passed: bool,
    pub action: ProposalAction,
    pub description: String,
}

#[derive(Clone, Debug, Default)]
pub struct GovernanceEngine {
    settings: GovernanceSettings,
    proposals: BTreeMap<u64, Proposal>,
    /// Ids neither processed, cancelled nor escaped.
    unresolved: BTreeSet<u64>,
    count: u64,
    events: Vec<GovernanceEvent>,
}

impl GovernanceEngine {
    pub fn new(settings: GovernanceSettings) -> Result<Self, GovernanceError> {
        settings.validate()?;
        Ok(Self {
            settings,
            ..Self::default()
        })
    }

    pub fn settings(&self) -> &GovernanceSettings {
        &self.settings
    }

    /// Replace the settings after validating them.
    pub fn set_settings(&mut self, settings: GovernanceSettings) -> Result<(), GovernanceError> {
        settings.validate()?;
        info!(
            voting_period = settings.voting_period,
            grace_period = settings.grace_period,
            quorum = settings.quorum,
            supermajority = settings.supermajority,
            "governance settings updated"
        );
        self.settings = settings;
        Ok(())
    }

    pub fn proposal(&self, id: u64) -> Option<&Proposal> {
        self.proposals.get(&id)
    }

    pub fn proposals(&self) -> impl Iterator<Item = &Proposal> {
        self.proposals.values()
    }

    /// The last id assigned; zero before the first proposal.
    pub fn proposal_count(&self) -> u64 {
        self.count
    }

    /// Lowest id still waiting to be processed, if any.
    pub fn next_unresolved(&self) -> Option<u64> {
        self.unresolved.first().copied()
    }

    pub fn take_events(&mut self) -> Vec<GovernanceEvent> {
        std::mem::take(&mut self.events)
    }

    /// Create a proposal and return its id.
    ///
    /// A proposer with voting power, or a whitelisted extension
    /// (`is_extension`), sponsors their own proposal and voting opens now.
    pub fn propose<P: VotingPower + ?Sized>(
        &mut self,
        proposer: &Address,
        category: ProposalCategory,
        draft: ProposalDraft,
        power: &P,
        is_extension: bool,
        now: Timestamp,
    ) -> Result<u64, GovernanceError> {
        let action = ProposalAction::from_draft(category, &draft)?;
        let id = self.count + 1;
        if action == ProposalAction::Escape(id) {
            return Err(GovernanceError::SelfEscape(id));
        }

        let self_sponsored = is_extension || power.current_votes(proposer) > 0;
        let mut proposal = Proposal {
            id,
            action,
            description: draft.description,
            proposer: *proposer,
            sponsor: None,
            creation_time: now,
            voting_starts: None,
            voting_ends: None,
            yes_votes: 0,
            no_votes: 0,
            voters: BTreeSet::new(),
            status: ProposalStatus::Draft,
        };
        if self_sponsored {
            self.open_voting(&mut proposal, proposer, now);
        }

        self.count = id;
        self.proposals.insert(id, proposal);
        self.unresolved.insert(id);
        self.events.push(GovernanceEvent::ProposalCreated {
            id,
            proposer: *proposer,
            category,
            self_sponsored,
        });
        info!(id, %proposer, %category, self_sponsored, "proposal created");
        Ok(id)
    }

    /// Withdraw an unsponsored proposal. Proposer only.
    pub fn cancel(&mut self, caller: &Address, id: u64) -> Result<(), GovernanceError> {
        let proposal = self.live_mut(id)?;
        if proposal.proposer != *caller {
            return Err(GovernanceError::NotProposer(id));
        }
        if proposal.status != ProposalStatus::Draft {
            return Err(GovernanceError::AlreadySponsored(id));
        }
        proposal.status = ProposalStatus::Cancelled;
        self.unresolved.remove(&id);
        self.events.push(GovernanceEvent::ProposalCancelled {
            id,
            proposer: *caller,
        });
        info!(id, proposer = %caller, "proposal cancelled");
        Ok(())
    }

    /// Open voting on a draft. Members only.
    pub fn sponsor<P: VotingPower + ?Sized>(
        &mut self,
        caller: &Address,
        id: u64,
        power: &P,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        let mut proposal = self.live(id)?.clone();
        if power.current_votes(caller) == 0 {
            return Err(GovernanceError::NotMember(*caller));
        }
        if proposal.status != ProposalStatus::Draft {
            return Err(GovernanceError::AlreadySponsored(id));
        }
        self.open_voting(&mut proposal, caller, now);
        self.proposals.insert(id, proposal);
        self.events.push(GovernanceEvent::ProposalSponsored {
            id,
            sponsor: *caller,
        });
        info!(id, sponsor = %caller, "proposal sponsored");
        Ok(())
    }

    /// Record `voter`'s checkpointed power at voting start as a yes or no.
    /// Returns the weight counted.
    pub fn vote<P: VotingPower + ?Sized>(
        &mut self,
        voter: &Address,
        id: u64,
        approve: bool,
        power: &P,
        now: Timestamp,
    ) -> Result<u128, GovernanceError> {
        let proposal = self.live_mut(id)?;
        let (starts, ends) = match (proposal.voting_starts, proposal.voting_ends) {
            (Some(starts), Some(ends)) => (starts, ends),
            _ => return Err(GovernanceError::VotingNotStarted(id)),
        };
        if now <= starts {
            return Err(GovernanceError::VotingNotStarted(id));
        }
        if now >= ends {
            return Err(GovernanceError::VotingClosed(id));
        }
        if proposal.has_voted(voter) {
            return Err(GovernanceError::AlreadyVoted { id, voter: *voter });
        }

        let weight = power.prior_votes(voter, starts, now)?;
        if weight == 0 {
            return Err(GovernanceError::NotMember(*voter));
        }
        if approve {
            proposal.yes_votes += weight;
        } else {
            proposal.no_votes += weight;
        }
        proposal.voters.insert(*voter);

        self.events.push(GovernanceEvent::VoteCast {
            id,
            voter: *voter,
            approve,
            weight,
        });
        debug!(id, %voter, approve, weight, "vote cast");
        Ok(weight)
    }

    /// Check that `id` may be processed now and tally its outcome.
    ///
    /// Does not mutate; the caller executes the action when it passed and
    /// then calls [`finish`](Self::finish).
    pub fn decide<P: VotingPower + ?Sized>(
        &self,
        id: u64,
        power: &P,
        now: Timestamp,
    ) -> Result<Decision, GovernanceError> {
        let proposal = self.live(id)?;
        let (starts, ends) = match (proposal.voting_starts, proposal.voting_ends) {
            (Some(starts), Some(ends)) => (starts, ends),
            _ => return Err(GovernanceError::VotingNotStarted(id)),
        };
        let ready_at = ends.plus(self.settings.grace_period);
        if now < ready_at {
            return Err(GovernanceError::NotProcessable { id, ready_at, now });
        }
        if proposal.category() != ProposalCategory::Escape {
            if let Some(pending) = self.unresolved.range(..id).next() {
                return Err(GovernanceError::OutOfOrder {
                    id,
                    pending: *pending,
                });
            }
        }

        let supply = power.prior_supply(starts, now)?;
        let vote_type = self.settings.vote_types.get(proposal.category());
        let passed = vote_type.passes(
            proposal.yes_votes,
            proposal.no_votes,
            supply,
            self.settings.quorum,
            self.settings.supermajority,
        );
        Ok(Decision {
            id,
            passed,
            action: proposal.action.clone(),
            description: proposal.description.clone(),
        })
    }

    /// Mark a decided proposal processed. Terminal for `id`.
    pub fn finish(&mut self, decision: &Decision) -> Result<(), GovernanceError> {
        let id = decision.id;
        let proposal = self.live_mut(id)?;
        proposal.status = ProposalStatus::Processed {
            passed: decision.passed,
        };
        self.unresolved.remove(&id);
        self.events.push(GovernanceEvent::ProposalProcessed {
            id,
            passed: decision.passed,
        });
        info!(id, passed = decision.passed, "proposal processed");
        Ok(())
    }

    /// Delete the record of unresolved proposal `target`. Returns whether
    /// anything was removed.
    pub fn escape(&mut self, target: u64) -> bool {
        let live = self
            .proposals
            .get(&target)
            .is_some_and(|p| p.status.is_unresolved());
        if !live {
            warn!(target, "escape target is not a live proposal");
            return false;
        }
        self.proposals.remove(&target);
        self.unresolved.remove(&target);
        self.events.push(GovernanceEvent::ProposalEscaped { id: target });
        info!(target, "proposal escaped");
        true
    }

    fn open_voting(&self, proposal: &mut Proposal, sponsor: &Address, now: Timestamp) {
        proposal.sponsor = Some(*sponsor);
        proposal.voting_starts = Some(now);
        proposal.voting_ends = Some(now.plus(self.settings.voting_period));
        proposal.status = ProposalStatus::VotingOpen;
    }

    fn live(&self, id: u64) -> Result<&Proposal, GovernanceError> {
        let proposal = self
            .proposals
            .get(&id)
            .ok_or(GovernanceError::ProposalNotFound(id))?;
        match proposal.status {
            ProposalStatus::Cancelled => Err(GovernanceError::ProposalCancelled(id)),
            ProposalStatus::Processed { .. } => Err(GovernanceError::AlreadyProcessed(id)),
            ProposalStatus::Draft | ProposalStatus::VotingOpen => Ok(proposal),
        }
    }

    fn live_mut(&mut self, id: u64) -> Result<&mut Proposal, GovernanceError> {
        self.live(id)?;
        self.proposals
            .get_mut(&id)
            .ok_or(GovernanceError::ProposalNotFound(id))
    }
}
