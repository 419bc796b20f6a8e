//! Transaction scripts replayed against an in-memory DAO on a
//! deterministic clock.

use guild_dao::config::{hex_data, share_amount};
use guild_dao::{
    Dao, DaoConfig, DaoError, GovernanceSettings, ProposalCategory, ProposalDraft, ProposalStatus,
};
use guild_nullables::NullClock;
use guild_types::{Address, Clock, ErrorKind};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::rc::Rc;

/// One transaction, or a clock advance, in a replay script.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Advance {
        secs: u64,
    },
    Propose {
        proposer: Address,
        category: ProposalCategory,
        #[serde(default)]
        description: String,
        #[serde(default)]
        entries: Vec<Entry>,
    },
    Sponsor {
        sponsor: Address,
        id: u64,
    },
    Vote {
        voter: Address,
        id: u64,
        approve: bool,
    },
    Process {
        id: u64,
    },
    Cancel {
        proposer: Address,
        id: u64,
    },
    Transfer {
        from: Address,
        to: Address,
        #[serde(with = "share_amount")]
        amount: u128,
    },
    Delegate {
        delegator: Address,
        delegatee: Address,
    },
}

impl Step {
    fn name(&self) -> &'static str {
        match self {
            Step::Advance { .. } => "advance",
            Step::Propose { .. } => "propose",
            Step::Sponsor { .. } => "sponsor",
            Step::Vote { .. } => "vote",
            Step::Process { .. } => "process",
            Step::Cancel { .. } => "cancel",
            Step::Transfer { .. } => "transfer",
            Step::Delegate { .. } => "delegate",
        }
    }
}

/// One `(target, value, payload)` row of a proposal.
#[derive(Debug, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub target: Address,
    #[serde(default, with = "share_amount")]
    pub value: u128,
    #[serde(default, with = "hex_data")]
    pub payload: Vec<u8>,
}

#[derive(Debug, Serialize)]
pub struct StepOutcome {
    pub step: usize,
    pub op: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
}

#[derive(Debug, Serialize)]
pub struct MemberSummary {
    pub address: Address,
    pub balance: u128,
    pub votes: u128,
    pub delegate: Address,
}

#[derive(Debug, Serialize)]
pub struct ProposalSummary {
    pub id: u64,
    pub category: ProposalCategory,
    pub description: String,
    pub status: ProposalStatus,
    pub yes_votes: u128,
    pub no_votes: u128,
}

/// Final state of a replay.
#[derive(Debug, Serialize)]
pub struct Summary<'a> {
    pub name: &'a str,
    pub symbol: &'a str,
    pub docs: &'a str,
    pub now: u64,
    pub paused: bool,
    pub total_supply: u128,
    pub settings: &'a GovernanceSettings,
    pub members: Vec<MemberSummary>,
    pub proposals: Vec<ProposalSummary>,
    pub events: usize,
    pub steps: Vec<StepOutcome>,
}

pub struct Replay {
    clock: Rc<NullClock>,
    dao: Dao,
}

impl Replay {
    /// Initialize a DAO at `address` with the clock reading `start`.
    pub fn new(address: Address, config: DaoConfig, start: u64) -> Result<Self, DaoError> {
        let clock = Rc::new(NullClock::new(start));
        let mut dao = Dao::new(address, clock.clone());
        dao.init(config)?;
        Ok(Self { clock, dao })
    }

    pub fn dao(&self) -> &Dao {
        &self.dao
    }

    /// Apply every step in order. Failed steps are recorded and, like a
    /// reverted transaction, leave the DAO untouched.
    pub fn run(&mut self, steps: &[Step], fail_fast: bool) -> Vec<StepOutcome> {
        let mut outcomes = Vec::with_capacity(steps.len());
        for (index, step) in steps.iter().enumerate() {
            let outcome = match self.apply(step) {
                Ok(result) => StepOutcome {
                    step: index,
                    op: step.name(),
                    result: Some(result),
                    error: None,
                    kind: None,
                },
                Err(e) => {
                    tracing::warn!(step = index, op = step.name(), error = %e, "step failed");
                    StepOutcome {
                        step: index,
                        op: step.name(),
                        result: None,
                        error: Some(e.to_string()),
                        kind: Some(e.kind()),
                    }
                }
            };
            let failed = outcome.error.is_some();
            outcomes.push(outcome);
            if failed && fail_fast {
                break;
            }
        }
        outcomes
    }

    pub fn apply(&mut self, step: &Step) -> Result<Value, DaoError> {
        let dao = &mut self.dao;
        match step {
            Step::Advance { secs } => {
                self.clock.advance(*secs);
                Ok(json!({ "now": self.clock.now().as_secs() }))
            }
            Step::Propose {
                proposer,
                category,
                description,
                entries,
            } => {
                let draft = entries.iter().fold(
                    ProposalDraft::new(description.clone()),
                    |draft, entry| draft.entry(entry.target, entry.value, entry.payload.clone()),
                );
                let id = dao.propose(proposer, *category, draft)?;
                Ok(json!({ "id": id }))
            }
            Step::Sponsor { sponsor, id } => {
                dao.sponsor_proposal(sponsor, *id)?;
                Ok(Value::Null)
            }
            Step::Vote { voter, id, approve } => {
                let weight = dao.vote(voter, *id, *approve)?;
                Ok(json!({ "weight": weight.to_string() }))
            }
            Step::Process { id } => {
                let passed = dao.process_proposal(*id)?;
                Ok(json!({ "passed": passed }))
            }
            Step::Cancel { proposer, id } => {
                dao.cancel_proposal(proposer, *id)?;
                Ok(Value::Null)
            }
            Step::Transfer { from, to, amount } => {
                dao.transfer(from, to, *amount)?;
                Ok(Value::Null)
            }
            Step::Delegate {
                delegator,
                delegatee,
            } => {
                dao.delegate(delegator, delegatee)?;
                Ok(Value::Null)
            }
        }
    }

    pub fn summary(&self, steps: Vec<StepOutcome>) -> Summary<'_> {
        let dao = &self.dao;
        let mut accounts: BTreeSet<Address> = BTreeSet::new();
        for (holder, _) in dao.holders() {
            accounts.insert(holder);
            accounts.insert(dao.delegates(&holder));
        }
        let members = accounts
            .into_iter()
            .map(|address| MemberSummary {
                address,
                balance: dao.balance_of(&address),
                votes: dao.get_current_votes(&address),
                delegate: dao.delegates(&address),
            })
            .collect();
        let proposals = dao
            .proposals()
            .map(|p| ProposalSummary {
                id: p.id,
                category: p.category(),
                description: p.description.clone(),
                status: p.status,
                yes_votes: p.yes_votes,
                no_votes: p.no_votes,
            })
            .collect();

        Summary {
            name: dao.name(),
            symbol: dao.symbol(),
            docs: dao.docs(),
            now: self.clock.now().as_secs(),
            paused: dao.paused(),
            total_supply: dao.total_supply(),
            settings: dao.settings(),
            members,
            proposals,
            events: dao.events().len(),
            steps,
        }
    }
}
