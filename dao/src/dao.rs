//! The DAO: initialization, the governance surface, and reads.

use crate::config::DaoConfig;
use crate::error::DaoError;
use crate::events::DaoEvent;
use crate::guard::ReentrancyGuard;
use crate::host::{CallContext, Host};
use crate::signatures::{SignatureVerifier, SignedMessage, VoteMessage, DOMAIN_VERSION};
use guild_crypto::TypedDomain;
use guild_governance::{
    GovernanceEngine, GovernanceSettings, Proposal, ProposalCategory, ProposalDraft, VoteType,
};
use guild_ledger::{Checkpoint, ShareLedger};
use guild_types::{Address, Clock, Timestamp};
use std::collections::BTreeSet;
use std::mem;
use std::rc::Rc;
use tracing::info;

/// Everything an entry point may change. Snapshotted before each entry
/// point and restored if it fails.
#[derive(Clone, Debug, Default)]
pub(crate) struct DaoState {
    pub initialized: bool,
    pub name: String,
    pub symbol: String,
    pub docs: String,
    pub shares: ShareLedger,
    pub governance: GovernanceEngine,
    pub extensions: BTreeSet<Address>,
    pub signatures: SignatureVerifier,
    pub events: Vec<DaoEvent>,
}

impl DaoState {
    pub fn emit(&mut self, event: DaoEvent) {
        self.events.push(event);
    }

    /// Run `f` against the share ledger and log what it emitted, in order.
    pub fn with_shares<R>(&mut self, f: impl FnOnce(&mut ShareLedger) -> R) -> R {
        let out = f(&mut self.shares);
        let emitted = self.shares.take_events();
        self.events.extend(emitted.into_iter().map(DaoEvent::from));
        out
    }

    /// Run `f` against the governance engine, with read access to the
    /// ledger for voting weight, and log what it emitted.
    pub fn with_governance<R>(
        &mut self,
        f: impl FnOnce(&mut GovernanceEngine, &ShareLedger) -> R,
    ) -> R {
        let out = f(&mut self.governance, &self.shares);
        let emitted = self.governance.take_events();
        self.events.extend(emitted.into_iter().map(DaoEvent::from));
        out
    }
}

pub struct Dao {
    address: Address,
    clock: Rc<dyn Clock>,
    guard: ReentrancyGuard,
    pub(crate) state: DaoState,
    host: Host,
}

impl Dao {
    /// An uninitialized DAO living at `address`.
    pub fn new(address: Address, clock: Rc<dyn Clock>) -> Self {
        Self {
            address,
            clock,
            guard: ReentrancyGuard::new(),
            state: DaoState::default(),
            host: Host::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut Host {
        &mut self.host
    }

    /// Run `op` as one transaction: on error every change it made, to the
    /// DAO state and to the host, is undone.
    ///
    /// The event log is not part of the snapshot. It is cut back to its
    /// length on entry instead.
    pub(crate) fn atomic<T>(
        &mut self,
        op: impl FnOnce(&mut Self) -> Result<T, DaoError>,
    ) -> Result<T, DaoError> {
        let mark = self.state.events.len();
        let log = mem::take(&mut self.state.events);
        let state = self.state.clone();
        self.state.events = log;
        let host = self.host.clone();
        let result = op(self);
        if result.is_err() {
            let mut log = mem::take(&mut self.state.events);
            log.truncate(mark);
            self.state = state;
            self.state.events = log;
            self.host = host;
        }
        result
    }

    pub(crate) fn ensure_initialized(&self) -> Result<(), DaoError> {
        if !self.state.initialized {
            return Err(DaoError::NotInitialized);
        }
        Ok(())
    }

    pub(crate) fn guard(&self) -> &ReentrancyGuard {
        &self.guard
    }

    // ── initialization ──────────────────────────────────────────────────

    /// One-time setup: mint founding shares, whitelist extensions and run
    /// their setup hooks. All or nothing.
    pub fn init(&mut self, config: DaoConfig) -> Result<(), DaoError> {
        if self.state.initialized {
            return Err(DaoError::AlreadyInitialized);
        }
        config.validate()?;
        self.atomic(|dao| {
            let now = dao.now();
            let domain = TypedDomain::new(&config.name, DOMAIN_VERSION, config.chain_id, dao.address);
            let state = &mut dao.state;
            state.name = config.name.clone();
            state.symbol = config.symbol.clone();
            state.docs = config.docs.clone();
            state.shares = ShareLedger::new(config.paused);
            state.governance = GovernanceEngine::new(config.settings.clone())?;
            state.signatures = SignatureVerifier::new(domain);
            state.initialized = true;
            state.emit(DaoEvent::Initialized {
                name: config.name.clone(),
                symbol: config.symbol.clone(),
                members: config.members.len(),
                extensions: config.extensions.len(),
            });
            for member in &config.members {
                state.with_shares(|shares| shares.mint(&member.address, member.shares, now))?;
            }
            for ext in &config.extensions {
                state.extensions.insert(ext.address);
            }

            for ext in config.extensions.iter().filter(|e| !e.data.is_empty()) {
                dao.run_set_extension(&ext.address, &ext.data)?;
            }
            info!(
                name = %config.name,
                symbol = %config.symbol,
                members = config.members.len(),
                extensions = config.extensions.len(),
                supply = dao.state.shares.total_supply(),
                "dao initialized"
            );
            Ok(())
        })
    }

    pub(crate) fn run_set_extension(
        &mut self,
        extension: &Address,
        data: &[u8],
    ) -> Result<(), DaoError> {
        let ctx = CallContext {
            this: *extension,
            caller: self.address,
            value: 0,
        };
        self.with_contract(extension, |contract, dao| {
            contract.set_extension(ctx, dao, data)
        })
    }

    // ── governance surface ──────────────────────────────────────────────

    /// Create a proposal; returns its id.
    pub fn propose(
        &mut self,
        caller: &Address,
        category: ProposalCategory,
        draft: ProposalDraft,
    ) -> Result<u64, DaoError> {
        self.ensure_initialized()?;
        self.atomic(|dao| {
            let now = dao.now();
            let is_extension = dao.state.extensions.contains(caller);
            Ok(dao.state.with_governance(|engine, shares| {
                engine.propose(caller, category, draft, shares, is_extension, now)
            })?)
        })
    }

    pub fn cancel_proposal(&mut self, caller: &Address, id: u64) -> Result<(), DaoError> {
        self.ensure_initialized()?;
        self.atomic(|dao| {
            Ok(dao
                .state
                .with_governance(|engine, _| engine.cancel(caller, id))?)
        })
    }

    pub fn sponsor_proposal(&mut self, caller: &Address, id: u64) -> Result<(), DaoError> {
        self.ensure_initialized()?;
        self.atomic(|dao| {
            let now = dao.now();
            Ok(dao
                .state
                .with_governance(|engine, shares| engine.sponsor(caller, id, shares, now))?)
        })
    }

    /// Cast `caller`'s vote; returns the weight counted.
    pub fn vote(&mut self, caller: &Address, id: u64, approve: bool) -> Result<u128, DaoError> {
        self.ensure_initialized()?;
        let _token = self.guard.enter()?;
        self.atomic(|dao| dao.cast_vote(caller, id, approve))
    }

    /// Cast a vote signed off-chain by `vote.signer`.
    pub fn vote_by_sig(
        &mut self,
        vote: &VoteMessage,
        signed: &SignedMessage,
    ) -> Result<u128, DaoError> {
        self.ensure_initialized()?;
        let _token = self.guard.enter()?;
        self.atomic(|dao| {
            let signer = dao.state.signatures.verify(vote, signed, dao.now())?;
            dao.state.signatures.consume(&signer);
            dao.cast_vote(&signer, vote.proposal, vote.approve)
        })
    }

    fn cast_vote(&mut self, voter: &Address, id: u64, approve: bool) -> Result<u128, DaoError> {
        let now = self.now();
        Ok(self
            .state
            .with_governance(|engine, shares| engine.vote(voter, id, approve, shares, now))?)
    }

    /// Process proposal `id`, executing it if it passed. Returns whether it
    /// passed. Anyone may call this.
    pub fn process_proposal(&mut self, id: u64) -> Result<bool, DaoError> {
        self.ensure_initialized()?;
        let _token = self.guard.enter()?;
        self.atomic(|dao| {
            let now = dao.now();
            let decision = dao
                .state
                .with_governance(|engine, shares| engine.decide(id, shares, now))?;
            if decision.passed {
                dao.execute(&decision)?;
            }
            dao.state
                .with_governance(|engine, _| engine.finish(&decision))?;
            Ok(decision.passed)
        })
    }

    // ── reads ───────────────────────────────────────────────────────────

    pub fn is_initialized(&self) -> bool {
        self.state.initialized
    }

    pub fn name(&self) -> &str {
        &self.state.name
    }

    pub fn symbol(&self) -> &str {
        &self.state.symbol
    }

    pub fn docs(&self) -> &str {
        &self.state.docs
    }

    pub fn settings(&self) -> &GovernanceSettings {
        self.state.governance.settings()
    }

    pub fn proposal_vote_type(&self, category: ProposalCategory) -> VoteType {
        self.settings().vote_types.get(category)
    }

    pub fn voting_period(&self) -> u64 {
        self.settings().voting_period
    }

    pub fn grace_period(&self) -> u64 {
        self.settings().grace_period
    }

    pub fn quorum(&self) -> u8 {
        self.settings().quorum
    }

    pub fn supermajority(&self) -> u8 {
        self.settings().supermajority
    }

    pub fn is_extension(&self, account: &Address) -> bool {
        self.state.extensions.contains(account)
    }

    pub fn extensions(&self) -> impl Iterator<Item = &Address> {
        self.state.extensions.iter()
    }

    pub fn proposal(&self, id: u64) -> Option<&Proposal> {
        self.state.governance.proposal(id)
    }

    pub fn proposals(&self) -> impl Iterator<Item = &Proposal> {
        self.state.governance.proposals()
    }

    pub fn proposal_count(&self) -> u64 {
        self.state.governance.proposal_count()
    }

    pub fn get_current_votes(&self, account: &Address) -> u128 {
        self.state.shares.current_votes(account)
    }

    /// Voting power of `account` at the strictly past instant `at`.
    pub fn get_prior_votes(&self, account: &Address, at: Timestamp) -> Result<u128, DaoError> {
        Ok(self.state.shares.prior_votes(account, at, self.now())?)
    }

    pub fn checkpoints(&self, account: &Address) -> &[Checkpoint] {
        self.state.shares.checkpoints(account)
    }

    pub fn delegates(&self, account: &Address) -> Address {
        self.state.shares.delegates(account)
    }

    pub fn balance_of(&self, account: &Address) -> u128 {
        self.state.shares.balance_of(account)
    }

    pub fn total_supply(&self) -> u128 {
        self.state.shares.total_supply()
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.state.shares.allowance(owner, spender)
    }

    pub fn paused(&self) -> bool {
        self.state.shares.paused()
    }

    /// Next nonce `signer` must use in a signed message.
    pub fn nonces(&self, signer: &Address) -> u64 {
        self.state.signatures.nonce(signer)
    }

    /// Signing domain for votes, delegations and permits.
    pub fn domain(&self) -> &TypedDomain {
        self.state.signatures.domain()
    }

    pub fn events(&self) -> &[DaoEvent] {
        &self.state.events
    }

    /// Holders with a non-zero balance, sorted by address.
    pub fn holders(&self) -> Vec<(Address, u128)> {
        let mut holders: Vec<_> = self
            .state
            .shares
            .holders()
            .map(|(a, b)| (*a, *b))
            .collect();
        holders.sort();
        holders
    }
}
