//! Applying passed proposals, and the extension entry point.
//!
//! Both run inside the caller's transaction: any failure here unwinds the
//! whole `process_proposal` or `call_extension` call.

use crate::dao::Dao;
use crate::error::DaoError;
use crate::events::DaoEvent;
use crate::host::{CallContext, ContractError, ExtensionOutcome};
use guild_governance::{CallEntry, Decision, ExtensionEntry, GovernanceSettings, ProposalAction};
use guild_types::Address;
use tracing::{debug, info};

impl Dao {
    /// Carry out the effect of a passed proposal.
    pub(crate) fn execute(&mut self, decision: &Decision) -> Result<(), DaoError> {
        let now = self.now();
        match &decision.action {
            ProposalAction::Mint(grants) => {
                for (to, amount) in grants {
                    self.state.with_shares(|shares| shares.mint(to, *amount, now))?;
                }
            }
            ProposalAction::Burn(evictions) => {
                for (from, amount) in evictions {
                    self.state.with_shares(|shares| shares.burn(from, *amount, now))?;
                }
            }
            ProposalAction::Call(calls) => {
                for call in calls {
                    self.execute_call(call)?;
                }
            }
            ProposalAction::VotingPeriod(secs) => {
                self.update_settings(|s| s.voting_period = *secs)?;
            }
            ProposalAction::GracePeriod(secs) => {
                self.update_settings(|s| s.grace_period = *secs)?;
            }
            ProposalAction::Quorum(pct) => {
                self.update_settings(|s| s.quorum = *pct)?;
            }
            ProposalAction::Supermajority(pct) => {
                self.update_settings(|s| s.supermajority = *pct)?;
            }
            ProposalAction::VoteType {
                category,
                vote_type,
            } => {
                self.update_settings(|s| s.vote_types.set(*category, *vote_type))?;
            }
            ProposalAction::Pause => self.state.with_shares(|shares| shares.flip_pause()),
            ProposalAction::Extension(entries) => {
                for entry in entries {
                    self.execute_extension_entry(entry)?;
                }
            }
            ProposalAction::Escape(target) => {
                self.state.with_governance(|engine, _| engine.escape(*target));
            }
            ProposalAction::Docs => {
                self.state.docs = decision.description.clone();
                self.state.emit(DaoEvent::DocsUpdated {
                    docs: decision.description.clone(),
                });
                info!(docs = %decision.description, "docs updated");
            }
        }
        Ok(())
    }

    fn update_settings(
        &mut self,
        change: impl FnOnce(&mut GovernanceSettings),
    ) -> Result<(), DaoError> {
        let mut settings = self.state.governance.settings().clone();
        change(&mut settings);
        self.state
            .with_governance(|engine, _| engine.set_settings(settings))?;
        Ok(())
    }

    fn execute_call(&mut self, call: &CallEntry) -> Result<(), DaoError> {
        if call.payload.is_empty() {
            debug!(target = %call.target, "empty payload, call skipped");
            return Ok(());
        }
        let this = self.address();
        self.host_mut()
            .transfer_native(&this, &call.target, call.value)
            .map_err(|source| DaoError::ExternalCall {
                target: call.target,
                source,
            })?;
        let ctx = CallContext {
            this: call.target,
            caller: this,
            value: call.value,
        };
        self.with_contract(&call.target, |contract, dao| {
            contract.call(ctx, dao, &call.payload)
        })?;
        debug!(target = %call.target, value = call.value, "external call executed");
        Ok(())
    }

    fn execute_extension_entry(&mut self, entry: &ExtensionEntry) -> Result<(), DaoError> {
        if entry.toggle {
            let enabled = if self.state.extensions.remove(&entry.target) {
                false
            } else {
                self.state.extensions.insert(entry.target);
                true
            };
            self.state.emit(DaoEvent::ExtensionToggled {
                extension: entry.target,
                enabled,
            });
            info!(extension = %entry.target, enabled, "extension toggled");
        }
        if !entry.payload.is_empty() {
            self.run_set_extension(&entry.target, &entry.payload)?;
        }
        Ok(())
    }

    // ── extension entry point ───────────────────────────────────────────

    /// Mint or burn shares through a whitelisted extension.
    ///
    /// Called by a whitelisted extension directly, `extension` names the
    /// affected account and `data[0] != 0` selects mint. Called by anyone
    /// else, `extension` must be whitelisted: `value` native coin moves from
    /// the caller to it, and the extension decides what to mint to or burn
    /// from the caller.
    pub fn call_extension(
        &mut self,
        caller: &Address,
        extension: &Address,
        amount: u128,
        data: &[u8],
        value: u128,
    ) -> Result<ExtensionOutcome, DaoError> {
        self.ensure_initialized()?;
        let _token = self.guard().enter()?;
        self.atomic(|dao| {
            let (account, outcome) = if dao.is_extension(caller) {
                let outcome = ExtensionOutcome {
                    mint: data.first().is_some_and(|flag| *flag != 0),
                    amount,
                };
                (*extension, outcome)
            } else if dao.is_extension(extension) {
                dao.host_mut()
                    .transfer_native(caller, extension, value)
                    .map_err(|e| match e {
                        ContractError::InsufficientValue { needed, available } => {
                            DaoError::InsufficientNative {
                                account: *caller,
                                needed,
                                available,
                            }
                        }
                        source => DaoError::ExternalCall {
                            target: *extension,
                            source,
                        },
                    })?;
                let ctx = CallContext {
                    this: *extension,
                    caller: *caller,
                    value,
                };
                let outcome = dao.with_contract(extension, |contract, dao| {
                    contract.call_extension(ctx, dao, caller, amount, data)
                })?;
                (*caller, outcome)
            } else {
                return Err(DaoError::NotExtension(*extension));
            };

            let now = dao.now();
            if outcome.amount != 0 {
                if outcome.mint {
                    dao.state
                        .with_shares(|shares| shares.mint(&account, outcome.amount, now))?;
                } else {
                    dao.state
                        .with_shares(|shares| shares.burn(&account, outcome.amount, now))?;
                }
            }
            dao.state.emit(DaoEvent::ExtensionCalled {
                extension: *extension,
                account,
                mint: outcome.mint,
                amount: outcome.amount,
            });
            debug!(%extension, %account, mint = outcome.mint, amount = outcome.amount, "extension called");
            Ok(outcome)
        })
    }
}
