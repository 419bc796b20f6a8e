//! The share ledger surface: ERC20-style transfers and approvals, signed
//! permits, and delegation.
//!
//! Transfers and pull transfers fail while the DAO is paused; burns,
//! approvals and delegation do not.

use crate::dao::Dao;
use crate::error::DaoError;
use crate::signatures::{DelegationMessage, PermitMessage, SignedMessage};
use guild_types::Address;

impl Dao {
    pub fn transfer(&mut self, caller: &Address, to: &Address, amount: u128) -> Result<(), DaoError> {
        self.ensure_initialized()?;
        self.atomic(|dao| {
            let now = dao.now();
            Ok(dao
                .state
                .with_shares(|shares| shares.transfer(caller, to, amount, now))?)
        })
    }

    pub fn transfer_from(
        &mut self,
        caller: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), DaoError> {
        self.ensure_initialized()?;
        self.atomic(|dao| {
            let now = dao.now();
            Ok(dao.state.with_shares(|shares| {
                shares.transfer_from(caller, from, to, amount, now)
            })?)
        })
    }

    pub fn approve(&mut self, caller: &Address, spender: &Address, amount: u128) -> Result<(), DaoError> {
        self.ensure_initialized()?;
        self.atomic(|dao| {
            dao.state
                .with_shares(|shares| shares.approve(caller, spender, amount));
            Ok(())
        })
    }

    pub fn burn(&mut self, caller: &Address, amount: u128) -> Result<(), DaoError> {
        self.ensure_initialized()?;
        self.atomic(|dao| {
            let now = dao.now();
            Ok(dao.state.with_shares(|shares| shares.burn(caller, amount, now))?)
        })
    }

    pub fn burn_from(&mut self, caller: &Address, from: &Address, amount: u128) -> Result<(), DaoError> {
        self.ensure_initialized()?;
        self.atomic(|dao| {
            let now = dao.now();
            Ok(dao
                .state
                .with_shares(|shares| shares.burn_from(caller, from, amount, now))?)
        })
    }

    /// Approve `permit.spender` on behalf of `permit.owner`, authorized by
    /// the owner's signature.
    pub fn permit(&mut self, permit: &PermitMessage, signed: &SignedMessage) -> Result<(), DaoError> {
        self.ensure_initialized()?;
        self.atomic(|dao| {
            let owner = dao.state.signatures.verify(permit, signed, dao.now())?;
            dao.state.signatures.consume(&owner);
            dao.state
                .with_shares(|shares| shares.approve(&owner, &permit.spender, permit.value));
            Ok(())
        })
    }

    pub fn delegate(&mut self, caller: &Address, to: &Address) -> Result<(), DaoError> {
        self.ensure_initialized()?;
        self.atomic(|dao| {
            let now = dao.now();
            dao.state.with_shares(|shares| shares.delegate(caller, to, now));
            Ok(())
        })
    }

    /// Delegate the signer's voting power to `message.delegatee`.
    pub fn delegate_by_sig(
        &mut self,
        message: &DelegationMessage,
        signed: &SignedMessage,
    ) -> Result<(), DaoError> {
        self.ensure_initialized()?;
        self.atomic(|dao| {
            let now = dao.now();
            let delegator = dao.state.signatures.verify(message, signed, now)?;
            dao.state.signatures.consume(&delegator);
            dao.state
                .with_shares(|shares| shares.delegate(&delegator, &message.delegatee, now));
            Ok(())
        })
    }
}
