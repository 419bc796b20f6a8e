//! The share ledger.
//!
//! Balances, allowances, the pause gate and the total supply. Every balance
//! change is mirrored into the delegates' checkpoints in the same call, so
//! voting power always sums to the supply.

use crate::checkpoint::{Checkpoint, CheckpointStore};
use crate::delegation::DelegationRegistry;
use crate::error::LedgerError;
use crate::event::LedgerEvent;
use guild_types::{Address, Timestamp, MAX_SUPPLY};
use std::collections::HashMap;

#[derive(Clone, Debug, Default)]
pub struct ShareLedger {
    balances: HashMap<Address, u128>,
    allowances: HashMap<(Address, Address), u128>,
    total_supply: u128,
    paused: bool,
    checkpoints: CheckpointStore,
    delegation: DelegationRegistry,
    events: Vec<LedgerEvent>,
}

impl ShareLedger {
    pub fn new(paused: bool) -> Self {
        Self {
            paused,
            ..Self::default()
        }
    }

    // ── reads ───────────────────────────────────────────────────────────

    pub fn balance_of(&self, account: &Address) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(0)
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn delegates(&self, account: &Address) -> Address {
        self.delegation.delegate_of(account)
    }

    pub fn current_votes(&self, account: &Address) -> u128 {
        self.checkpoints.current(account)
    }

    pub fn prior_votes(
        &self,
        account: &Address,
        at: Timestamp,
        now: Timestamp,
    ) -> Result<u128, LedgerError> {
        self.checkpoints.prior(account, at, now)
    }

    pub fn prior_supply(&self, at: Timestamp, now: Timestamp) -> Result<u128, LedgerError> {
        self.checkpoints.prior_supply(at, now)
    }

    pub fn checkpoints(&self, account: &Address) -> &[Checkpoint] {
        self.checkpoints.checkpoints(account)
    }

    /// Every account holding a non-zero balance.
    pub fn holders(&self) -> impl Iterator<Item = (&Address, &u128)> {
        self.balances.iter().filter(|(_, bal)| **bal > 0)
    }

    /// Drain buffered events in emission order.
    pub fn take_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.events)
    }

    // ── supply ──────────────────────────────────────────────────────────

    /// Create `amount` new shares for `to`. Not gated by pause.
    pub fn mint(&mut self, to: &Address, amount: u128, now: Timestamp) -> Result<(), LedgerError> {
        let supply = self
            .total_supply
            .checked_add(amount)
            .filter(|s| *s <= MAX_SUPPLY)
            .ok_or(LedgerError::SupplyOverflow { amount })?;

        self.total_supply = supply;
        *self.balances.entry(*to).or_default() += amount;
        self.checkpoints.record_supply(supply, now);

        let dst = self.delegation.delegate_of(to);
        self.move_delegates(None, Some(dst), amount, now);
        self.events.push(LedgerEvent::Transfer {
            from: None,
            to: Some(*to),
            amount,
        });
        tracing::debug!(%to, amount, supply, "shares minted");
        Ok(())
    }

    /// Destroy `amount` of `from`'s shares. Not gated by pause.
    pub fn burn(&mut self, from: &Address, amount: u128, now: Timestamp) -> Result<(), LedgerError> {
        self.debit(from, amount)?;
        self.total_supply -= amount;
        self.checkpoints.record_supply(self.total_supply, now);

        let src = self.delegation.delegate_of(from);
        self.move_delegates(Some(src), None, amount, now);
        self.events.push(LedgerEvent::Transfer {
            from: Some(*from),
            to: None,
            amount,
        });
        tracing::debug!(%from, amount, supply = self.total_supply, "shares burned");
        Ok(())
    }

    /// Burn `owner`'s shares on their behalf, spending `spender`'s allowance.
    pub fn burn_from(
        &mut self,
        spender: &Address,
        owner: &Address,
        amount: u128,
        now: Timestamp,
    ) -> Result<(), LedgerError> {
        let remaining = self.check_allowance(owner, spender, amount)?;
        self.burn(owner, amount, now)?;
        self.allowances.insert((*owner, *spender), remaining);
        Ok(())
    }

    // ── transfers ───────────────────────────────────────────────────────

    pub fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: u128,
        now: Timestamp,
    ) -> Result<(), LedgerError> {
        if self.paused {
            return Err(LedgerError::Paused);
        }
        self.move_balance(from, to, amount, now)
    }

    /// Pull transfer by `spender` out of `owner`'s balance.
    pub fn transfer_from(
        &mut self,
        spender: &Address,
        owner: &Address,
        to: &Address,
        amount: u128,
        now: Timestamp,
    ) -> Result<(), LedgerError> {
        if self.paused {
            return Err(LedgerError::Paused);
        }
        let remaining = self.check_allowance(owner, spender, amount)?;
        self.move_balance(owner, to, amount, now)?;
        self.allowances.insert((*owner, *spender), remaining);
        Ok(())
    }

    pub fn approve(&mut self, owner: &Address, spender: &Address, amount: u128) {
        self.allowances.insert((*owner, *spender), amount);
        self.events.push(LedgerEvent::Approval {
            owner: *owner,
            spender: *spender,
            amount,
        });
    }

    // ── delegation ──────────────────────────────────────────────────────

    /// Assign `delegator`'s full balance of voting weight to `to`.
    pub fn delegate(&mut self, delegator: &Address, to: &Address, now: Timestamp) {
        let previous = self.delegation.set(delegator, to);
        self.events.push(LedgerEvent::DelegateChanged {
            delegator: *delegator,
            from: previous,
            to: *to,
        });
        let weight = self.balance_of(delegator);
        self.move_delegates(Some(previous), Some(*to), weight, now);
        tracing::debug!(%delegator, from = %previous, %to, weight, "delegate changed");
    }

    // ── pause ───────────────────────────────────────────────────────────

    pub fn flip_pause(&mut self) {
        self.set_paused(!self.paused);
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
        self.events.push(LedgerEvent::PauseFlipped { paused });
        tracing::info!(paused, "share transfers pause flag set");
    }

    // ── internals ───────────────────────────────────────────────────────

    fn debit(&mut self, account: &Address, amount: u128) -> Result<(), LedgerError> {
        let available = self.balance_of(account);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                account: *account,
                needed: amount,
                available,
            });
        }
        self.balances.insert(*account, available - amount);
        Ok(())
    }

    /// Allowance left after spending `amount`; the maximum allowance is
    /// never decremented.
    fn check_allowance(
        &self,
        owner: &Address,
        spender: &Address,
        amount: u128,
    ) -> Result<u128, LedgerError> {
        let available = self.allowance(owner, spender);
        if available == u128::MAX {
            return Ok(available);
        }
        available
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientAllowance {
                owner: *owner,
                spender: *spender,
                needed: amount,
                available,
            })
    }

    fn move_balance(
        &mut self,
        from: &Address,
        to: &Address,
        amount: u128,
        now: Timestamp,
    ) -> Result<(), LedgerError> {
        self.debit(from, amount)?;
        *self.balances.entry(*to).or_default() += amount;

        let src = self.delegation.delegate_of(from);
        let dst = self.delegation.delegate_of(to);
        self.move_delegates(Some(src), Some(dst), amount, now);
        self.events.push(LedgerEvent::Transfer {
            from: Some(*from),
            to: Some(*to),
            amount,
        });
        tracing::debug!(%from, %to, amount, "shares transferred");
        Ok(())
    }

    /// Shift `amount` of voting power from `src` to `dst`, writing one
    /// checkpoint on each side. `None` stands for the mint/burn sink.
    fn move_delegates(
        &mut self,
        src: Option<Address>,
        dst: Option<Address>,
        amount: u128,
        now: Timestamp,
    ) {
        if src == dst || amount == 0 {
            return;
        }
        if let Some(src) = src {
            let previous = self.checkpoints.current(&src);
            let current = previous.saturating_sub(amount);
            self.checkpoints.record(&src, current, now);
            self.events.push(LedgerEvent::DelegateVotesChanged {
                delegate: src,
                previous,
                current,
            });
        }
        if let Some(dst) = dst {
            let previous = self.checkpoints.current(&dst);
            let current = previous.saturating_add(amount);
            self.checkpoints.record(&dst, current, now);
            self.events.push(LedgerEvent::DelegateVotesChanged {
                delegate: dst,
                previous,
                current,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guild_types::whole_shares;

    fn ts(secs: u64) -> Timestamp {
        Timestamp::new(secs)
    }

    fn alice() -> Address {
        Address::repeat_byte(0xa1)
    }

    fn bob() -> Address {
        Address::repeat_byte(0xb0)
    }

    fn carol() -> Address {
        Address::repeat_byte(0xc4)
    }

    #[test]
    fn mint_credits_balance_votes_and_supply() {
        let mut ledger = ShareLedger::new(false);
        ledger.mint(&alice(), whole_shares(10), ts(1)).unwrap();

        assert_eq!(ledger.balance_of(&alice()), whole_shares(10));
        assert_eq!(ledger.current_votes(&alice()), whole_shares(10));
        assert_eq!(ledger.total_supply(), whole_shares(10));
        assert_eq!(ledger.prior_supply(ts(1), ts(2)).unwrap(), whole_shares(10));
    }

    #[test]
    fn mint_rejects_supply_over_cap() {
        let mut ledger = ShareLedger::new(false);
        ledger.mint(&alice(), MAX_SUPPLY, ts(1)).unwrap();
        let err = ledger.mint(&bob(), 1, ts(1)).unwrap_err();
        assert!(matches!(err, LedgerError::SupplyOverflow { amount: 1 }));
        assert_eq!(ledger.balance_of(&bob()), 0);
    }

    #[test]
    fn transfer_moves_votes() {
        let mut ledger = ShareLedger::new(false);
        ledger.mint(&alice(), 100, ts(1)).unwrap();
        ledger.transfer(&alice(), &bob(), 40, ts(2)).unwrap();

        assert_eq!(ledger.current_votes(&alice()), 60);
        assert_eq!(ledger.current_votes(&bob()), 40);
        assert_eq!(ledger.prior_votes(&alice(), ts(1), ts(3)).unwrap(), 100);
    }

    #[test]
    fn transfer_blocked_while_paused() {
        let mut ledger = ShareLedger::new(true);
        ledger.mint(&alice(), 100, ts(1)).unwrap();
        assert_eq!(
            ledger.transfer(&alice(), &bob(), 1, ts(2)),
            Err(LedgerError::Paused)
        );
        ledger.approve(&alice(), &bob(), 50);
        assert_eq!(
            ledger.transfer_from(&bob(), &alice(), &carol(), 1, ts(2)),
            Err(LedgerError::Paused)
        );
        // burning is not gated
        ledger.burn(&alice(), 10, ts(2)).unwrap();
        assert_eq!(ledger.total_supply(), 90);
    }

    #[test]
    fn transfer_insufficient_balance_changes_nothing() {
        let mut ledger = ShareLedger::new(false);
        ledger.mint(&alice(), 10, ts(1)).unwrap();
        let err = ledger.transfer(&alice(), &bob(), 11, ts(2)).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientBalance { .. }));
        assert_eq!(ledger.balance_of(&alice()), 10);
        assert_eq!(ledger.balance_of(&bob()), 0);
    }

    #[test]
    fn transfer_from_spends_allowance() {
        let mut ledger = ShareLedger::new(false);
        ledger.mint(&alice(), 100, ts(1)).unwrap();
        ledger.approve(&alice(), &bob(), 30);

        ledger.transfer_from(&bob(), &alice(), &carol(), 20, ts(2)).unwrap();
        assert_eq!(ledger.allowance(&alice(), &bob()), 10);
        assert_eq!(ledger.balance_of(&carol()), 20);

        let err = ledger
            .transfer_from(&bob(), &alice(), &carol(), 20, ts(2))
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientAllowance { .. }));
        assert_eq!(ledger.allowance(&alice(), &bob()), 10);
    }

    #[test]
    fn infinite_allowance_is_not_decremented() {
        let mut ledger = ShareLedger::new(false);
        ledger.mint(&alice(), 100, ts(1)).unwrap();
        ledger.approve(&alice(), &bob(), u128::MAX);
        ledger.transfer_from(&bob(), &alice(), &carol(), 60, ts(2)).unwrap();
        ledger.burn_from(&bob(), &alice(), 40, ts(2)).unwrap();
        assert_eq!(ledger.allowance(&alice(), &bob()), u128::MAX);
        assert_eq!(ledger.total_supply(), 60);
    }

    #[test]
    fn allowance_kept_when_balance_insufficient() {
        let mut ledger = ShareLedger::new(false);
        ledger.mint(&alice(), 5, ts(1)).unwrap();
        ledger.approve(&alice(), &bob(), 10);
        assert!(ledger.burn_from(&bob(), &alice(), 8, ts(2)).is_err());
        assert_eq!(ledger.allowance(&alice(), &bob()), 10);
        assert_eq!(ledger.balance_of(&alice()), 5);
    }

    #[test]
    fn delegation_moves_full_balance() {
        let mut ledger = ShareLedger::new(false);
        ledger.mint(&alice(), 70, ts(1)).unwrap();
        ledger.mint(&bob(), 30, ts(1)).unwrap();

        ledger.delegate(&alice(), &bob(), ts(2));
        assert_eq!(ledger.current_votes(&alice()), 0);
        assert_eq!(ledger.current_votes(&bob()), 100);
        assert_eq!(ledger.delegates(&alice()), bob());

        // later receipts by alice follow her delegate
        ledger.mint(&alice(), 5, ts(3)).unwrap();
        assert_eq!(ledger.current_votes(&bob()), 105);

        ledger.delegate(&alice(), &alice(), ts(4));
        assert_eq!(ledger.current_votes(&alice()), 75);
        assert_eq!(ledger.current_votes(&bob()), 30);
    }

    #[test]
    fn one_checkpoint_per_instant() {
        let mut ledger = ShareLedger::new(false);
        ledger.mint(&alice(), 100, ts(1)).unwrap();
        ledger.transfer(&alice(), &bob(), 10, ts(1)).unwrap();
        ledger.transfer(&alice(), &bob(), 10, ts(1)).unwrap();
        assert_eq!(ledger.checkpoints(&alice()).len(), 1);
        assert_eq!(ledger.current_votes(&alice()), 80);
    }

    #[test]
    fn events_are_buffered_in_order() {
        let mut ledger = ShareLedger::new(false);
        ledger.mint(&alice(), 5, ts(1)).unwrap();
        let events = ledger.take_events();
        assert_eq!(
            events,
            vec![
                LedgerEvent::DelegateVotesChanged {
                    delegate: alice(),
                    previous: 0,
                    current: 5,
                },
                LedgerEvent::Transfer {
                    from: None,
                    to: Some(alice()),
                    amount: 5,
                },
            ]
        );
        assert!(ledger.take_events().is_empty());
    }
}
