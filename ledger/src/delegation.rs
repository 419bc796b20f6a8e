//! Delegation registry: who receives each account's voting weight.
//!
//! Delegation is one hop. An account that never delegated, or delegated back
//! to itself, is its own delegate and is not stored.

use guild_types::Address;
use std::collections::HashMap;

#[derive(Clone, Debug, Default)]
pub struct DelegationRegistry {
    /// delegator → delegate, only for accounts delegating elsewhere.
    delegations: HashMap<Address, Address>,
}

impl DelegationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current delegate of `account`; defaults to the account itself.
    pub fn delegate_of(&self, account: &Address) -> Address {
        self.delegations.get(account).copied().unwrap_or(*account)
    }

    /// Point `from`'s weight at `to` and return the previous delegate.
    ///
    /// Setting `to == from` resets to the default state.
    pub fn set(&mut self, from: &Address, to: &Address) -> Address {
        let previous = if from == to {
            self.delegations.remove(from)
        } else {
            self.delegations.insert(*from, *to)
        };
        previous.unwrap_or(*from)
    }
}
