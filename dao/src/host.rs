//! The execution environment around the DAO.
//!
//! Holds the external contracts that proposals and extensions reach, plus a
//! native-coin balance per address. Contracts receive `&mut Dao` so they can
//! call back into it; the guarded entry points reject such calls while a
//! protected call is in flight.

use crate::dao::Dao;
use crate::error::DaoError;
use guild_types::Address;
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Who is calling whom, and with how much native value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallContext {
    /// The contract being called.
    pub this: Address,
    pub caller: Address,
    pub value: u128,
}

/// What an extension asks the DAO to do for the calling account.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExtensionOutcome {
    /// Mint when true, burn when false.
    pub mint: bool,
    pub amount: u128,
}

#[derive(Debug, Error)]
pub enum ContractError {
    #[error("reverted: {0}")]
    Reverted(String),

    #[error("contract does not implement {0}")]
    Unsupported(&'static str),

    #[error("no contract deployed at {0}")]
    NoCode(Address),

    #[error("insufficient native balance: need {needed}, have {available}")]
    InsufficientValue { needed: u128, available: u128 },

    #[error("dao call failed: {0}")]
    Dao(#[source] Box<DaoError>),
}

impl From<DaoError> for ContractError {
    fn from(e: DaoError) -> Self {
        Self::Dao(Box::new(e))
    }
}

/// An external contract hosted next to the DAO.
///
/// `call` is the generic entry point used by call proposals. Extensions also
/// implement the two extension hooks.
pub trait Contract: 'static {
    fn call(
        &mut self,
        ctx: CallContext,
        dao: &mut Dao,
        payload: &[u8],
    ) -> Result<Vec<u8>, ContractError>;

    /// Configure the extension for this DAO. Runs at init and when an
    /// extension proposal carries a payload.
    fn set_extension(
        &mut self,
        _ctx: CallContext,
        _dao: &mut Dao,
        _data: &[u8],
    ) -> Result<(), ContractError> {
        Err(ContractError::Unsupported("set_extension"))
    }

    /// Handle a user's `call_extension` and report what to mint or burn.
    fn call_extension(
        &mut self,
        _ctx: CallContext,
        _dao: &mut Dao,
        _account: &Address,
        _amount: u128,
        _data: &[u8],
    ) -> Result<ExtensionOutcome, ContractError> {
        Err(ContractError::Unsupported("call_extension"))
    }

    fn box_clone(&self) -> Box<dyn Contract>;

    fn as_any(&self) -> &dyn Any;
}

impl Clone for Box<dyn Contract> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

#[derive(Clone, Default)]
pub struct Host {
    contracts: BTreeMap<Address, Box<dyn Contract>>,
    balances: BTreeMap<Address, u128>,
}

impl Host {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deploy<C: Contract>(&mut self, address: Address, contract: C) {
        self.contracts.insert(address, Box::new(contract));
    }

    pub fn has_contract(&self, address: &Address) -> bool {
        self.contracts.contains_key(address)
    }

    /// Typed view of a deployed contract.
    pub fn contract<C: Contract>(&self, address: &Address) -> Option<&C> {
        self.contracts
            .get(address)
            .and_then(|c| c.as_any().downcast_ref::<C>())
    }

    pub fn native_balance(&self, address: &Address) -> u128 {
        self.balances.get(address).copied().unwrap_or(0)
    }

    /// Credit native coin out of thin air. Used to seed accounts.
    pub fn fund(&mut self, address: &Address, amount: u128) {
        let balance = self.balances.entry(*address).or_default();
        *balance = balance.saturating_add(amount);
    }

    pub fn transfer_native(
        &mut self,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), ContractError> {
        if amount == 0 {
            return Ok(());
        }
        let available = self.native_balance(from);
        if available < amount {
            return Err(ContractError::InsufficientValue {
                needed: amount,
                available,
            });
        }
        self.balances.insert(*from, available - amount);
        self.fund(to, amount);
        Ok(())
    }

    pub(crate) fn take(&mut self, address: &Address) -> Option<Box<dyn Contract>> {
        self.contracts.remove(address)
    }

    pub(crate) fn put(&mut self, address: Address, contract: Box<dyn Contract>) {
        self.contracts.insert(address, contract);
    }
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("contracts", &self.contracts.keys().collect::<Vec<_>>())
            .field("balances", &self.balances)
            .finish()
    }
}

impl Dao {
    /// Run `f` against the contract at `target`.
    ///
    /// The contract is lifted out of the host for the duration of the call so
    /// it can borrow the DAO mutably.
    pub(crate) fn with_contract<R>(
        &mut self,
        target: &Address,
        f: impl FnOnce(&mut dyn Contract, &mut Dao) -> Result<R, ContractError>,
    ) -> Result<R, DaoError> {
        let mut contract = self
            .host_mut()
            .take(target)
            .ok_or_else(|| DaoError::ExternalCall {
                target: *target,
                source: ContractError::NoCode(*target),
            })?;
        let result = f(contract.as_mut(), self);
        self.host_mut().put(*target, contract);
        result.map_err(|source| {
            tracing::warn!(%target, error = %source, "external call failed");
            DaoError::ExternalCall {
                target: *target,
                source,
            }
        })
    }
}
