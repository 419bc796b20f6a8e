//! Mock external contracts.

use guild_dao::{CallContext, Contract, ContractError, Dao, ExtensionOutcome};
use guild_types::Address;
use std::any::Any;

/// One call observed by a [`CallRecorder`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedCall {
    pub caller: Address,
    pub value: u128,
    pub payload: Vec<u8>,
    /// DAO share supply seen during the call.
    pub supply_seen: u128,
}

/// Accepts every call and remembers it. Echoes the payload back.
#[derive(Clone, Debug, Default)]
pub struct CallRecorder {
    pub calls: Vec<RecordedCall>,
}

impl CallRecorder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Contract for CallRecorder {
    fn call(
        &mut self,
        ctx: CallContext,
        dao: &mut Dao,
        payload: &[u8],
    ) -> Result<Vec<u8>, ContractError> {
        self.calls.push(RecordedCall {
            caller: ctx.caller,
            value: ctx.value,
            payload: payload.to_vec(),
            supply_seen: dao.total_supply(),
        });
        Ok(payload.to_vec())
    }

    fn box_clone(&self) -> Box<dyn Contract> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Fails every call and every hook.
#[derive(Clone, Debug, Default)]
pub struct Reverter;

impl Contract for Reverter {
    fn call(
        &mut self,
        _ctx: CallContext,
        _dao: &mut Dao,
        _payload: &[u8],
    ) -> Result<Vec<u8>, ContractError> {
        Err(ContractError::Reverted("always reverts".into()))
    }

    fn set_extension(
        &mut self,
        _ctx: CallContext,
        _dao: &mut Dao,
        _data: &[u8],
    ) -> Result<(), ContractError> {
        Err(ContractError::Reverted("setup refused".into()))
    }

    fn box_clone(&self) -> Box<dyn Contract> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// What a [`ReentrantContract`] tries when it is called.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reentry {
    Vote { proposal: u64 },
    Process { proposal: u64 },
    CallExtension { extension: Address },
}

/// Calls back into a guarded DAO entry point from inside its own call.
///
/// Works both as a call target and as an extension.
#[derive(Clone, Debug)]
pub struct ReentrantContract {
    pub address: Address,
    pub reentry: Reentry,
}

impl ReentrantContract {
    pub fn new(address: Address, reentry: Reentry) -> Self {
        Self { address, reentry }
    }

    fn reenter(&self, dao: &mut Dao) -> Result<(), ContractError> {
        match self.reentry {
            Reentry::Vote { proposal } => {
                dao.vote(&self.address, proposal, true)?;
            }
            Reentry::Process { proposal } => {
                dao.process_proposal(proposal)?;
            }
            Reentry::CallExtension { extension } => {
                dao.call_extension(&self.address, &extension, 1, &[1], 0)?;
            }
        }
        Ok(())
    }
}

impl Contract for ReentrantContract {
    fn call(
        &mut self,
        _ctx: CallContext,
        dao: &mut Dao,
        _payload: &[u8],
    ) -> Result<Vec<u8>, ContractError> {
        self.reenter(dao)?;
        Ok(Vec::new())
    }

    fn call_extension(
        &mut self,
        _ctx: CallContext,
        dao: &mut Dao,
        _account: &Address,
        _amount: u128,
        _data: &[u8],
    ) -> Result<ExtensionOutcome, ContractError> {
        self.reenter(dao)?;
        Ok(ExtensionOutcome::default())
    }

    fn box_clone(&self) -> Box<dyn Contract> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A minimal share sale: buyers attach native coin and receive
/// `rate` shares per unit.
///
/// Configured through `set_extension` with the rate as 16 big-endian bytes.
#[derive(Clone, Debug, Default)]
pub struct SaleExtension {
    pub rate: Option<u128>,
    pub sold: u128,
}

impl SaleExtension {
    pub fn new() -> Self {
        Self::default()
    }

    /// Setup data selling `rate` shares per native unit.
    pub fn setup_data(rate: u128) -> Vec<u8> {
        rate.to_be_bytes().to_vec()
    }
}

impl Contract for SaleExtension {
    fn call(
        &mut self,
        _ctx: CallContext,
        _dao: &mut Dao,
        _payload: &[u8],
    ) -> Result<Vec<u8>, ContractError> {
        Err(ContractError::Unsupported("call"))
    }

    fn set_extension(
        &mut self,
        _ctx: CallContext,
        _dao: &mut Dao,
        data: &[u8],
    ) -> Result<(), ContractError> {
        let bytes: [u8; 16] = data
            .try_into()
            .map_err(|_| ContractError::Reverted("rate must be 16 bytes".into()))?;
        self.rate = Some(u128::from_be_bytes(bytes));
        Ok(())
    }

    fn call_extension(
        &mut self,
        ctx: CallContext,
        _dao: &mut Dao,
        _account: &Address,
        _amount: u128,
        _data: &[u8],
    ) -> Result<ExtensionOutcome, ContractError> {
        let rate = self
            .rate
            .ok_or_else(|| ContractError::Reverted("sale not configured".into()))?;
        if ctx.value == 0 {
            return Err(ContractError::Reverted("no payment attached".into()));
        }
        let amount = ctx
            .value
            .checked_mul(rate)
            .ok_or_else(|| ContractError::Reverted("purchase too large".into()))?;
        self.sold += amount;
        Ok(ExtensionOutcome { mint: true, amount })
    }

    fn box_clone(&self) -> Box<dyn Contract> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
