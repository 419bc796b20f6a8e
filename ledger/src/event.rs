//! Events produced by ledger mutations.

use guild_types::Address;
use serde::{Deserialize, Serialize};

/// A ledger-level state change.
///
/// The ledger buffers these; the owner drains them with
/// [`ShareLedger::take_events`](crate::ShareLedger::take_events).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    /// Shares moved. `from == None` is a mint, `to == None` a burn.
    Transfer {
        from: Option<Address>,
        to: Option<Address>,
        amount: u128,
    },
    Approval {
        owner: Address,
        spender: Address,
        amount: u128,
    },
    DelegateChanged {
        delegator: Address,
        from: Address,
        to: Address,
    },
    DelegateVotesChanged {
        delegate: Address,
        previous: u128,
        current: u128,
    },
    PauseFlipped {
        paused: bool,
    },
}
