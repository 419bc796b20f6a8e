//! The DAO event log.

use guild_governance::GovernanceEvent;
use guild_ledger::LedgerEvent;
use guild_types::Address;
use serde::{Deserialize, Serialize};

/// One observable state change. The log is part of the DAO state and is
/// rolled back with everything else when an entry point fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DaoEvent {
    Initialized {
        name: String,
        symbol: String,
        members: usize,
        extensions: usize,
    },
    Ledger(LedgerEvent),
    Governance(GovernanceEvent),
    ExtensionToggled {
        extension: Address,
        enabled: bool,
    },
    ExtensionCalled {
        extension: Address,
        account: Address,
        mint: bool,
        amount: u128,
    },
    DocsUpdated {
        docs: String,
    },
}

impl From<LedgerEvent> for DaoEvent {
    fn from(inner: LedgerEvent) -> Self {
        Self::Ledger(inner)
    }
}

impl From<GovernanceEvent> for DaoEvent {
    fn from(inner: GovernanceEvent) -> Self {
        Self::Governance(inner)
    }
}
