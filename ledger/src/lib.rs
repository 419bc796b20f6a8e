//! Share ledger for the guild DAO.
//!
//! Shares are both economic stake and voting weight. Every balance mutation
//! moves voting power between the affected holders' delegates and records a
//! timestamped checkpoint, so the voting power any account held at any past
//! instant can be answered exactly.
//!
//! Invariant: the sum of every account's current voting power equals the
//! total share supply.

pub mod checkpoint;
pub mod delegation;
pub mod error;
pub mod event;
pub mod shares;

pub use checkpoint::{Checkpoint, CheckpointStore};
pub use delegation::DelegationRegistry;
pub use error::LedgerError;
pub use event::LedgerEvent;
pub use shares::ShareLedger;
