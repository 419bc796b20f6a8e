//! Nullable infrastructure for deterministic testing.
//!
//! Everything the DAO touches outside its own state (the ledger clock and
//! the external contracts reached through proposals and extensions) has a
//! test-friendly stand-in here that:
//! - Returns deterministic values
//! - Can be controlled programmatically
//! - Records what was done to it
//!
//! Usage: hand a [`NullClock`] to `Dao::new` and deploy the mock contracts
//! on the DAO's host.

pub mod clock;
pub mod contracts;

pub use clock::NullClock;
pub use contracts::{CallRecorder, RecordedCall, ReentrantContract, Reentry, Reverter, SaleExtension};
