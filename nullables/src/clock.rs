//! Nullable clock: deterministic time for testing.

use guild_types::{Clock, Timestamp};
use std::cell::Cell;

/// A deterministic ledger clock.
///
/// Time only advances when you tell it to. Share it with the DAO through an
/// `Rc` and keep a handle to move time forward.
#[derive(Debug, Default)]
pub struct NullClock {
    current: Cell<u64>,
}

impl NullClock {
    pub fn new(initial_secs: u64) -> Self {
        Self {
            current: Cell::new(initial_secs),
        }
    }

    /// Advance time by a number of seconds.
    pub fn advance(&self, secs: u64) {
        self.current.set(self.current.get() + secs);
    }

    /// Set the time to a specific value. Must not move backwards.
    pub fn set(&self, secs: u64) {
        debug_assert!(secs >= self.current.get(), "ledger time runs forward");
        self.current.set(secs);
    }
}

impl Clock for NullClock {
    fn now(&self) -> Timestamp {
        Timestamp::new(self.current.get())
    }
}
