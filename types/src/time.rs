//! Ledger time.
//!
//! Timestamps are Unix epoch seconds. All period and expiry math in the DAO
//! compares absolute timestamps against the ambient ledger [`Clock`], never
//! against a local wall clock read ad hoc.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A Unix timestamp in seconds since epoch.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    pub fn new(secs: u64) -> Self {
        Self(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// This timestamp shifted forward by `secs`, saturating at `u64::MAX`.
    pub fn plus(&self, secs: u64) -> Timestamp {
        Self(self.0.saturating_add(secs))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

/// Source of the ambient ledger time.
///
/// Monotonically non-decreasing and coarse-grained; several operations may
/// observe the same instant.
pub trait Clock {
    fn now(&self) -> Timestamp;
}
