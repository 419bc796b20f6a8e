//! Timestamped voting-power history.
//!
//! Each account owns an ordered list of checkpoints with strictly increasing
//! timestamps. A write in the same instant as the last checkpoint replaces
//! it rather than appending, so there is at most one checkpoint per
//! timestamp. Point-in-time queries binary-search the list.
//!
//! The total share supply is tracked the same way, which lets quorum math
//! use the supply as of a proposal's voting start.

use crate::error::LedgerError;
use guild_types::{Address, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Voting power recorded at an instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub timestamp: Timestamp,
    pub votes: u128,
}

#[derive(Clone, Debug, Default)]
pub struct CheckpointStore {
    accounts: HashMap<Address, Vec<Checkpoint>>,
    supply: Vec<Checkpoint>,
}

impl CheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `votes` as `account`'s power from `now` on.
    pub fn record(&mut self, account: &Address, votes: u128, now: Timestamp) {
        let history = self.accounts.entry(*account).or_default();
        write(history, votes, now);
        tracing::debug!(%account, votes, at = %now, "checkpoint written");
    }

    /// Record `supply` as the total share supply from `now` on.
    pub fn record_supply(&mut self, supply: u128, now: Timestamp) {
        write(&mut self.supply, supply, now);
    }

    /// Most recent voting power of `account`, or zero if it never had any.
    pub fn current(&self, account: &Address) -> u128 {
        self.accounts
            .get(account)
            .and_then(|history| history.last())
            .map_or(0, |cp| cp.votes)
    }

    /// Voting power of `account` as of the end of instant `at`.
    ///
    /// Only strictly historical instants are answerable: `at` must be
    /// earlier than `now`, otherwise the value could still change within
    /// the current instant.
    pub fn prior(&self, account: &Address, at: Timestamp, now: Timestamp) -> Result<u128, LedgerError> {
        check_historical(at, now)?;
        Ok(self
            .accounts
            .get(account)
            .map_or(0, |history| lookup(history, at)))
    }

    /// Total supply as of the end of instant `at`. Same rules as [`prior`](Self::prior).
    pub fn prior_supply(&self, at: Timestamp, now: Timestamp) -> Result<u128, LedgerError> {
        check_historical(at, now)?;
        Ok(lookup(&self.supply, at))
    }

    /// Full checkpoint history of `account`, oldest first.
    pub fn checkpoints(&self, account: &Address) -> &[Checkpoint] {
        self.accounts.get(account).map_or(&[], Vec::as_slice)
    }

    pub fn num_checkpoints(&self, account: &Address) -> usize {
        self.checkpoints(account).len()
    }
}

fn check_historical(at: Timestamp, now: Timestamp) -> Result<(), LedgerError> {
    if at >= now {
        return Err(LedgerError::InvalidTimestamp { requested: at, now });
    }
    Ok(())
}

fn write(history: &mut Vec<Checkpoint>, votes: u128, now: Timestamp) {
    match history.last_mut() {
        // The ledger clock never runs backwards, so `>=` only ever matches
        // the same instant.
        Some(last) if last.timestamp >= now => last.votes = votes,
        _ => history.push(Checkpoint {
            timestamp: now,
            votes,
        }),
    }
}

fn lookup(history: &[Checkpoint], at: Timestamp) -> u128 {
    let idx = history.partition_point(|cp| cp.timestamp <= at);
    if idx == 0 {
        0
    } else {
        history[idx - 1].votes
    }
}
