//! Reentrancy guard shared by the protected entry points.

use crate::error::DaoError;
use std::cell::Cell;
use std::rc::Rc;

/// A single engaged/free flag.
///
/// [`enter`](Self::enter) hands out a token that does not borrow the guard,
/// so the protected call keeps full `&mut` access to the DAO while it runs.
/// Dropping the token releases the flag on every exit path.
#[derive(Clone, Debug, Default)]
pub struct ReentrancyGuard {
    engaged: Rc<Cell<bool>>,
}

#[must_use = "the guard is released as soon as the token is dropped"]
#[derive(Debug)]
pub struct GuardToken {
    engaged: Rc<Cell<bool>>,
}

impl ReentrancyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&self) -> Result<GuardToken, DaoError> {
        if self.engaged.replace(true) {
            return Err(DaoError::Reentrancy);
        }
        Ok(GuardToken {
            engaged: Rc::clone(&self.engaged),
        })
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged.get()
    }
}

impl Drop for GuardToken {
    fn drop(&mut self) {
        self.engaged.set(false);
    }
}
