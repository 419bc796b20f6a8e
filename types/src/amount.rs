//! Share amounts.
//!
//! Shares are fixed-point integers (u128) with 18 decimals, the same unit
//! that measures voting power. The smallest unit is 1 raw share.

/// Raw units per whole share.
pub const SHARE_UNIT: u128 = 1_000_000_000_000_000_000;

/// Upper bound on total share supply (`2^96 - 1`).
///
/// Keeping supply below 96 bits lets threshold math multiply vote tallies
/// by 100 without leaving `u128`.
pub const MAX_SUPPLY: u128 = (1u128 << 96) - 1;

/// Convert a whole number of shares to raw units.
///
/// Saturates at `u128::MAX`; callers minting the result are bounded by
/// [`MAX_SUPPLY`] anyway.
pub fn whole_shares(whole: u128) -> u128 {
    whole.saturating_mul(SHARE_UNIT)
}
