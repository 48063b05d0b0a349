// Spectrecoin Constants
// =====================
//
// This module defines the monetary units and reward constants shared by every network.
// Changing any of these values is a consensus change.

/// A signed coin amount in the smallest unit.
///
/// Amounts are signed so that fee adjustments can be expressed with plain arithmetic; a valid
/// reward is never negative.
pub type Amount = i64;

/// Number of base units in one coin
pub const COIN: Amount = 100_000_000;

/// One hundredth of a coin
pub const CENT: Amount = 1_000_000;

/// Length in bytes of the wire magic that prefixes every peer message
pub const MESSAGE_START_SIZE: usize = 4;

/// Annual stake rate applied to coin-age (2% per coin-year)
pub const COIN_YEAR_REWARD: Amount = 2 * CENT;

/// Flat per-block subsidy for a regular stake once fork v3 is active
pub const STAKE_SUBSIDY_V3: Amount = 2 * COIN;

/// Flat per-block subsidy for a stake made from anonymized inputs
pub const ANON_STAKE_SUBSIDY: Amount = 2 * COIN;

/// Extra subsidy minted on every anonymous stake once the supply increase is active
///
/// This share is paid to the network's supply-increase address, never to the staker.
pub const SUPPLY_INCREASE_SUBSIDY: Amount = COIN;

/// Percentage of a stake subsidy routed to the development contribution address from fork v3
pub const DEV_CONTRIBUTION_PERCENT: Amount = 10;
