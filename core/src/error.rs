//! Error types for parameter selection and consensus queries.

use thiserror::Error;

use crate::{constants::Amount, params::NetworkId};

/// Contradictory or missing network selection, an invalid compiled-in parameter set, or a
/// reselection attempted after the registry was locked.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("-testnet and -regtest are mutually exclusive")]
    ConflictingNetworkFlags,

    #[error("unknown network name: {0}")]
    UnknownNetwork(String),

    #[error("network selection conflict: flags select {flags}, environment selects {env}")]
    FlagEnvMismatch { flags: NetworkId, env: NetworkId },

    #[error("network already selected ({active}), cannot select {requested}")]
    AlreadySelected {
        active: NetworkId,
        requested: NetworkId,
    },

    #[error("{network}: address prefix {prefix} for {first} collides with {second}")]
    AmbiguousAddressPrefix {
        network: NetworkId,
        prefix: String,
        first: &'static str,
        second: &'static str,
    },

    #[error("{network}: empty address prefix for {kind}")]
    EmptyAddressPrefix {
        network: NetworkId,
        kind: &'static str,
    },

    #[error("{network}: invalid genesis hash literal: {reason}")]
    InvalidGenesisHash { network: NetworkId, reason: String },

    #[error("{network}: invalid alert key literal: {reason}")]
    InvalidAlertKey { network: NetworkId, reason: String },

    #[error("{network}: {what} thresholds must be strictly increasing")]
    NonIncreasingSchedule {
        network: NetworkId,
        what: &'static str,
    },

    #[error("{network}: message start collides with {other}")]
    DuplicateMessageStart { network: NetworkId, other: NetworkId },
}

/// A consensus query made before any network was selected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("chain parameters queried before a network was selected")]
pub struct UninitializedError;

/// A reward or fork query given an argument outside its valid domain.
///
/// These are never clamped: the block that produced the query must be rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsensusViolation {
    #[error("proof-of-work block at height {height} is past the last PoW height {last_pow_height}")]
    PowAfterLastPowBlock { height: u32, last_pow_height: u32 },

    #[error("negative coin age: {0}")]
    NegativeCoinAge(i64),

    #[error("negative fees: {0}")]
    NegativeFees(Amount),

    #[error("previous block time {time} predates genesis time {genesis_time}")]
    PrevBlockBeforeGenesis { time: i64, genesis_time: i64 },

    #[error("stake depth {depth} below the required {required} confirmations")]
    InsufficientStakeDepth { depth: u32, required: u32 },

    #[error("reward {reward} is smaller than the mandated share {mandated}")]
    RewardBelowMandatedShare { reward: Amount, mandated: Amount },

    #[error("reward amount overflow")]
    AmountOverflow,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainParamsError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Uninitialized(#[from] UninitializedError),

    #[error(transparent)]
    Consensus(#[from] ConsensusViolation),
}
