//! Consensus parameters and reward rules for the Spectrecoin networks.
//!
//! A node builds one [`ParameterSet`] per network, selects exactly one of them at startup
//! through the [`registry`], and from then on only reads it: fork gates
//! ([`fork_gate`]), block rewards ([`reward`]) and address prefixes ([`address`]) are pure
//! functions of the active set.

pub mod address;
pub mod block;
pub mod constants;
pub mod error;
pub mod fork_gate;
pub mod params;
pub mod registry;
pub mod reward;

pub use address::{AddressKind, AddressPrefixes};
pub use block::BlockIndex;
pub use constants::{Amount, CENT, COIN};
pub use error::{ChainParamsError, ConfigurationError, ConsensusViolation, UninitializedError};
pub use fork_gate::{ForkFlags, ForkId, ForkSchedule, VerifiedStakeDepth};
pub use params::{NetworkId, ParameterSet};
pub use registry::{
    mainnet_params, params, select_params, select_params_from_flags, testnet_params, try_params,
    NetworkRegistry, NetworkSelection,
};
pub use reward::{RewardSplit, StakeKind, StakeRule};
