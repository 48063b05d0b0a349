use serde::{Deserialize, Serialize};

/// The parts of a block index entry that reward and fork computations read
///
/// Rewards are always computed against the *previous* block so that the height, the fork
/// level and the reward of a new block are derived from already-connected state.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
pub struct BlockIndex {
    pub height: u32,
    /// Block timestamp, seconds since the Unix epoch
    pub time: i64,
}

impl BlockIndex {
    pub fn new(height: u32, time: i64) -> Self {
        BlockIndex { height, time }
    }
}
