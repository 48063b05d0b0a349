// Fork Gates
// ==========
//
// Spectrecoin has two independent upgrade axes:
// - protocol versions, gated by block height (v2, v3)
// - forks, gated by block time (v2, v3, v4)
// Both coexist and are never derived from one another.
//
// Height gates and the v2/v3 time gates are exclusive: the threshold block itself still runs
// under the old rule. The v4 time gate is inclusive and activates exactly at its timestamp.

use serde::{Deserialize, Serialize};

use crate::{
    block::BlockIndex, error::ConsensusViolation, params::ParameterSet, reward::StakeRule,
};

/// Fork level in effect at a given time
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ForkId {
    Genesis = 0,
    V2 = 2,
    V3 = 3,
    V4 = 4,
}

impl ForkId {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// One epoch of the fork schedule
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ForkEpoch {
    /// First timestamp at which the epoch's rules hold
    pub first_active_time: i64,
    pub fork_id: ForkId,
    pub stake_rule: StakeRule,
}

/// The fork schedule as an ordered table of epochs
///
/// Adding a fork is a matter of appending an epoch. The inclusive/exclusive comparison of each
/// gate is folded into `first_active_time`, so lookup is a plain binary search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForkSchedule {
    epochs: Vec<ForkEpoch>,
}

impl ForkSchedule {
    /// Builds the schedule from the three fork thresholds, which must already be increasing.
    pub fn new(fork_v2_time: i64, fork_v3_time: i64, fork_v4_time: i64) -> Self {
        ForkSchedule {
            epochs: vec![
                ForkEpoch {
                    first_active_time: i64::MIN,
                    fork_id: ForkId::Genesis,
                    stake_rule: StakeRule::CoinAge,
                },
                ForkEpoch {
                    first_active_time: fork_v2_time.saturating_add(1),
                    fork_id: ForkId::V2,
                    stake_rule: StakeRule::CoinAgeCentRounded,
                },
                ForkEpoch {
                    first_active_time: fork_v3_time.saturating_add(1),
                    fork_id: ForkId::V3,
                    stake_rule: StakeRule::FlatSubsidy,
                },
                ForkEpoch {
                    first_active_time: fork_v4_time,
                    fork_id: ForkId::V4,
                    stake_rule: StakeRule::FlatSubsidy,
                },
            ],
        }
    }

    pub fn epochs(&self) -> &[ForkEpoch] {
        &self.epochs
    }

    pub fn epoch_at(&self, time: i64) -> &ForkEpoch {
        let idx = self
            .epochs
            .partition_point(|epoch| epoch.first_active_time <= time);
        // The first epoch starts at i64::MIN, so idx >= 1.
        &self.epochs[idx.saturating_sub(1)]
    }
}

/// A stake confirmation depth that has been checked against the network's minimum
///
/// Only [`ParameterSet::verify_stake_depth`] creates one, so code holding a
/// `VerifiedStakeDepth` does not need to re-check the precondition.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VerifiedStakeDepth(u32);

impl VerifiedStakeDepth {
    pub fn depth(&self) -> u32 {
        self.0
    }
}

impl ParameterSet {
    pub fn is_protocol_v2(&self, height: u32) -> bool {
        height > self.first_posv2_height
    }

    pub fn is_protocol_v3(&self, height: u32) -> bool {
        height > self.first_posv3_height
    }

    pub fn is_fork_v2(&self, time: i64) -> bool {
        time > self.fork_v2_time
    }

    pub fn is_fork_v3(&self, time: i64) -> bool {
        time > self.fork_v3_time
    }

    /// Inclusive, unlike the older forks
    pub fn is_fork_v4(&self, time: i64) -> bool {
        time >= self.fork_v4_time
    }

    /// The schedule built once when the parameter set was constructed
    pub fn fork_schedule(&self) -> &ForkSchedule {
        &self.fork_schedule
    }

    pub fn fork_id(&self, time: i64) -> ForkId {
        self.fork_schedule().epoch_at(time).fork_id
    }

    /// Minimum stake confirmations at `time`; a binary switch on fork v3, not on the fork id
    pub fn stake_min_confirmations(&self, time: i64) -> u32 {
        if self.is_fork_v3(time) {
            self.stake_min_confirmations
        } else {
            self.stake_min_confirmations_legacy
        }
    }

    pub fn anon_stake_min_confirmations(&self) -> u32 {
        self.stake_min_confirmations
    }

    /// Evaluated against the previous block, never the block being built
    pub fn supply_increase_active(&self, prev: &BlockIndex) -> bool {
        self.is_fork_v4(prev.time)
    }

    pub fn verify_stake_depth(&self, depth: u32) -> Result<VerifiedStakeDepth, ConsensusViolation> {
        let required = self.anon_stake_min_confirmations();
        if depth < required {
            return Err(ConsensusViolation::InsufficientStakeDepth { depth, required });
        }
        Ok(VerifiedStakeDepth(depth))
    }
}

/// Every gate evaluated for one block
#[derive(Serialize, Deserialize, Eq, PartialEq, Clone, Debug)]
pub struct ForkFlags {
    pub protocol_v2: bool,
    pub protocol_v3: bool,
    pub fork_v2: bool,
    pub fork_v3: bool,
    pub fork_v4: bool,
    pub fork_id: ForkId,
    pub stake_min_confirmations: u32,
}

impl ForkFlags {
    pub fn at(params: &ParameterSet, height: u32, time: i64) -> Self {
        Self {
            protocol_v2: params.is_protocol_v2(height),
            protocol_v3: params.is_protocol_v3(height),
            fork_v2: params.is_fork_v2(time),
            fork_v3: params.is_fork_v3(time),
            fork_v4: params.is_fork_v4(time),
            fork_id: params.fork_id(time),
            stake_min_confirmations: params.stake_min_confirmations(time),
        }
    }

    pub fn is_protocol_v2_active(&self) -> bool {
        self.protocol_v2
    }

    pub fn is_protocol_v3_active(&self) -> bool {
        self.protocol_v3
    }

    pub fn is_fork_v4_active(&self) -> bool {
        self.fork_v4
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::NetworkId;

    fn main() -> ParameterSet {
        ParameterSet::for_network(NetworkId::Main).unwrap()
    }

    #[test]
    fn test_protocol_v2_boundary() {
        let params = main();
        let h = params.first_posv2_height();
        assert!(!params.is_protocol_v2(h));
        assert!(params.is_protocol_v2(h + 1));
        assert!(!params.is_protocol_v2(0));
    }

    #[test]
    fn test_protocol_v3_boundary() {
        let params = main();
        let h = params.first_posv3_height();
        assert!(!params.is_protocol_v3(h));
        assert!(params.is_protocol_v3(h + 1));
        // v3 implies v2 since the thresholds are increasing
        assert!(params.is_protocol_v2(h + 1));
    }

    #[test]
    fn test_protocol_gates_match_definition() {
        for network in NetworkId::ALL {
            let params = ParameterSet::for_network(network).unwrap();
            for h in [0, 1, 9, 10, 11, 999, 1_000, 1_001, 23_000, 23_001, 183_001, u32::MAX] {
                assert_eq!(params.is_protocol_v2(h), h > params.first_posv2_height());
                assert_eq!(params.is_protocol_v3(h), h > params.first_posv3_height());
            }
        }
    }

    #[test]
    fn test_fork_v4_inclusive_v3_exclusive() {
        for network in NetworkId::ALL {
            let params = ParameterSet::for_network(network).unwrap();
            assert!(params.is_fork_v4(params.fork_v4_time()));
            assert!(!params.is_fork_v4(params.fork_v4_time() - 1));

            assert!(!params.is_fork_v3(params.fork_v3_time()));
            assert!(params.is_fork_v3(params.fork_v3_time() + 1));

            assert!(!params.is_fork_v2(params.fork_v2_time()));
            assert!(params.is_fork_v2(params.fork_v2_time() + 1));
        }
    }

    #[test]
    fn test_fork_id_boundaries() {
        let params = main();
        assert_eq!(params.fork_id(0), ForkId::Genesis);
        assert_eq!(params.fork_id(params.fork_v2_time()), ForkId::Genesis);
        assert_eq!(params.fork_id(params.fork_v2_time() + 1), ForkId::V2);
        assert_eq!(params.fork_id(params.fork_v3_time()), ForkId::V2);
        assert_eq!(params.fork_id(params.fork_v3_time() + 1), ForkId::V3);
        assert_eq!(params.fork_id(params.fork_v4_time() - 1), ForkId::V3);
        assert_eq!(params.fork_id(params.fork_v4_time()), ForkId::V4);
        assert_eq!(params.fork_id(i64::MAX), ForkId::V4);
        assert_eq!(params.fork_id(i64::MIN), ForkId::Genesis);
    }

    #[test]
    fn test_fork_id_numeric_values() {
        let params = main();
        assert_eq!(params.fork_id(params.fork_v2_time() - 1).as_u8(), 0);
        assert_eq!(params.fork_id(params.fork_v2_time() + 1).as_u8(), 2);
        assert_eq!(params.fork_id(params.fork_v3_time() + 1).as_u8(), 3);
        assert_eq!(params.fork_id(params.fork_v4_time() + 86_400 * 365).as_u8(), 4);
    }

    #[test]
    fn test_fork_id_monotonic() {
        for network in NetworkId::ALL {
            let params = ParameterSet::for_network(network).unwrap();
            let start = params.fork_v2_time() - 10;
            let end = params.fork_v4_time() + 10;
            let step = ((end - start) / 5_000).max(1);
            let mut last = ForkId::Genesis;
            let mut t = start;
            while t <= end {
                let id = params.fork_id(t);
                assert!(id >= last, "fork id decreased at {t}");
                last = id;
                t += step;
            }
            for t in [params.fork_v2_time(), params.fork_v3_time(), params.fork_v4_time()] {
                assert!(params.fork_id(t - 1) <= params.fork_id(t));
                assert!(params.fork_id(t) <= params.fork_id(t + 1));
            }
        }
    }

    #[test]
    fn test_fork_id_agrees_with_gates() {
        let params = main();
        for t in [
            params.fork_v2_time() - 1,
            params.fork_v2_time(),
            params.fork_v2_time() + 1,
            params.fork_v3_time(),
            params.fork_v3_time() + 1,
            params.fork_v4_time() - 1,
            params.fork_v4_time(),
        ] {
            let expected = if params.is_fork_v4(t) {
                ForkId::V4
            } else if params.is_fork_v3(t) {
                ForkId::V3
            } else if params.is_fork_v2(t) {
                ForkId::V2
            } else {
                ForkId::Genesis
            };
            assert_eq!(params.fork_id(t), expected);
        }
    }

    #[test]
    fn test_schedule_is_ordered() {
        let params = main();
        let schedule = params.fork_schedule();
        assert!(schedule
            .epochs()
            .windows(2)
            .all(|w| w[0].first_active_time < w[1].first_active_time));
        assert_eq!(schedule.epochs().len(), 4);
    }

    #[test]
    fn test_schedule_is_built_once_per_set() {
        let params = main();
        assert!(std::ptr::eq(params.fork_schedule(), params.fork_schedule()));
        let firsts: Vec<i64> = params
            .fork_schedule()
            .epochs()
            .iter()
            .map(|epoch| epoch.first_active_time)
            .collect();
        assert_eq!(
            firsts,
            vec![
                i64::MIN,
                params.fork_v2_time() + 1,
                params.fork_v3_time() + 1,
                params.fork_v4_time(),
            ]
        );
        assert_eq!(
            params.fork_schedule(),
            &ForkSchedule::new(
                params.fork_v2_time(),
                params.fork_v3_time(),
                params.fork_v4_time()
            )
        );
    }

    #[test]
    fn test_stake_min_confirmations_switch() {
        let params = main();
        let t = params.fork_v3_time();
        assert_eq!(params.stake_min_confirmations(t), 288);
        assert_eq!(params.stake_min_confirmations(t - 1_000), 288);
        assert_eq!(params.stake_min_confirmations(t + 1), 2_880);
        // Fork v4 does not change the switch
        assert_eq!(params.stake_min_confirmations(params.fork_v4_time()), 2_880);
        assert_eq!(params.anon_stake_min_confirmations(), 2_880);
    }

    #[test]
    fn test_supply_increase_uses_previous_block_time() {
        let params = main();
        let before = BlockIndex::new(900_000, params.fork_v4_time() - 1);
        let at = BlockIndex::new(900_001, params.fork_v4_time());
        assert!(!params.supply_increase_active(&before));
        assert!(params.supply_increase_active(&at));
    }

    #[test]
    fn test_verify_stake_depth() {
        let params = main();
        assert_eq!(
            params.verify_stake_depth(2_879),
            Err(ConsensusViolation::InsufficientStakeDepth {
                depth: 2_879,
                required: 2_880
            })
        );
        assert_eq!(params.verify_stake_depth(2_880).unwrap().depth(), 2_880);
    }

    #[test]
    fn test_fork_flags_snapshot() {
        let params = main();
        let flags = ForkFlags::at(
            &params,
            params.first_posv3_height() + 1,
            params.fork_v3_time() + 1,
        );
        assert_eq!(
            flags,
            ForkFlags {
                protocol_v2: true,
                protocol_v3: true,
                fork_v2: true,
                fork_v3: true,
                fork_v4: false,
                fork_id: ForkId::V3,
                stake_min_confirmations: 2_880,
            }
        );
        assert!(flags.is_protocol_v3_active());
        assert!(!flags.is_fork_v4_active());

        let genesis = ForkFlags::at(&params, 0, params.genesis_time());
        assert!(!genesis.is_protocol_v2_active());
        assert_eq!(genesis.fork_id, ForkId::Genesis);
        assert_eq!(genesis.stake_min_confirmations, 288);
    }
}
