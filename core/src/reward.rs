// Block Rewards
// =============
//
// Three producer classes are rewarded by three separate formulas:
// - proof of work: a per-network subsidy table, valid only up to the last PoW height
// - proof of stake: coin-age based until fork v3, a flat subsidy afterwards
// - anonymous stake: a flat subsidy that never looks at coin age, since the anonymized inputs
//   carry no usable holding history
//
// All amounts are computed with checked arithmetic. An argument outside the valid domain is a
// `ConsensusViolation`, never a clamped value.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    block::BlockIndex,
    constants::{
        Amount, ANON_STAKE_SUBSIDY, CENT, COIN_YEAR_REWARD, DEV_CONTRIBUTION_PERCENT,
        STAKE_SUBSIDY_V3, SUPPLY_INCREASE_SUBSIDY,
    },
    error::ConsensusViolation,
    fork_gate::{ForkId, VerifiedStakeDepth},
    params::ParameterSet,
};

/// Proof-of-stake reward formula of a fork epoch
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
pub enum StakeRule {
    /// `coin_age * COIN_YEAR_REWARD * 33 / (365 * 33 + 8)`, coin age in coin-days
    CoinAge,
    /// The coin-age formula truncated to a whole cent
    CoinAgeCentRounded,
    /// A fixed subsidy per block, independent of coin age
    FlatSubsidy,
}

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
pub enum StakeKind {
    Regular,
    Anonymous,
}

/// How a stake reward is divided between the staker and the protocol-mandated destinations
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
pub struct RewardSplit {
    pub staker: Amount,
    /// Paid to the network's development contribution address
    pub dev_contribution: Amount,
    /// Paid to the network's supply increase address
    pub supply_increase: Amount,
}

impl RewardSplit {
    pub fn total(&self) -> Amount {
        self.staker + self.dev_contribution + self.supply_increase
    }
}

fn check_fees(fees: Amount) -> Result<(), ConsensusViolation> {
    if fees < 0 {
        return Err(ConsensusViolation::NegativeFees(fees));
    }
    Ok(())
}

fn add_fees(subsidy: Amount, fees: Amount) -> Result<Amount, ConsensusViolation> {
    subsidy
        .checked_add(fees)
        .ok_or(ConsensusViolation::AmountOverflow)
}

fn coin_age_subsidy(coin_age: i64) -> Result<Amount, ConsensusViolation> {
    coin_age
        .checked_mul(COIN_YEAR_REWARD)
        .and_then(|v| v.checked_mul(33))
        .map(|v| v / (365 * 33 + 8))
        .ok_or(ConsensusViolation::AmountOverflow)
}

impl ParameterSet {
    fn check_after_genesis(&self, prev: &BlockIndex) -> Result<(), ConsensusViolation> {
        if prev.time < self.genesis_time() {
            return Err(ConsensusViolation::PrevBlockBeforeGenesis {
                time: prev.time,
                genesis_time: self.genesis_time(),
            });
        }
        Ok(())
    }

    /// Subsidy plus fees for a proof-of-work block at `height`.
    ///
    /// Fails once `height` is above the last PoW height, whatever the fees.
    pub fn proof_of_work_reward(
        &self,
        height: u32,
        fees: Amount,
    ) -> Result<Amount, ConsensusViolation> {
        check_fees(fees)?;
        if height > self.last_pow_height() {
            return Err(ConsensusViolation::PowAfterLastPowBlock {
                height,
                last_pow_height: self.last_pow_height(),
            });
        }

        let reward = add_fees(self.pow_subsidy_at(height), fees)?;
        debug!(height, fees, reward, "Proof-of-work reward");
        Ok(reward)
    }

    /// Subsidy plus fees for a proof-of-stake block built on `prev`.
    ///
    /// The formula is chosen by the fork epoch of `prev.time`, not by height.
    pub fn proof_of_stake_reward(
        &self,
        prev: &BlockIndex,
        coin_age: i64,
        fees: Amount,
    ) -> Result<Amount, ConsensusViolation> {
        if coin_age < 0 {
            return Err(ConsensusViolation::NegativeCoinAge(coin_age));
        }
        check_fees(fees)?;
        self.check_after_genesis(prev)?;

        let subsidy = match self.fork_schedule().epoch_at(prev.time).stake_rule {
            StakeRule::CoinAge => coin_age_subsidy(coin_age)?,
            StakeRule::CoinAgeCentRounded => coin_age_subsidy(coin_age)? / CENT * CENT,
            StakeRule::FlatSubsidy => STAKE_SUBSIDY_V3,
        };

        let reward = add_fees(subsidy, fees)?;
        debug!(
            prev_height = prev.height,
            coin_age,
            fees,
            reward,
            "Proof-of-stake reward"
        );
        Ok(reward)
    }

    /// Subsidy plus fees for a stake made from anonymized inputs.
    ///
    /// `depth` proves that the stake's confirmation depth was checked against
    /// [`ParameterSet::anon_stake_min_confirmations`].
    pub fn proof_of_anon_stake_reward(
        &self,
        prev: &BlockIndex,
        depth: VerifiedStakeDepth,
        fees: Amount,
    ) -> Result<Amount, ConsensusViolation> {
        check_fees(fees)?;
        self.check_after_genesis(prev)?;

        let mut subsidy = ANON_STAKE_SUBSIDY;
        if self.supply_increase_active(prev) {
            subsidy += SUPPLY_INCREASE_SUBSIDY;
        }

        let reward = add_fees(subsidy, fees)?;
        debug!(
            prev_height = prev.height,
            depth = depth.depth(),
            fees,
            reward,
            "Anonymous stake reward"
        );
        Ok(reward)
    }

    /// Divides a computed stake reward between the staker and the mandated addresses.
    pub fn split_stake_reward(
        &self,
        prev: &BlockIndex,
        kind: StakeKind,
        reward: Amount,
    ) -> Result<RewardSplit, ConsensusViolation> {
        self.check_after_genesis(prev)?;
        let supply_increase = match kind {
            StakeKind::Anonymous if self.supply_increase_active(prev) => SUPPLY_INCREASE_SUBSIDY,
            _ => 0,
        };
        if reward < supply_increase {
            return Err(ConsensusViolation::RewardBelowMandatedShare {
                reward,
                mandated: supply_increase,
            });
        }

        let remaining = reward - supply_increase;
        let dev_contribution = if self.fork_id(prev.time) >= ForkId::V3 {
            remaining / 100 * DEV_CONTRIBUTION_PERCENT
        } else {
            0
        };

        Ok(RewardSplit {
            staker: remaining - dev_contribution,
            dev_contribution,
            supply_increase,
        })
    }
}
