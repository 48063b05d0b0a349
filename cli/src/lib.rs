use std::{
    collections::BTreeMap,
    env::{self, VarError},
    str::FromStr,
};

use anyhow::{Context, Result};
use serde::Serialize;
use spectre_consensus_core::{
    params::{DnsSeed, SubsidyStep},
    AddressKind, NetworkId, NetworkSelection, ParameterSet,
};

/// Environment variable that selects a network when no flag is given
pub const NETWORK_ENV: &str = "SPECTRE_NETWORK";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub selection: NetworkSelection,
    pub env_network: Option<NetworkId>,
}

impl Config {
    pub fn load(selection: NetworkSelection) -> Result<Self> {
        dotenv::dotenv().ok();
        Ok(Config {
            selection,
            env_network: parse_env_network(env::var(NETWORK_ENV))?,
        })
    }

    pub fn network(&self) -> Result<NetworkId> {
        Ok(self.selection.resolve_with_env(self.env_network)?)
    }
}

/// Human-readable view of a parameter set
#[derive(Serialize, Debug)]
pub struct ParamsSummary {
    pub network: String,
    pub data_dir: String,
    pub genesis_hash: String,
    pub genesis_time: i64,
    pub message_start: String,
    pub default_port: u16,
    pub rpc_port: u16,
    pub bip44_coin_type: u32,
    pub require_rpc_password: bool,
    pub pow_limit: String,
    pub pos_limit: String,
    pub pos_limit_v2: String,
    pub first_posv2_height: u32,
    pub first_posv3_height: u32,
    pub fork_v2_time: i64,
    pub fork_v3_time: i64,
    pub fork_v4_time: i64,
    pub stake_min_confirmations_legacy: u32,
    pub stake_min_confirmations: u32,
    pub last_pow_height: u32,
    pub pow_subsidy: Vec<SubsidyStep>,
    pub dev_contribution_address: String,
    pub supply_increase_address: String,
    pub address_prefixes: BTreeMap<&'static str, String>,
    pub dns_seeds: Vec<DnsSeed>,
    pub fixed_seeds: Vec<String>,
}

impl From<&ParameterSet> for ParamsSummary {
    fn from(params: &ParameterSet) -> Self {
        let v2 = params.first_posv2_height();
        ParamsSummary {
            network: params.network_id_string().to_string(),
            data_dir: params.data_dir().to_string(),
            genesis_hash: params.genesis_hash().to_string(),
            genesis_time: params.genesis_time(),
            message_start: hex::encode(params.message_start().to_bytes()),
            default_port: params.default_port(),
            rpc_port: params.rpc_port(),
            bip44_coin_type: params.bip44_coin_type(),
            require_rpc_password: params.require_rpc_password(),
            pow_limit: format!("{:x}", params.pow_limit()),
            pos_limit: format!("{:x}", params.pos_limit(v2)),
            pos_limit_v2: format!("{:x}", params.pos_limit(v2 + 1)),
            first_posv2_height: v2,
            first_posv3_height: params.first_posv3_height(),
            fork_v2_time: params.fork_v2_time(),
            fork_v3_time: params.fork_v3_time(),
            fork_v4_time: params.fork_v4_time(),
            stake_min_confirmations_legacy: params.stake_min_confirmations(params.fork_v3_time()),
            stake_min_confirmations: params.anon_stake_min_confirmations(),
            last_pow_height: params.last_pow_height(),
            pow_subsidy: params.pow_subsidy_schedule().to_vec(),
            dev_contribution_address: params.dev_contribution_address().to_string(),
            supply_increase_address: params.supply_increase_address().to_string(),
            address_prefixes: params
                .address_prefixes()
                .iter()
                .map(|(kind, prefix)| (kind.name(), hex::encode(prefix)))
                .collect(),
            dns_seeds: params.dns_seeds().to_vec(),
            fixed_seeds: params.fixed_seeds().iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Interprets a lookup of [`NETWORK_ENV`]. Only an absent variable means "no preference".
pub fn parse_env_network(value: Result<String, VarError>) -> Result<Option<NetworkId>> {
    match value {
        Ok(value) => {
            let network = NetworkId::from_str(&value)
                .with_context(|| format!("{NETWORK_ENV}={value} is not a network"))?;
            Ok(Some(network))
        }
        Err(VarError::NotPresent) => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Failed to read {NETWORK_ENV}")),
    }
}

pub fn parse_address_kind(name: &str) -> Result<AddressKind> {
    AddressKind::ALL
        .into_iter()
        .find(|kind| kind.name() == name)
        .with_context(|| format!("unknown address kind: {name}"))
}
