// Spectrecoin Network Parameters
// ==============================
//
// This module defines parameters specific to the three Spectrecoin networks (main, testnet and
// regtest). These parameters are crucial for consensus and determine how blocks are validated
// and rewarded on each network.

use std::{fmt, net::SocketAddr, str::FromStr};

use bitcoin::{p2p::Magic, BlockHash};
use crypto_bigint::U256;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    address::{AddressKind, AddressPrefixes},
    constants::{Amount, COIN, MESSAGE_START_SIZE},
    error::ConfigurationError,
    fork_gate::ForkSchedule,
};

/// The closed set of networks a node can run on
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NetworkId {
    Main,
    Testnet,
    Regtest,
}

impl NetworkId {
    pub const ALL: [NetworkId; 3] = [NetworkId::Main, NetworkId::Testnet, NetworkId::Regtest];

    pub fn as_str(self) -> &'static str {
        match self {
            NetworkId::Main => "main",
            NetworkId::Testnet => "test",
            NetworkId::Regtest => "regtest",
        }
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkId {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "main" | "mainnet" => Ok(NetworkId::Main),
            "test" | "testnet" => Ok(NetworkId::Testnet),
            "regtest" => Ok(NetworkId::Regtest),
            other => Err(ConfigurationError::UnknownNetwork(other.to_string())),
        }
    }
}

/// A DNS seed used for peer bootstrap
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct DnsSeed {
    pub name: String,
    pub host: String,
}

impl DnsSeed {
    fn new(name: &str, host: &str) -> Self {
        DnsSeed {
            name: name.to_string(),
            host: host.to_string(),
        }
    }
}

/// One step of the proof-of-work subsidy curve: `subsidy` applies from `from_height` until the
/// next step starts
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
pub struct SubsidyStep {
    pub from_height: u32,
    pub subsidy: Amount,
}

/// Literal constants for one network, before validation
struct RawParams {
    network_id: NetworkId,
    data_dir: &'static str,
    genesis_hash: &'static str,
    genesis_time: i64,
    message_start: [u8; MESSAGE_START_SIZE],
    alert_pub_key: &'static str,
    default_port: u16,
    rpc_port: u16,
    bip44_coin_type: u32,
    require_rpc_password: bool,
    pow_limit_shift: usize,
    pos_limit_shift: usize,
    pos_limit_v2_shift: usize,
    first_posv2_height: u32,
    first_posv3_height: u32,
    fork_v2_time: i64,
    fork_v3_time: i64,
    fork_v4_time: i64,
    stake_min_confirmations_legacy: u32,
    stake_min_confirmations: u32,
    last_pow_height: u32,
    pow_subsidy: Vec<SubsidyStep>,
    dev_contribution_address: &'static str,
    supply_increase_address: &'static str,
    address_prefixes: AddressPrefixes,
    dns_seeds: Vec<DnsSeed>,
    fixed_seeds: Vec<SocketAddr>,
}

/// Stores the consensus parameters for one Spectrecoin network
///
/// A `ParameterSet` is built once from compiled-in constants and never changes afterwards. All
/// fields are private; the fork gates in [`crate::fork_gate`] and the reward functions in
/// [`crate::reward`] read it through `&self`.
#[derive(Clone, Debug)]
pub struct ParameterSet {
    network_id: NetworkId,

    /// Sub-directory of the node's data directory
    ///
    /// Main stores its files directly in the data directory (empty string); the test networks
    /// use "testnet" and "regtest" so that a node can keep all three side by side.
    data_dir: &'static str,

    /// Hash of block 0, supplied as a literal
    ///
    /// Peers compare it during the handshake; a mismatch means the peer is on another chain.
    genesis_hash: BlockHash,

    /// Timestamp of block 0, seconds since the Unix epoch
    ///
    /// No reward is computed on top of a block older than this.
    genesis_time: i64,

    /// Wire magic prepended to every peer message
    ///
    /// The four bytes are chosen so they rarely occur in ordinary data and are distinct across
    /// the three networks.
    message_start: Magic,

    /// Public key that signs network alerts, decoded from hex (empty on regtest)
    alert_pub_key: Vec<u8>,

    /// P2P listen port
    default_port: u16,
    rpc_port: u16,

    /// BIP44 coin type used for HD wallet derivation paths
    bip44_coin_type: u32,

    /// Whether the RPC server refuses to start without a password
    require_rpc_password: bool,

    /// Highest proof-of-work target (lowest difficulty) a block may claim
    pow_limit: U256,

    /// Highest proof-of-stake target up to protocol v2
    pos_limit: U256,

    /// Highest proof-of-stake target once protocol v2 is active
    ///
    /// Selected by [`ParameterSet::pos_limit`] from the block height.
    pos_limit_v2: U256,

    /// Protocol v2 applies to blocks strictly above this height
    pub(crate) first_posv2_height: u32,

    /// Protocol v3 applies to blocks strictly above this height
    pub(crate) first_posv3_height: u32,

    /// Fork v2 applies to block times strictly after this timestamp
    ///
    /// From here the coin-age stake reward is truncated to a whole cent.
    pub(crate) fork_v2_time: i64,

    /// Fork v3 applies to block times strictly after this timestamp
    ///
    /// Regular stakes switch to a flat subsidy, the dev contribution starts and the stake
    /// confirmation depth increases.
    pub(crate) fork_v3_time: i64,

    /// Fork v4 applies from this timestamp on, inclusive
    ///
    /// Activates the supply increase on anonymous stakes.
    pub(crate) fork_v4_time: i64,

    /// Epoch table derived from the fork times; frozen with the rest of the set
    pub(crate) fork_schedule: ForkSchedule,

    /// Stake confirmations required up to fork v3
    pub(crate) stake_min_confirmations_legacy: u32,

    /// Stake confirmations required after fork v3, and always for anonymous stakes
    pub(crate) stake_min_confirmations: u32,

    /// No proof-of-work block is valid above this height
    last_pow_height: u32,

    /// Proof-of-work subsidy curve, ordered by height and starting at height 0
    pow_subsidy: Vec<SubsidyStep>,

    /// Receives the dev contribution share of stake rewards from fork v3
    dev_contribution_address: String,

    /// Receives the extra subsidy minted on anonymous stakes from fork v4
    supply_increase_address: String,

    /// Base58 prefix for every address kind, validated to be prefix-free
    address_prefixes: AddressPrefixes,

    dns_seeds: Vec<DnsSeed>,
    fixed_seeds: Vec<SocketAddr>,
}

impl ParameterSet {
    /// Builds and validates the parameters of `network`.
    pub fn for_network(network: NetworkId) -> Result<Self, ConfigurationError> {
        let raw = match network {
            NetworkId::Main => main_params(),
            NetworkId::Testnet => testnet_params(),
            NetworkId::Regtest => regtest_params(),
        };
        let params = Self::from_raw(raw)?;
        debug!(
            network = %params.network_id,
            genesis = %params.genesis_hash,
            port = params.default_port,
            "Constructed chain parameters"
        );
        Ok(params)
    }

    fn from_raw(raw: RawParams) -> Result<Self, ConfigurationError> {
        let network = raw.network_id;

        let genesis_hash = BlockHash::from_str(raw.genesis_hash).map_err(|e| {
            ConfigurationError::InvalidGenesisHash {
                network,
                reason: e.to_string(),
            }
        })?;
        let alert_pub_key =
            hex::decode(raw.alert_pub_key).map_err(|e| ConfigurationError::InvalidAlertKey {
                network,
                reason: e.to_string(),
            })?;

        if raw.first_posv2_height >= raw.first_posv3_height {
            return Err(ConfigurationError::NonIncreasingSchedule {
                network,
                what: "protocol version height",
            });
        }
        if !(raw.fork_v2_time < raw.fork_v3_time && raw.fork_v3_time < raw.fork_v4_time) {
            return Err(ConfigurationError::NonIncreasingSchedule {
                network,
                what: "fork time",
            });
        }
        let steps_increasing = raw
            .pow_subsidy
            .windows(2)
            .all(|w| w[0].from_height < w[1].from_height);
        if raw.pow_subsidy.first().map(|s| s.from_height) != Some(0) || !steps_increasing {
            return Err(ConfigurationError::NonIncreasingSchedule {
                network,
                what: "proof-of-work subsidy",
            });
        }

        raw.address_prefixes.validate(network)?;

        Ok(ParameterSet {
            network_id: network,
            data_dir: raw.data_dir,
            genesis_hash,
            genesis_time: raw.genesis_time,
            message_start: Magic::from_bytes(raw.message_start),
            alert_pub_key,
            default_port: raw.default_port,
            rpc_port: raw.rpc_port,
            bip44_coin_type: raw.bip44_coin_type,
            require_rpc_password: raw.require_rpc_password,
            pow_limit: U256::MAX.shr_vartime(raw.pow_limit_shift),
            pos_limit: U256::MAX.shr_vartime(raw.pos_limit_shift),
            pos_limit_v2: U256::MAX.shr_vartime(raw.pos_limit_v2_shift),
            first_posv2_height: raw.first_posv2_height,
            first_posv3_height: raw.first_posv3_height,
            fork_v2_time: raw.fork_v2_time,
            fork_v3_time: raw.fork_v3_time,
            fork_v4_time: raw.fork_v4_time,
            fork_schedule: ForkSchedule::new(
                raw.fork_v2_time,
                raw.fork_v3_time,
                raw.fork_v4_time,
            ),
            stake_min_confirmations_legacy: raw.stake_min_confirmations_legacy,
            stake_min_confirmations: raw.stake_min_confirmations,
            last_pow_height: raw.last_pow_height,
            pow_subsidy: raw.pow_subsidy,
            dev_contribution_address: raw.dev_contribution_address.to_string(),
            supply_increase_address: raw.supply_increase_address.to_string(),
            address_prefixes: raw.address_prefixes,
            dns_seeds: raw.dns_seeds,
            fixed_seeds: raw.fixed_seeds,
        })
    }

    /// The network these parameters belong to
    pub fn network_id(&self) -> NetworkId {
        self.network_id
    }

    /// Short name of the network: "main", "test" or "regtest"
    pub fn network_id_string(&self) -> &'static str {
        self.network_id.as_str()
    }

    /// True only for the public test network; regtest deliberately answers false
    pub fn is_testnet(&self) -> bool {
        self.network_id == NetworkId::Testnet
    }

    /// Sub-directory of the data directory used by this network ("" for main)
    pub fn data_dir(&self) -> &'static str {
        self.data_dir
    }

    pub fn genesis_hash(&self) -> BlockHash {
        self.genesis_hash
    }

    /// Timestamp of block 0; previous blocks older than this are rejected by the reward functions
    pub fn genesis_time(&self) -> i64 {
        self.genesis_time
    }

    pub fn message_start(&self) -> Magic {
        self.message_start
    }

    /// The pair peers compare before any further protocol exchange
    pub fn handshake_fingerprint(&self) -> (BlockHash, Magic) {
        (self.genesis_hash, self.message_start)
    }

    /// Raw alert signing key; empty when the network has no alert system
    pub fn alert_pub_key(&self) -> &[u8] {
        &self.alert_pub_key
    }

    pub fn default_port(&self) -> u16 {
        self.default_port
    }

    /// Default port of the JSON-RPC server
    pub fn rpc_port(&self) -> u16 {
        self.rpc_port
    }

    pub fn bip44_coin_type(&self) -> u32 {
        self.bip44_coin_type
    }

    /// False only on regtest, where the RPC server may run unauthenticated
    pub fn require_rpc_password(&self) -> bool {
        self.require_rpc_password
    }

    /// Highest proof-of-work target a block may claim
    pub fn pow_limit(&self) -> &U256 {
        &self.pow_limit
    }

    /// Proof-of-stake target limit for a block at `height`
    pub fn pos_limit(&self, height: u32) -> &U256 {
        if self.is_protocol_v2(height) {
            &self.pos_limit_v2
        } else {
            &self.pos_limit
        }
    }

    pub fn first_posv2_height(&self) -> u32 {
        self.first_posv2_height
    }

    pub fn first_posv3_height(&self) -> u32 {
        self.first_posv3_height
    }

    pub fn fork_v2_time(&self) -> i64 {
        self.fork_v2_time
    }

    pub fn fork_v3_time(&self) -> i64 {
        self.fork_v3_time
    }

    pub fn fork_v4_time(&self) -> i64 {
        self.fork_v4_time
    }

    /// Height of the last block that may be mined with proof of work
    pub fn last_pow_height(&self) -> u32 {
        self.last_pow_height
    }

    /// Base proof-of-work subsidy at `height`, without fees or the last-PoW check
    pub fn pow_subsidy_at(&self, height: u32) -> Amount {
        let idx = self
            .pow_subsidy
            .partition_point(|step| step.from_height <= height);
        // The schedule always starts at height 0, so idx >= 1.
        self.pow_subsidy
            .get(idx.saturating_sub(1))
            .map_or(0, |step| step.subsidy)
    }

    pub fn pow_subsidy_schedule(&self) -> &[SubsidyStep] {
        &self.pow_subsidy
    }

    pub fn dev_contribution_address(&self) -> &str {
        &self.dev_contribution_address
    }

    pub fn supply_increase_address(&self) -> &str {
        &self.supply_increase_address
    }

    pub fn address_prefixes(&self) -> &AddressPrefixes {
        &self.address_prefixes
    }

    /// Base58 prefix bytes of `kind`; every kind has one
    pub fn base58_prefix(&self, kind: AddressKind) -> &[u8] {
        self.address_prefixes.prefix(kind)
    }

    pub fn dns_seeds(&self) -> &[DnsSeed] {
        &self.dns_seeds
    }

    /// Hard-coded peers tried when DNS seeding yields nothing
    pub fn fixed_seeds(&self) -> &[SocketAddr] {
        &self.fixed_seeds
    }
}

fn main_params() -> RawParams {
    RawParams {
        network_id: NetworkId::Main,
        data_dir: "",
        genesis_hash: "00000426e7bb73977f829d1129fd51aab892a36ba8386c5febe19eaf92bfe77c",
        genesis_time: 1_475_020_800,
        message_start: [0xb5, 0xb3, 0xde, 0x2b],
        alert_pub_key: "0464745f119b8b8a91fa9da94a026cb3deccfe4d0ae233309eeb2708beb5d7f32fbdceb191a98ce6f14edeb32a26305b317749a45296bf1772880f2b8d7dda0156",
        default_port: 37347,
        rpc_port: 36657,
        bip44_coin_type: 213,
        require_rpc_password: true,
        pow_limit_shift: 20,
        pos_limit_shift: 20,
        pos_limit_v2_shift: 48,
        first_posv2_height: 23_000,
        first_posv3_height: 183_000,
        fork_v2_time: 1_534_888_800,
        fork_v3_time: 1_558_375_200,
        fork_v4_time: 1_562_961_600,
        stake_min_confirmations_legacy: 288,
        stake_min_confirmations: 2_880,
        last_pow_height: 5_000,
        pow_subsidy: vec![
            SubsidyStep {
                from_height: 0,
                subsidy: 0,
            },
            // Block 1 carries the initial distribution
            SubsidyStep {
                from_height: 1,
                subsidy: 10_000_000 * COIN,
            },
            SubsidyStep {
                from_height: 2,
                subsidy: 400 * COIN,
            },
        ],
        dev_contribution_address: "SdrdWNtjD7V6BSt3EyQZKCnZDkeE28cZhr",
        supply_increase_address: "SQH3o1FWXa9fCGb7q1s8CCvbHLEDmhCDgk",
        address_prefixes: AddressPrefixes {
            pubkey_address: vec![63],
            script_address: vec![136],
            secret_key: vec![191],
            stealth_address: vec![40],
            ext_public_key: vec![0x8E, 0x8E, 0xA8, 0xEA],
            ext_secret_key: vec![0x8E, 0x8F, 0xC4, 0x70],
            ext_key_hash: vec![75],
            ext_acc_hash: vec![23],
            ext_public_key_btc: vec![0x04, 0x88, 0xB2, 0x1E],
            ext_secret_key_btc: vec![0x04, 0x88, 0xAD, 0xE4],
        },
        dns_seeds: vec![
            DnsSeed::new("spectrecoin.org", "seed.spectrecoin.org"),
            DnsSeed::new("spectreproject.io", "dnsseed.spectreproject.io"),
        ],
        fixed_seeds: vec![
            SocketAddr::from(([212, 47, 226, 154], 37347)),
            SocketAddr::from(([185, 144, 157, 18], 37347)),
            SocketAddr::from(([95, 216, 17, 203], 37347)),
        ],
    }
}

fn testnet_params() -> RawParams {
    RawParams {
        network_id: NetworkId::Testnet,
        data_dir: "testnet",
        genesis_hash: "00000a0d499c4d089b19507856222df5b5f0ae7923ac8b0f7efb7c2f578f2158",
        genesis_time: 1_475_020_800,
        message_start: [0x12, 0x36, 0x24, 0x4a],
        alert_pub_key: "0478e3691efab91ff035a90e6f6423a0096990b178ee7f5387c8f56446b2752b92da2e7a31aba9c9a36fe301244e425820116abc3ee31cbbaf36bba96ea9f99f82",
        default_port: 37111,
        rpc_port: 36757,
        bip44_coin_type: 1,
        require_rpc_password: true,
        pow_limit_shift: 16,
        pos_limit_shift: 20,
        pos_limit_v2_shift: 48,
        first_posv2_height: 1_000,
        first_posv3_height: 2_000,
        fork_v2_time: 1_531_692_000,
        fork_v3_time: 1_555_696_800,
        fork_v4_time: 1_561_024_800,
        stake_min_confirmations_legacy: 28,
        stake_min_confirmations: 288,
        last_pow_height: 1_000,
        pow_subsidy: vec![
            SubsidyStep {
                from_height: 0,
                subsidy: 0,
            },
            SubsidyStep {
                from_height: 1,
                subsidy: 1_000_000 * COIN,
            },
            SubsidyStep {
                from_height: 2,
                subsidy: 400 * COIN,
            },
        ],
        dev_contribution_address: "tMp4g2Rsq5hHGE3J6GYUMmWr6K4cpJJ4yP",
        supply_increase_address: "tRkKfXxmG1vDo3AqWK8BR7R6ypAJNzv6Gh",
        address_prefixes: test_address_prefixes(),
        dns_seeds: vec![DnsSeed::new(
            "spectrecoin.org",
            "testnet-seed.spectrecoin.org",
        )],
        fixed_seeds: vec![SocketAddr::from(([212, 47, 226, 155], 37111))],
    }
}

fn regtest_params() -> RawParams {
    RawParams {
        network_id: NetworkId::Regtest,
        data_dir: "regtest",
        genesis_hash: "4d3595f60fe507c5e31fc72f377fa5686684cdff769d5d81d4cbc4d27ede295d",
        genesis_time: 1_296_688_602,
        message_start: [0xfa, 0xbf, 0xb5, 0xda],
        alert_pub_key: "",
        default_port: 18444,
        rpc_port: 18445,
        bip44_coin_type: 1,
        require_rpc_password: false,
        pow_limit_shift: 1,
        pos_limit_shift: 1,
        pos_limit_v2_shift: 1,
        first_posv2_height: 10,
        first_posv3_height: 20,
        fork_v2_time: 1_500_000_000,
        fork_v3_time: 1_500_000_600,
        fork_v4_time: 1_500_001_200,
        stake_min_confirmations_legacy: 1,
        stake_min_confirmations: 2,
        last_pow_height: 1_000,
        pow_subsidy: vec![
            SubsidyStep {
                from_height: 0,
                subsidy: 0,
            },
            SubsidyStep {
                from_height: 1,
                subsidy: 50 * COIN,
            },
        ],
        dev_contribution_address: "tMp4g2Rsq5hHGE3J6GYUMmWr6K4cpJJ4yP",
        supply_increase_address: "tRkKfXxmG1vDo3AqWK8BR7R6ypAJNzv6Gh",
        address_prefixes: test_address_prefixes(),
        dns_seeds: Vec::new(),
        fixed_seeds: Vec::new(),
    }
}

// Testnet and regtest share one prefix table
fn test_address_prefixes() -> AddressPrefixes {
    AddressPrefixes {
        pubkey_address: vec![127],
        script_address: vec![196],
        secret_key: vec![255],
        stealth_address: vec![43],
        ext_public_key: vec![0x76, 0xC0, 0xFD, 0xFB],
        ext_secret_key: vec![0x76, 0xC1, 0x07, 0x7A],
        ext_key_hash: vec![137],
        ext_acc_hash: vec![83],
        ext_public_key_btc: vec![0x04, 0x35, 0x87, 0xCF],
        ext_secret_key_btc: vec![0x04, 0x35, 0x83, 0x94],
    }
}
