use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use spectre_consensus_core::{
    registry, Amount, BlockIndex, ForkFlags, NetworkSelection, ParameterSet, StakeKind,
};
use spectre_params_cli::{parse_address_kind, Config, ParamsSummary};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

// --- CLI Definition ---

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,

    /// Use the public test network
    #[clap(long, global = true)]
    testnet: bool,

    /// Use the private regression test network
    #[clap(long, global = true)]
    regtest: bool,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Prints every parameter of the selected network.
    Show,
    /// Evaluates all fork gates for a block height and time.
    Fork {
        #[clap(long)]
        height: u32,
        #[clap(long)]
        time: i64,
    },
    /// Computes a proof-of-work reward.
    PowReward {
        #[clap(long)]
        height: u32,
        #[clap(long, default_value_t = 0)]
        fees: Amount,
    },
    /// Computes a proof-of-stake reward on top of a previous block.
    StakeReward {
        #[clap(long)]
        prev_height: u32,
        #[clap(long)]
        prev_time: i64,
        /// Coin age of the spent stake inputs, in coin-days
        #[clap(long)]
        coin_age: i64,
        #[clap(long, default_value_t = 0)]
        fees: Amount,
    },
    /// Computes an anonymous stake reward on top of a previous block.
    AnonStakeReward {
        #[clap(long)]
        prev_height: u32,
        #[clap(long)]
        prev_time: i64,
        /// Confirmation depth of the staked anonymized inputs
        #[clap(long)]
        depth: u32,
        #[clap(long, default_value_t = 0)]
        fees: Amount,
    },
    /// Encodes a hex payload as an address of the given kind.
    EncodeAddress {
        /// Address kind, e.g. pubkey-address or stealth-address
        kind: String,
        payload_hex: String,
    },
    /// Decodes an address and reports its kind and payload.
    DecodeAddress { address: String },
}

// --- Main Application Logic ---

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string())),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load(NetworkSelection {
        testnet: cli.testnet,
        regtest: cli.regtest,
    })?;
    let network = config.network()?;

    // Select once, before anything reads the parameters.
    let params = registry::select_params(network).context("Failed to select chain parameters")?;
    info!("Network: {}", params.network_id());

    let output = run(params, cli.command)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn run(params: &ParameterSet, command: Commands) -> Result<serde_json::Value> {
    let value = match command {
        Commands::Show => serde_json::to_value(ParamsSummary::from(params))?,
        Commands::Fork { height, time } => {
            serde_json::to_value(ForkFlags::at(params, height, time))?
        }
        Commands::PowReward { height, fees } => {
            let reward = params.proof_of_work_reward(height, fees)?;
            json!({ "height": height, "reward": reward })
        }
        Commands::StakeReward {
            prev_height,
            prev_time,
            coin_age,
            fees,
        } => {
            let prev = BlockIndex::new(prev_height, prev_time);
            let reward = params.proof_of_stake_reward(&prev, coin_age, fees)?;
            let split = params.split_stake_reward(&prev, StakeKind::Regular, reward)?;
            json!({
                "fork_id": params.fork_id(prev.time).as_u8(),
                "reward": reward,
                "split": split,
            })
        }
        Commands::AnonStakeReward {
            prev_height,
            prev_time,
            depth,
            fees,
        } => {
            let prev = BlockIndex::new(prev_height, prev_time);
            let depth = params.verify_stake_depth(depth)?;
            let reward = params.proof_of_anon_stake_reward(&prev, depth, fees)?;
            let split = params.split_stake_reward(&prev, StakeKind::Anonymous, reward)?;
            json!({
                "supply_increase_active": params.supply_increase_active(&prev),
                "reward": reward,
                "split": split,
                "supply_increase_address": params.supply_increase_address(),
                "dev_contribution_address": params.dev_contribution_address(),
            })
        }
        Commands::EncodeAddress { kind, payload_hex } => {
            let kind = parse_address_kind(&kind)?;
            let payload = hex::decode(&payload_hex).context("Payload is not valid hex")?;
            json!({
                "kind": kind.name(),
                "address": params.address_prefixes().encode(kind, &payload),
            })
        }
        Commands::DecodeAddress { address } => {
            let (kind, payload) = params.address_prefixes().decode(&address)?;
            json!({ "kind": kind.name(), "payload": hex::encode(payload) })
        }
    };
    Ok(value)
}
