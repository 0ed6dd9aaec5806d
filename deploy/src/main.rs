// deploy/src/main.rs
use std::{
    fs,
    path::{Path, PathBuf},
    rc::Rc,
    str::FromStr,
};

use anchor_client::{
    solana_sdk::{
        commitment_config::CommitmentConfig,
        pubkey::Pubkey,
        signature::{read_keypair_file, write_keypair_file, Keypair, Signer},
        system_program,
    },
    Client, ClientError, Cluster, Program,
};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use lottery::{
    constants::{LOTTERY_SEED, TREASURY_SEED},
    instructions::InitializeParams,
    state::Lottery,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod network;

use network::{parse_key_hash, CoordinatorSource, NetworkConfig};

#[derive(Parser)]
#[command(name = "lottery-deploy")]
#[command(about = "Provision and initialize the lottery program", version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Cluster to target (localnet, devnet or an RPC url)
    #[arg(short, long, global = true, default_value = "localnet")]
    cluster: String,

    /// Keypair paying for and owning the deployment
    #[arg(short, long, global = true, default_value = "~/.config/solana/id.json")]
    wallet: String,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the lottery and treasury accounts
    Deploy {
        /// Coordinator pubkey; required on clusters without a local coordinator
        #[arg(long)]
        coordinator: Option<String>,

        /// Where the local coordinator keypair is kept (created if missing)
        #[arg(long, default_value = ".keys/vrf-coordinator.json")]
        coordinator_keypair: PathBuf,

        /// Override the entrance fee in lamports
        #[arg(long)]
        entrance_fee: Option<u64>,

        /// Override the upkeep interval in seconds
        #[arg(long)]
        interval: Option<i64>,

        /// Override the coordinator key hash (32 bytes hex)
        #[arg(long)]
        key_hash: Option<String>,

        /// Override the coordinator subscription id
        #[arg(long)]
        subscription_id: Option<u64>,
    },

    /// Show the lottery's current state
    Status,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("lottery_deploy={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cluster = Cluster::from_str(&cli.cluster)
        .map_err(|e| anyhow!("unknown cluster {}: {e}", cli.cluster))?;
    let payer = read_keypair_file(expand_home(&cli.wallet))
        .map_err(|e| anyhow!("failed to read wallet {}: {e}", cli.wallet))?;

    let client = Client::new_with_options(
        cluster.clone(),
        Rc::new(payer),
        CommitmentConfig::confirmed(),
    );
    let program = client.program(lottery::ID)?;

    match cli.command {
        Commands::Deploy {
            coordinator,
            coordinator_keypair,
            entrance_fee,
            interval,
            key_hash,
            subscription_id,
        } => {
            let mut config = NetworkConfig::for_cluster(&cluster)?;
            if let Some(fee) = entrance_fee {
                config.entrance_fee = fee;
            }
            if let Some(interval) = interval {
                config.interval = interval;
            }
            if let Some(key_hash) = key_hash {
                config.key_hash = parse_key_hash(&key_hash)?;
            }
            if let Some(id) = subscription_id {
                config.subscription_id = id;
            }

            let vrf_coordinator =
                resolve_coordinator(&config, coordinator.as_deref(), &coordinator_keypair)?;
            deploy(&program, &config, vrf_coordinator)
        }
        Commands::Status => status(&program),
    }
}

fn lottery_addresses() -> (Pubkey, Pubkey) {
    let (lottery, _) = Pubkey::find_program_address(&[LOTTERY_SEED], &lottery::ID);
    let (treasury, _) =
        Pubkey::find_program_address(&[TREASURY_SEED, lottery.as_ref()], &lottery::ID);
    (lottery, treasury)
}

/// Picks the coordinator key: an explicit pubkey wins, otherwise development
/// clusters get a local keypair that is generated on first use.
fn resolve_coordinator(
    config: &NetworkConfig,
    explicit: Option<&str>,
    keypair_path: &Path,
) -> Result<Pubkey> {
    if let Some(pubkey) = explicit {
        return Pubkey::from_str(pubkey).context("invalid coordinator pubkey");
    }

    match config.coordinator {
        CoordinatorSource::External => Err(anyhow!(
            "{} has no local coordinator; pass --coordinator <PUBKEY>",
            config.name
        )),
        CoordinatorSource::LocalKeypair => {
            if keypair_path.exists() {
                let keypair = read_keypair_file(keypair_path).map_err(|e| {
                    anyhow!("failed to read {}: {e}", keypair_path.display())
                })?;
                info!("Reusing local coordinator {}", keypair.pubkey());
                return Ok(keypair.pubkey());
            }

            if let Some(parent) = keypair_path.parent() {
                fs::create_dir_all(parent)?;
            }
            let keypair = Keypair::new();
            write_keypair_file(&keypair, keypair_path)
                .map_err(|e| anyhow!("failed to write {}: {e}", keypair_path.display()))?;
            info!(
                "Provisioned local coordinator {} at {}",
                keypair.pubkey(),
                keypair_path.display()
            );
            Ok(keypair.pubkey())
        }
    }
}

fn deploy<C>(program: &Program<C>, config: &NetworkConfig, vrf_coordinator: Pubkey) -> Result<()>
where
    C: std::ops::Deref<Target = Keypair> + Clone,
{
    let (lottery, treasury) = lottery_addresses();

    match program.account::<Lottery>(lottery) {
        Ok(existing) => {
            warn!(
                "Lottery already initialized at {lottery} (fee={} interval={}s); skipping",
                existing.entrance_fee, existing.interval
            );
            return Ok(());
        }
        Err(ClientError::AccountNotFound) => {}
        Err(e) => return Err(e.into()),
    }

    info!(
        "Initializing lottery on {}: fee={} interval={}s coordinator={}",
        config.name, config.entrance_fee, config.interval, vrf_coordinator
    );

    let signature = program
        .request()
        .accounts(lottery::accounts::Initialize {
            lottery,
            treasury,
            authority: program.payer(),
            system_program: system_program::ID,
        })
        .args(lottery::instruction::Initialize {
            params: InitializeParams {
                entrance_fee: config.entrance_fee,
                interval: config.interval,
                vrf_coordinator,
                key_hash: config.key_hash,
                subscription_id: config.subscription_id,
                callback_compute_limit: config.callback_compute_limit,
            },
        })
        .send()?;

    info!("Lottery {lottery} initialized with treasury {treasury} ({signature})");
    Ok(())
}

fn status<C>(program: &Program<C>) -> Result<()>
where
    C: std::ops::Deref<Target = Keypair> + Clone,
{
    let (lottery, _) = lottery_addresses();
    let account = program.account::<Lottery>(lottery)?;

    info!("Lottery {lottery}");
    info!("  state:          {:?}", account.lottery_state);
    info!("  entrance fee:   {}", account.entrance_fee);
    info!("  interval:       {}s", account.interval);
    info!("  last timestamp: {}", account.last_timestamp);
    info!("  players:        {}", account.number_of_players());
    match account.recent_winner {
        Some(winner) => info!("  recent winner:  {winner}"),
        None => info!("  recent winner:  none"),
    }
    if let Some(request_id) = account.pending_request {
        info!("  pending request: {request_id}");
    }
    Ok(())
}

fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), std::env::var_os("HOME")) {
        (Some(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => PathBuf::from(path),
    }
}
