// deploy/src/network.rs
use anchor_client::Cluster;
use anyhow::{bail, Context, Result};

/// Where the randomness coordinator key comes from on a given cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorSource {
    /// Generate (or reuse) a local keypair that acts as the coordinator.
    LocalKeypair,
    /// An externally operated coordinator whose pubkey must be supplied.
    External,
}

/// Per-cluster lottery parameters used when initializing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    pub name: &'static str,
    pub entrance_fee: u64,
    pub interval: i64,
    pub key_hash: [u8; 32],
    pub subscription_id: u64,
    pub callback_compute_limit: u32,
    pub coordinator: CoordinatorSource,
}

const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

impl NetworkConfig {
    pub fn for_cluster(cluster: &Cluster) -> Result<Self> {
        match cluster {
            Cluster::Localnet | Cluster::Debug => Ok(Self {
                name: "localnet",
                entrance_fee: LAMPORTS_PER_SOL / 100,
                interval: 30,
                key_hash: [0u8; 32],
                subscription_id: 1,
                callback_compute_limit: 500_000,
                coordinator: CoordinatorSource::LocalKeypair,
            }),
            Cluster::Devnet => Ok(Self {
                name: "devnet",
                entrance_fee: LAMPORTS_PER_SOL / 100,
                interval: 30,
                key_hash: [0u8; 32],
                subscription_id: 0,
                callback_compute_limit: 500_000,
                coordinator: CoordinatorSource::External,
            }),
            other => bail!("no lottery network config for cluster {other:?}"),
        }
    }

    pub fn is_development(&self) -> bool {
        self.coordinator == CoordinatorSource::LocalKeypair
    }
}

/// Parses a 32-byte key hash from hex, with or without a `0x` prefix.
pub fn parse_key_hash(value: &str) -> Result<[u8; 32]> {
    let bytes = hex::decode(value.trim_start_matches("0x")).context("key hash is not valid hex")?;
    let Ok(key_hash) = <[u8; 32]>::try_from(bytes.as_slice()) else {
        bail!("key hash must be 32 bytes, got {}", bytes.len());
    };
    Ok(key_hash)
}
