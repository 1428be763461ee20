//! # Runtime Configuration
//!
//! Loaded from `RP_*` environment variables.
//!
//! ## Mandatory
//!
//! - `RP_INSTANCE_ID` - identifier of this prover process
//! - `RP_PROVER_SEED` - 32-byte proof-system key seed, hex encoded
//!
//! Everything else falls back to the defaults below.

use std::time::Duration;

use rp_02_sequencing::SequencingConfig;
use rp_03_proof_merge::MergeConfig;
use rp_04_settlement::SettlementConfig;
use thiserror::Error;

/// Complete runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Identifier of this process; coordinators append their index.
    pub instance_id: String,
    /// Seed of the attested proof system key.
    pub prover_seed: [u8; 32],
    /// Pause between loop passes.
    pub poll_interval: Duration,
    /// Budget for one merge attempt.
    pub merge_timeout: Duration,
    /// Re-selection cool-down for a combined range.
    pub dedup_cooldown: Duration,
    /// Unsettled blocks scanned per coordinator pass.
    pub window_blocks: u64,
    /// Coordinator instances sharing the registry.
    pub coordinators: usize,
    /// Operations per demo block.
    pub block_size: u64,
    /// Operations the demo chain produces before going quiet.
    pub demo_operations: u64,
}

/// Configuration errors. Any of these aborts startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Mandatory variable absent or empty.
    #[error("{var} must be set")]
    Missing { var: &'static str },

    /// Variable present but unusable.
    #[error("{var}={value:?} is invalid: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    /// Setting that must be positive is zero.
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
}

const DEFAULT_POLL_INTERVAL_MS: u64 = 5_000;
const DEFAULT_MERGE_TIMEOUT_SECS: u64 = 120;
const DEFAULT_DEDUP_COOLDOWN_SECS: u64 = 60;
const DEFAULT_WINDOW_BLOCKS: u64 = 16;
const DEFAULT_COORDINATORS: usize = 2;
const DEFAULT_BLOCK_SIZE: u64 = 8;
const DEFAULT_DEMO_OPERATIONS: u64 = 64;

impl RuntimeConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |var: &'static str| lookup(var).filter(|v| !v.trim().is_empty());

        let instance_id = read("RP_INSTANCE_ID").ok_or(ConfigError::Missing {
            var: "RP_INSTANCE_ID",
        })?;
        let seed_hex = read("RP_PROVER_SEED").ok_or(ConfigError::Missing {
            var: "RP_PROVER_SEED",
        })?;
        let prover_seed = parse_seed(&seed_hex)?;

        let config = Self {
            instance_id: instance_id.trim().to_string(),
            prover_seed,
            poll_interval: Duration::from_millis(parse_or(
                read("RP_POLL_INTERVAL_MS"),
                "RP_POLL_INTERVAL_MS",
                DEFAULT_POLL_INTERVAL_MS,
            )?),
            merge_timeout: Duration::from_secs(parse_or(
                read("RP_MERGE_TIMEOUT_SECS"),
                "RP_MERGE_TIMEOUT_SECS",
                DEFAULT_MERGE_TIMEOUT_SECS,
            )?),
            dedup_cooldown: Duration::from_secs(parse_or(
                read("RP_DEDUP_COOLDOWN_SECS"),
                "RP_DEDUP_COOLDOWN_SECS",
                DEFAULT_DEDUP_COOLDOWN_SECS,
            )?),
            window_blocks: parse_or(
                read("RP_WINDOW_BLOCKS"),
                "RP_WINDOW_BLOCKS",
                DEFAULT_WINDOW_BLOCKS,
            )?,
            coordinators: parse_or(
                read("RP_COORDINATORS"),
                "RP_COORDINATORS",
                DEFAULT_COORDINATORS,
            )?,
            block_size: parse_or(read("RP_BLOCK_SIZE"), "RP_BLOCK_SIZE", DEFAULT_BLOCK_SIZE)?,
            demo_operations: parse_or(
                read("RP_DEMO_OPERATIONS"),
                "RP_DEMO_OPERATIONS",
                DEFAULT_DEMO_OPERATIONS,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would stall a loop.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval.is_zero() {
            return Err(ConfigError::Zero {
                field: "poll_interval",
            });
        }
        if self.merge_timeout.is_zero() {
            return Err(ConfigError::Zero {
                field: "merge_timeout",
            });
        }
        if self.window_blocks == 0 {
            return Err(ConfigError::Zero {
                field: "window_blocks",
            });
        }
        if self.coordinators == 0 {
            return Err(ConfigError::Zero {
                field: "coordinators",
            });
        }
        if self.block_size == 0 {
            return Err(ConfigError::Zero { field: "block_size" });
        }
        Ok(())
    }

    /// Merge configuration for coordinator `index`.
    pub fn merge_config(&self, index: usize) -> MergeConfig {
        MergeConfig {
            instance_id: format!("{}-{}", self.instance_id, index),
            poll_interval: self.poll_interval,
            attempt_timeout: self.merge_timeout,
            dedup_cooldown: self.dedup_cooldown,
            window_blocks: self.window_blocks,
        }
    }

    pub fn sequencing_config(&self) -> SequencingConfig {
        SequencingConfig::default()
    }

    pub fn settlement_config(&self) -> SettlementConfig {
        SettlementConfig::default()
    }
}

fn parse_seed(value: &str) -> Result<[u8; 32], ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        var: "RP_PROVER_SEED",
        value: value.to_string(),
        reason,
    };
    let bytes = hex::decode(value.trim()).map_err(|e| invalid(e.to_string()))?;
    bytes
        .try_into()
        .map_err(|bytes: Vec<u8>| invalid(format!("expected 32 bytes, got {}", bytes.len())))
}

fn parse_or<T>(value: Option<String>, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}
