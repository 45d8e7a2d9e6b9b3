//! Cluster configuration
//!
//! Loads configuration from environment variables.

use serde::Deserialize;
use std::env;

/// Default gateway hostname
pub const DEFAULT_GATEWAY_HOST: &str = "gateway.discord.gg";

/// Configuration for a shard cluster
#[derive(Debug, Clone, Deserialize)]
pub struct ClusterConfig {
    /// Bot token (opaque bearer credential)
    pub token: String,

    /// Total number of shards the bot runs
    #[serde(default = "default_shard_count")]
    pub shard_count: u32,

    /// Gateway intent bitset (raw bits; typed as `GatewayIntents` downstream)
    #[serde(default)]
    pub intents: u32,

    /// Whether to request transport-level zlib-stream compression
    #[serde(default = "default_compressed")]
    pub compressed: bool,

    /// Gateway hostname (overridable for testing against a local gateway)
    #[serde(default = "default_gateway_host")]
    pub gateway_host: String,
}

impl ClusterConfig {
    /// Load configuration from environment variables
    ///
    /// | Variable              | Required | Default              |
    /// |-----------------------|----------|----------------------|
    /// | `DISCORD_TOKEN`       | yes      | (none)               |
    /// | `DISCORD_SHARD_COUNT` | no       | `1`                  |
    /// | `DISCORD_INTENTS`     | no       | `0`                  |
    /// | `DISCORD_COMPRESS`    | no       | `true`               |
    /// | `DISCORD_GATEWAY_HOST`| no       | `gateway.discord.gg` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let token =
            env::var("DISCORD_TOKEN").map_err(|_| ConfigError::MissingVar("DISCORD_TOKEN"))?;

        let shard_count = parse_var("DISCORD_SHARD_COUNT")?.unwrap_or_else(default_shard_count);
        if shard_count == 0 {
            return Err(ConfigError::InvalidVar {
                name: "DISCORD_SHARD_COUNT",
                value: "0".to_string(),
            });
        }

        let intents = parse_var("DISCORD_INTENTS")?.unwrap_or(0);
        let compressed = parse_var("DISCORD_COMPRESS")?.unwrap_or_else(default_compressed);
        let gateway_host =
            env::var("DISCORD_GATEWAY_HOST").unwrap_or_else(|_| default_gateway_host());

        Ok(Self {
            token,
            shard_count,
            intents,
            compressed,
            gateway_host,
        })
    }

    /// Create a configuration directly (programmatic setup, tests)
    #[must_use]
    pub fn new(token: impl Into<String>, shard_count: u32, intents: u32, compressed: bool) -> Self {
        Self {
            token: token.into(),
            shard_count,
            intents,
            compressed,
            gateway_host: default_gateway_host(),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidVar { name, value: raw }),
        Err(_) => Ok(None),
    }
}

fn default_shard_count() -> u32 {
    1
}

fn default_compressed() -> bool {
    true
}

fn default_gateway_host() -> String {
    DEFAULT_GATEWAY_HOST.to_string()
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    #[error("invalid value {value:?} for environment variable {name}")]
    InvalidVar { name: &'static str, value: String },
}
