//! # corvid-common
//!
//! Shared infrastructure: configuration loading and telemetry setup.

pub mod config;
pub mod telemetry;

pub use config::{ClusterConfig, ConfigError, DEFAULT_GATEWAY_HOST};
pub use telemetry::{init_tracing, try_init_tracing, TelemetryError};
