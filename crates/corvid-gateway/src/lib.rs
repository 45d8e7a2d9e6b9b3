//! # corvid-gateway
//!
//! Gateway shard client: maintains a persistent, authenticated, optionally
//! compressed WebSocket connection to Discord's real-time gateway,
//! translates the opcode protocol into dispatched events, and sustains the
//! connection across failures via heartbeating, reconnection and session
//! resumption.

pub mod cluster;
pub mod compression;
pub mod error;
pub mod events;
pub mod protocol;
pub mod shard;
pub mod voice;

pub use cluster::{Cluster, EventHandler};
pub use error::{GatewayError, GatewayResult};
pub use shard::{MessageQueue, Shard, ShardState};
pub use voice::{VoiceClient, VoiceClientFactory, VoiceCredentials, VoiceError, VoiceInfo};
