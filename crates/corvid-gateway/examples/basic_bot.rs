//! Minimal bot: connect every shard, log message events
//!
//! ```bash
//! DISCORD_TOKEN=... DISCORD_INTENTS=513 cargo run -p corvid-gateway --example basic_bot
//! ```

use std::sync::Arc;

use corvid_common::{try_init_tracing, ClusterConfig};
use corvid_gateway::{Cluster, EventHandler};
use serde_json::Value;
use tracing::{error, info};

struct LoggingHandler;

impl EventHandler for LoggingHandler {
    fn on_event(&self, shard_id: u32, event: &str, data: &Value, _raw: &str) {
        if event == "MESSAGE_CREATE" {
            info!(
                shard_id,
                author = %data["author"]["username"],
                content = %data["content"],
                "Message received"
            );
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = try_init_tracing() {
        eprintln!("Warning: failed to initialize tracing: {e}");
    }

    let config = match ClusterConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            std::process::exit(1);
        }
    };

    info!(
        shard_count = config.shard_count,
        compressed = config.compressed,
        "Starting cluster"
    );

    let cluster = Cluster::new(config);
    cluster.set_event_handler(Arc::new(LoggingHandler));
    cluster.run().await;
}
