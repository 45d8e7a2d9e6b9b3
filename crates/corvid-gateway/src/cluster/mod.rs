//! Shard cluster
//!
//! Owns the shard registry, the shared guild cache, the cross-shard
//! IDENTIFY throttle and the seams to user code (event handler, voice
//! client factory). Runs the global one-second ticker that drives every
//! shard's heartbeat logic, and the cache maintenance interval.

use std::sync::{Arc, Mutex, RwLock, Weak};
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use serde_json::Value;
use tracing::{debug, error, info};

use corvid_cache::GuildCache;
use corvid_common::ClusterConfig;
use corvid_core::{GatewayIntents, Guild, Snowflake};

use crate::events::GatewayEventType;
use crate::shard::Shard;
use crate::voice::VoiceClientFactory;

/// Minimum spacing between IDENTIFY payloads across all sibling shards
pub const IDENTIFY_INTERVAL_SECS: i64 = 5;

/// Cadence of the cache garbage collection pass
pub const MAINTENANCE_INTERVAL_SECS: u64 = 60;

/// Receives every dispatch event after the shard's internal handling
///
/// Called from shard driver tasks; implementations must be cheap or hand
/// the work off, as they run on the read path.
pub trait EventHandler: Send + Sync {
    fn on_event(&self, shard_id: u32, event: &str, data: &Value, raw: &str);
}

/// A set of shards sharing one bot identity
pub struct Cluster {
    config: ClusterConfig,
    /// Self-handle for the shards' back-references and spawned loops
    weak_self: Weak<Cluster>,
    /// Epoch second of the most recently claimed IDENTIFY slot
    last_identify_at: Mutex<i64>,
    shards: DashMap<u32, Arc<Shard>>,
    cache: Arc<GuildCache>,
    handler: RwLock<Option<Arc<dyn EventHandler>>>,
    voice_factory: RwLock<Option<Arc<dyn VoiceClientFactory>>>,
}

impl Cluster {
    /// Create a cluster from configuration
    pub fn new(config: ClusterConfig) -> Arc<Self> {
        Arc::new_cyclic(|weak_self| Self {
            config,
            weak_self: weak_self.clone(),
            last_identify_at: Mutex::new(0),
            shards: DashMap::new(),
            cache: Arc::new(GuildCache::new()),
            handler: RwLock::new(None),
            voice_factory: RwLock::new(None),
        })
    }

    /// The cluster configuration
    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Gateway hostname shards connect to
    pub fn gateway_host(&self) -> &str {
        &self.config.gateway_host
    }

    /// The configured intent bitset
    pub fn intents(&self) -> GatewayIntents {
        GatewayIntents::from_bits_truncate(self.config.intents)
    }

    /// The shared guild cache
    pub fn cache(&self) -> &Arc<GuildCache> {
        &self.cache
    }

    /// Install the user event handler
    pub fn set_event_handler(&self, handler: Arc<dyn EventHandler>) {
        *self.handler.write().expect("handler poisoned") = Some(handler);
    }

    /// Install the voice client factory
    ///
    /// Without a factory, voice handoffs assemble credentials but never
    /// spawn a client.
    pub fn set_voice_factory(&self, factory: Arc<dyn VoiceClientFactory>) {
        *self.voice_factory.write().expect("voice factory poisoned") = Some(factory);
    }

    pub(crate) fn voice_factory(&self) -> Option<Arc<dyn VoiceClientFactory>> {
        self.voice_factory
            .read()
            .expect("voice factory poisoned")
            .clone()
    }

    /// Create and register the shard for an index
    ///
    /// The shard is inert until [`Shard::run`] or [`Cluster::run`] starts
    /// its driver.
    pub fn spawn_shard(&self, shard_id: u32) -> Arc<Shard> {
        let this = self
            .weak_self
            .upgrade()
            .expect("cluster invoked outside its Arc");
        let shard = Shard::new(
            &this,
            shard_id,
            self.config.shard_count,
            self.config.token.clone(),
            self.intents(),
            self.config.compressed,
        );
        self.shards.insert(shard_id, shard.clone());
        debug!(shard_id, shard_count = self.config.shard_count, "Shard registered");
        shard
    }

    /// Look up a registered shard
    pub fn shard(&self, shard_id: u32) -> Option<Arc<Shard>> {
        self.shards.get(&shard_id).map(|entry| entry.clone())
    }

    /// Number of registered shards
    pub fn shard_len(&self) -> usize {
        self.shards.len()
    }

    /// Invoke `tick()` on every registered shard
    pub fn tick_shards(&self) {
        for entry in self.shards.iter() {
            entry.value().tick();
        }
    }

    /// Run the cluster: all shard drivers, the one-second ticker and the
    /// cache maintenance interval
    ///
    /// Resolves when every shard driver has terminated, which only happens
    /// on unrecoverable close codes (bad token or intents).
    pub async fn run(&self) {
        for shard_id in 0..self.config.shard_count {
            if !self.shards.contains_key(&shard_id) {
                self.spawn_shard(shard_id);
            }
        }

        info!(shards = self.shards.len(), "Cluster starting");

        let mut drivers = Vec::new();
        for entry in self.shards.iter() {
            drivers.push(entry.value().run());
        }

        let ticker = tokio::spawn(tick_loop(self.weak_self.clone()));
        let maintenance = tokio::spawn(maintenance_loop(self.weak_self.clone()));

        for driver in drivers {
            if let Err(e) = driver.await {
                error!(error = %e, "Shard driver task failed");
            }
        }

        ticker.abort();
        maintenance.abort();
        info!("Cluster stopped");
    }

    /// Claim the next IDENTIFY slot, sleeping out the 5-second floor
    ///
    /// The slot is claimed under the mutex before any waiting, so two
    /// shards can never identify inside the same window. Returns the epoch
    /// second of the claimed slot.
    pub(crate) async fn claim_identify_slot(&self) -> i64 {
        let (slot, wait) = {
            let now = Utc::now().timestamp();
            let mut last = self.last_identify_at.lock().expect("identify clock poisoned");
            let slot = now.max(*last + IDENTIFY_INTERVAL_SECS);
            *last = slot;
            (slot, slot - now)
        };

        if wait > 0 {
            debug!(wait, "Waiting before identifying for session");
            tokio::time::sleep(Duration::from_secs(wait as u64)).await;
        }

        slot
    }

    /// Route a dispatch event: cache maintenance, then the user handler
    pub(crate) fn dispatch(&self, shard_id: u32, event: &str, data: &Value, raw: &str) {
        self.update_cache(event, data);

        let handler = self.handler.read().expect("handler poisoned").clone();
        if let Some(handler) = handler {
            handler.on_event(shard_id, event, data, raw);
        }
    }

    /// Keep the guild cache in step with dispatch traffic
    fn update_cache(&self, event: &str, data: &Value) {
        let Some(kind) = GatewayEventType::parse(event) else {
            return;
        };

        match kind {
            GatewayEventType::GuildCreate => {
                let Some(id) = snowflake_field(data.get("id")) else {
                    return;
                };
                let name = data
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                let owner_id = snowflake_field(data.get("owner_id")).unwrap_or_default();

                let mut guild = Guild::new(id, name, owner_id, self.config.shard_count);
                guild.unavailable = data
                    .get("unavailable")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);

                if let Some(members) = data.get("members").and_then(Value::as_array) {
                    for member in members {
                        if let Some(user_id) =
                            snowflake_field(member.get("user").and_then(|u| u.get("id")))
                        {
                            guild.members.insert(user_id);
                        }
                    }
                }
                if let Some(channels) = data.get("channels").and_then(Value::as_array) {
                    for channel in channels {
                        if let Some(channel_id) = snowflake_field(channel.get("id")) {
                            guild.channels.insert(channel_id);
                        }
                    }
                }

                self.cache.insert(guild);
            }
            GatewayEventType::GuildDelete => {
                let Some(id) = snowflake_field(data.get("id")) else {
                    return;
                };
                // An outage sets `unavailable`; the guild stays cached.
                // A true removal is deferred to the maintenance sweep.
                if data
                    .get("unavailable")
                    .and_then(Value::as_bool)
                    .unwrap_or(false)
                {
                    self.cache.mark_unavailable(id);
                } else {
                    self.cache.mark_for_removal(id);
                }
            }
            GatewayEventType::ChannelCreate => {
                if let (Some(guild_id), Some(channel_id)) = (
                    snowflake_field(data.get("guild_id")),
                    snowflake_field(data.get("id")),
                ) {
                    self.cache.add_channel(guild_id, channel_id);
                }
            }
            GatewayEventType::ChannelDelete => {
                if let (Some(guild_id), Some(channel_id)) = (
                    snowflake_field(data.get("guild_id")),
                    snowflake_field(data.get("id")),
                ) {
                    self.cache.remove_channel(guild_id, channel_id);
                }
            }
            GatewayEventType::GuildMemberAdd => {
                if let (Some(guild_id), Some(user_id)) = (
                    snowflake_field(data.get("guild_id")),
                    snowflake_field(data.get("user").and_then(|u| u.get("id"))),
                ) {
                    self.cache.add_member(guild_id, user_id);
                }
            }
            GatewayEventType::GuildMemberRemove => {
                if let (Some(guild_id), Some(user_id)) = (
                    snowflake_field(data.get("guild_id")),
                    snowflake_field(data.get("user").and_then(|u| u.get("id"))),
                ) {
                    self.cache.remove_member(guild_id, user_id);
                }
            }
            _ => {}
        }
    }
}

impl std::fmt::Debug for Cluster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cluster")
            .field("shard_count", &self.config.shard_count)
            .field("shards", &self.shards.len())
            .field("guilds", &self.cache.len())
            .finish()
    }
}

fn snowflake_field(value: Option<&Value>) -> Option<Snowflake> {
    serde_json::from_value(value?.clone()).ok()
}

/// Global one-second ticker driving every shard's `tick()`
async fn tick_loop(cluster: Weak<Cluster>) {
    let mut interval = tokio::time::interval(Duration::from_secs(1));
    loop {
        interval.tick().await;
        let Some(cluster) = cluster.upgrade() else {
            return;
        };
        cluster.tick_shards();
    }
}

/// Cache maintenance, decoupled from heartbeat cadence
async fn maintenance_loop(cluster: Weak<Cluster>) {
    let mut interval = tokio::time::interval(Duration::from_secs(MAINTENANCE_INTERVAL_SECS));
    loop {
        interval.tick().await;
        let Some(cluster) = cluster.upgrade() else {
            return;
        };
        cluster.cache.garbage_collect();
    }
}
