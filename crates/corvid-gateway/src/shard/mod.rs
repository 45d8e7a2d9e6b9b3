//! Gateway shard client
//!
//! One `Shard` owns one gateway connection: it interprets the opcode
//! protocol, drives the IDENTIFY/RESUME handshake, emits heartbeats,
//! drains the rate-limited send queue and routes voice handoff events.
//! The driver task (see [`runner`]) feeds it decoded frames and reconnects
//! the transport when it drops.

mod queue;
pub mod runner;

pub use queue::MessageQueue;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};
use std::time::Duration;

use chrono::Utc;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, error, info, trace, warn};

use corvid_core::{GatewayIntents, Snowflake};

use crate::cluster::Cluster;
use crate::compression::ZlibStream;
use crate::events::GatewayEventType;
use crate::protocol::{
    describe_close_code, GatewayMessage, IdentifyPayload, OpCode, ReadyPayload, ResumePayload,
    VoiceServerUpdatePayload, VoiceStatePayload, VoiceStateUpdatePayload,
};
use crate::voice::{VoiceHandoff, VoiceInfo};

/// Heartbeats are sent at this fraction of the interval, slightly early to
/// tolerate latency jitter.
const HEARTBEAT_EARLY_FACTOR: f64 = 0.75;

/// Connection lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShardState {
    /// No transport attached
    Disconnected,
    /// Transport handshake in progress
    Connecting,
    /// Transport up, waiting for the gateway Hello
    AwaitingHello,
    /// Identify sent, waiting for READY
    Identifying,
    /// Resume sent, waiting for RESUMED
    Resuming,
    /// READY or RESUMED observed
    Ready,
}

/// Commands the shard hands to the transport writer task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireCommand {
    /// Write a text frame
    Send(String),
    /// Close the connection with a code
    Close(u16),
}

/// Resumable session identity
#[derive(Debug, Default)]
struct Session {
    /// Empty string = no session
    id: String,
    /// 0 = no sequence seen yet
    seq: u64,
}

/// A single gateway shard connection
///
/// All public methods are safe to call from any thread. `handle_frame` and
/// `tick` are invoked only by the library's own schedulers (the driver task
/// and the cluster's one-second ticker).
pub struct Shard {
    cluster: Weak<Cluster>,
    /// Self-handle for tasks spawned on behalf of this shard
    weak_self: Weak<Shard>,
    shard_id: u32,
    shard_count: u32,
    token: String,
    intents: GatewayIntents,
    compressed: bool,

    state: RwLock<ShardState>,
    session: Mutex<Session>,
    /// Bot user id, learned from READY
    user_id: Mutex<Option<Snowflake>>,

    /// Milliseconds; 0 until Hello arrives
    heartbeat_interval: AtomicU64,
    /// Epoch seconds
    last_heartbeat_sent: AtomicI64,
    last_heartbeat_ack: AtomicI64,
    connect_time: AtomicI64,

    reconnects: AtomicU64,
    resumes: AtomicU64,
    decompressed_total: AtomicU64,

    ready: AtomicBool,
    connected: AtomicBool,

    queue: MessageQueue,
    writer: Mutex<Option<mpsc::UnboundedSender<WireCommand>>>,
    inflate: Mutex<Option<ZlibStream>>,
    voice: Mutex<HashMap<Snowflake, VoiceHandoff>>,
}

impl Shard {
    /// Create a shard bound to its owning cluster
    ///
    /// `shard_id` must be less than `shard_count`. The shard does nothing
    /// until [`run`](Self::run) starts the driver task.
    pub fn new(
        cluster: &Arc<Cluster>,
        shard_id: u32,
        shard_count: u32,
        token: impl Into<String>,
        intents: GatewayIntents,
        compressed: bool,
    ) -> Arc<Self> {
        assert!(
            shard_id < shard_count,
            "shard_id {shard_id} out of range for shard_count {shard_count}"
        );

        Arc::new_cyclic(|weak_self| Self {
            cluster: Arc::downgrade(cluster),
            weak_self: weak_self.clone(),
            shard_id,
            shard_count,
            token: token.into(),
            intents,
            compressed,
            state: RwLock::new(ShardState::Disconnected),
            session: Mutex::new(Session::default()),
            user_id: Mutex::new(None),
            heartbeat_interval: AtomicU64::new(0),
            last_heartbeat_sent: AtomicI64::new(0),
            last_heartbeat_ack: AtomicI64::new(0),
            connect_time: AtomicI64::new(0),
            reconnects: AtomicU64::new(0),
            resumes: AtomicU64::new(0),
            decompressed_total: AtomicU64::new(0),
            ready: AtomicBool::new(false),
            connected: AtomicBool::new(false),
            queue: MessageQueue::new(),
            writer: Mutex::new(None),
            inflate: Mutex::new(None),
            voice: Mutex::new(HashMap::new()),
        })
    }

    /// Start the driver task (connect/read/reconnect loop)
    ///
    /// The returned handle resolves only when the shard terminates, which
    /// happens solely on unrecoverable close codes.
    pub fn run(&self) -> tokio::task::JoinHandle<()> {
        let shard = self
            .weak_self
            .upgrade()
            .expect("shard invoked outside its Arc");
        tokio::spawn(async move { runner::run(shard).await })
    }

    // === Identity & observability ===

    /// This shard's index
    #[must_use]
    pub fn shard_id(&self) -> u32 {
        self.shard_id
    }

    /// Total shard count of the owning cluster
    #[must_use]
    pub fn shard_count(&self) -> u32 {
        self.shard_count
    }

    /// Current lifecycle state
    pub fn state(&self) -> ShardState {
        *self.state.read().expect("shard state poisoned")
    }

    /// Connected and READY/RESUMED observed
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst) && self.ready.load(Ordering::SeqCst)
    }

    /// Time since the current session identified
    pub fn uptime(&self) -> Duration {
        let connected_at = self.connect_time.load(Ordering::SeqCst);
        if connected_at == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs((epoch_now() - connected_at).max(0) as u64)
    }

    /// Session ID of the current gateway session (empty = none)
    pub fn session_id(&self) -> String {
        self.session.lock().expect("session poisoned").id.clone()
    }

    /// Last sequence number observed (0 = none yet)
    pub fn last_seq(&self) -> u64 {
        self.session.lock().expect("session poisoned").seq
    }

    /// Heartbeat interval in milliseconds (0 until Hello)
    pub fn heartbeat_interval_ms(&self) -> u64 {
        self.heartbeat_interval.load(Ordering::SeqCst)
    }

    /// Number of fresh sessions opened (IDENTIFY count)
    pub fn reconnects(&self) -> u64 {
        self.reconnects.load(Ordering::SeqCst)
    }

    /// Number of successful session resumptions attempted
    pub fn resumes(&self) -> u64 {
        self.resumes.load(Ordering::SeqCst)
    }

    /// Total bytes produced by the transport inflater
    pub fn decompressed_bytes_in(&self) -> u64 {
        self.decompressed_total.load(Ordering::SeqCst)
    }

    // === Send queue ===

    /// Queue a serialized frame for the rate-limited drainer
    pub fn queue_message(&self, message: String, to_front: bool) {
        if to_front {
            self.queue.push_front(message);
        } else {
            self.queue.push_back(message);
        }
    }

    /// Drop all queued outbound frames
    pub fn clear_queue(&self) {
        self.queue.clear();
    }

    /// Number of queued outbound frames
    pub fn queue_size(&self) -> usize {
        self.queue.len()
    }

    // === Transport seam (driver-facing) ===

    /// Install a fresh transport writer and inflate context
    ///
    /// Called by the driver after each successful WebSocket handshake. The
    /// returned receiver feeds the connection's writer task.
    pub fn attach_transport(&self) -> mpsc::UnboundedReceiver<WireCommand> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.writer.lock().expect("writer poisoned") = Some(tx);
        if self.compressed {
            // The stream dictionary is per-connection; a reused context
            // would corrupt the stream.
            *self.inflate.lock().expect("inflate poisoned") = Some(ZlibStream::new());
        }
        self.connected.store(true, Ordering::SeqCst);
        *self.state.write().expect("shard state poisoned") = ShardState::AwaitingHello;
        rx
    }

    /// Tear down the transport seam after the connection dropped
    ///
    /// Clears `ready`, drains the send queue and destroys the inflate
    /// context, leaving session identity intact for a RESUME attempt.
    pub fn detach_transport(&self) {
        *self.writer.lock().expect("writer poisoned") = None;
        *self.inflate.lock().expect("inflate poisoned") = None;
        self.connected.store(false, Ordering::SeqCst);
        self.ready.store(false, Ordering::SeqCst);
        *self.state.write().expect("shard state poisoned") = ShardState::Disconnected;
        self.queue.clear();
    }

    /// Write a frame directly to the transport, bypassing the queue
    fn write(&self, message: String) {
        trace!(shard_id = self.shard_id, "W: {}", message);
        let guard = self.writer.lock().expect("writer poisoned");
        match guard.as_ref() {
            Some(tx) => {
                if tx.send(WireCommand::Send(message)).is_err() {
                    warn!(shard_id = self.shard_id, "Transport writer gone, frame dropped");
                }
            }
            None => {
                warn!(shard_id = self.shard_id, "No transport attached, frame dropped");
            }
        }
    }

    /// Ask the writer task to close the connection
    ///
    /// Closing the transport unblocks the read loop, which falls into the
    /// reconnect path; there is no graceful shutdown opcode.
    fn close_transport(&self, code: u16) {
        let guard = self.writer.lock().expect("writer poisoned");
        if let Some(tx) = guard.as_ref() {
            let _ = tx.send(WireCommand::Close(code));
        }
    }

    // === Frame handling (protocol state machine) ===

    /// Handle one transport frame
    ///
    /// With compression enabled the frame is fed to the streaming inflater
    /// and may not yet complete a logical payload. Called only from the
    /// driver task.
    pub async fn handle_frame(&self, data: &[u8]) {
        if let Some(text) = self.decode_frame(data) {
            self.handle_payload(&text).await;
        }
    }

    /// Decode a transport frame into a complete logical payload, if any
    fn decode_frame(&self, data: &[u8]) -> Option<String> {
        if !self.compressed {
            match std::str::from_utf8(data) {
                Ok(text) => return Some(text.to_owned()),
                Err(e) => {
                    error!(shard_id = self.shard_id, error = %e, "Non-UTF-8 gateway frame dropped");
                    return None;
                }
            }
        }

        let mut guard = self.inflate.lock().expect("inflate poisoned");
        let Some(stream) = guard.as_mut() else {
            warn!(shard_id = self.shard_id, "Compressed frame with no inflate context");
            return None;
        };

        match stream.push(data) {
            Ok(Some(text)) => {
                drop(guard);
                self.decompressed_total
                    .fetch_add(text.len() as u64, Ordering::SeqCst);
                Some(text)
            }
            Ok(None) => None,
            Err(e) => {
                let code = e.code();
                drop(guard);
                error!(
                    shard_id = self.shard_id,
                    code,
                    "Error from zlib stream: {}",
                    describe_close_code(code)
                );
                self.close_transport(code);
                None
            }
        }
    }

    /// Interpret one decoded gateway payload
    pub async fn handle_payload(&self, raw: &str) {
        trace!(shard_id = self.shard_id, "R: {}", raw);

        let msg = match GatewayMessage::from_json(raw) {
            Ok(msg) => msg,
            Err(e) => {
                error!(shard_id = self.shard_id, error = %e, "Malformed gateway payload dropped");
                return;
            }
        };

        // The sequence must be recorded before dispatch so any subsequent
        // RESUME carries the latest seen value.
        if let Some(seq) = msg.s {
            self.session.lock().expect("session poisoned").seq = seq;
        }

        match msg.opcode() {
            Some(OpCode::InvalidSession) => {
                debug!(
                    shard_id = self.shard_id,
                    session_id = %self.session_id(),
                    "Failed to resume session, will reidentify"
                );
                self.clear_session();
                // Falls through to the Hello path, which now identifies.
                self.handle_hello(&msg.d).await;
            }
            Some(OpCode::Hello) => {
                self.handle_hello(&msg.d).await;
            }
            Some(OpCode::Dispatch) => {
                let event = msg.t.clone().unwrap_or_default();
                self.dispatch_event(&event, &msg, raw);
            }
            Some(OpCode::Reconnect) => {
                debug!(
                    shard_id = self.shard_id,
                    session_id = %self.session_id(),
                    "Reconnection requested, closing socket"
                );
                self.queue.clear();
                self.close_transport(1000);
            }
            Some(OpCode::HeartbeatAck) => {
                self.last_heartbeat_ack.store(epoch_now(), Ordering::SeqCst);
            }
            _ => {
                // Unknown or send-only op codes are ignored.
            }
        }
    }

    /// Hello path: record the interval, then RESUME or (throttled) IDENTIFY
    async fn handle_hello(&self, d: &Value) {
        if let Some(interval) = d.get("heartbeat_interval").and_then(Value::as_u64) {
            self.heartbeat_interval.store(interval, Ordering::SeqCst);
        }

        let (session_id, seq) = {
            let session = self.session.lock().expect("session poisoned");
            (session.id.clone(), session.seq)
        };

        if seq > 0 && !session_id.is_empty() {
            *self.state.write().expect("shard state poisoned") = ShardState::Resuming;
            debug!(
                shard_id = self.shard_id,
                session_id = %session_id,
                seq,
                "Resuming session"
            );
            self.write(GatewayMessage::resume(&ResumePayload {
                token: self.token.clone(),
                session_id,
                seq,
            }));
            self.resumes.fetch_add(1, Ordering::SeqCst);
        } else {
            *self.state.write().expect("shard state poisoned") = ShardState::Identifying;

            // One IDENTIFY per 5 seconds across all sibling shards.
            let now = match self.cluster.upgrade() {
                Some(cluster) => cluster.claim_identify_slot().await,
                None => epoch_now(),
            };

            debug!(shard_id = self.shard_id, "Connecting new session");
            self.write(GatewayMessage::identify(&IdentifyPayload::new(
                self.token.clone(),
                self.shard_id,
                self.shard_count,
                self.intents,
            )));
            self.connect_time.store(now, Ordering::SeqCst);
            self.reconnects.fetch_add(1, Ordering::SeqCst);
        }

        self.last_heartbeat_ack.store(epoch_now(), Ordering::SeqCst);
    }

    /// Route an op-0 dispatch: internal handling, then the external bus
    fn dispatch_event(&self, event: &str, msg: &GatewayMessage, raw: &str) {
        match GatewayEventType::parse(event) {
            Some(GatewayEventType::Ready) => {
                match serde_json::from_value::<ReadyPayload>(msg.d.clone()) {
                    Ok(ready) => {
                        self.session.lock().expect("session poisoned").id = ready.session_id;
                        *self.user_id.lock().expect("user id poisoned") = Some(ready.user.id);
                        self.ready.store(true, Ordering::SeqCst);
                        *self.state.write().expect("shard state poisoned") = ShardState::Ready;
                        info!(
                            shard_id = self.shard_id,
                            session_id = %self.session_id(),
                            "Shard ready"
                        );
                    }
                    Err(e) => {
                        error!(shard_id = self.shard_id, error = %e, "Malformed READY payload");
                    }
                }
            }
            Some(GatewayEventType::Resumed) => {
                self.ready.store(true, Ordering::SeqCst);
                *self.state.write().expect("shard state poisoned") = ShardState::Ready;
                info!(
                    shard_id = self.shard_id,
                    session_id = %self.session_id(),
                    "Session resumed"
                );
            }
            Some(GatewayEventType::VoiceServerUpdate) => {
                if let Ok(update) = serde_json::from_value::<VoiceServerUpdatePayload>(msg.d.clone())
                {
                    self.on_voice_server_update(update);
                }
            }
            Some(GatewayEventType::VoiceStateUpdate) => {
                if let Ok(state) = serde_json::from_value::<VoiceStatePayload>(msg.d.clone()) {
                    self.on_voice_state_update(state);
                }
            }
            _ => {}
        }

        if let Some(cluster) = self.cluster.upgrade() {
            cluster.dispatch(self.shard_id, event, &msg.d, raw);
        }
    }

    /// Clear session identity; the next Hello will IDENTIFY
    fn clear_session(&self) {
        let mut session = self.session.lock().expect("session poisoned");
        session.id.clear();
        session.seq = 0;
    }

    // === Heartbeat & liveness tick ===

    /// One-second tick: liveness check, queue drain, heartbeat emission
    ///
    /// Invoked by the cluster's global ticker; a no-op until the shard is
    /// connected and ready.
    pub fn tick(&self) {
        if !self.is_connected() {
            return;
        }

        let now = epoch_now();
        let interval_ms = self.heartbeat_interval.load(Ordering::SeqCst);

        // Missing two ACKs means the connection is dead even if TCP looks
        // healthy; force a reconnect.
        if interval_ms > 0 {
            let since_ack_ms =
                (now - self.last_heartbeat_ack.load(Ordering::SeqCst)).max(0) as u64 * 1000;
            if since_ack_ms > interval_ms * 2 {
                warn!(
                    shard_id = self.shard_id,
                    session_id = %self.session_id(),
                    "Missed heartbeat ACK, forcing reconnection"
                );
                self.queue.clear();
                self.close_transport(1000);
                return;
            }
        }

        // Rate limit outbound messages: 1 every odd second, 2 every even.
        let limit = (now.rem_euclid(2) + 1) as usize;
        for _ in 0..limit {
            match self.queue.pop_front() {
                Some(message) => self.write(message),
                None => break,
            }
        }

        // Queue a heartbeat slightly before the interval elapses.
        let seq = self.session.lock().expect("session poisoned").seq;
        if interval_ms > 0 && seq > 0 {
            let due = self.last_heartbeat_sent.load(Ordering::SeqCst) as f64
                + (interval_ms as f64 / 1000.0) * HEARTBEAT_EARLY_FACTOR;
            if (now as f64) > due {
                self.queue.push_front(GatewayMessage::heartbeat(seq));
                self.last_heartbeat_sent.store(now, Ordering::SeqCst);
            }
        }
    }

    // === Voice ===

    /// Begin the two-phase voice handshake for a guild
    ///
    /// Idempotent: if a handoff already exists for the guild this is a
    /// no-op. The op-4 join request is queued with front priority.
    pub fn connect_voice(&self, guild_id: Snowflake, channel_id: Snowflake) {
        let mut voice = self.voice.lock().expect("voice map poisoned");
        if voice.contains_key(&guild_id) {
            return;
        }
        voice.insert(guild_id, VoiceHandoff::new(channel_id));

        // Two events now arrive on the websocket, in either order:
        // VOICE_SERVER_UPDATE and VOICE_STATE_UPDATE.
        self.queue.push_front(GatewayMessage::voice_state_update(
            &VoiceStateUpdatePayload::join(guild_id, channel_id),
        ));
    }

    /// Leave a guild's voice channel and tear down its client
    pub fn disconnect_voice(&self, guild_id: Snowflake) {
        let mut voice = self.voice.lock().expect("voice map poisoned");
        if let Some(mut handoff) = voice.remove(&guild_id) {
            handoff.disconnect();
            self.queue.push_front(GatewayMessage::voice_state_update(
                &VoiceStateUpdatePayload::leave(guild_id),
            ));
        }
    }

    /// Snapshot the voice handoff for a guild, if one exists
    pub fn get_voice(&self, guild_id: Snowflake) -> Option<VoiceInfo> {
        let voice = self.voice.lock().expect("voice map poisoned");
        voice.get(&guild_id).map(|handoff| VoiceInfo {
            guild_id,
            channel_id: handoff.channel_id,
            ready: handoff.is_ready(),
            active: handoff.is_active(),
        })
    }

    fn on_voice_server_update(&self, update: VoiceServerUpdatePayload) {
        {
            let mut voice = self.voice.lock().expect("voice map poisoned");
            let Some(handoff) = voice.get_mut(&update.guild_id) else {
                return;
            };
            handoff.token = update.token;
            if let Some(endpoint) = update.endpoint {
                handoff.websocket_hostname = endpoint;
            }
        }
        self.try_spawn_voice(update.guild_id);
    }

    fn on_voice_state_update(&self, state: VoiceStatePayload) {
        // Only our own voice state carries the session id for the handoff.
        if *self.user_id.lock().expect("user id poisoned") != Some(state.user_id) {
            return;
        }
        let Some(guild_id) = state.guild_id else {
            return;
        };
        {
            let mut voice = self.voice.lock().expect("voice map poisoned");
            let Some(handoff) = voice.get_mut(&guild_id) else {
                return;
            };
            handoff.session_id = state.session_id;
        }
        self.try_spawn_voice(guild_id);
    }

    /// Spawn the external voice client once all credentials are present
    ///
    /// The client constructor performs a blocking TLS handshake, so it runs
    /// on a blocking worker and must never stall the shard driver.
    fn try_spawn_voice(&self, guild_id: Snowflake) {
        let credentials = {
            let mut voice = self.voice.lock().expect("voice map poisoned");
            match voice.get_mut(&guild_id) {
                Some(handoff) => {
                    if handoff.try_begin_connect() {
                        handoff.credentials(guild_id)
                    } else {
                        return;
                    }
                }
                None => return,
            }
        };

        let factory = self
            .cluster
            .upgrade()
            .and_then(|cluster| cluster.voice_factory());
        let Some(factory) = factory else {
            debug!(
                shard_id = self.shard_id,
                guild_id = %guild_id,
                "Voice credentials complete but no voice client factory registered"
            );
            let mut voice = self.voice.lock().expect("voice map poisoned");
            if let Some(handoff) = voice.get_mut(&guild_id) {
                handoff.finish_connect(None);
            }
            return;
        };

        let Some(shard) = self.weak_self.upgrade() else {
            return;
        };
        let channel_id = credentials.channel_id;
        tokio::spawn(async move {
            let result = tokio::task::spawn_blocking(move || factory.connect(credentials)).await;
            let client = match result {
                Ok(Ok(client)) => Some(client),
                Ok(Err(e)) => {
                    error!(
                        shard_id = shard.shard_id,
                        guild_id = %guild_id,
                        channel_id = %channel_id,
                        error = %e,
                        "Can't connect to voice websocket"
                    );
                    None
                }
                Err(e) => {
                    error!(
                        shard_id = shard.shard_id,
                        guild_id = %guild_id,
                        error = %e,
                        "Voice connect worker panicked"
                    );
                    None
                }
            };

            let mut voice = shard.voice.lock().expect("voice map poisoned");
            match voice.get_mut(&guild_id) {
                Some(handoff) => handoff.finish_connect(client),
                None => {
                    // Disconnected while the handshake was in flight.
                    if let Some(client) = client {
                        client.stop();
                    }
                }
            }
        });
    }

    // === Cache counts ===

    /// Number of cached guilds owned by this shard
    ///
    /// O(guilds); holds the cache lock for the full traversal.
    pub fn guild_count(&self) -> u64 {
        let Some(cluster) = self.cluster.upgrade() else {
            return 0;
        };
        let guilds = cluster.cache().lock();
        guilds
            .values()
            .filter(|guild| guild.shard_id == self.shard_id)
            .count() as u64
    }

    /// Number of cached members across this shard's guilds
    pub fn member_count(&self) -> u64 {
        let Some(cluster) = self.cluster.upgrade() else {
            return 0;
        };
        let guilds = cluster.cache().lock();
        guilds
            .values()
            .filter(|guild| guild.shard_id == self.shard_id)
            .map(|guild| guild.member_count() as u64)
            .sum()
    }

    /// Number of cached channels across this shard's guilds
    pub fn channel_count(&self) -> u64 {
        let Some(cluster) = self.cluster.upgrade() else {
            return 0;
        };
        let guilds = cluster.cache().lock();
        guilds
            .values()
            .filter(|guild| guild.shard_id == self.shard_id)
            .map(|guild| guild.channel_count() as u64)
            .sum()
    }

    // === Driver-facing session policy ===

    /// Apply close-code policy after the transport dropped
    pub(crate) fn on_close_code(&self, code: u16) {
        error!(
            shard_id = self.shard_id,
            code,
            "Error from underlying websocket: {}",
            describe_close_code(code)
        );
        if let Some(close) = crate::protocol::GatewayCloseCode::from_u16(code) {
            if close.clears_session() {
                self.clear_session();
            }
        }
    }

    pub(crate) fn mark_connecting(&self) {
        *self.state.write().expect("shard state poisoned") = ShardState::Connecting;
    }

    pub(crate) fn is_compressed(&self) -> bool {
        self.compressed
    }

    /// Gateway host from the owning cluster; `None` once the cluster is gone
    pub(crate) fn gateway_host(&self) -> Option<String> {
        self.cluster
            .upgrade()
            .map(|cluster| cluster.gateway_host().to_string())
    }
}

impl std::fmt::Debug for Shard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shard")
            .field("shard_id", &self.shard_id)
            .field("shard_count", &self.shard_count)
            .field("state", &self.state())
            .field("last_seq", &self.last_seq())
            .field("reconnects", &self.reconnects())
            .field("resumes", &self.resumes())
            .finish()
    }
}

fn epoch_now() -> i64 {
    Utc::now().timestamp()
}
