//! Voice handoff
//!
//! Joining a voice channel is a two-phase handshake on top of the gateway:
//! the shard sends op-4 (Voice State Update), then receives
//! VOICE_SERVER_UPDATE (hostname + token) and VOICE_STATE_UPDATE (session
//! id) in either order. Once all three credentials are present the external
//! voice client is spawned with them.

use corvid_core::Snowflake;
use thiserror::Error;

/// Errors from voice client construction
#[derive(Debug, Error)]
pub enum VoiceError {
    /// The voice client could not connect to the voice server
    #[error("voice connection failed: {0}")]
    Connect(String),
}

/// The credentials assembled by the two-event handshake
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceCredentials {
    pub guild_id: Snowflake,
    pub channel_id: Snowflake,
    /// Voice server hostname from VOICE_SERVER_UPDATE
    pub websocket_hostname: String,
    /// Our voice session id from VOICE_STATE_UPDATE
    pub session_id: String,
    /// Voice token from VOICE_SERVER_UPDATE (distinct from the bot token)
    pub token: String,
}

/// A running voice RTP session (external collaborator)
pub trait VoiceClient: Send + Sync {
    /// Tear down the session
    fn stop(&self);
}

/// Constructs voice clients
///
/// `connect` performs a blocking TLS handshake; the shard always invokes it
/// on a blocking worker, never on the driver task.
pub trait VoiceClientFactory: Send + Sync {
    fn connect(&self, credentials: VoiceCredentials) -> Result<Box<dyn VoiceClient>, VoiceError>;
}

/// Pending or established voice connection for one guild
///
/// Created by `connect_voice`, filled in by the VOICE_SERVER_UPDATE /
/// VOICE_STATE_UPDATE handlers, removed by `disconnect_voice` or shard
/// teardown. At most one exists per guild.
pub struct VoiceHandoff {
    /// Target voice channel
    pub channel_id: Snowflake,
    /// Empty until VOICE_SERVER_UPDATE arrives
    pub websocket_hostname: String,
    /// Empty until VOICE_STATE_UPDATE arrives
    pub session_id: String,
    /// Empty until VOICE_SERVER_UPDATE arrives
    pub token: String,
    /// The spawned voice client, once both halves arrived
    client: Option<Box<dyn VoiceClient>>,
    /// Set while a spawn is in flight on the blocking worker
    connecting: bool,
}

impl VoiceHandoff {
    /// Create a pending handoff for a channel
    #[must_use]
    pub fn new(channel_id: Snowflake) -> Self {
        Self {
            channel_id,
            websocket_hostname: String::new(),
            session_id: String::new(),
            token: String::new(),
            client: None,
            connecting: false,
        }
    }

    /// All credentials have arrived
    #[must_use]
    pub fn is_ready(&self) -> bool {
        !self.websocket_hostname.is_empty() && !self.session_id.is_empty() && !self.token.is_empty()
    }

    /// A voice client has been spawned
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.client.is_some()
    }

    /// Snapshot the credentials for spawning
    ///
    /// Only meaningful when [`is_ready`](Self::is_ready) holds.
    #[must_use]
    pub fn credentials(&self, guild_id: Snowflake) -> VoiceCredentials {
        VoiceCredentials {
            guild_id,
            channel_id: self.channel_id,
            websocket_hostname: self.websocket_hostname.clone(),
            session_id: self.session_id.clone(),
            token: self.token.clone(),
        }
    }

    /// Whether a spawn should start: credentials complete, nothing running,
    /// no spawn already in flight. Marks the spawn as in flight.
    pub(crate) fn try_begin_connect(&mut self) -> bool {
        if self.is_ready() && !self.is_active() && !self.connecting {
            self.connecting = true;
            true
        } else {
            false
        }
    }

    /// Install the spawned client (or record the failed attempt)
    pub(crate) fn finish_connect(&mut self, client: Option<Box<dyn VoiceClient>>) {
        self.connecting = false;
        self.client = client;
    }

    /// Stop and drop the voice client, if any
    pub(crate) fn disconnect(&mut self) {
        if let Some(client) = self.client.take() {
            client.stop();
        }
    }
}

impl Drop for VoiceHandoff {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl std::fmt::Debug for VoiceHandoff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceHandoff")
            .field("channel_id", &self.channel_id)
            .field("ready", &self.is_ready())
            .field("active", &self.is_active())
            .finish()
    }
}

/// Read-only snapshot of a voice handoff, returned by `Shard::get_voice`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceInfo {
    pub guild_id: Snowflake,
    pub channel_id: Snowflake,
    /// Credentials complete (client spawn has been requested or done)
    pub ready: bool,
    /// Voice client running
    pub active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    struct StubClient {
        stopped: Arc<AtomicBool>,
    }

    impl VoiceClient for StubClient {
        fn stop(&self) {
            self.stopped.store(true, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_readiness_requires_all_credentials() {
        let mut handoff = VoiceHandoff::new(Snowflake::new(2));
        assert!(!handoff.is_ready());

        handoff.websocket_hostname = "voice.example".to_string();
        handoff.token = "vt".to_string();
        assert!(!handoff.is_ready(), "session_id still missing");

        handoff.session_id = "vs".to_string();
        assert!(handoff.is_ready());
        assert!(!handoff.is_active());
    }

    #[test]
    fn test_begin_connect_gating() {
        let mut handoff = VoiceHandoff::new(Snowflake::new(2));
        assert!(!handoff.try_begin_connect(), "not ready yet");

        handoff.websocket_hostname = "voice.example".to_string();
        handoff.session_id = "vs".to_string();
        handoff.token = "vt".to_string();

        assert!(handoff.try_begin_connect());
        assert!(!handoff.try_begin_connect(), "spawn already in flight");

        handoff.finish_connect(Some(Box::new(StubClient {
            stopped: Arc::new(AtomicBool::new(false)),
        })));
        assert!(handoff.is_active());
        assert!(!handoff.try_begin_connect(), "already active");
    }

    #[test]
    fn test_failed_connect_allows_retry() {
        let mut handoff = VoiceHandoff::new(Snowflake::new(2));
        handoff.websocket_hostname = "voice.example".to_string();
        handoff.session_id = "vs".to_string();
        handoff.token = "vt".to_string();

        assert!(handoff.try_begin_connect());
        handoff.finish_connect(None);
        assert!(!handoff.is_active());
        assert!(handoff.try_begin_connect(), "failed spawn can retry");
    }

    #[test]
    fn test_disconnect_stops_client() {
        let stopped = Arc::new(AtomicBool::new(false));
        let mut handoff = VoiceHandoff::new(Snowflake::new(2));
        handoff.finish_connect(Some(Box::new(StubClient {
            stopped: stopped.clone(),
        })));

        handoff.disconnect();
        assert!(stopped.load(Ordering::SeqCst));
        assert!(!handoff.is_active());
    }

    #[test]
    fn test_drop_stops_client() {
        let stopped = Arc::new(AtomicBool::new(false));
        {
            let mut handoff = VoiceHandoff::new(Snowflake::new(2));
            handoff.finish_connect(Some(Box::new(StubClient {
                stopped: stopped.clone(),
            })));
        }
        assert!(stopped.load(Ordering::SeqCst));
    }

    #[test]
    fn test_credentials_snapshot() {
        let mut handoff = VoiceHandoff::new(Snowflake::new(2));
        handoff.websocket_hostname = "voice.example".to_string();
        handoff.session_id = "vs".to_string();
        handoff.token = "vt".to_string();

        let creds = handoff.credentials(Snowflake::new(1));
        assert_eq!(creds.guild_id, Snowflake::new(1));
        assert_eq!(creds.channel_id, Snowflake::new(2));
        assert_eq!(creds.websocket_hostname, "voice.example");
        assert_eq!(creds.session_id, "vs");
        assert_eq!(creds.token, "vt");
    }
}
