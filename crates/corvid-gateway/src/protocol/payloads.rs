//! Payload definitions
//!
//! Defines the payload structures carried in the `d` field of gateway
//! messages, in both directions.

use corvid_core::{GatewayIntents, Snowflake};
use serde::{Deserialize, Serialize};

/// Payload for op 10 (Hello)
///
/// Sent by the gateway immediately after the WebSocket handshake.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloPayload {
    /// Heartbeat interval in milliseconds
    pub heartbeat_interval: u64,
}

/// Connection properties sent inside Identify
///
/// The gateway v8 wire format uses `$`-prefixed keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyProperties {
    /// Operating system
    #[serde(rename = "$os")]
    pub os: String,

    /// Library name
    #[serde(rename = "$browser")]
    pub browser: String,

    /// Device name
    #[serde(rename = "$device")]
    pub device: String,
}

impl Default for IdentifyProperties {
    fn default() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            browser: "corvid".to_string(),
            device: "corvid".to_string(),
        }
    }
}

/// Payload for op 2 (Identify)
///
/// Opens a fresh gateway session. The `compress` field refers to
/// per-payload compression and is orthogonal to the transport-level
/// zlib-stream; this library always sends `false`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyPayload {
    /// Bot token
    pub token: String,

    /// Client properties
    pub properties: IdentifyProperties,

    /// `[shard_id, shard_count]`
    pub shard: [u32; 2],

    /// Per-payload compression (always false)
    pub compress: bool,

    /// Member count threshold for offline member list omission
    pub large_threshold: u32,

    /// Intent bitset, included iff non-zero
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intents: Option<GatewayIntents>,
}

impl IdentifyPayload {
    /// Default large_threshold per the gateway protocol
    pub const LARGE_THRESHOLD: u32 = 250;

    /// Build an Identify payload for a shard
    #[must_use]
    pub fn new(
        token: impl Into<String>,
        shard_id: u32,
        shard_count: u32,
        intents: GatewayIntents,
    ) -> Self {
        Self {
            token: token.into(),
            properties: IdentifyProperties::default(),
            shard: [shard_id, shard_count],
            compress: false,
            large_threshold: Self::LARGE_THRESHOLD,
            intents: if intents.is_empty() {
                None
            } else {
                Some(intents)
            },
        }
    }
}

/// Payload for op 6 (Resume)
///
/// Replays missed events against an existing session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumePayload {
    /// Bot token
    pub token: String,

    /// Session ID to resume
    pub session_id: String,

    /// Last received sequence number
    pub seq: u64,
}

/// Payload for op 4 (Voice State Update)
///
/// Joins a voice channel (`channel_id` set) or leaves one
/// (`channel_id` null).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceStateUpdatePayload {
    pub guild_id: Snowflake,
    pub channel_id: Option<Snowflake>,
    pub self_mute: bool,
    pub self_deaf: bool,
}

impl VoiceStateUpdatePayload {
    /// Build a join request for a voice channel
    #[must_use]
    pub fn join(guild_id: Snowflake, channel_id: Snowflake) -> Self {
        Self {
            guild_id,
            channel_id: Some(channel_id),
            self_mute: false,
            self_deaf: false,
        }
    }

    /// Build a leave request for a guild's voice channel
    #[must_use]
    pub fn leave(guild_id: Snowflake) -> Self {
        Self {
            guild_id,
            channel_id: None,
            self_mute: false,
            self_deaf: false,
        }
    }
}

/// The subset of the READY dispatch payload the shard consumes
#[derive(Debug, Clone, Deserialize)]
pub struct ReadyPayload {
    /// Session ID for subsequent RESUME attempts
    pub session_id: String,
    /// The bot user
    pub user: ReadyUser,
}

/// Bot user identity from READY
#[derive(Debug, Clone, Deserialize)]
pub struct ReadyUser {
    pub id: Snowflake,
}

/// VOICE_SERVER_UPDATE dispatch payload
#[derive(Debug, Clone, Deserialize)]
pub struct VoiceServerUpdatePayload {
    /// Voice connection token (distinct from the bot token)
    pub token: String,
    pub guild_id: Snowflake,
    /// Voice server hostname; null while the server is reallocating
    pub endpoint: Option<String>,
}

/// The subset of a VOICE_STATE_UPDATE dispatch the shard consumes
#[derive(Debug, Clone, Deserialize)]
pub struct VoiceStatePayload {
    pub guild_id: Option<Snowflake>,
    pub user_id: Snowflake,
    pub session_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hello_payload_parse() {
        let hello: HelloPayload =
            serde_json::from_str(r#"{"heartbeat_interval":41250}"#).unwrap();
        assert_eq!(hello.heartbeat_interval, 41250);
    }

    #[test]
    fn test_identify_serialization() {
        let payload = IdentifyPayload::new(
            "T",
            0,
            1,
            GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES,
        );
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["token"], "T");
        assert_eq!(json["shard"][0], 0);
        assert_eq!(json["shard"][1], 1);
        assert_eq!(json["compress"], false);
        assert_eq!(json["large_threshold"], 250);
        assert_eq!(json["intents"], 513);
        assert!(json["properties"]["$os"].is_string());
        assert_eq!(json["properties"]["$browser"], "corvid");
    }

    #[test]
    fn test_identify_omits_zero_intents() {
        let payload = IdentifyPayload::new("T", 0, 1, GatewayIntents::empty());
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("intents").is_none());
    }

    #[test]
    fn test_resume_serialization() {
        let payload = ResumePayload {
            token: "T".to_string(),
            session_id: "abc".to_string(),
            seq: 42,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["session_id"], "abc");
        assert_eq!(json["seq"], 42);
    }

    #[test]
    fn test_voice_state_update() {
        let join = VoiceStateUpdatePayload::join(Snowflake::new(1), Snowflake::new(2));
        let json = serde_json::to_value(&join).unwrap();
        assert_eq!(json["guild_id"], "1");
        assert_eq!(json["channel_id"], "2");
        assert_eq!(json["self_mute"], false);
        assert_eq!(json["self_deaf"], false);

        let leave = VoiceStateUpdatePayload::leave(Snowflake::new(1));
        let json = serde_json::to_value(&leave).unwrap();
        assert!(json["channel_id"].is_null());
    }

    #[test]
    fn test_ready_parse() {
        let ready: ReadyPayload = serde_json::from_str(
            r#"{"v":8,"session_id":"abc","user":{"id":"42","username":"bot"}}"#,
        )
        .unwrap();
        assert_eq!(ready.session_id, "abc");
        assert_eq!(ready.user.id, Snowflake::new(42));
    }

    #[test]
    fn test_voice_server_update_parse() {
        let update: VoiceServerUpdatePayload = serde_json::from_str(
            r#"{"token":"vt","guild_id":"1","endpoint":"eu-west1.discord.media:443"}"#,
        )
        .unwrap();
        assert_eq!(update.token, "vt");
        assert_eq!(update.endpoint.as_deref(), Some("eu-west1.discord.media:443"));

        let reallocating: VoiceServerUpdatePayload =
            serde_json::from_str(r#"{"token":"vt","guild_id":"1","endpoint":null}"#).unwrap();
        assert!(reallocating.endpoint.is_none());
    }
}
