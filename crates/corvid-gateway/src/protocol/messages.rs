//! Gateway message format
//!
//! Defines the envelope for all WebSocket messages and the constructors for
//! the frames the shard sends.

use super::{IdentifyPayload, OpCode, ResumePayload, VoiceStateUpdatePayload};
use serde::Deserialize;
use serde_json::{json, Value};

/// Inbound gateway message envelope
///
/// All messages received over the WebSocket connection follow this format.
/// The `op` field is kept as a raw integer so that unknown op codes can be
/// ignored rather than rejected at parse time.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayMessage {
    /// Operation code (raw)
    pub op: u8,

    /// Sequence number (only on op=0 Dispatch)
    #[serde(default)]
    pub s: Option<u64>,

    /// Event type (only on op=0 Dispatch)
    #[serde(default)]
    pub t: Option<String>,

    /// Event data payload
    #[serde(default)]
    pub d: Value,
}

impl GatewayMessage {
    /// Deserialize from JSON text
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The typed op code, if this library knows it
    #[must_use]
    pub fn opcode(&self) -> Option<OpCode> {
        OpCode::from_u8(self.op)
    }

    // === Outbound frame constructors ===

    /// Build a Heartbeat frame (op=1) carrying the last seen sequence
    #[must_use]
    pub fn heartbeat(last_seq: u64) -> String {
        json!({ "op": OpCode::Heartbeat, "d": last_seq }).to_string()
    }

    /// Build an Identify frame (op=2)
    #[must_use]
    pub fn identify(payload: &IdentifyPayload) -> String {
        json!({ "op": OpCode::Identify, "d": payload }).to_string()
    }

    /// Build a Resume frame (op=6)
    #[must_use]
    pub fn resume(payload: &ResumePayload) -> String {
        json!({ "op": OpCode::Resume, "d": payload }).to_string()
    }

    /// Build a Voice State Update frame (op=4)
    #[must_use]
    pub fn voice_state_update(payload: &VoiceStateUpdatePayload) -> String {
        json!({ "op": OpCode::VoiceStateUpdate, "d": payload }).to_string()
    }
}

impl std::fmt::Display for GatewayMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(t) = &self.t {
            write!(f, "GatewayMessage(op={}, t={t}", self.op)?;
            if let Some(s) = self.s {
                write!(f, ", s={s}")?;
            }
            write!(f, ")")
        } else {
            write!(f, "GatewayMessage(op={})", self.op)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corvid_core::{GatewayIntents, Snowflake};

    #[test]
    fn test_parse_dispatch() {
        let msg = GatewayMessage::from_json(
            r#"{"op":0,"s":42,"t":"MESSAGE_CREATE","d":{"id":"1","content":"hi"}}"#,
        )
        .unwrap();

        assert_eq!(msg.opcode(), Some(OpCode::Dispatch));
        assert_eq!(msg.s, Some(42));
        assert_eq!(msg.t.as_deref(), Some("MESSAGE_CREATE"));
        assert_eq!(msg.d["content"], "hi");
    }

    #[test]
    fn test_parse_missing_fields() {
        let msg = GatewayMessage::from_json(r#"{"op":11}"#).unwrap();
        assert_eq!(msg.opcode(), Some(OpCode::HeartbeatAck));
        assert!(msg.s.is_none());
        assert!(msg.t.is_none());
        assert!(msg.d.is_null());
    }

    #[test]
    fn test_parse_unknown_opcode() {
        let msg = GatewayMessage::from_json(r#"{"op":42,"s":7}"#).unwrap();
        assert!(msg.opcode().is_none());
        // The sequence is still observable for unknown ops
        assert_eq!(msg.s, Some(7));
    }

    #[test]
    fn test_parse_null_sequence() {
        let msg = GatewayMessage::from_json(r#"{"op":0,"s":null,"t":"READY","d":{}}"#).unwrap();
        assert!(msg.s.is_none());
    }

    #[test]
    fn test_heartbeat_frame() {
        assert_eq!(GatewayMessage::heartbeat(7), r#"{"d":7,"op":1}"#);
    }

    #[test]
    fn test_identify_frame() {
        let frame = GatewayMessage::identify(&IdentifyPayload::new(
            "T",
            0,
            1,
            GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES,
        ));
        let value: Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["op"], 2);
        assert_eq!(value["d"]["token"], "T");
        assert_eq!(value["d"]["intents"], 513);
    }

    #[test]
    fn test_resume_frame() {
        let frame = GatewayMessage::resume(&ResumePayload {
            token: "T".to_string(),
            session_id: "abc".to_string(),
            seq: 42,
        });
        let value: Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["op"], 6);
        assert_eq!(value["d"]["session_id"], "abc");
        assert_eq!(value["d"]["seq"], 42);
    }

    #[test]
    fn test_voice_state_frame() {
        let frame = GatewayMessage::voice_state_update(&VoiceStateUpdatePayload::join(
            Snowflake::new(1),
            Snowflake::new(2),
        ));
        let value: Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["op"], 4);
        assert_eq!(value["d"]["guild_id"], "1");
    }

    #[test]
    fn test_message_display() {
        let msg = GatewayMessage::from_json(r#"{"op":0,"s":5,"t":"READY","d":{}}"#).unwrap();
        let display = format!("{msg}");
        assert!(display.contains("READY"));
        assert!(display.contains("s=5"));
    }
}
