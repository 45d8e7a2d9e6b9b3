//! Gateway event types
//!
//! Event names carried in the `t` field of dispatch messages. Only the
//! events the shard itself reacts to are enumerated; everything else is
//! forwarded to the user handler by name.

use std::fmt;

/// Dispatch events the shard client handles internally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayEventType {
    /// Session established after Identify
    Ready,
    /// Session replay finished after Resume
    Resumed,

    /// Guild available, joined, or created
    GuildCreate,
    /// Left guild, kicked, or guild outage
    GuildDelete,

    /// Channel created
    ChannelCreate,
    /// Channel deleted
    ChannelDelete,

    /// User joined guild
    GuildMemberAdd,
    /// User left guild
    GuildMemberRemove,

    /// Voice server credentials for a pending voice connection
    VoiceServerUpdate,
    /// Voice session state changed (carries our voice session id)
    VoiceStateUpdate,
}

impl GatewayEventType {
    /// Get the wire name of the event type
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "READY",
            Self::Resumed => "RESUMED",
            Self::GuildCreate => "GUILD_CREATE",
            Self::GuildDelete => "GUILD_DELETE",
            Self::ChannelCreate => "CHANNEL_CREATE",
            Self::ChannelDelete => "CHANNEL_DELETE",
            Self::GuildMemberAdd => "GUILD_MEMBER_ADD",
            Self::GuildMemberRemove => "GUILD_MEMBER_REMOVE",
            Self::VoiceServerUpdate => "VOICE_SERVER_UPDATE",
            Self::VoiceStateUpdate => "VOICE_STATE_UPDATE",
        }
    }

    /// Parse a wire event name
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "READY" => Some(Self::Ready),
            "RESUMED" => Some(Self::Resumed),
            "GUILD_CREATE" => Some(Self::GuildCreate),
            "GUILD_DELETE" => Some(Self::GuildDelete),
            "CHANNEL_CREATE" => Some(Self::ChannelCreate),
            "CHANNEL_DELETE" => Some(Self::ChannelDelete),
            "GUILD_MEMBER_ADD" => Some(Self::GuildMemberAdd),
            "GUILD_MEMBER_REMOVE" => Some(Self::GuildMemberRemove),
            "VOICE_SERVER_UPDATE" => Some(Self::VoiceServerUpdate),
            "VOICE_STATE_UPDATE" => Some(Self::VoiceStateUpdate),
            _ => None,
        }
    }
}

impl fmt::Display for GatewayEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        for event in [
            GatewayEventType::Ready,
            GatewayEventType::Resumed,
            GatewayEventType::GuildCreate,
            GatewayEventType::GuildDelete,
            GatewayEventType::ChannelCreate,
            GatewayEventType::ChannelDelete,
            GatewayEventType::GuildMemberAdd,
            GatewayEventType::GuildMemberRemove,
            GatewayEventType::VoiceServerUpdate,
            GatewayEventType::VoiceStateUpdate,
        ] {
            assert_eq!(GatewayEventType::parse(event.as_str()), Some(event));
        }
    }

    #[test]
    fn test_unknown_event() {
        // Events the shard does not react to are simply not enumerated
        assert_eq!(GatewayEventType::parse("MESSAGE_CREATE"), None);
        assert_eq!(GatewayEventType::parse(""), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(GatewayEventType::Ready.to_string(), "READY");
        assert_eq!(
            GatewayEventType::VoiceServerUpdate.to_string(),
            "VOICE_SERVER_UPDATE"
        );
    }
}
