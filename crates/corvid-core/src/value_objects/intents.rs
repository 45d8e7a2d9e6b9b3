//! Gateway intent bitflags
//!
//! The intent bitset declares which event categories a shard subscribes to.
//! Sent in the Identify payload; the gateway rejects unknown or disallowed
//! bits with close codes 4013/4014.

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

bitflags! {
    /// Gateway intents (v8 bit assignments)
    ///
    /// Serialized as a bare integer in JSON, the way the gateway expects it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct GatewayIntents: u32 {
        /// Guild create/update/delete, role and channel events
        const GUILDS                   = 1 << 0;
        /// Member add/update/remove (privileged)
        const GUILD_MEMBERS            = 1 << 1;
        /// Ban add/remove
        const GUILD_BANS               = 1 << 2;
        /// Emoji updates
        const GUILD_EMOJIS             = 1 << 3;
        /// Integration updates
        const GUILD_INTEGRATIONS       = 1 << 4;
        /// Webhook updates
        const GUILD_WEBHOOKS           = 1 << 5;
        /// Invite create/delete
        const GUILD_INVITES            = 1 << 6;
        /// Voice state updates
        const GUILD_VOICE_STATES       = 1 << 7;
        /// Presence updates (privileged)
        const GUILD_PRESENCES          = 1 << 8;
        /// Message create/update/delete in guilds
        const GUILD_MESSAGES           = 1 << 9;
        /// Reaction events in guilds
        const GUILD_MESSAGE_REACTIONS  = 1 << 10;
        /// Typing start in guilds
        const GUILD_MESSAGE_TYPING     = 1 << 11;
        /// Message events in DMs
        const DIRECT_MESSAGES          = 1 << 12;
        /// Reaction events in DMs
        const DIRECT_MESSAGE_REACTIONS = 1 << 13;
        /// Typing start in DMs
        const DIRECT_MESSAGE_TYPING    = 1 << 14;
    }
}

impl GatewayIntents {
    /// Every intent that does not require privileged approval
    #[must_use]
    pub fn unprivileged() -> Self {
        Self::all() - Self::GUILD_MEMBERS - Self::GUILD_PRESENCES
    }

    /// The privileged intents (require approval on the developer portal)
    #[must_use]
    pub fn privileged() -> Self {
        Self::GUILD_MEMBERS | Self::GUILD_PRESENCES
    }

    /// Check whether any privileged intent is requested
    #[must_use]
    pub fn has_privileged(&self) -> bool {
        self.intersects(Self::privileged())
    }
}

impl Default for GatewayIntents {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for GatewayIntents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

impl Serialize for GatewayIntents {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u32(self.bits())
    }
}

impl<'de> Deserialize<'de> for GatewayIntents {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = u32::deserialize(deserializer)?;
        Ok(Self::from_bits_truncate(bits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_bits() {
        assert_eq!(GatewayIntents::GUILDS.bits(), 1);
        assert_eq!(GatewayIntents::GUILD_MESSAGES.bits(), 512);

        let both = GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES;
        assert_eq!(both.bits(), 513);
    }

    #[test]
    fn test_privileged_split() {
        let unpriv = GatewayIntents::unprivileged();
        assert!(!unpriv.contains(GatewayIntents::GUILD_MEMBERS));
        assert!(!unpriv.contains(GatewayIntents::GUILD_PRESENCES));
        assert!(unpriv.contains(GatewayIntents::GUILDS));

        assert!(!unpriv.has_privileged());
        assert!(GatewayIntents::GUILD_MEMBERS.has_privileged());
    }

    #[test]
    fn test_serialization() {
        let intents = GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES;
        let json = serde_json::to_string(&intents).unwrap();
        assert_eq!(json, "513");

        let parsed: GatewayIntents = serde_json::from_str("513").unwrap();
        assert_eq!(parsed, intents);
    }

    #[test]
    fn test_unknown_bits_truncated() {
        let parsed: GatewayIntents = serde_json::from_str("4294967295").unwrap();
        assert_eq!(parsed, GatewayIntents::all());
    }
}
