//! WebSocket close codes
//!
//! Gateway-specific close codes and the description table surfaced to
//! operators. The numeric codes (1000-1015 standard WebSocket, 4000-4014
//! Discord gateway, 6000-6002 zlib categories) are preserved verbatim for
//! operator familiarity.

use serde::{Deserialize, Serialize};

/// Discord gateway close codes (4000-4014)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum GatewayCloseCode {
    /// Unknown error
    UnknownError = 4000,
    /// Invalid opcode sent
    UnknownOpcode = 4001,
    /// Invalid payload encoding (JSON decode error)
    DecodeError = 4002,
    /// Sent a payload before Identify
    NotAuthenticated = 4003,
    /// Invalid token
    AuthenticationFailed = 4004,
    /// Sent Identify twice
    AlreadyAuthenticated = 4005,
    /// Invalid sequence number for Resume
    InvalidSequence = 4007,
    /// Too many payloads (rate limited)
    RateLimited = 4008,
    /// Session has timed out
    SessionTimeout = 4009,
    /// Invalid shard configuration
    InvalidShard = 4010,
    /// Sharding is required for this bot
    ShardingRequired = 4011,
    /// Invalid/outdated API version
    InvalidApiVersion = 4012,
    /// Invalid intent bits
    InvalidIntents = 4013,
    /// Intent not approved for this bot
    DisallowedIntents = 4014,
}

impl GatewayCloseCode {
    /// Create a `GatewayCloseCode` from a raw u16 value
    #[must_use]
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            4000 => Some(Self::UnknownError),
            4001 => Some(Self::UnknownOpcode),
            4002 => Some(Self::DecodeError),
            4003 => Some(Self::NotAuthenticated),
            4004 => Some(Self::AuthenticationFailed),
            4005 => Some(Self::AlreadyAuthenticated),
            4007 => Some(Self::InvalidSequence),
            4008 => Some(Self::RateLimited),
            4009 => Some(Self::SessionTimeout),
            4010 => Some(Self::InvalidShard),
            4011 => Some(Self::ShardingRequired),
            4012 => Some(Self::InvalidApiVersion),
            4013 => Some(Self::InvalidIntents),
            4014 => Some(Self::DisallowedIntents),
            _ => None,
        }
    }

    /// Get the raw u16 value
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Check if the session survives this close (next connect may RESUME)
    #[must_use]
    pub const fn should_resume(self) -> bool {
        matches!(
            self,
            Self::UnknownError | Self::InvalidSequence | Self::RateLimited | Self::SessionTimeout
        )
    }

    /// Check if this close invalidates the session (next connect must IDENTIFY)
    #[must_use]
    pub const fn clears_session(self) -> bool {
        matches!(
            self,
            Self::NotAuthenticated
                | Self::AuthenticationFailed
                | Self::AlreadyAuthenticated
                | Self::InvalidShard
                | Self::ShardingRequired
                | Self::InvalidApiVersion
        )
    }

    /// Check if reconnecting cannot succeed (bad token or intents)
    ///
    /// The driver terminates the shard on these codes rather than looping.
    #[must_use]
    pub const fn is_unrecoverable(self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed | Self::InvalidIntents | Self::DisallowedIntents
        )
    }
}

impl std::fmt::Display for GatewayCloseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({})",
            describe_close_code(self.as_u16()),
            self.as_u16()
        )
    }
}

impl From<GatewayCloseCode> for u16 {
    fn from(code: GatewayCloseCode) -> Self {
        code.as_u16()
    }
}

/// Describe any close/error code the shard can surface
///
/// Covers the standard WebSocket range, the Discord gateway range and the
/// library's zlib error categories.
#[must_use]
pub fn describe_close_code(code: u16) -> &'static str {
    match code {
        1000 => "Socket shutdown",
        1001 => "Endpoint is leaving",
        1002 => "Endpoint received a malformed frame",
        1003 => "Endpoint received an unsupported frame",
        1004 => "Reserved code",
        1005 => "Expected close status, received none",
        1006 => "No close code frame has been received",
        1007 => "Endpoint received an inconsistent message",
        1008 => "Generic policy violation",
        1009 => "Endpoint won't process large frame",
        1010 => "Client wanted an extension which server did not negotiate",
        1011 => "Internal server error while operating",
        1012 => "Server/service is restarting",
        1013 => "Temporary server condition forced blocking client's request",
        1014 => "Server acting as gateway received an invalid response",
        1015 => "Transport Layer Security handshake failure",
        4000 => "Unknown error",
        4001 => "Unknown opcode",
        4002 => "Decode error",
        4003 => "Not authenticated",
        4004 => "Authentication failed",
        4005 => "Already authenticated",
        4007 => "Invalid seq",
        4008 => "Rate limited",
        4009 => "Session timed out",
        4010 => "Invalid shard",
        4011 => "Sharding required",
        4012 => "Invalid API version",
        4013 => "Invalid intent(s)",
        4014 => "Disallowed intent(s)",
        6000 => "ZLib stream error",
        6001 => "ZLib data error",
        6002 => "ZLib memory error",
        _ => "Unknown error code",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_code_from_u16() {
        assert_eq!(
            GatewayCloseCode::from_u16(4000),
            Some(GatewayCloseCode::UnknownError)
        );
        assert_eq!(
            GatewayCloseCode::from_u16(4014),
            Some(GatewayCloseCode::DisallowedIntents)
        );
        assert_eq!(GatewayCloseCode::from_u16(1000), None);
        assert_eq!(GatewayCloseCode::from_u16(4006), None); // 4006 is not defined
    }

    #[test]
    fn test_resume_policy() {
        assert!(GatewayCloseCode::UnknownError.should_resume());
        assert!(GatewayCloseCode::InvalidSequence.should_resume());
        assert!(GatewayCloseCode::RateLimited.should_resume());
        assert!(GatewayCloseCode::SessionTimeout.should_resume());

        assert!(!GatewayCloseCode::AuthenticationFailed.should_resume());
        assert!(!GatewayCloseCode::InvalidShard.should_resume());
    }

    #[test]
    fn test_session_clear_policy() {
        for code in [
            GatewayCloseCode::NotAuthenticated,
            GatewayCloseCode::AuthenticationFailed,
            GatewayCloseCode::AlreadyAuthenticated,
            GatewayCloseCode::InvalidShard,
            GatewayCloseCode::ShardingRequired,
            GatewayCloseCode::InvalidApiVersion,
        ] {
            assert!(code.clears_session(), "{code:?} must clear the session");
        }

        assert!(!GatewayCloseCode::SessionTimeout.clears_session());
    }

    #[test]
    fn test_unrecoverable_policy() {
        assert!(GatewayCloseCode::AuthenticationFailed.is_unrecoverable());
        assert!(GatewayCloseCode::InvalidIntents.is_unrecoverable());
        assert!(GatewayCloseCode::DisallowedIntents.is_unrecoverable());

        assert!(!GatewayCloseCode::UnknownError.is_unrecoverable());
        assert!(!GatewayCloseCode::SessionTimeout.is_unrecoverable());
    }

    #[test]
    fn test_describe_table() {
        assert_eq!(describe_close_code(4004), "Authentication failed");
        assert_eq!(describe_close_code(1006), "No close code frame has been received");
        assert_eq!(describe_close_code(6001), "ZLib data error");
        assert_eq!(describe_close_code(9999), "Unknown error code");
    }
}
