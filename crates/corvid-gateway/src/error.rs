//! Gateway error types

use crate::compression::ZlibStreamError;
use crate::protocol::GatewayCloseCode;
use thiserror::Error;

/// Errors produced by the shard driver
///
/// These never escape the driver task: transient variants feed the
/// reconnect loop, fatal ones terminate the shard.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// WebSocket transport error
    #[error("WebSocket error: {0}")]
    WebSocket(Box<tokio_tungstenite::tungstenite::Error>),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Connection closed with a code
    #[error("Connection closed with code {0}")]
    Closed(u16),

    /// The gateway rejected the connection with an unrecoverable code
    /// (bad token or intents); reconnecting cannot succeed
    #[error("Unrecoverable close: {0}")]
    Unrecoverable(GatewayCloseCode),

    /// Transport-level zlib-stream failure
    #[error(transparent)]
    Zlib(#[from] ZlibStreamError),
}

impl From<tokio_tungstenite::tungstenite::Error> for GatewayError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::WebSocket(Box::new(err))
    }
}

/// Gateway result type
pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GatewayError::Closed(4009);
        assert!(err.to_string().contains("4009"));

        let err = GatewayError::Unrecoverable(GatewayCloseCode::AuthenticationFailed);
        assert!(err.to_string().contains("4004"));

        let err = GatewayError::Zlib(ZlibStreamError::Data);
        assert!(err.to_string().contains("data"));
    }
}
