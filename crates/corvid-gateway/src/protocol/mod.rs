//! Gateway wire protocol
//!
//! Op codes, close codes, the message envelope and payload structures for
//! the gateway v8 subset the shard client speaks.

mod close_codes;
mod messages;
mod opcodes;
mod payloads;

pub use close_codes::{describe_close_code, GatewayCloseCode};
pub use messages::GatewayMessage;
pub use opcodes::OpCode;
pub use payloads::{
    HelloPayload, IdentifyPayload, IdentifyProperties, ReadyPayload, ReadyUser, ResumePayload,
    VoiceServerUpdatePayload, VoiceStatePayload, VoiceStateUpdatePayload,
};
