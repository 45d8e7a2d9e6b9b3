//! Value objects shared across the library

mod intents;
mod snowflake;

pub use intents::GatewayIntents;
pub use snowflake::{Snowflake, SnowflakeParseError};
