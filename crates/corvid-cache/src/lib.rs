//! # corvid-cache
//!
//! In-memory, mutex-guarded cache layer shared by all shards of a cluster.

mod guilds;

pub use guilds::GuildCache;
