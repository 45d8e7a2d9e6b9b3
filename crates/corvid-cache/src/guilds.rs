//! Guild cache
//!
//! A process-wide, mutex-guarded map of guilds populated from dispatch
//! events. Consumers that traverse the container (the shard count methods)
//! must hold the lock for the full iteration.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use corvid_core::{Guild, Snowflake};

/// Mutex-guarded in-memory guild cache
///
/// Deletions from dispatch handlers are deferred: guilds are flagged for
/// removal and swept by [`garbage_collect`](GuildCache::garbage_collect),
/// which the cluster invokes on its maintenance interval.
#[derive(Debug, Default)]
pub struct GuildCache {
    guilds: Mutex<HashMap<Snowflake, Guild>>,
    pending_removal: Mutex<Vec<Snowflake>>,
}

impl GuildCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a guild
    pub fn insert(&self, guild: Guild) {
        self.guilds
            .lock()
            .expect("guild cache poisoned")
            .insert(guild.id, guild);
    }

    /// Get a cloned snapshot of a guild
    pub fn get(&self, id: Snowflake) -> Option<Guild> {
        self.guilds
            .lock()
            .expect("guild cache poisoned")
            .get(&id)
            .cloned()
    }

    /// Lock the container for iteration
    ///
    /// The guard must be held for the full traversal; the shard count
    /// methods rely on this to observe a consistent snapshot.
    pub fn lock(&self) -> MutexGuard<'_, HashMap<Snowflake, Guild>> {
        self.guilds.lock().expect("guild cache poisoned")
    }

    /// Number of cached guilds
    pub fn len(&self) -> usize {
        self.guilds.lock().expect("guild cache poisoned").len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Record a member in a guild
    pub fn add_member(&self, guild_id: Snowflake, user_id: Snowflake) {
        if let Some(guild) = self
            .guilds
            .lock()
            .expect("guild cache poisoned")
            .get_mut(&guild_id)
        {
            guild.members.insert(user_id);
        }
    }

    /// Drop a member from a guild
    pub fn remove_member(&self, guild_id: Snowflake, user_id: Snowflake) {
        if let Some(guild) = self
            .guilds
            .lock()
            .expect("guild cache poisoned")
            .get_mut(&guild_id)
        {
            guild.members.remove(&user_id);
        }
    }

    /// Record a channel in a guild
    pub fn add_channel(&self, guild_id: Snowflake, channel_id: Snowflake) {
        if let Some(guild) = self
            .guilds
            .lock()
            .expect("guild cache poisoned")
            .get_mut(&guild_id)
        {
            guild.channels.insert(channel_id);
        }
    }

    /// Drop a channel from a guild
    pub fn remove_channel(&self, guild_id: Snowflake, channel_id: Snowflake) {
        if let Some(guild) = self
            .guilds
            .lock()
            .expect("guild cache poisoned")
            .get_mut(&guild_id)
        {
            guild.channels.remove(&channel_id);
        }
    }

    /// Flag a guild as unavailable (gateway outage, guild kept)
    pub fn mark_unavailable(&self, guild_id: Snowflake) {
        if let Some(guild) = self
            .guilds
            .lock()
            .expect("guild cache poisoned")
            .get_mut(&guild_id)
        {
            guild.unavailable = true;
        }
    }

    /// Flag a guild for removal by the next garbage collection pass
    pub fn mark_for_removal(&self, guild_id: Snowflake) {
        self.pending_removal
            .lock()
            .expect("guild cache poisoned")
            .push(guild_id);
    }

    /// Sweep guilds flagged for removal
    ///
    /// Returns the number of guilds evicted.
    pub fn garbage_collect(&self) -> usize {
        let pending: Vec<Snowflake> = std::mem::take(
            &mut *self
                .pending_removal
                .lock()
                .expect("guild cache poisoned"),
        );

        if pending.is_empty() {
            return 0;
        }

        let mut guilds = self.guilds.lock().expect("guild cache poisoned");
        let mut evicted = 0;
        for id in pending {
            if guilds.remove(&id).is_some() {
                evicted += 1;
            }
        }

        if evicted > 0 {
            tracing::debug!(evicted, "Guild cache garbage collection pass");
        }

        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guild(id: u64) -> Guild {
        Guild::new(
            Snowflake::new(id),
            format!("guild-{id}"),
            Snowflake::new(1),
            1,
        )
    }

    #[test]
    fn test_insert_and_get() {
        let cache = GuildCache::new();
        assert!(cache.is_empty());

        cache.insert(guild(10));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(Snowflake::new(10)).unwrap().name, "guild-10");
        assert!(cache.get(Snowflake::new(11)).is_none());
    }

    #[test]
    fn test_member_and_channel_tracking() {
        let cache = GuildCache::new();
        cache.insert(guild(10));

        cache.add_member(Snowflake::new(10), Snowflake::new(100));
        cache.add_member(Snowflake::new(10), Snowflake::new(101));
        cache.add_channel(Snowflake::new(10), Snowflake::new(200));

        let g = cache.get(Snowflake::new(10)).unwrap();
        assert_eq!(g.member_count(), 2);
        assert_eq!(g.channel_count(), 1);

        cache.remove_member(Snowflake::new(10), Snowflake::new(100));
        cache.remove_channel(Snowflake::new(10), Snowflake::new(200));

        let g = cache.get(Snowflake::new(10)).unwrap();
        assert_eq!(g.member_count(), 1);
        assert_eq!(g.channel_count(), 0);

        // Mutations against an uncached guild are no-ops
        cache.add_member(Snowflake::new(99), Snowflake::new(100));
        assert!(cache.get(Snowflake::new(99)).is_none());
    }

    #[test]
    fn test_garbage_collection() {
        let cache = GuildCache::new();
        cache.insert(guild(10));
        cache.insert(guild(11));

        // Nothing flagged: nothing swept
        assert_eq!(cache.garbage_collect(), 0);
        assert_eq!(cache.len(), 2);

        cache.mark_for_removal(Snowflake::new(10));
        assert_eq!(cache.len(), 2, "removal is deferred to the sweep");

        assert_eq!(cache.garbage_collect(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(Snowflake::new(10)).is_none());

        // Sweep is idempotent
        assert_eq!(cache.garbage_collect(), 0);
    }

    #[test]
    fn test_mark_unavailable_keeps_guild() {
        let cache = GuildCache::new();
        cache.insert(guild(10));

        cache.mark_unavailable(Snowflake::new(10));
        let g = cache.get(Snowflake::new(10)).unwrap();
        assert!(g.unavailable);
        assert_eq!(cache.len(), 1);
    }
}
