use crate::clock::Clock;
use crate::config::Config;
use crate::constants::DEV_ROLE_NAMES;
use crate::registry::PrivilegeLookup;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::time::{Duration, Instant};
use tracing::debug;

pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, Copy)]
struct Entry {
    is_developer: bool,
    checked_at: Instant,
}

/// Remembers who passed (or failed) the developer check for a short while.
pub struct PermissionCache {
    clock: Arc<dyn Clock>,
    ttl: Duration,
    entries: Mutex<HashMap<u64, Entry>>,
}

impl PermissionCache {
    pub fn new(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self { clock, ttl, entries: Mutex::new(HashMap::new()) }
    }

    fn live(&self, entry: &Entry, now: Instant) -> bool {
        now.saturating_duration_since(entry.checked_at) < self.ttl
    }

    pub fn get(&self, user_id: u64) -> Option<bool> {
        let now = self.clock.now();
        let entries = self.entries.lock().ok()?;
        entries
            .get(&user_id)
            .filter(|e| self.live(e, now))
            .map(|e| e.is_developer)
    }

    pub fn set(&self, user_id: u64, is_developer: bool) {
        self.set_at(user_id, is_developer, self.clock.now());
    }

    /// Stores a result measured at `checked_at`. A result older than the one
    /// already stored is dropped.
    fn set_at(&self, user_id: u64, is_developer: bool, checked_at: Instant) {
        if let Ok(mut entries) = self.entries.lock() {
            let fresher = entries
                .get(&user_id)
                .map_or(true, |old| old.checked_at <= checked_at);
            if fresher {
                entries.insert(user_id, Entry { is_developer, checked_at });
            }
        }
    }

    /// Cached answer if live, otherwise the owner check plus, in dev mode
    /// inside the dev guild, the privileged-role check. Lookup errors are
    /// returned without caching anything.
    pub async fn check(
        &self,
        user_id: u64,
        guild_id: Option<u64>,
        lookup: &dyn PrivilegeLookup,
        config: &Config,
    ) -> anyhow::Result<bool> {
        if let Some(hit) = self.get(user_id) {
            return Ok(hit);
        }

        let started = self.clock.now();
        let mut is_developer = lookup.is_owner(user_id).await?;

        if !is_developer && config.dev_mode {
            if let (Some(guild), Some(dev_guild)) = (guild_id, config.dev_guild_id) {
                if guild == dev_guild {
                    is_developer = lookup
                        .member_role_names(guild, user_id)
                        .await?
                        .map(|roles| roles.iter().any(|r| DEV_ROLE_NAMES.contains(&r.as_str())))
                        .unwrap_or(false);
                }
            }
        }

        debug!(user_id, is_developer, "developer check refreshed");
        self.set_at(user_id, is_developer, started);
        Ok(is_developer)
    }

    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        match self.entries.lock() {
            Ok(mut entries) => {
                let before = entries.len();
                entries.retain(|_, e| now.saturating_duration_since(e.checked_at) < self.ttl);
                before - entries.len()
            }
            Err(_) => 0,
        }
    }

    pub fn active_developers(&self) -> usize {
        let now = self.clock.now();
        self.entries
            .lock()
            .map(|entries| entries.values().filter(|e| e.is_developer && self.live(e, now)).count())
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}
