use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::model::StarSystem;

struct CacheEntry {
    record: StarSystem,
    last_access: Instant,
}

struct NameEntry {
    address: u64,
    last_access: Instant,
}

/// Process-local cache of star systems keyed by system address, with a case-insensitive
/// name index.
///
/// Entries use a sliding expiration: any read resets the entry's window, and an entry not
/// touched for `ttl` is treated as absent and dropped on the next access. There is no size
/// bound. Both maps are sharded, so concurrent fetch tasks populating different keys do not
/// contend on one lock.
pub struct RecordCache {
    ttl: Duration,
    entries: DashMap<u64, CacheEntry>,
    names: DashMap<String, NameEntry>,
}

impl RecordCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: DashMap::new(),
            names: DashMap::new(),
        }
    }

    /// Inserts or replaces the record under its address and indexes its name.
    ///
    /// Records without an address are not cached.
    pub fn put(&self, record: StarSystem) {
        let address = record.system_address;
        if address == 0 {
            return;
        }

        let now = Instant::now();
        let key = name_key(&record.name);

        self.entries.insert(
            address,
            CacheEntry {
                record,
                last_access: now,
            },
        );

        if !key.is_empty() {
            self.names.insert(
                key,
                NameEntry {
                    address,
                    last_access: now,
                },
            );
        }
    }

    /// Reads a record by address, sliding the window of its name index entry along with it.
    pub fn try_get_by_address(&self, address: u64) -> Option<StarSystem> {
        let now = Instant::now();

        let hit = {
            let mut entry = self.entries.get_mut(&address)?;
            if self.is_expired(entry.last_access, now) {
                None
            } else {
                entry.last_access = now;
                Some(entry.record.clone())
            }
        };

        let Some(record) = hit else {
            self.entries
                .remove_if(&address, |_, entry| self.is_expired(entry.last_access, now));
            return None;
        };

        if let Some(mut name) = self.names.get_mut(&name_key(&record.name)) {
            if name.address == address {
                name.last_access = now;
            }
        }

        Some(record)
    }

    /// Resolves a name through the index, then the address entry. Fails closed when the
    /// address entry has already expired or now belongs to a differently named record.
    pub fn try_get_by_name(&self, name: &str) -> Option<StarSystem> {
        let key = name_key(name);
        let now = Instant::now();

        let address = {
            let mut entry = self.names.get_mut(&key)?;
            if self.is_expired(entry.last_access, now) {
                None
            } else {
                entry.last_access = now;
                Some(entry.address)
            }
        };

        let Some(address) = address else {
            self.names
                .remove_if(&key, |_, entry| self.is_expired(entry.last_access, now));
            return None;
        };

        match self.try_get_by_address(address) {
            Some(record) if record.matches_name(name) => Some(record),
            _ => {
                self.names.remove_if(&key, |_, entry| entry.address == address);
                None
            }
        }
    }

    /// Returns the cached records among `addresses`; misses are skipped.
    pub fn get_many(&self, addresses: &[u64]) -> Vec<StarSystem> {
        addresses
            .iter()
            .filter_map(|address| self.try_get_by_address(*address))
            .collect()
    }

    /// Returns the cached records among `names`; misses are skipped.
    pub fn get_many_by_names(&self, names: &[String]) -> Vec<StarSystem> {
        names
            .iter()
            .filter_map(|name| self.try_get_by_name(name))
            .collect()
    }

    /// Evicts the record under `address` along with its name index entry.
    pub fn remove(&self, address: u64) {
        if let Some((_, entry)) = self.entries.remove(&address) {
            self.names
                .remove_if(&name_key(&entry.record.name), |_, name| {
                    name.address == address
                });
        }
    }

    /// Drops every expired entry.
    pub fn purge_expired(&self) {
        let now = Instant::now();

        self.entries
            .retain(|_, entry| !self.is_expired(entry.last_access, now));
        self.names
            .retain(|_, entry| !self.is_expired(entry.last_access, now));
    }

    /// Number of address entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn is_expired(&self, last_access: Instant, now: Instant) -> bool {
        now.saturating_duration_since(last_access) > self.ttl
    }
}

fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}
