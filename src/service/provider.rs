use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use chrono::Utc;
use futures::stream::{FuturesUnordered, StreamExt};

use crate::{
    config::ProviderConfig,
    data::{SaveSummary, StarSystemStore, StoredStarSystem},
    model::{payload::Decoded, StarSystem},
    service::{
        cache::RecordCache,
        fetch::{Fetcher, NoSecondaryAuthority, SecondaryAuthority},
        merge::preserve_unsynced_fields,
    },
    util::time::is_outdated,
};

/// How far [`StarSystemProvider::resolve`] may go to satisfy a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Consult the remote authority for identities the cache and store cannot supply.
    pub fetch_if_missing: bool,
    /// Treat stored records older than the staleness threshold as missing.
    pub refresh_if_outdated: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            fetch_if_missing: true,
            refresh_if_outdated: true,
        }
    }
}

impl ResolveOptions {
    /// Resolve from the cache and store only, accepting stored data of any age.
    pub fn offline() -> Self {
        Self {
            fetch_if_missing: false,
            refresh_if_outdated: false,
        }
    }
}

/// Tiered star system provider.
///
/// Requests are satisfied from the in-process cache first, then the durable store, then the
/// remote [`Fetcher`]. Fetched records are enriched by the [`SecondaryAuthority`], merged
/// with their stored form so locally owned fields survive the refresh, persisted, and
/// re-cached before being returned.
///
/// No tier's failure is surfaced to the caller: a degraded call returns fewer or older
/// records and logs why.
pub struct StarSystemProvider {
    store: StarSystemStore,
    cache: RecordCache,
    fetcher: Arc<dyn Fetcher>,
    authority: Arc<dyn SecondaryAuthority>,
    config: ProviderConfig,
}

impl StarSystemProvider {
    pub fn new(store: StarSystemStore, fetcher: Arc<dyn Fetcher>, config: ProviderConfig) -> Self {
        Self {
            store,
            cache: RecordCache::new(config.cache_ttl),
            fetcher,
            authority: Arc::new(NoSecondaryAuthority),
            config,
        }
    }

    pub fn with_authority(mut self, authority: Arc<dyn SecondaryAuthority>) -> Self {
        self.authority = authority;
        self
    }

    pub fn cache(&self) -> &RecordCache {
        &self.cache
    }

    pub fn store(&self) -> &StarSystemStore {
        &self.store
    }

    /// Resolves a single system address.
    pub async fn get(&self, address: u64, options: ResolveOptions) -> Option<StarSystem> {
        self.resolve(&[address], options).await.into_iter().next()
    }

    /// Resolves star systems by address through the cache, store, and remote tiers.
    ///
    /// # Arguments
    /// - `addresses` - System addresses to resolve; duplicates and `0` are ignored
    /// - `options` - Whether to fetch missing systems and whether stale stored data counts
    ///
    /// # Returns
    /// The resolved records, at most one per address, in tier order. Addresses that could
    /// not be resolved are absent; a single warning lists them when a fetch was attempted.
    pub async fn resolve(&self, addresses: &[u64], options: ResolveOptions) -> Vec<StarSystem> {
        let requested = unique_addresses(addresses);
        if requested.is_empty() {
            return Vec::new();
        }

        // Cache tier
        let mut results: Vec<StarSystem> = self
            .cache
            .get_many(&requested)
            .into_iter()
            .filter(StarSystem::is_complete)
            .collect();
        let missing = missing_addresses(&requested, &results);
        if missing.is_empty() {
            return results;
        }

        // Store tier
        let stored = self.store.find_by_addresses(&missing).await;
        results.extend(self.usable_stored_records(&stored, options));
        let missing = missing_addresses(&requested, &results);
        if missing.is_empty() || !options.fetch_if_missing {
            return results;
        }

        // Remote tier
        let fetched = self.fetch_by_addresses(&missing).await;
        results.extend(self.refresh(fetched, &stored).await);

        let unresolved = missing_addresses(&requested, &results);
        if !unresolved.is_empty() {
            tracing::warn!(
                "Failed to resolve {} of {} star systems: {:?}",
                unresolved.len(),
                requested.len(),
                unresolved
            );
        }

        results
    }

    /// Resolves star systems by name, creating placeholder records for names no tier can
    /// supply.
    ///
    /// Names that only have stale or incomplete stored data, and whose remote fetch fails,
    /// resolve to that stored data rather than a placeholder. Placeholders carry no system
    /// address and are never persisted.
    pub async fn get_or_create_by_names(
        &self,
        names: &[String],
        options: ResolveOptions,
    ) -> Vec<StarSystem> {
        let requested = unique_names(names);
        if requested.is_empty() {
            return Vec::new();
        }

        let mut results: Vec<StarSystem> = self
            .cache
            .get_many_by_names(&requested)
            .into_iter()
            .filter(StarSystem::is_complete)
            .collect();
        let missing = missing_names(&requested, &results);
        if missing.is_empty() {
            return results;
        }

        let stored = self.store.find_by_names(&missing).await;
        results.extend(self.usable_stored_records(&stored, options));
        let mut missing = missing_names(&requested, &results);

        if !missing.is_empty() && options.fetch_if_missing {
            let fetched = match self.fetcher.fetch_by_names(&missing).await {
                Ok(fetched) => fetched,
                Err(e) => {
                    tracing::warn!("Failed to fetch star systems {:?}: {}", missing, e);
                    Vec::new()
                }
            };
            let fetched = fetched
                .into_iter()
                .filter(|system| missing.iter().any(|name| system.matches_name(name)))
                .collect();

            results.extend(self.refresh(fetched, &stored).await);
            missing = missing_names(&requested, &results);
        }

        for name in missing {
            let fallback = stored
                .iter()
                .filter(|row| row.name.eq_ignore_ascii_case(&name))
                .find_map(|row| self.decode_stored(row));

            match fallback {
                Some(record) => results.push(record),
                None => {
                    tracing::debug!("Creating placeholder for unknown star system {:?}", name);
                    results.push(StarSystem::stub(name, 0));
                }
            }
        }

        results
    }

    /// Single-name form of [`get_or_create_by_names`](Self::get_or_create_by_names).
    pub async fn get_or_create_by_name(&self, name: &str, options: ResolveOptions) -> StarSystem {
        self.get_or_create_by_names(&[name.to_string()], options)
            .await
            .into_iter()
            .next()
            .unwrap_or_else(|| StarSystem::stub(name, 0))
    }

    /// Persists records mutated in memory by the caller.
    ///
    /// Cached copies are evicted first so concurrent readers fall through to the store
    /// rather than observe the pre-write record.
    pub async fn save(&self, records: &[StarSystem]) -> SaveSummary {
        for record in records {
            self.cache.remove(record.system_address);
        }

        self.store.save(records).await
    }

    /// Permanently deletes a star system from the cache and the store.
    pub async fn delete(&self, address: u64) -> bool {
        self.cache.remove(address);
        self.store.delete_by_address(address).await
    }

    /// Decodes stored rows that may be served as hits: fresh enough (when freshness is
    /// requested) and complete.
    fn usable_stored_records(
        &self,
        stored: &[StoredStarSystem],
        options: ResolveOptions,
    ) -> Vec<StarSystem> {
        let now = Utc::now();

        stored
            .iter()
            .filter(|row| {
                let outdated = options.refresh_if_outdated
                    && is_outdated(row.last_updated, now, self.config.staleness_threshold);
                if outdated {
                    tracing::debug!(
                        "Stored star system {:?} ({:?}) is outdated, refetching",
                        row.name,
                        row.system_address
                    );
                }
                !outdated
            })
            .filter_map(|row| self.cached_or_decoded(row))
            .filter(StarSystem::is_complete)
            .collect()
    }

    /// Returns the cached form of a stored row, decoding and caching it on first use.
    fn cached_or_decoded(&self, row: &StoredStarSystem) -> Option<StarSystem> {
        if let Some(record) = row
            .system_address
            .and_then(|address| self.cache.try_get_by_address(address))
        {
            return Some(record);
        }

        let record = self.decode_stored(row)?;
        self.cache.put(record.clone());

        Some(record)
    }

    fn decode_stored(&self, row: &StoredStarSystem) -> Option<StarSystem> {
        match row.decode() {
            Decoded::Found(mut record) => {
                // Older payloads may predate the address column being filled in
                if record.system_address == 0 {
                    record.system_address = row.system_address.unwrap_or_default();
                }
                Some(record)
            }
            Decoded::Empty => None,
            Decoded::Malformed(e) => {
                tracing::warn!(
                    "Failed to decode stored star system {:?} ({:?}): {}",
                    row.name,
                    row.system_address,
                    e
                );
                None
            }
        }
    }

    /// Fetches each address as its own unit of work, concurrently in chunks of
    /// `max_concurrent_fetches`, and gathers whatever resolved.
    async fn fetch_by_addresses(&self, addresses: &[u64]) -> Vec<StarSystem> {
        let mut fetched: HashMap<u64, StarSystem> = HashMap::new();
        let fetcher = self.fetcher.as_ref();

        for chunk in addresses.chunks(self.config.max_concurrent_fetches.max(1)) {
            let mut futures = FuturesUnordered::new();

            for &address in chunk {
                futures.push(async move {
                    let result = fetcher.fetch_by_addresses(&[address]).await;
                    (address, result)
                });
            }

            while let Some((address, result)) = futures.next().await {
                match result {
                    Ok(systems) => {
                        for mut system in systems {
                            if system.system_address == 0 {
                                system.system_address = address;
                            }
                            if system.system_address == address {
                                fetched.insert(address, system);
                            }
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Failed to fetch star system {}: {}", address, e);
                    }
                }
            }
        }

        addresses
            .iter()
            .filter_map(|address| fetched.remove(address))
            .collect()
    }

    /// Post-processes fetched records: secondary-authority sync, merge with the stored
    /// form, freshness stamp, persist, then evict-and-repopulate the cache for every
    /// record that was written.
    async fn refresh(
        &self,
        fetched: Vec<StarSystem>,
        stored: &[StoredStarSystem],
    ) -> Vec<StarSystem> {
        if fetched.is_empty() {
            return fetched;
        }

        let synced = self.authority.sync_visits_and_comments(fetched).await;

        // The rows the save will overwrite, including name-only rows it replaces
        let mut stale = stored.to_vec();
        stale.extend(
            self.store
                .find_matching(&synced)
                .await
                .into_iter()
                .filter(|row| !row.is_placeholder()),
        );
        let mut merged = preserve_unsynced_fields(synced, &stale);

        let now = Utc::now();
        for record in &mut merged {
            record.last_updated = Some(now);
        }

        let summary = self.store.save(&merged).await;
        let saved: HashSet<u64> = summary.saved.iter().copied().collect();

        for record in merged.iter().filter(|r| saved.contains(&r.system_address)) {
            self.cache.remove(record.system_address);
            self.cache.put(record.clone());
        }

        merged
    }
}

fn unique_addresses(addresses: &[u64]) -> Vec<u64> {
    let mut seen = HashSet::new();
    addresses
        .iter()
        .copied()
        .filter(|address| *address != 0 && seen.insert(*address))
        .collect()
}

fn unique_names(names: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty() && seen.insert(name.to_lowercase()))
        .map(str::to_string)
        .collect()
}

fn missing_addresses(requested: &[u64], resolved: &[StarSystem]) -> Vec<u64> {
    let resolved: HashSet<u64> = resolved.iter().map(|r| r.system_address).collect();
    requested
        .iter()
        .copied()
        .filter(|address| !resolved.contains(address))
        .collect()
}

fn missing_names(requested: &[String], resolved: &[StarSystem]) -> Vec<String> {
    requested
        .iter()
        .filter(|name| !resolved.iter().any(|record| record.matches_name(name)))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests;
