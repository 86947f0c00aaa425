use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use beacon::{error::fetch::FetchError, model::StarSystem, service::Fetcher};

/// Fetcher serving a fixed set of systems after a short delay, counting in-flight requests.
pub struct SlowFetcher {
    systems: HashMap<u64, StarSystem>,
    delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl SlowFetcher {
    pub fn new(systems: Vec<StarSystem>, delay: Duration) -> Self {
        Self {
            systems: systems
                .into_iter()
                .map(|system| (system.system_address, system))
                .collect(),
            delay,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for SlowFetcher {
    async fn fetch_by_addresses(&self, addresses: &[u64]) -> Result<Vec<StarSystem>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(addresses
            .iter()
            .filter_map(|address| self.systems.get(address).cloned())
            .collect())
    }
}
