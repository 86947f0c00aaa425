//! Contracts for the remote collaborators the provider consults.
//!
//! Wire formats, transport, retries, and rate limiting all live behind these traits; the
//! provider only reacts to what they return.

use async_trait::async_trait;

use crate::{error::fetch::FetchError, model::StarSystem};

/// Remote authority for star system data.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches full records for `addresses`.
    ///
    /// Best effort: the result holds only the systems the authority could resolve, in no
    /// particular order.
    async fn fetch_by_addresses(&self, addresses: &[u64]) -> Result<Vec<StarSystem>, FetchError>;

    /// Fetches full records by system name. Authorities that cannot look systems up by
    /// name resolve nothing.
    async fn fetch_by_names(&self, names: &[String]) -> Result<Vec<StarSystem>, FetchError> {
        let _ = names;
        Ok(Vec::new())
    }
}

/// Independently sourced ledger of visits and comments.
#[async_trait]
pub trait SecondaryAuthority: Send + Sync {
    /// Annotates `visit_log` and `comment` of the given records. Returns them unchanged
    /// when the ledger is unreachable or not configured.
    async fn sync_visits_and_comments(&self, records: Vec<StarSystem>) -> Vec<StarSystem>;
}

/// Fetcher for running without any remote authority; every fetch fails as not configured.
pub struct OfflineFetcher;

#[async_trait]
impl Fetcher for OfflineFetcher {
    async fn fetch_by_addresses(&self, _addresses: &[u64]) -> Result<Vec<StarSystem>, FetchError> {
        Err(FetchError::NotConfigured)
    }
}

/// Secondary authority that leaves records untouched.
pub struct NoSecondaryAuthority;

#[async_trait]
impl SecondaryAuthority for NoSecondaryAuthority {
    async fn sync_visits_and_comments(&self, records: Vec<StarSystem>) -> Vec<StarSystem> {
        records
    }
}
