use thiserror::Error;

/// Failures reported by a [`Fetcher`](crate::service::fetch::Fetcher) or
/// [`SecondaryAuthority`](crate::service::fetch::SecondaryAuthority).
///
/// None of these are surfaced to callers of the provider; the affected identities simply
/// stay unresolved.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Remote authority {source_name} is unavailable: {reason}")]
    Unavailable { source_name: String, reason: String },
    #[error("Remote authority is not configured")]
    NotConfigured,
}
