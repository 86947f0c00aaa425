//! Service layer: the record cache, the merge step, the remote collaborator contracts, and
//! the provider orchestrating them over the durable store.

pub mod cache;
pub mod fetch;
pub mod merge;
pub mod provider;

pub use cache::RecordCache;
pub use fetch::{Fetcher, NoSecondaryAuthority, OfflineFetcher, SecondaryAuthority};
pub use provider::{ResolveOptions, StarSystemProvider};
