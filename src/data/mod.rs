//! Data access layer.
//!
//! [`StarSystemRepository`](starsystem::StarSystemRepository) holds the CRUD primitives for
//! one connection or transaction; [`StarSystemStore`](store::StarSystemStore) is the durable
//! store handle built on top of it, owning the single-writer guard and the degraded-mode
//! error policy.

pub mod starsystem;
pub mod store;
pub mod write;

pub use starsystem::StoredStarSystem;
pub use store::{SaveSummary, StarSystemStore};
pub use write::WriteAction;

#[cfg(test)]
mod tests;
