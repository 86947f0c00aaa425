//! Domain types shared across the cache, store, and provider.

pub mod legacy;
pub mod payload;
pub mod starsystem;

pub use starsystem::{Body, Faction, StarSystem, Station};
