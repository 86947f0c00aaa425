//! Utility functions shared across the data and service layers.

pub mod time;
