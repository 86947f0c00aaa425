//! Decoding of serialized star system payloads read back from the store.

use serde::de::DeserializeOwned;

/// Outcome of decoding a stored payload.
#[derive(Debug)]
pub enum Decoded<T> {
    Found(T),
    /// No payload was stored (placeholder rows, blank columns).
    Empty,
    Malformed(serde_json::Error),
}

impl<T> Decoded<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Decoded::Found(value) => Some(value),
            Decoded::Empty | Decoded::Malformed(_) => None,
        }
    }
}

pub fn decode<T: DeserializeOwned>(payload: &str) -> Decoded<T> {
    if payload.trim().is_empty() {
        return Decoded::Empty;
    }

    match serde_json::from_str(payload) {
        Ok(value) => Decoded::Found(value),
        Err(e) => Decoded::Malformed(e),
    }
}
