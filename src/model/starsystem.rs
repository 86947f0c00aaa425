use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A star system with its bodies, stations, and factions.
///
/// `system_address` is the durable identity once known; `0` means the identity has not
/// been assigned yet. Names compare case-insensitively.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StarSystem {
    pub system_address: u64,
    pub name: String,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub visit_log: BTreeSet<DateTime<Utc>>,
    pub comment: Option<String>,
    /// Body count reported by the remote authority, `None` when it reported nothing.
    pub total_bodies: Option<u32>,
    pub allegiance: Option<String>,
    pub government: Option<String>,
    pub security: Option<String>,
    pub population: Option<u64>,
    #[serde(default)]
    pub bodies: Vec<Body>,
    #[serde(default)]
    pub stations: Vec<Station>,
    #[serde(default)]
    pub factions: Vec<Faction>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Body {
    pub body_id: Option<i64>,
    pub name: String,
    pub body_type: Option<String>,
    pub distance_from_arrival: Option<f64>,
    pub scanned_at: Option<DateTime<Utc>>,
    pub mapped_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub mapped_efficiently: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    pub market_id: Option<u64>,
    pub name: String,
    pub station_type: Option<String>,
    pub distance_from_star: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Faction {
    pub name: String,
    pub allegiance: Option<String>,
    pub influence: Option<f64>,
    pub my_reputation: Option<f64>,
}

impl StarSystem {
    /// Creates a placeholder record carrying only its identity.
    pub fn stub(name: impl Into<String>, system_address: u64) -> Self {
        Self {
            name: name.into(),
            system_address,
            ..Default::default()
        }
    }

    /// A record is complete once all three coordinates are known. Incomplete records are
    /// never served as fresh data.
    pub fn is_complete(&self) -> bool {
        self.x.is_some() && self.y.is_some() && self.z.is_some()
    }

    /// Most recent visit, if any.
    pub fn last_visit(&self) -> Option<DateTime<Utc>> {
        self.visit_log.last().copied()
    }

    pub fn total_visits(&self) -> usize {
        self.visit_log.len()
    }

    /// Records a visit. Returns `false` when the timestamp was already logged.
    pub fn add_visit(&mut self, visited_at: DateTime<Utc>) -> bool {
        self.visit_log.insert(visited_at)
    }

    pub fn matches_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

impl Body {
    /// Bodies match on id when both sides carry one, otherwise on name.
    pub fn is_same_body(&self, other: &Body) -> bool {
        match (self.body_id, other.body_id) {
            (Some(id), Some(other_id)) => id == other_id,
            _ => self.name.eq_ignore_ascii_case(&other.name),
        }
    }
}
