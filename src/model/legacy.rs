//! Tolerant view of previously stored payloads.
//!
//! Payloads written by older builds used different field names and may lack whole
//! sections. [`LegacyStarSystem`] decodes only the locally owned fields the merge step
//! carries forward, each optional, so one decode serves every merge site.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct LegacyStarSystem {
    #[serde(alias = "systemAddress", alias = "systemaddress", alias = "SystemAddress")]
    pub system_address: Option<u64>,
    #[serde(alias = "systemname", alias = "systemName")]
    pub name: Option<String>,
    #[serde(alias = "totalBodies", alias = "totalbodies")]
    pub total_bodies: Option<u32>,
    #[serde(alias = "visitLog", alias = "visitlog")]
    pub visit_log: Option<BTreeSet<DateTime<Utc>>>,
    pub comment: Option<String>,
    pub bodies: Option<Vec<LegacyBody>>,
    pub factions: Option<Vec<LegacyFaction>>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct LegacyBody {
    #[serde(alias = "bodyId", alias = "bodyid")]
    pub body_id: Option<i64>,
    #[serde(alias = "bodyname", alias = "bodyName")]
    pub name: Option<String>,
    #[serde(alias = "scannedAt", alias = "scanned")]
    pub scanned_at: Option<DateTime<Utc>>,
    #[serde(alias = "mappedAt", alias = "mapped")]
    pub mapped_at: Option<DateTime<Utc>>,
    #[serde(alias = "mappedEfficiently", alias = "mappedefficiently")]
    pub mapped_efficiently: Option<bool>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct LegacyFaction {
    pub name: Option<String>,
    #[serde(alias = "myReputation", alias = "myreputation")]
    pub my_reputation: Option<f64>,
}

impl LegacyBody {
    pub fn matches(&self, body_id: Option<i64>, name: &str) -> bool {
        match (self.body_id, body_id) {
            (Some(id), Some(other_id)) => id == other_id,
            _ => self
                .name
                .as_deref()
                .is_some_and(|stale| stale.eq_ignore_ascii_case(name)),
        }
    }
}
