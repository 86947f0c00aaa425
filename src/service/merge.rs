//! Carries locally owned fields across a remote refresh.
//!
//! A refreshed record replaces the stored one wholesale, but some fields are only ever
//! observed locally: visits, comments, per-body exploration state, and faction reputation.
//! Remote authorities never report them, so they are copied forward from the previously
//! stored payload before the refreshed record is persisted. Stations always come from the
//! fresh record.

use std::collections::HashMap;

use crate::{
    data::StoredStarSystem,
    model::{
        legacy::LegacyStarSystem,
        payload::{decode, Decoded},
        StarSystem,
    },
};

/// Merges every fresh record with its stored counterpart, matched by system address, or by
/// name against rows written before addresses were tracked.
///
/// Records without a counterpart, or whose counterpart payload cannot be decoded, pass
/// through unchanged.
pub fn preserve_unsynced_fields(
    fresh: Vec<StarSystem>,
    stale: &[StoredStarSystem],
) -> Vec<StarSystem> {
    let stale_by_address: HashMap<u64, &StoredStarSystem> = stale
        .iter()
        .filter_map(|stored| stored.system_address.map(|address| (address, stored)))
        .collect();
    let unaddressed: Vec<&StoredStarSystem> = stale
        .iter()
        .filter(|stored| stored.system_address.is_none())
        .collect();

    fresh
        .into_iter()
        .map(|record| {
            let counterpart = stale_by_address
                .get(&record.system_address)
                .copied()
                .or_else(|| {
                    unaddressed
                        .iter()
                        .copied()
                        .find(|stored| record.matches_name(&stored.name))
                });
            let Some(stored) = counterpart else {
                return record;
            };

            match decode::<LegacyStarSystem>(&stored.payload) {
                Decoded::Found(legacy) => merge_record(record, legacy, stored),
                Decoded::Empty => record,
                Decoded::Malformed(e) => {
                    tracing::warn!(
                        "Failed to decode stored star system {:?} ({}), keeping refreshed data only: {}",
                        stored.name,
                        record.system_address,
                        e
                    );
                    record
                }
            }
        })
        .collect()
}

/// Copies the locally owned fields of one stale record into its fresh replacement.
pub fn merge_record(
    mut fresh: StarSystem,
    stale: LegacyStarSystem,
    stored: &StoredStarSystem,
) -> StarSystem {
    if fresh.total_bodies.is_none() {
        fresh.total_bodies = stale.total_bodies;
    }

    match stale.visit_log {
        Some(visits) => fresh.visit_log.extend(visits),
        // Payloads predating the visit log only kept the last visit in its own column
        None => fresh.visit_log.extend(stored.last_visit),
    }

    if fresh.comment.is_none() {
        fresh.comment = stale.comment.or_else(|| stored.comment.clone());
    }

    if let Some(stale_bodies) = stale.bodies {
        for body in &mut fresh.bodies {
            if let Some(stale_body) = stale_bodies
                .iter()
                .find(|stale_body| stale_body.matches(body.body_id, &body.name))
            {
                body.scanned_at = stale_body.scanned_at;
                body.mapped_at = stale_body.mapped_at;
                body.mapped_efficiently = stale_body.mapped_efficiently.unwrap_or_default();
            }
        }
    }

    if let Some(stale_factions) = stale.factions {
        for faction in &mut fresh.factions {
            if let Some(stale_faction) = stale_factions.iter().find(|stale_faction| {
                stale_faction
                    .name
                    .as_deref()
                    .is_some_and(|name| name.eq_ignore_ascii_case(&faction.name))
            }) {
                faction.my_reputation = stale_faction.my_reputation;
            }
        }
    }

    fresh
}
