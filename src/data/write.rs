use crate::{
    data::starsystem::{db_address, StoredStarSystem},
    model::StarSystem,
};

/// How one record is written, decided before the write transaction opens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteAction {
    /// No stored counterpart: the record is new.
    Insert,
    /// A row already holds the record's address and is updated in place.
    Update,
    /// The counterpart was stored under the old name-only key; it is purged and the record
    /// inserted under its address.
    DeleteThenInsert,
    /// The record has no usable address and is never written.
    Reject,
}

impl WriteAction {
    /// Classifies a record against the counterpart found for it by
    /// [`StarSystemStore::find_matching`](crate::data::StarSystemStore::find_matching).
    pub fn classify(record: &StarSystem, counterpart: &StoredStarSystem) -> Self {
        if db_address(record.system_address).is_none() {
            return WriteAction::Reject;
        }

        if counterpart.is_placeholder() {
            return WriteAction::Insert;
        }

        match counterpart.system_address {
            Some(address) if address == record.system_address => WriteAction::Update,
            // Same name, different system
            Some(_) => WriteAction::Insert,
            None => WriteAction::DeleteThenInsert,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn stored(name: &str, address: u64) -> StoredStarSystem {
        let record = StarSystem::stub(name, address);
        StoredStarSystem {
            payload: serde_json::to_string(&record).unwrap(),
            ..StoredStarSystem::placeholder(name, address)
        }
    }

    /// Expect records without an address to be rejected regardless of counterpart
    #[test]
    fn rejects_identity_less_records() {
        let record = StarSystem::stub("Sol", 0);

        assert_eq!(
            WriteAction::classify(&record, &StoredStarSystem::placeholder("Sol", 0)),
            WriteAction::Reject
        );
        assert_eq!(
            WriteAction::classify(&record, &stored("Sol", 10477373803)),
            WriteAction::Reject
        );
    }

    /// Expect addresses outside the signed column range to be rejected
    #[test]
    fn rejects_out_of_range_addresses() {
        let record = StarSystem::stub("Sol", u64::MAX);

        assert_eq!(
            WriteAction::classify(&record, &StoredStarSystem::placeholder("Sol", u64::MAX)),
            WriteAction::Reject
        );
    }

    /// Expect a placeholder counterpart to classify as insert
    #[test]
    fn inserts_without_counterpart() {
        let record = StarSystem::stub("Sol", 10477373803);

        assert_eq!(
            WriteAction::classify(&record, &StoredStarSystem::placeholder("Sol", 10477373803)),
            WriteAction::Insert
        );
    }

    /// Expect a counterpart holding the same address to classify as update
    #[test]
    fn updates_matching_address() {
        let record = StarSystem::stub("Sol", 10477373803);

        assert_eq!(
            WriteAction::classify(&record, &stored("Sol", 10477373803)),
            WriteAction::Update
        );
    }

    /// Expect a name-only counterpart to be replaced under the new key
    #[test]
    fn replaces_name_only_counterpart() {
        let record = StarSystem::stub("Sol", 10477373803);
        let mut counterpart = stored("Sol", 0);
        counterpart.last_updated = Utc::now();

        assert_eq!(
            WriteAction::classify(&record, &counterpart),
            WriteAction::DeleteThenInsert
        );
    }
}
