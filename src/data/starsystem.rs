use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
};

use crate::{
    error::Error,
    model::{
        payload::{decode, Decoded},
        StarSystem,
    },
};

/// Persistence-tier form of a star system: the serialized record plus the columns kept
/// alongside it for querying.
#[derive(Clone, Debug, PartialEq)]
pub struct StoredStarSystem {
    pub name: String,
    pub system_address: Option<u64>,
    /// Serialized [`StarSystem`]; empty for placeholder entries.
    pub payload: String,
    pub last_updated: DateTime<Utc>,
    pub last_visit: Option<DateTime<Utc>>,
    pub total_visits: u32,
    pub comment: Option<String>,
}

impl StoredStarSystem {
    /// Entry standing in for a record with no stored counterpart.
    pub fn placeholder(name: impl Into<String>, system_address: u64) -> Self {
        Self {
            name: name.into(),
            system_address: (system_address != 0).then_some(system_address),
            payload: String::new(),
            last_updated: DateTime::<Utc>::MIN_UTC,
            last_visit: None,
            total_visits: 0,
            comment: None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.payload.is_empty()
    }

    /// Serializes a record for persistence. `last_updated` falls back to `now` for records
    /// that were never refreshed from a remote authority.
    pub fn from_record(record: &StarSystem, now: DateTime<Utc>) -> Result<Self, Error> {
        if db_address(record.system_address).is_none() {
            return Err(Error::MissingIdentity {
                name: record.name.clone(),
                address: record.system_address,
            });
        }

        Ok(Self {
            name: record.name.clone(),
            system_address: Some(record.system_address),
            payload: serde_json::to_string(record)?,
            last_updated: record.last_updated.unwrap_or(now),
            last_visit: record.last_visit(),
            total_visits: u32::try_from(record.total_visits()).unwrap_or(u32::MAX),
            comment: record.comment.clone(),
        })
    }

    pub fn decode(&self) -> Decoded<StarSystem> {
        decode(&self.payload)
    }

    fn active_model(&self) -> entity::starsystems::ActiveModel {
        entity::starsystems::ActiveModel {
            name: ActiveValue::Set(self.name.clone()),
            totalvisits: ActiveValue::Set(i32::try_from(self.total_visits).unwrap_or(i32::MAX)),
            lastvisit: ActiveValue::Set(self.last_visit.map(|t| t.naive_utc())),
            starsystem: ActiveValue::Set(self.payload.clone()),
            starsystemlastupdated: ActiveValue::Set(self.last_updated.naive_utc()),
            comment: ActiveValue::Set(self.comment.clone()),
            systemaddress: ActiveValue::Set(self.system_address.and_then(db_address)),
            ..Default::default()
        }
    }
}

impl From<entity::starsystems::Model> for StoredStarSystem {
    fn from(model: entity::starsystems::Model) -> Self {
        Self {
            name: model.name,
            system_address: model
                .systemaddress
                .and_then(|address| u64::try_from(address).ok())
                .filter(|address| *address != 0),
            payload: model.starsystem,
            last_updated: model.starsystemlastupdated.and_utc(),
            last_visit: model.lastvisit.map(|t| t.and_utc()),
            total_visits: u32::try_from(model.totalvisits).unwrap_or_default(),
            comment: model.comment,
        }
    }
}

/// Column value for a system address. Zero and addresses beyond the signed range have no
/// column value and are never persisted.
pub fn db_address(address: u64) -> Option<i64> {
    i64::try_from(address).ok().filter(|address| *address != 0)
}

pub struct StarSystemRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> StarSystemRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn find_by_address(
        &self,
        address: i64,
    ) -> Result<Option<entity::starsystems::Model>, DbErr> {
        entity::prelude::Starsystems::find()
            .filter(entity::starsystems::Column::Systemaddress.eq(address))
            .one(self.db)
            .await
    }

    /// Finds the most recently updated row with the given name, case-insensitively.
    pub async fn find_by_name(
        &self,
        name: &str,
    ) -> Result<Option<entity::starsystems::Model>, DbErr> {
        entity::prelude::Starsystems::find()
            .filter(entity::starsystems::Column::Name.eq(name))
            .order_by_desc(entity::starsystems::Column::Starsystemlastupdated)
            .one(self.db)
            .await
    }

    /// Finds a row keyed only by name, written before its system address was known.
    pub async fn find_unaddressed_by_name(
        &self,
        name: &str,
    ) -> Result<Option<entity::starsystems::Model>, DbErr> {
        entity::prelude::Starsystems::find()
            .filter(entity::starsystems::Column::Name.eq(name))
            .filter(entity::starsystems::Column::Systemaddress.is_null())
            .one(self.db)
            .await
    }

    pub async fn insert(&self, row: &StoredStarSystem) -> Result<(), DbErr> {
        entity::prelude::Starsystems::insert(row.active_model())
            .exec_without_returning(self.db)
            .await?;

        Ok(())
    }

    /// Updates the row holding the stored system's address in place.
    ///
    /// # Returns
    /// - `Ok(u64)` - Number of rows updated, `0` when no row holds the address
    pub async fn update_by_address(&self, row: &StoredStarSystem) -> Result<u64, DbErr> {
        let Some(address) = row.system_address.and_then(db_address) else {
            return Ok(0);
        };

        let result = entity::prelude::Starsystems::update_many()
            .set(row.active_model())
            .filter(entity::starsystems::Column::Systemaddress.eq(address))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected)
    }

    /// Purges rows keyed only by name, superseded once the system address is known.
    pub async fn delete_unaddressed_by_name(&self, name: &str) -> Result<u64, DbErr> {
        let result = entity::prelude::Starsystems::delete_many()
            .filter(entity::starsystems::Column::Name.eq(name))
            .filter(entity::starsystems::Column::Systemaddress.is_null())
            .exec(self.db)
            .await?;

        Ok(result.rows_affected)
    }

    pub async fn delete_by_address(&self, address: i64) -> Result<u64, DbErr> {
        let result = entity::prelude::Starsystems::delete_many()
            .filter(entity::starsystems::Column::Systemaddress.eq(address))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected)
    }
}
