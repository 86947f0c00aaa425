//! Schema version bookkeeping.
//!
//! The schema version is the single integer SQLite keeps in `PRAGMA user_version`. Every
//! migration step checks it before touching the schema and bumps it once the step succeeds,
//! so databases that predate the migration-tracking table migrate the same way as new ones.

use sea_orm_migration::sea_orm::{
    ConnectionTrait, DbBackend, DbErr, FromQueryResult, QueryResult, Statement,
};

/// Version a fully migrated `starsystems` database reports.
pub const SCHEMA_VERSION: i32 = 3;

struct UserVersion(i32);

impl FromQueryResult for UserVersion {
    fn from_query_result(res: &QueryResult, pre: &str) -> Result<Self, DbErr> {
        Ok(Self(res.try_get(pre, "user_version")?))
    }
}

/// Reads the schema version stored in the database file, `0` for a fresh file.
pub async fn schema_version<C: ConnectionTrait>(db: &C) -> Result<i32, DbErr> {
    let version = UserVersion::find_by_statement(Statement::from_string(
        DbBackend::Sqlite,
        "PRAGMA user_version",
    ))
    .one(db)
    .await?;

    Ok(version.map(|v| v.0).unwrap_or_default())
}

/// Persists the schema version.
pub async fn set_schema_version<C: ConnectionTrait>(db: &C, version: i32) -> Result<(), DbErr> {
    db.execute_unprepared(&format!("PRAGMA user_version = {version}"))
        .await?;

    Ok(())
}
