use sea_orm_migration::{
    prelude::*,
    sea_orm::{ConnectionTrait, TransactionTrait},
};

use crate::version::{schema_version, set_schema_version};

static IDX_STARSYSTEMS_SYSTEMADDRESS: &str = "idx_starsystems_systemaddress";

/// SQLite cannot add a UNIQUE constraint with `ALTER TABLE`, so the table is rebuilt:
/// renamed aside, recreated with the constraints, refilled with distinct rows, then dropped.
const REBUILD_STATEMENTS: [&str; 7] = [
    "ALTER TABLE starsystems RENAME TO starsystems_v2",
    "DROP INDEX IF EXISTS idx_starsystems_name",
    "CREATE TABLE starsystems (
        name TEXT NOT NULL COLLATE NOCASE,
        totalvisits INT NOT NULL,
        lastvisit DATETIME,
        starsystem TEXT NOT NULL,
        starsystemlastupdated DATETIME NOT NULL,
        comment TEXT,
        systemaddress INT UNIQUE,
        UNIQUE(name, systemaddress)
    )",
    // Zero was written as a placeholder address by old builds; it must not collide
    "INSERT OR IGNORE INTO starsystems
        (name, totalvisits, lastvisit, starsystem, starsystemlastupdated, comment, systemaddress)
     SELECT DISTINCT
        name, totalvisits, lastvisit, starsystem, starsystemlastupdated, comment, NULLIF(systemaddress, 0)
     FROM starsystems_v2",
    "DROP TABLE starsystems_v2",
    "CREATE INDEX IF NOT EXISTS idx_starsystems_name ON starsystems (name COLLATE NOCASE)",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_starsystems_systemaddress
        ON starsystems (systemaddress) WHERE systemaddress IS NOT NULL",
];

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        if schema_version(db).await? >= 3 {
            return Ok(());
        }

        // Dropping the transaction on error rolls the whole rebuild back
        let txn = db.begin().await?;
        for statement in REBUILD_STATEMENTS {
            txn.execute_unprepared(statement).await?;
        }
        set_schema_version(&txn, 3).await?;
        txn.commit().await?;

        db.execute_unprepared("PRAGMA optimize").await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // The table-level UNIQUE constraints stay; only the partial index is removable in place
        db.execute_unprepared(&format!(
            "DROP INDEX IF EXISTS {IDX_STARSYSTEMS_SYSTEMADDRESS}"
        ))
        .await?;

        set_schema_version(db, 2).await
    }
}
