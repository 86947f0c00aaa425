use sea_orm_migration::{prelude::*, schema::*, sea_orm::ConnectionTrait};

use crate::{
    m20251018_000001_create_starsystems_table::Starsystems,
    version::{schema_version, set_schema_version},
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        if schema_version(db).await? >= 2 {
            return Ok(());
        }

        // Columns may already exist on databases written by builds that skipped the version bump
        if !manager.has_column("starsystems", "comment").await? {
            manager
                .alter_table(
                    Table::alter()
                        .table(Starsystems::Table)
                        .add_column(text_null(Starsystems::Comment))
                        .to_owned(),
                )
                .await?;
        }

        if !manager.has_column("starsystems", "systemaddress").await? {
            manager
                .alter_table(
                    Table::alter()
                        .table(Starsystems::Table)
                        .add_column(big_integer_null(Starsystems::Systemaddress))
                        .to_owned(),
                )
                .await?;
        }

        set_schema_version(db, 2).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        for column in ["systemaddress", "comment"] {
            if manager.has_column("starsystems", column).await? {
                db.execute_unprepared(&format!("ALTER TABLE starsystems DROP COLUMN {column}"))
                    .await?;
            }
        }

        set_schema_version(db, 1).await
    }
}
