use sea_orm_migration::{prelude::*, schema::*};

use crate::version::{schema_version, set_schema_version};

static IDX_STARSYSTEMS_NAME: &str = "idx_starsystems_name";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        if schema_version(db).await? >= 1 {
            return Ok(());
        }

        manager
            .create_table(
                Table::create()
                    .table(Starsystems::Table)
                    .if_not_exists()
                    .col(text(Starsystems::Name).extra("COLLATE NOCASE"))
                    .col(integer(Starsystems::Totalvisits))
                    .col(date_time_null(Starsystems::Lastvisit))
                    .col(text(Starsystems::Starsystem))
                    .col(date_time(Starsystems::Starsystemlastupdated))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_STARSYSTEMS_NAME)
                    .table(Starsystems::Table)
                    .col(Starsystems::Name)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        set_schema_version(db, 1).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Starsystems::Table).if_exists().to_owned())
            .await?;

        set_schema_version(manager.get_connection(), 0).await
    }
}

#[derive(DeriveIden)]
pub enum Starsystems {
    Table,
    Name,
    Totalvisits,
    Lastvisit,
    Starsystem,
    Starsystemlastupdated,
    Comment,
    Systemaddress,
}
