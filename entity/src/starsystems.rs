//! `SeaORM` Entity for the `starsystems` table

use sea_orm::entity::prelude::*;

/// One persisted star system.
///
/// The table declares no primary key of its own; rows are addressed through SQLite's
/// implicit `rowid`, which is selected like a regular column.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "starsystems")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub rowid: i64,
    pub name: String,
    pub totalvisits: i32,
    pub lastvisit: Option<DateTime>,
    #[sea_orm(column_type = "Text")]
    pub starsystem: String,
    pub starsystemlastupdated: DateTime,
    #[sea_orm(column_type = "Text", nullable)]
    pub comment: Option<String>,
    #[sea_orm(nullable)]
    pub systemaddress: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
