pub use sea_orm_migration::prelude::*;

mod m20251018_000001_create_starsystems_table;
mod m20251018_000002_add_starsystems_comment_and_address;
mod m20251018_000003_unique_starsystems_address;
mod version;

pub use version::{schema_version, set_schema_version, SCHEMA_VERSION};

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251018_000001_create_starsystems_table::Migration),
            Box::new(m20251018_000002_add_starsystems_comment_and_address::Migration),
            Box::new(m20251018_000003_unique_starsystems_address::Migration),
        ]
    }
}
