//! Declarative test builder.
//!
//! Queues schema and fixture setup for a [`TestSetup`], executed in order by `build()`.

use crate::{error::TestError, fixtures::starsystem::StarsystemRow, TestSetup};

/// Builder for database test environments.
///
/// Defaults to the current schema with no rows.
pub struct TestBuilder {
    schema_version: Option<u32>,
    untracked: bool,
    rows: Vec<StarsystemRow>,
}

impl TestBuilder {
    pub fn new() -> Self {
        Self {
            schema_version: None,
            untracked: false,
            rows: Vec::new(),
        }
    }

    /// Stop migrating at `version` instead of the current schema.
    ///
    /// # Arguments
    /// - `version` - Number of migrations to apply; `0` leaves the database empty
    pub fn with_schema_version(mut self, version: u32) -> Self {
        self.schema_version = Some(version);
        self
    }

    /// Drop migration tracking after migrating, so the next migrator run sees an
    /// untracked database that already has tables.
    pub fn untracked(mut self) -> Self {
        self.untracked = true;
        self
    }

    /// Insert a row after the schema is in place.
    pub fn with_row(mut self, row: StarsystemRow) -> Self {
        self.rows.push(row);
        self
    }

    /// Build the test setup.
    ///
    /// # Returns
    /// - `Ok(TestSetup)` - Database at the requested schema version holding the queued rows
    /// - `Err(TestError::DbErr)` - Migration or row insertion failed
    /// - `Err(TestError::Io)` - The temporary directory could not be created
    pub async fn build(self) -> Result<TestSetup, TestError> {
        let setup = TestSetup::new().await?;

        match self.schema_version {
            Some(version) => setup.with_schema_version(version).await?,
            None => setup.with_schema().await?,
        }

        if self.untracked {
            setup.execute("DROP TABLE IF EXISTS seaql_migrations").await?;
        }

        setup.insert_rows(&self.rows).await?;

        Ok(setup)
    }
}

impl Default for TestBuilder {
    fn default() -> Self {
        Self::new()
    }
}
