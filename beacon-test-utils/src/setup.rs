use std::path::PathBuf;

use migration::{Migrator, MigratorTrait};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend, FromQueryResult,
    Statement,
};
use tempfile::TempDir;

use crate::{error::TestError, fixtures::starsystem::StarsystemRow};

/// File-backed SQLite database living in its own temporary directory.
///
/// The directory and database file are removed when the setup is dropped.
pub struct TestSetup {
    pub db: DatabaseConnection,
    pub db_path: PathBuf,
    _dir: TempDir,
}

/// One schema object as recorded in `sqlite_master`.
#[derive(Clone, Debug, PartialEq, Eq, FromQueryResult)]
pub struct SchemaObject {
    pub kind: String,
    pub name: String,
    pub sql: Option<String>,
}

#[derive(FromQueryResult)]
struct ColumnName {
    name: String,
}

#[derive(FromQueryResult)]
struct RowCount {
    count: i64,
}

impl TestSetup {
    /// Creates an empty database with no tables.
    pub async fn new() -> Result<Self, TestError> {
        let dir = tempfile::tempdir()?;
        let db_path = dir.path().join("starsystems.sqlite");
        let db = Self::connect(&db_path).await?;

        Ok(Self {
            db,
            db_path,
            _dir: dir,
        })
    }

    async fn connect(path: &std::path::Path) -> Result<DatabaseConnection, TestError> {
        let mut opt = ConnectOptions::new(format!("sqlite://{}?mode=rwc", path.display()));
        opt.sqlx_logging(false);

        Ok(Database::connect(opt).await?)
    }

    /// Opens a second, independent connection to the same database file.
    pub async fn reconnect(&self) -> Result<DatabaseConnection, TestError> {
        Self::connect(&self.db_path).await
    }

    /// Migrates the database to the current schema.
    pub async fn with_schema(&self) -> Result<(), TestError> {
        Migrator::up(&self.db, None).await?;
        Ok(())
    }

    /// Applies only the first `version` migrations.
    pub async fn with_schema_version(&self, version: u32) -> Result<(), TestError> {
        if version > 0 {
            Migrator::up(&self.db, Some(version)).await?;
        }
        Ok(())
    }

    pub async fn execute(&self, sql: &str) -> Result<(), TestError> {
        self.db.execute_unprepared(sql).await?;
        Ok(())
    }

    pub async fn schema_version(&self) -> Result<i32, TestError> {
        Ok(migration::schema_version(&self.db).await?)
    }

    /// Inserts a row directly, writing only the columns the current schema has.
    pub async fn insert_row(&self, row: &StarsystemRow) -> Result<(), TestError> {
        let columns = self.table_columns("starsystems").await?;
        let sql = row.insert_sql(&columns);

        self.execute(&sql).await
    }

    pub async fn insert_rows(&self, rows: &[StarsystemRow]) -> Result<(), TestError> {
        for row in rows {
            self.insert_row(row).await?;
        }
        Ok(())
    }

    /// Column names of `table`, in declaration order.
    pub async fn table_columns(&self, table: &str) -> Result<Vec<String>, TestError> {
        let columns = ColumnName::find_by_statement(Statement::from_string(
            DbBackend::Sqlite,
            format!("SELECT name FROM pragma_table_info('{table}')"),
        ))
        .all(&self.db)
        .await?;

        Ok(columns.into_iter().map(|c| c.name).collect())
    }

    /// Tables and indexes in the database, excluding SQLite and migration bookkeeping.
    pub async fn schema_snapshot(&self) -> Result<Vec<SchemaObject>, TestError> {
        Ok(SchemaObject::find_by_statement(Statement::from_string(
            DbBackend::Sqlite,
            "SELECT type AS kind, name, sql FROM sqlite_master \
             WHERE name NOT LIKE 'sqlite_%' AND name != 'seaql_migrations' \
             ORDER BY name"
                .to_string(),
        ))
        .all(&self.db)
        .await?)
    }

    pub async fn count_rows(&self) -> Result<i64, TestError> {
        let count = RowCount::find_by_statement(Statement::from_string(
            DbBackend::Sqlite,
            "SELECT COUNT(*) AS count FROM starsystems".to_string(),
        ))
        .one(&self.db)
        .await?;

        Ok(count.map(|c| c.count).unwrap_or_default())
    }
}

#[macro_export]
macro_rules! test_setup_with_schema {
    // Pattern 1: Current schema
    () => {{
        async {
            let setup = $crate::TestSetup::new().await?;
            setup.with_schema().await?;

            Ok::<_, $crate::error::TestError>(setup)
        }
        .await
    }};

    // Pattern 2: Schema at a specific version
    ($version:expr) => {{
        async {
            let setup = $crate::TestSetup::new().await?;
            setup.with_schema_version($version).await?;

            Ok::<_, $crate::error::TestError>(setup)
        }
        .await
    }};
}
