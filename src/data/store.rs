use std::{path::Path, sync::Arc};

use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, TransactionTrait,
};
use tokio::sync::Mutex;

use crate::{
    data::{
        starsystem::{db_address, StarSystemRepository, StoredStarSystem},
        write::WriteAction,
    },
    error::Error,
    model::StarSystem,
};

/// Outcome of a [`StarSystemStore::save`] batch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SaveSummary {
    pub inserted: usize,
    pub updated: usize,
    pub replaced: usize,
    pub rejected: usize,
    pub failed: usize,
    /// Addresses of the records that were written.
    pub saved: Vec<u64>,
}

impl SaveSummary {
    pub fn written(&self) -> usize {
        self.inserted + self.updated + self.replaced
    }

    fn record(&mut self, action: WriteAction, address: u64) {
        match action {
            WriteAction::Insert => self.inserted += 1,
            WriteAction::Update => self.updated += 1,
            WriteAction::DeleteThenInsert => self.replaced += 1,
            WriteAction::Reject => return,
        }
        self.saved.push(address);
    }
}

/// Handle to the durable star system store.
///
/// The store is single-writer, multi-reader: every mutation takes the write guard shared by
/// all clones of the handle, while reads go straight to the connection pool and rely on
/// SQLite's transaction isolation. Engine failures are logged and absorbed; callers see
/// fewer rows or a [`SaveSummary`] with failures rather than errors.
#[derive(Clone)]
pub struct StarSystemStore {
    db: DatabaseConnection,
    write_lock: Arc<Mutex<()>>,
}

impl StarSystemStore {
    /// Wraps a connection whose schema is already migrated.
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Opens (creating if needed) the database file at `path` and migrates it to the
    /// current schema version.
    pub async fn open(path: &Path) -> Result<Self, Error> {
        let mut opt = ConnectOptions::new(format!("sqlite://{}?mode=rwc", path.display()));
        opt.sqlx_logging(false);

        let db = Database::connect(opt).await?;
        let store = Self::new(db);
        store.migrate().await?;

        Ok(store)
    }

    /// Applies pending schema migrations. Safe to run repeatedly.
    pub async fn migrate(&self) -> Result<(), Error> {
        let _guard = self.write_lock.lock().await;

        let from = migration::schema_version(&self.db).await?;
        Migrator::up(&self.db, None).await?;
        let to = migration::schema_version(&self.db).await?;

        if from != to {
            tracing::info!("Migrated star system database from version {} to {}", from, to);
        }

        Ok(())
    }

    pub async fn schema_version(&self) -> Result<i32, Error> {
        Ok(migration::schema_version(&self.db).await?)
    }

    /// Looks up stored rows by system address within one read transaction.
    ///
    /// A failed lookup is logged and skipped without aborting the batch; if the transaction
    /// cannot be opened at all the whole batch is treated as a miss.
    pub async fn find_by_addresses(&self, addresses: &[u64]) -> Vec<StoredStarSystem> {
        let txn = match self.db.begin().await {
            Ok(txn) => txn,
            Err(e) => {
                tracing::warn!("Failed to open read transaction for star systems: {}", e);
                return Vec::new();
            }
        };

        let repo = StarSystemRepository::new(&txn);
        let mut found = Vec::new();

        for &address in addresses {
            let Some(key) = db_address(address) else {
                continue;
            };

            match repo.find_by_address(key).await {
                Ok(Some(model)) => found.push(StoredStarSystem::from(model)),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!("Failed to look up star system {}: {}", address, e);
                }
            }
        }

        if let Err(e) = txn.commit().await {
            tracing::warn!("Failed to close read transaction for star systems: {}", e);
        }

        found
    }

    /// Looks up stored rows by name, case-insensitively. Same failure policy as
    /// [`find_by_addresses`](Self::find_by_addresses).
    pub async fn find_by_names(&self, names: &[String]) -> Vec<StoredStarSystem> {
        let txn = match self.db.begin().await {
            Ok(txn) => txn,
            Err(e) => {
                tracing::warn!("Failed to open read transaction for star systems: {}", e);
                return Vec::new();
            }
        };

        let repo = StarSystemRepository::new(&txn);
        let mut found = Vec::new();

        for name in names {
            match repo.find_by_name(name).await {
                Ok(Some(model)) => found.push(StoredStarSystem::from(model)),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!("Failed to look up star system {:?}: {}", name, e);
                }
            }
        }

        if let Err(e) = txn.commit().await {
            tracing::warn!("Failed to close read transaction for star systems: {}", e);
        }

        found
    }

    /// Finds the stored counterpart of every record: by address when the record has one,
    /// falling back to a row keyed only by the record's name.
    ///
    /// # Returns
    /// One entry per input record, in order; misses are
    /// [`placeholder`](StoredStarSystem::placeholder) entries with an empty payload.
    pub async fn find_matching(&self, records: &[StarSystem]) -> Vec<StoredStarSystem> {
        let repo = StarSystemRepository::new(&self.db);
        let mut matches = Vec::with_capacity(records.len());

        for record in records {
            let counterpart = match find_counterpart(&repo, record).await {
                Ok(Some(model)) => StoredStarSystem::from(model),
                Ok(None) => StoredStarSystem::placeholder(&record.name, record.system_address),
                Err(e) => {
                    tracing::warn!(
                        "Failed to look up stored counterpart of star system {:?} ({}): {}",
                        record.name,
                        record.system_address,
                        e
                    );
                    StoredStarSystem::placeholder(&record.name, record.system_address)
                }
            };
            matches.push(counterpart);
        }

        matches
    }

    /// Persists records, deciding per record whether it is inserted, updated in place, or
    /// replaced under its new key.
    ///
    /// Records without a usable system address are rejected with a warning. All writes of
    /// one call share a transaction; each record runs in its own savepoint so a failing
    /// record is rolled back and logged while the rest of the batch continues. If the
    /// batch itself cannot commit, nothing is written.
    pub async fn save(&self, records: &[StarSystem]) -> SaveSummary {
        let mut summary = SaveSummary::default();
        if records.is_empty() {
            return summary;
        }

        let _guard = self.write_lock.lock().await;

        let now = Utc::now();
        let counterparts = self.find_matching(records).await;
        let mut planned = Vec::with_capacity(records.len());

        for (record, counterpart) in records.iter().zip(counterparts) {
            let action = WriteAction::classify(record, &counterpart);
            if action == WriteAction::Reject {
                tracing::warn!(
                    "Refusing to persist star system {:?} without a system address ({})",
                    record.name,
                    record.system_address
                );
                summary.rejected += 1;
                continue;
            }

            match StoredStarSystem::from_record(record, now) {
                Ok(row) => planned.push((action, row)),
                Err(e) => {
                    tracing::warn!("Failed to serialize star system {:?}: {}", record.name, e);
                    summary.rejected += 1;
                }
            }
        }

        if planned.is_empty() {
            return summary;
        }

        match self.write_planned(&planned).await {
            Ok(written) => {
                summary.inserted = written.inserted;
                summary.updated = written.updated;
                summary.replaced = written.replaced;
                summary.failed = written.failed;
                summary.saved = written.saved;
            }
            Err(e) => {
                tracing::error!(
                    "Failed to save batch of {} star systems, rolled back: {}",
                    planned.len(),
                    e
                );
                summary.failed = planned.len();
            }
        }

        summary
    }

    /// Removes the row holding `address`. Returns whether a row was deleted.
    pub async fn delete_by_address(&self, address: u64) -> bool {
        let Some(key) = db_address(address) else {
            return false;
        };

        let _guard = self.write_lock.lock().await;

        match StarSystemRepository::new(&self.db)
            .delete_by_address(key)
            .await
        {
            Ok(deleted) => deleted > 0,
            Err(e) => {
                tracing::warn!("Failed to delete star system {}: {}", address, e);
                false
            }
        }
    }

    async fn write_planned(
        &self,
        planned: &[(WriteAction, StoredStarSystem)],
    ) -> Result<SaveSummary, Error> {
        let mut written = SaveSummary::default();
        let txn = self.db.begin().await?;

        for (action, row) in planned {
            let savepoint = txn.begin().await?;

            match apply(&savepoint, *action, row).await {
                Ok(()) => {
                    savepoint.commit().await?;
                    if let Some(address) = row.system_address {
                        written.record(*action, address);
                    }
                }
                Err(e) => {
                    savepoint.rollback().await?;
                    tracing::warn!(
                        "Failed to write star system {:?} ({:?}): {}",
                        row.name,
                        row.system_address,
                        e
                    );
                    written.failed += 1;
                }
            }
        }

        txn.commit().await?;

        Ok(written)
    }
}

async fn find_counterpart<C: ConnectionTrait>(
    repo: &StarSystemRepository<'_, C>,
    record: &StarSystem,
) -> Result<Option<entity::starsystems::Model>, DbErr> {
    match db_address(record.system_address) {
        Some(address) => match repo.find_by_address(address).await? {
            Some(model) => Ok(Some(model)),
            None => repo.find_unaddressed_by_name(&record.name).await,
        },
        None => repo.find_by_name(&record.name).await,
    }
}

async fn apply<C: ConnectionTrait>(
    db: &C,
    action: WriteAction,
    row: &StoredStarSystem,
) -> Result<(), Error> {
    let repo = StarSystemRepository::new(db);

    match action {
        WriteAction::Insert => repo.insert(row).await?,
        WriteAction::Update => {
            if repo.update_by_address(row).await? == 0 {
                return Err(Error::InternalError(format!(
                    "star system {:?} classified as update but no row holds its address",
                    row.name
                )));
            }
        }
        WriteAction::DeleteThenInsert => {
            repo.delete_unaddressed_by_name(&row.name).await?;
            repo.insert(row).await?;
        }
        WriteAction::Reject => {
            return Err(Error::MissingIdentity {
                name: row.name.clone(),
                address: row.system_address.unwrap_or_default(),
            });
        }
    }

    Ok(())
}
