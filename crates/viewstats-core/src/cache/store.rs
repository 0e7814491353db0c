use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock, RwLockReadGuard};

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, error, warn};

use super::records::{StatisticsRecord, UserRecord};
use super::StoreError;

/// The record kinds the store knows how to hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RecordKind {
    Users,
    Statistics,
}

impl RecordKind {
    pub fn name(&self) -> &'static str {
        match self {
            RecordKind::Users => "users",
            RecordKind::Statistics => "statistics",
        }
    }

    fn file_name(&self) -> String {
        format!("{}.json", self.name())
    }
}

/// A stored record type: its kind, primary key, and where its table lives.
pub trait Record: Debug + Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    type Key: Ord + Clone + Debug + Send + Sync;

    const KIND: RecordKind;

    fn key(&self) -> Self::Key;

    fn table(tables: &Tables) -> &Table<Self>;

    fn table_mut(tables: &mut Tables) -> &mut Table<Self>;
}

/// On-disk envelope for one collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

/// Rows of one record kind ordered by primary key, plus the last commit time.
#[derive(Debug, Clone)]
pub struct Table<R: Record> {
    rows: BTreeMap<R::Key, R>,
    cached_at: Option<DateTime<Utc>>,
}

impl<R: Record> Default for Table<R> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            cached_at: None,
        }
    }
}

impl<R: Record> Table<R> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cached_at(&self) -> Option<DateTime<Utc>> {
        self.cached_at
    }
}

#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub(crate) users: Table<UserRecord>,
    pub(crate) statistics: Table<StatisticsRecord>,
}

impl Tables {
    fn stamp(&mut self, kind: RecordKind, at: DateTime<Utc>) {
        match kind {
            RecordKind::Users => self.users.cached_at = Some(at),
            RecordKind::Statistics => self.statistics.cached_at = Some(at),
        }
    }

    fn cached_at(&self, kind: RecordKind) -> Option<DateTime<Utc>> {
        match kind {
            RecordKind::Users => self.users.cached_at,
            RecordKind::Statistics => self.statistics.cached_at,
        }
    }

    fn encode(&self, kind: RecordKind) -> Result<String, StoreError> {
        match kind {
            RecordKind::Users => encode_table(&self.users),
            RecordKind::Statistics => encode_table(&self.statistics),
        }
    }
}

enum Backend {
    /// Store failed to initialize: reads are empty, writes are discarded
    Unavailable,
    Memory,
    Disk(PathBuf),
}

/// Scoped write transaction over a private copy of the tables.
///
/// Changes become visible only when the closure passed to
/// [`PersistentStore::write`] returns `Ok`.
pub struct WriteTxn {
    tables: Tables,
    touched: BTreeSet<RecordKind>,
}

impl WriteTxn {
    /// Insert or overwrite by primary key
    pub fn add<R: Record>(&mut self, record: R) {
        R::table_mut(&mut self.tables).rows.insert(record.key(), record);
        self.touched.insert(R::KIND);
    }

    pub fn add_all<R: Record>(&mut self, records: impl IntoIterator<Item = R>) {
        let table = R::table_mut(&mut self.tables);
        for record in records {
            table.rows.insert(record.key(), record);
        }
        self.touched.insert(R::KIND);
    }

    pub fn update<R: Record>(&mut self, record: R) {
        self.add(record);
    }

    pub fn find<R: Record>(&self, key: &R::Key) -> Option<&R> {
        R::table(&self.tables).rows.get(key)
    }

    pub fn count<R: Record>(&self) -> usize {
        R::table(&self.tables).len()
    }

    pub fn delete<R: Record>(&mut self, key: &R::Key) -> bool {
        let removed = R::table_mut(&mut self.tables).rows.remove(key).is_some();
        if removed {
            self.touched.insert(R::KIND);
        }
        removed
    }

    pub fn delete_all<R: Record>(&mut self) {
        R::table_mut(&mut self.tables).rows.clear();
        self.touched.insert(R::KIND);
    }

    pub fn delete_all_data(&mut self) {
        self.delete_all::<UserRecord>();
        self.delete_all::<StatisticsRecord>();
    }
}

/// Keyed, transactional store shared by both repositories.
///
/// Writers are serialized; each write works on a copy and swaps it in under
/// a short exclusive lock once the touched files are on disk. Readers see
/// either the state before a transaction or the state after it.
pub struct PersistentStore {
    backend: Backend,
    tables: RwLock<Tables>,
    writer: Mutex<()>,
}

impl PersistentStore {
    /// Open (or create) a store in `dir`, loading any collection files present
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        let tables = Tables {
            users: load_table(&dir)?,
            statistics: load_table(&dir)?,
        };
        debug!(
            dir = %dir.display(),
            users = tables.users.len(),
            statistics = tables.statistics.len(),
            "Opened store"
        );

        Ok(Self::with_backend(Backend::Disk(dir), tables))
    }

    /// Open a store, degrading to an unavailable one if it cannot be initialized
    pub fn open_or_unavailable(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        match Self::open(dir.clone()) {
            Ok(store) => store,
            Err(e) => {
                error!(dir = %dir.display(), error = %e, "Failed to open store, continuing without cache");
                Self::unavailable()
            }
        }
    }

    /// Store that never touches the filesystem
    pub fn in_memory() -> Self {
        Self::with_backend(Backend::Memory, Tables::default())
    }

    pub fn unavailable() -> Self {
        Self::with_backend(Backend::Unavailable, Tables::default())
    }

    fn with_backend(backend: Backend, tables: Tables) -> Self {
        Self {
            backend,
            tables: RwLock::new(tables),
            writer: Mutex::new(()),
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self.backend, Backend::Unavailable)
    }

    pub fn dir(&self) -> Option<&Path> {
        match &self.backend {
            Backend::Disk(dir) => Some(dir),
            _ => None,
        }
    }

    fn read_tables(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables.read().map_err(|_| StoreError::Poisoned)
    }

    // ===== Reads =====

    pub fn fetch_all<R: Record>(&self) -> Result<Vec<R>, StoreError> {
        let tables = self.read_tables()?;
        Ok(R::table(&tables).rows.values().cloned().collect())
    }

    pub fn find<R: Record>(&self, key: &R::Key) -> Result<Option<R>, StoreError> {
        let tables = self.read_tables()?;
        Ok(R::table(&tables).rows.get(key).cloned())
    }

    pub fn count<R: Record>(&self) -> Result<usize, StoreError> {
        let tables = self.read_tables()?;
        Ok(R::table(&tables).len())
    }

    /// When the collection was last committed, if ever
    pub fn cached_at(&self, kind: RecordKind) -> Result<Option<DateTime<Utc>>, StoreError> {
        let tables = self.read_tables()?;
        Ok(tables.cached_at(kind))
    }

    // ===== Writes =====

    /// Run `f` as one atomic write transaction.
    ///
    /// If `f` returns an error, or the touched collections cannot be
    /// persisted, nothing is applied.
    pub fn write<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut WriteTxn) -> Result<T, StoreError>,
    {
        let _writer = self.writer.lock().map_err(|_| StoreError::Poisoned)?;

        let snapshot = self.read_tables()?.clone();
        let mut txn = WriteTxn {
            tables: snapshot,
            touched: BTreeSet::new(),
        };
        let value = f(&mut txn)?;

        let WriteTxn { mut tables, touched } = txn;
        if touched.is_empty() {
            return Ok(value);
        }

        let dir = match &self.backend {
            Backend::Unavailable => {
                warn!(kinds = ?touched, "Store unavailable, write discarded");
                return Ok(value);
            }
            Backend::Memory => None,
            Backend::Disk(dir) => Some(dir),
        };

        let now = Utc::now();
        for kind in &touched {
            tables.stamp(*kind, now);
        }
        if let Some(dir) = dir {
            persist(dir, &tables, &touched)?;
        }

        *self.tables.write().map_err(|_| StoreError::Poisoned)? = tables;
        debug!(kinds = ?touched, "Write transaction committed");
        Ok(value)
    }

    pub fn add<R: Record>(&self, record: R) -> Result<(), StoreError> {
        self.write(|txn| {
            txn.add(record);
            Ok(())
        })
    }

    pub fn add_all<R: Record>(&self, records: Vec<R>) -> Result<(), StoreError> {
        self.write(|txn| {
            txn.add_all(records);
            Ok(())
        })
    }

    pub fn update<R: Record>(&self, record: R) -> Result<(), StoreError> {
        self.write(|txn| {
            txn.update(record);
            Ok(())
        })
    }

    /// Remove one record, returning whether it existed
    pub fn delete<R: Record>(&self, key: &R::Key) -> Result<bool, StoreError> {
        self.write(|txn| Ok(txn.delete::<R>(key)))
    }

    pub fn delete_all<R: Record>(&self) -> Result<(), StoreError> {
        self.write(|txn| {
            txn.delete_all::<R>();
            Ok(())
        })
    }

    /// Clear every collection in one transaction
    pub fn delete_all_data(&self) -> Result<(), StoreError> {
        self.write(|txn| {
            txn.delete_all_data();
            Ok(())
        })
    }

    /// Clear a collection and insert `records` as one transaction
    pub fn replace_all<R: Record>(&self, records: Vec<R>) -> Result<(), StoreError> {
        self.write(|txn| {
            txn.delete_all::<R>();
            txn.add_all(records);
            Ok(())
        })
    }

    // ===== Cache Age Information =====

    pub fn cache_ages(&self) -> CacheAges {
        let now = Utc::now();
        let age = |kind: RecordKind| match self.cached_at(kind) {
            Ok(at) => at.map(|at| age_display(at, now)),
            Err(e) => {
                debug!(kind = kind.name(), error = %e, "Failed to read cache age");
                None
            }
        };

        CacheAges {
            users: age(RecordKind::Users),
            statistics: age(RecordKind::Statistics),
        }
    }

    #[cfg(test)]
    pub(crate) fn poison(&self) {
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = self.tables.write();
            panic!("poisoning store lock");
        }));
    }
}

fn encode_table<R: Record>(table: &Table<R>) -> Result<String, StoreError> {
    let envelope = CachedData {
        data: table.rows.values().collect::<Vec<&R>>(),
        cached_at: table.cached_at.unwrap_or_else(Utc::now),
    };
    Ok(serde_json::to_string_pretty(&envelope)?)
}

fn load_table<R: Record>(dir: &Path) -> Result<Table<R>, StoreError> {
    let path = dir.join(R::KIND.file_name());
    if !path.exists() {
        return Ok(Table::default());
    }

    let contents = fs::read_to_string(&path)?;
    let cached: CachedData<Vec<R>> = serde_json::from_str(&contents)?;

    Ok(Table {
        rows: cached.data.into_iter().map(|r| (r.key(), r)).collect(),
        cached_at: Some(cached.cached_at),
    })
}

/// Write every touched collection to a temp file, then rename them all into place.
///
/// If a rename fails, collections already renamed are restored from their
/// backups so the files match the previous commit. A crash between two
/// renames is not covered: after a restart the collections may come from
/// different commits.
fn persist(dir: &Path, tables: &Tables, touched: &BTreeSet<RecordKind>) -> Result<(), StoreError> {
    let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(touched.len());

    for kind in touched {
        let path = dir.join(kind.file_name());
        let tmp = path.with_extension("json.tmp");
        let written = tables
            .encode(*kind)
            .and_then(|contents| fs::write(&tmp, contents).map_err(StoreError::from));
        if let Err(e) = written {
            for (tmp, _) in &staged {
                let _ = fs::remove_file(tmp);
            }
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }
        staged.push((tmp, path));
    }

    let mut committed: Vec<(&Path, Option<PathBuf>)> = Vec::with_capacity(staged.len());
    for (tmp, path) in &staged {
        match commit_file(tmp, path) {
            Ok(backup) => committed.push((path.as_path(), backup)),
            Err(e) => {
                for (tmp, _) in &staged {
                    let _ = fs::remove_file(tmp);
                }
                for (path, backup) in committed.into_iter().rev() {
                    restore_file(path, backup);
                }
                return Err(e);
            }
        }
    }

    for backup in committed.into_iter().filter_map(|(_, backup)| backup) {
        let _ = fs::remove_file(backup);
    }
    Ok(())
}

/// Rename `tmp` over `path`, keeping a copy of the old file if there was one
fn commit_file(tmp: &Path, path: &Path) -> Result<Option<PathBuf>, StoreError> {
    let backup = if path.is_file() {
        let backup = path.with_extension("json.bak");
        fs::copy(path, &backup)?;
        Some(backup)
    } else {
        None
    };

    if let Err(e) = fs::rename(tmp, path) {
        if let Some(backup) = &backup {
            let _ = fs::remove_file(backup);
        }
        return Err(e.into());
    }
    Ok(backup)
}

fn restore_file(path: &Path, backup: Option<PathBuf>) {
    let restored = match backup {
        Some(backup) => fs::rename(&backup, path),
        None => fs::remove_file(path),
    };
    if let Err(e) = restored {
        error!(path = %path.display(), error = %e, "Failed to roll back collection file");
    }
}

/// Human readable age of a cache timestamp
pub fn age_display(cached_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - cached_at).num_minutes();
    if minutes < 1 {
        // Also covers clock skew
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 1440 {
        let hours = minutes / 60;
        if minutes % 60 >= 30 {
            format!("{}h ago", hours + 1)
        } else {
            format!("{}h ago", hours)
        }
    } else {
        let days = minutes / 1440;
        if (minutes % 1440) / 60 >= 12 {
            format!("{}d ago", days + 1)
        } else {
            format!("{}d ago", days)
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheAges {
    pub users: Option<String>,
    pub statistics: Option<String>,
}

impl CacheAges {
    pub fn users_age(&self) -> String {
        self.users.clone().unwrap_or_else(|| "never".to_string())
    }

    pub fn statistics_age(&self) -> String {
        self.statistics.clone().unwrap_or_else(|| "never".to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================
