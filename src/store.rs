//! Store Module
//!
//! The NVS store that ties the record table to its backing file.
//!
//! ## Responsibilities
//! - Load the backing file into the record table, dropping corrupt records
//! - Typed set/get/delete against the in-memory table
//! - Commit the table back to the file in 2-record pages
//!
//! ## Lifecycle
//! ```text
//!   init ──► set_* / get_* / delete ──► commit ──► (deinit) ──► init ...
//! ```
//! Mutations only touch memory. Nothing reaches the file until `commit`,
//! which rewrites it entirely. Tombstoned keys stay in the table until a
//! commit followed by a fresh `init`.

use std::fs::{self, OpenOptions};
use std::io::BufReader;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{NvsError, Result};
use crate::record::{Key, Record, TextValue, Value, ValueKind};
use crate::storage::{PageWriter, RecordReader, Slot};
use crate::table::{PushRejection, RecordTable};

/// Outcome of loading the backing file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Records placed in the table
    pub loaded: usize,
    /// Records dropped on checksum mismatch
    pub corrupted: usize,
    /// Checksum-valid records that could not be decoded, or repeated a key
    pub invalid: usize,
    /// Valid records dropped because the table was full
    pub overflow: usize,
    /// All-zero filler slots skipped
    pub filler_slots: usize,
    /// File ended part-way through a slot
    pub truncated_tail: bool,
}

impl LoadReport {
    /// True when every slot in the file was either loaded or filler
    pub fn is_clean(&self) -> bool {
        self.corrupted == 0 && self.invalid == 0 && self.overflow == 0 && !self.truncated_tail
    }
}

/// Outcome of a commit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitReport {
    /// Records written to the file
    pub records_written: usize,
    /// Tombstoned records left out
    pub tombstones_skipped: usize,
    /// Physical page writes
    pub pages_written: usize,
    /// Written records modified since the last load
    pub dirty_written: usize,
}

#[derive(Debug, Default, Clone, Copy)]
struct LoadOptions {
    /// Perturb every stored checksum before verification
    corrupt_checksums: bool,
}

/// A file-backed typed key/value store
///
/// Single-threaded: every mutation takes `&mut self`. Wrap it in a
/// [`SharedStore`](crate::SharedStore) to share across threads.
#[derive(Debug)]
pub struct NvsStore {
    config: Config,
    table: RecordTable,
}

impl NvsStore {
    /// Create a store with an empty table. Does not touch the file.
    pub fn new(config: Config) -> Result<Self> {
        if config.capacity == 0 {
            return Err(NvsError::Config(
                "record table capacity must be at least 1".to_string(),
            ));
        }

        let table = RecordTable::new(config.capacity);
        Ok(Self { config, table })
    }

    /// Create a store and load its backing file
    pub fn open(config: Config) -> Result<Self> {
        let mut store = Self::new(config)?;
        store.init()?;
        Ok(store)
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified backing file
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().data_file(path).build())
    }

    // =========================================================================
    // Load / Init
    // =========================================================================

    /// Rebuild the table from the backing file.
    ///
    /// A missing file is created empty. Corrupt records are logged, counted
    /// and skipped; only I/O failures make this return an error.
    pub fn init(&mut self) -> Result<LoadReport> {
        self.load(LoadOptions::default())
    }

    /// Like [`init`](Self::init), but every stored checksum is perturbed
    /// before verification so each record reads as corrupt.
    #[cfg(any(test, feature = "fault-injection"))]
    pub fn init_simulating_corruption(&mut self) -> Result<LoadReport> {
        self.load(LoadOptions {
            corrupt_checksums: true,
        })
    }

    fn load(&mut self, options: LoadOptions) -> Result<LoadReport> {
        self.table.clear();

        let path = &self.config.data_file;
        ensure_parent_dir(path)?;

        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(path)?;
        info!(path = %path.display(), "backing file open");

        let mut report = LoadReport::default();

        for (slot_no, slot) in RecordReader::new(BufReader::new(file)).enumerate() {
            let slot = match slot {
                Ok(slot) => slot,
                Err(e) => {
                    self.table.clear();
                    return Err(e);
                }
            };

            let mut raw = match slot {
                Slot::Record(raw) => raw,
                Slot::Erased => {
                    debug!(slot = slot_no, "filler slot skipped");
                    report.filler_slots += 1;
                    continue;
                }
                Slot::TruncatedTail(bytes) => {
                    warn!(slot = slot_no, bytes, "partial slot at end of file ignored");
                    report.truncated_tail = true;
                    continue;
                }
            };

            if options.corrupt_checksums {
                raw.checksum = raw.checksum.wrapping_sub(1);
            }

            if !raw.checksum_matches() {
                warn!(
                    slot = slot_no,
                    stored = raw.checksum,
                    computed = raw.computed_checksum(),
                    "corrupted record detected, dropping"
                );
                report.corrupted += 1;
                continue;
            }

            let record = match raw.decode() {
                Ok(record) => record,
                Err(e) => {
                    warn!(slot = slot_no, error = %e, "undecodable record dropped");
                    report.invalid += 1;
                    continue;
                }
            };

            let key = record.key().clone();
            let value = record.value().clone();
            match self.table.push_loaded(record) {
                Ok(index) => {
                    debug!(key = %key, value = %value, index, "record loaded");
                    report.loaded += 1;
                }
                Err(PushRejection::Duplicate) => {
                    warn!(key = %key, slot = slot_no, "duplicate key dropped");
                    report.invalid += 1;
                }
                Err(PushRejection::Full) => {
                    warn!(key = %key, capacity = self.table.capacity(), "table full, record dropped");
                    report.overflow += 1;
                }
            }
        }

        info!(
            loaded = report.loaded,
            corrupted = report.corrupted,
            invalid = report.invalid,
            overflow = report.overflow,
            "init complete"
        );
        Ok(report)
    }

    /// Release the in-memory table. Safe to call repeatedly.
    pub fn deinit(&mut self) {
        if !self.table.is_empty() {
            debug!(records = self.table.len(), "releasing record table");
        }
        self.table.clear();
    }

    // =========================================================================
    // Typed Access
    // =========================================================================

    /// Store an unsigned 32-bit value under `key`
    pub fn set_uint32(&mut self, key: &str, value: u32) -> Result<()> {
        let key = Key::new(key)?;
        self.table.insert_or_update(key, Value::Uint32(value))?;
        Ok(())
    }

    /// Store a string value under `key`
    pub fn set_string(&mut self, key: &str, value: &str) -> Result<()> {
        let key = Key::new(key)?;
        let value = TextValue::new(value)?;
        self.table.insert_or_update(key, Value::Text(value))?;
        Ok(())
    }

    /// Read the unsigned 32-bit value stored under `key`
    pub fn get_uint32(&self, key: &str) -> Result<u32> {
        let key = Key::new(key)?;
        match self.table.read(key.as_str(), ValueKind::Uint32)? {
            Value::Uint32(v) => Ok(v),
            other => Err(NvsError::TypeMismatch {
                key: key.to_string(),
                expected: ValueKind::Uint32,
                found: other.kind(),
            }),
        }
    }

    /// Read the string stored under `key`, cut to at most `capacity` bytes
    /// (never splitting a character)
    pub fn get_string(&self, key: &str, capacity: usize) -> Result<String> {
        let key = Key::new(key)?;
        match self.table.read(key.as_str(), ValueKind::String)? {
            Value::Text(text) => Ok(truncate_to(text.as_str(), capacity).to_string()),
            other => Err(NvsError::TypeMismatch {
                key: key.to_string(),
                expected: ValueKind::String,
                found: other.kind(),
            }),
        }
    }

    /// Tombstone `key`. It stays in the table, unreadable and unwritable,
    /// until the next commit and reload.
    pub fn delete(&mut self, key: &str) -> Result<()> {
        let key = Key::new(key)?;
        self.table.tombstone(key.as_str())
    }

    // =========================================================================
    // Commit
    // =========================================================================

    /// Rewrite the backing file from the table.
    ///
    /// Tombstones are skipped; every other record gets a fresh checksum. On
    /// an I/O error the commit stops at once and the file may be partially
    /// written.
    pub fn commit(&mut self) -> Result<CommitReport> {
        let path = &self.config.data_file;
        ensure_parent_dir(path)?;

        let mut writer = PageWriter::create(path)?;
        let mut report = CommitReport::default();

        for record in self.table.iter_mut() {
            if record.is_deleted() {
                report.tombstones_skipped += 1;
                continue;
            }

            record.refresh_checksum();
            if record.is_dirty() {
                report.dirty_written += 1;
            }
            writer.push(record)?;
        }

        let (file, summary) = writer.finish()?;
        if self.config.sync_on_commit {
            file.sync_all()?;
        }

        report.records_written = summary.records_written as usize;
        report.pages_written = summary.pages_written as usize;

        info!(
            path = %path.display(),
            records = report.records_written,
            pages = report.pages_written,
            tombstones_skipped = report.tombstones_skipped,
            "commit complete"
        );
        Ok(report)
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Path of the backing file
    pub fn data_file(&self) -> &Path {
        &self.config.data_file
    }

    /// Occupied slots, tombstones included
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Records that are not tombstoned
    pub fn live_count(&self) -> usize {
        self.table.live_count()
    }

    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Records in slot order
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.table.iter()
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn truncate_to(s: &str, capacity: usize) -> &str {
    if s.len() <= capacity {
        return s;
    }
    let mut end = capacity;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
