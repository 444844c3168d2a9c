//! Shared store handle
//!
//! [`NvsStore`] has no internal locking. `SharedStore` serializes whole calls
//! behind one mutex so several threads can use the same store.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::config::Config;
use crate::error::Result;
use crate::store::{CommitReport, LoadReport, NvsStore};

/// Cloneable, thread-safe handle to a single store
#[derive(Debug, Clone)]
pub struct SharedStore {
    inner: Arc<Mutex<NvsStore>>,
}

impl SharedStore {
    /// Wrap an existing store
    pub fn new(store: NvsStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Open a store and wrap it
    pub fn open(config: Config) -> Result<Self> {
        Ok(Self::new(NvsStore::open(config)?))
    }

    /// Hold the lock across several calls, e.g. a set followed by a commit
    pub fn lock(&self) -> MutexGuard<'_, NvsStore> {
        self.inner.lock()
    }

    pub fn init(&self) -> Result<LoadReport> {
        self.inner.lock().init()
    }

    pub fn deinit(&self) {
        self.inner.lock().deinit()
    }

    pub fn set_uint32(&self, key: &str, value: u32) -> Result<()> {
        self.inner.lock().set_uint32(key, value)
    }

    pub fn set_string(&self, key: &str, value: &str) -> Result<()> {
        self.inner.lock().set_string(key, value)
    }

    pub fn get_uint32(&self, key: &str) -> Result<u32> {
        self.inner.lock().get_uint32(key)
    }

    pub fn get_string(&self, key: &str, capacity: usize) -> Result<String> {
        self.inner.lock().get_string(key, capacity)
    }

    pub fn delete(&self, key: &str) -> Result<()> {
        self.inner.lock().delete(key)
    }

    pub fn commit(&self) -> Result<CommitReport> {
        self.inner.lock().commit()
    }
}
