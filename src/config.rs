//! Configuration for the NVS emulator
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::table::DEFAULT_CAPACITY;

/// File name used when no backing file is configured
pub const DEFAULT_DATA_FILE: &str = "nvs_flash_crc.bin";

/// Main configuration for an NVS store
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Backing file holding the persisted records.
    /// Rewritten entirely on every commit.
    pub data_file: PathBuf,

    /// fsync the backing file at the end of every commit
    pub sync_on_commit: bool,

    // -------------------------------------------------------------------------
    // Record Table Configuration
    // -------------------------------------------------------------------------
    /// Number of record slots held in RAM (tombstones included)
    pub capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            sync_on_commit: true,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the backing file path
    pub fn data_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_file = path.into();
        self
    }

    /// Enable or disable fsync after commit
    pub fn sync_on_commit(mut self, sync: bool) -> Self {
        self.config.sync_on_commit = sync;
        self
    }

    /// Set the record table capacity
    pub fn capacity(mut self, slots: usize) -> Self {
        self.config.capacity = slots;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
