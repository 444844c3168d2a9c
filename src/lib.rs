//! # nvs-emu
//!
//! A file-backed emulator of embedded non-volatile storage (NVS):
//! - Typed key/value records (`u32` or short strings) held in a bounded RAM table
//! - Tombstone deletes that take effect on the next commit and reload
//! - Fixed 128-byte records with a CRC-32 over each payload
//! - Whole-file commits written in 2-record pages
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        NvsStore                              │
//! │      init / set_* / get_* / delete / commit / deinit         │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │ RecordTable │          │   Storage   │
//!   │ (RAM, ≤100) │          │ Reader/Page │
//!   └─────────────┘          │   Writer    │
//!                            └──────┬──────┘
//!                                   │
//!                                   ▼
//!                           ┌─────────────┐
//!                           │ Backing file│
//!                           │ (CRC slots) │
//!                           └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use nvs_emu::{Config, NvsStore};
//!
//! let config = Config::builder().data_file("nvs_flash_crc.bin").build();
//! let mut store = NvsStore::open(config)?;
//!
//! store.set_uint32("sample_rate", 44100)?;
//! store.set_string("name", "Paul-M")?;
//! assert_eq!(store.get_uint32("sample_rate")?, 44100);
//!
//! store.commit()?;
//! # Ok::<(), nvs_emu::NvsError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod checksum;
pub mod record;
pub mod table;
pub mod storage;
pub mod store;
pub mod shared;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ErrorKind, NvsError, Result};
pub use config::Config;
pub use record::{Key, Record, TextValue, Value, ValueKind};
pub use store::{CommitReport, LoadReport, NvsStore};
pub use shared::SharedStore;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of nvs-emu
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
