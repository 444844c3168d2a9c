//! Storage Module
//!
//! Persistence of the record table to the backing file.
//!
//! ## Responsibilities
//! - Write records in fixed 2-record pages, the emulated flash write unit
//! - Read the file back slot by slot for the load pipeline
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ Page 0 (256 bytes, one write call)      │
//! │ ┌──────────────────┬──────────────────┐ │
//! │ │ Record (128)     │ Record (128)     │ │
//! │ └──────────────────┴──────────────────┘ │
//! ├─────────────────────────────────────────┤
//! │ Page 1                                  │
//! │ ┌──────────────────┬──────────────────┐ │
//! │ │ Record (128)     │ Filler (128 x 0) │ │
//! │ └──────────────────┴──────────────────┘ │
//! └─────────────────────────────────────────┘
//! ```
//!
//! No header, no record count, no version: the table ends where the file
//! ends. Tombstoned records are never written. A trailing odd record shares
//! its page with an all-zero filler slot, which the reader reports as
//! [`Slot::Erased`]. A zeroed slot anywhere else is treated as a damaged
//! record.

mod page_writer;
mod record_reader;

pub use page_writer::{PageSummary, PageWriter};
pub use record_reader::{RecordReader, Slot};

use crate::record::RECORD_SIZE;

/// Records per physical write
pub const PAGE_RECORDS: usize = 2;

/// Bytes per physical write
pub const PAGE_SIZE: usize = PAGE_RECORDS * RECORD_SIZE;
