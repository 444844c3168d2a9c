//! Page Writer
//!
//! Buffers encoded records and writes them out one full page at a time.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use bytes::{BufMut, BytesMut};
use tracing::{debug, error};

use crate::error::Result;
use crate::record::{codec, Record};

use super::{PAGE_RECORDS, PAGE_SIZE};

/// Counters reported when a page writer finishes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageSummary {
    /// Records encoded into pages
    pub records_written: u64,
    /// Physical page writes issued
    pub pages_written: u64,
}

/// Writes records in [`PAGE_RECORDS`]-sized pages
pub struct PageWriter<W: Write = File> {
    /// Destination
    writer: W,
    /// Current page, at most [`PAGE_SIZE`] bytes
    page: BytesMut,
    /// Records in the current page
    buffered: usize,
    summary: PageSummary,
}

impl PageWriter<File> {
    /// Create (or truncate) the file at `path` and write pages into it
    pub fn create(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self::new(file))
    }
}

impl<W: Write> PageWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            page: BytesMut::with_capacity(PAGE_SIZE),
            buffered: 0,
            summary: PageSummary::default(),
        }
    }

    /// Encode `record` into the current page, flushing the page once full.
    ///
    /// The record is written with the checksum it currently carries.
    pub fn push(&mut self, record: &Record) -> Result<()> {
        codec::encode_record(record, &mut self.page);
        self.buffered += 1;
        self.summary.records_written += 1;

        if self.buffered == PAGE_RECORDS {
            self.flush_page()?;
        }

        Ok(())
    }

    /// Records waiting in the current page
    pub fn buffered(&self) -> usize {
        self.buffered
    }

    /// Flush a partial page (zero-filled) and hand back the writer
    pub fn finish(mut self) -> Result<(W, PageSummary)> {
        if self.buffered > 0 {
            self.flush_page()?;
        }
        self.writer.flush()?;

        Ok((self.writer, self.summary))
    }

    /// Zero-fill the unused slots, write the page in one call, reset it
    fn flush_page(&mut self) -> Result<()> {
        let filler = PAGE_SIZE - self.page.len();
        self.page.put_bytes(0, filler);

        if let Err(e) = self.writer.write_all(&self.page) {
            error!(page = self.summary.pages_written, error = %e, "page write failed");
            return Err(e.into());
        }

        debug!(
            page = self.summary.pages_written,
            records = self.buffered,
            "page written"
        );

        self.summary.pages_written += 1;
        self.page.clear();
        self.buffered = 0;
        Ok(())
    }
}
