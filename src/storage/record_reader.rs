//! Record Reader
//!
//! Sequential iteration over the fixed-size slots of a backing file.

use std::io::{self, Read};

use crate::error::Result;
use crate::record::{RawRecord, RECORD_SIZE};

/// One slot read from the file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    /// A full slot holding a record (checksum not yet verified)
    Record(RawRecord),
    /// The all-zero filler in the second slot of the last page
    Erased,
    /// Fewer than [`RECORD_SIZE`] bytes left at end of file
    TruncatedTail(usize),
}

/// Iterator over the slots of a backing file, in file order.
///
/// An all-zero slot only counts as filler when it is the second slot of the
/// final page. Zeroed slots anywhere else come back as [`Slot::Record`] so
/// they fail checksum verification like any other damaged record.
pub struct RecordReader<R: Read> {
    reader: R,
    /// Bytes consumed so far
    offset: u64,
    /// Slot read ahead while checking for end of file
    peeked: Option<([u8; RECORD_SIZE], usize)>,
    done: bool,
}

impl<R: Read> RecordReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            offset: 0,
            peeked: None,
            done: false,
        }
    }

    /// File offset of the next slot
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Read until `buf` is full or EOF, returning the byte count
    fn fill(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }

    /// Next raw slot, taking the read-ahead one first
    fn take_slot(&mut self) -> io::Result<([u8; RECORD_SIZE], usize)> {
        if let Some(peeked) = self.peeked.take() {
            return Ok(peeked);
        }
        let mut slot = [0u8; RECORD_SIZE];
        let n = self.fill(&mut slot)?;
        Ok((slot, n))
    }

    /// True when nothing follows the slot just taken
    fn at_end(&mut self) -> io::Result<bool> {
        let mut slot = [0u8; RECORD_SIZE];
        let n = self.fill(&mut slot)?;
        if n == 0 {
            return Ok(true);
        }
        self.peeked = Some((slot, n));
        Ok(false)
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<Slot>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let slot_index = self.offset / RECORD_SIZE as u64;
        let (slot, n) = match self.take_slot() {
            Ok(taken) => taken,
            Err(e) => {
                self.done = true;
                return Some(Err(e.into()));
            }
        };
        self.offset += n as u64;

        if n == 0 {
            self.done = true;
            return None;
        }
        if n < RECORD_SIZE {
            self.done = true;
            return Some(Ok(Slot::TruncatedTail(n)));
        }
        if slot_index % 2 == 1 && RawRecord::is_erased(&slot) {
            match self.at_end() {
                Ok(true) => return Some(Ok(Slot::Erased)),
                Ok(false) => {}
                Err(e) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
            }
        }

        Some(RawRecord::parse(&slot).map(Slot::Record))
    }
}
