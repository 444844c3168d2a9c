//! Record Table Module
//!
//! The in-memory working copy of the store.
//!
//! ## Responsibilities
//! - Bounded, insertion-ordered storage of records
//! - Exact-match key lookup (tombstoned keys still match)
//! - Typed insert-or-update, tombstoning and reads
//!
//! ## Data Structure Choice
//! A `Vec<Record>` plus a `HashMap<Key, usize>` slot index:
//! - Slots `[0, len)` are always occupied (compact prefix), so the logical
//!   end of the table is simply `len`
//! - Tombstones keep their slot until the next reload; slots are never reused
//! - Slot order is the order records are written on commit

mod record_table;

pub use record_table::RecordTable;

/// Default number of record slots
pub const DEFAULT_CAPACITY: usize = 100;

/// Why [`RecordTable::push_loaded`] refused a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushRejection {
    /// Table already holds `capacity` records
    Full,
    /// Key is already present
    Duplicate,
}
