//! Storage slot traits
//!
//! A slot store is a flat map of named string values. The record store only
//! needs get/set/remove, so any backend (SQLite file, in-memory map, a future
//! remote service) can stand in for the browser's storage areas.

use crate::error::Result;

/// Named string slots
pub trait KeyValueStore {
    /// Read a slot, `None` when it has never been written or was removed
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite a slot
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a slot. Removing an absent slot is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// Write `new` only if the slot currently holds `expected`.
    ///
    /// Returns `false` without writing when the slot changed underneath.
    /// The provided implementation is not atomic; backends with transactions
    /// override it.
    fn compare_and_swap(&self, key: &str, expected: Option<&str>, new: &str) -> Result<bool> {
        let current = self.get(key)?;
        if current.as_deref() != expected {
            return Ok(false);
        }
        self.set(key, new)?;
        Ok(true)
    }
}
