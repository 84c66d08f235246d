//! In-memory volatile slots

use std::cell::RefCell;
use std::collections::HashMap;

use super::traits::KeyValueStore;
use crate::error::Result;

/// Volatile slot store, gone when its owner is dropped
#[derive(Debug, Default)]
pub struct MemorySlot {
    values: RefCell<HashMap<String, String>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemorySlot {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values.borrow_mut().remove(key);
        Ok(())
    }
}
