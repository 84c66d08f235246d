//! Slot storage layer for Mitra
//!
//! Two independent slot stores back the record store: a durable one
//! (SQLite file) for the user list and a volatile one (in-memory) for the
//! active session.

mod memory;
mod migrations;
mod sqlite;
mod traits;

pub use memory::MemorySlot;
pub use sqlite::SqliteSlot;
pub use traits::KeyValueStore;

/// Durable slot holding the serialized user list
pub const USERS_SLOT: &str = "studymitra_users";

/// Volatile slot holding the serialized active session
pub const SESSION_SLOT: &str = "studymitra_session";
