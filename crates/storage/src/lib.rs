#![forbid(unsafe_code)]

pub mod keys;
pub mod repository;
pub mod session_store;
pub mod sqlite;

pub use keys::StorageKey;
pub use repository::{InMemoryStore, KeyValueStore, Storage, StorageError};
pub use session_store::SessionStore;
