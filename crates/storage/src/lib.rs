#![forbid(unsafe_code)]

pub mod repository;
pub mod snapshot;
pub mod sqlite;

pub use repository::{InMemoryRepository, SnapshotStore, Storage, StorageError};
pub use snapshot::SessionSnapshotRecord;
