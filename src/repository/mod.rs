// ==========================================
// Kitchen AI - Repository Layer
// ==========================================
// Storage port + adapters. No business rules, rows only.
// ==========================================

pub mod error;
pub mod memory_store;
pub mod sqlite_store;
pub mod storage_port;

pub use error::{RepositoryError, RepositoryResult};
pub use memory_store::InMemoryStore;
pub use sqlite_store::SqliteStore;
pub use storage_port::StoragePort;
