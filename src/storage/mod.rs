//! Storage abstractions for lookup history.
//!
//! History is a small bounded list kept under one fixed key. Every update
//! is a read-modify-write of the whole list, and backends serialise those
//! updates so concurrent lookups cannot break the uniqueness or capacity
//! rules.
//!
//! ## Directory Structure
//!
//! ```text
//! storage/
//! ├── config.toml           # Tracker configuration
//! └── expressHistory.json   # Lookup history, newest first
//! ```

pub mod local;
pub mod memory;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::HistoryRecord;

// Re-export for convenience
pub use local::LocalHistoryStore;
pub use memory::MemoryHistoryStore;

/// Trait for lookup history backends.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Load history, newest first.
    async fn load(&self) -> Result<Vec<HistoryRecord>>;

    /// Insert an entry and return the updated list.
    async fn record(&self, entry: HistoryRecord) -> Result<Vec<HistoryRecord>>;

    /// Remove all entries.
    async fn clear(&self) -> Result<()>;
}
