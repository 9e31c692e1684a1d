//! Durable storage for reconciled inventory
//!
//! Trait-based store abstraction with a SQLite implementation for
//! production and an in-memory implementation for tests, plus the
//! reconciler that upserts fetched records through it.

pub mod reconcile;
pub mod repository;

pub use reconcile::Reconciler;
pub use repository::{
    create_memory_store, create_sqlite_store, DatePrice, InventoryStore, InventoryTx,
    MemoryInventoryStore, SharedInventoryStore, SqliteInventoryStore, StoredPaxLine, StoredSlot,
};
