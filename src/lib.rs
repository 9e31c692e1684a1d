//! slotsync - Partner availability inventory sync engine
//!
//! Periodically pulls slot availability from a partner API and reconciles
//! it into a local inventory store, serving the result over a small REST
//! surface.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`gate`] - Admission gate: concurrency cap plus call pacing
//! - [`sync`] - Partner API client and the fetch pipeline
//! - [`storage`] - Inventory store and reconciliation
//! - [`scheduler`] - Periodic sync lanes with pause/resume
//! - [`server`] - REST API over scheduler state and stored inventory
//! - [`models`] - Core data structures and types
//!
//! # Example
//!
//! ```no_run
//! use slotsync::config::Config;
//! use slotsync::gate::AdmissionGate;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let gate = AdmissionGate::new(
//!         config.gate.max_concurrent,
//!         config.min_call_interval(),
//!     );
//!     let _ = gate;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod gate;
pub mod metrics;
pub mod models;
pub mod scheduler;
pub mod server;
pub mod storage;
pub mod sync;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Error, ErrorCategory, FetchError, Result};
    pub use crate::gate::AdmissionGate;
    pub use crate::models::{
        FetchRequest, FetchWindow, SlotAvailability, StoreOutcome, SyncState, SyncStatus,
    };
    pub use crate::scheduler::{Lane, SyncScheduler};
    pub use crate::storage::{InventoryStore, Reconciler, SharedInventoryStore};
    pub use crate::sync::client::{InventoryApi, PartnerClient};
    pub use crate::sync::pipeline::FetchPipeline;
}

// Direct re-exports for convenience
pub use models::{FetchRequest, FetchWindow, SlotAvailability, StoreOutcome};
