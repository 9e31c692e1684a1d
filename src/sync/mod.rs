//! Partner inventory fetching
//!
//! This module turns a (products × date window) request into a flat list
//! of availability records: transport client, window arithmetic, and the
//! fan-out pipeline that routes every per-day call through the shared
//! admission gate.

pub mod client;
pub mod pipeline;
pub mod window;

pub use client::{InventoryApi, PartnerClient};
pub use pipeline::FetchPipeline;
pub use window::{month_window, today_window, week_window};
