//! Deal sync library
//!
//! Reconciles a local deal export against the deals held by a Pipedrive
//! CRM and pushes only the records that differ, in throttled batches.

pub mod config;
pub mod core;
pub mod error;
pub mod services;
pub mod sync_impl;
pub mod traits;
pub mod types;

// Re-export main types
pub use config::{Layout, SyncConfig};
pub use error::{SyncError, SyncResult};
pub use sync_impl::{DealSync, EXIT_OK, EXIT_PARTIAL_FAILURE, SyncOptions, exit_code, log_summary};
pub use traits::*;
pub use types::*;
