//! Shared types for the deal synchronisation workspace
//!
//! Holds the canonical deal value types that every stage of a sync run
//! passes around, the run identity, and the logging setup used by the
//! binary and the library alike.

pub mod types;
pub mod errors;
pub mod logging;

pub use types::*;
pub use errors::*;
