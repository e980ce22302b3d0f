//! Domain layer for the Codex launcher
//!
//! Pure types, the error taxonomy, and the port traits implemented by
//! adapters. Nothing in here performs I/O.

pub mod errors;
pub mod models;
pub mod ports;

// Re-export error types for convenient access
pub use errors::{CodexError, CodexResult, StoreError};
