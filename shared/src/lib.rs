//! Shared types for the branch order ledger
//!
//! Common types used by the server and its test harnesses: order and
//! customer models, daily aggregate records, external expense entries,
//! change-event payloads, error codes, and id/time utilities.

pub mod error;
pub mod event;
pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

// Change-feed re-exports (for convenient access)
pub use event::{ChangeAction, OrderChangeEvent};
