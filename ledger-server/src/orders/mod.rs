//! Order state machine
//!
//! - **draft**: validated creation/edit inputs
//! - **manager**: the OrdersManager mutation surface and reads
//! - **error**: domain errors
//!
//! # Data Flow
//!
//! 1. Caller submits a draft/patch/transition
//! 2. Validation rejects bad input before any mutation
//! 3. The pricing calculator produces the new summary
//! 4. The order row is persisted
//! 5. Points, aggregates, and expense entries follow from the old/new diff
//! 6. The change event is broadcast to all subscribers

pub mod draft;
pub mod error;
pub mod manager;

#[cfg(test)]
mod tests;

pub use draft::{LineItemInput, OrderDraft, OrderPatch};
pub use error::{OrderError, OrderResult};
pub use manager::OrdersManager;
