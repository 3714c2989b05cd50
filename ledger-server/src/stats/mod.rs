//! Incremental aggregation of per-branch daily statistics

pub mod contribution;
pub mod engine;

pub use contribution::{StatContribution, creation_deltas, edit_deltas, removal_deltas};
pub use engine::AggregationEngine;
