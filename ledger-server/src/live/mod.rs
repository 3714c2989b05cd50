//! Real-time change propagation
//!
//! - [`feed`]: broadcast bus the manager publishes row changes to
//! - [`view`]: viewer-scoped visible-order collections
//! - [`worker`]: tokio tasks that drive a view from the feed

pub mod feed;
pub mod view;
pub mod worker;

pub use feed::{ChangeFeed, FeedConfig};
pub use view::{ViewScope, VisibleOrders};
pub use worker::ViewWorker;
