//! Collaborator service boundaries
//!
//! Everything here is external to the core: the engine only depends on
//! the traits and is wired with real or in-memory implementations.

pub mod expense;
pub mod fees;
pub mod notify;
pub mod stock;

pub use expense::{ExpenseLedgerClient, InMemoryExpenseLedger};
pub use fees::{FeeScheduleProvider, StaticFeeScheduleProvider};
pub use notify::{NoopNotifier, Notifier, WebhookNotifier};
pub use stock::{InMemoryStockService, NoopStockService, StockService};
