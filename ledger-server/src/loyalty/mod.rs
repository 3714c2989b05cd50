//! Loyalty points - the single write path to customer balances

pub mod ledger;

pub use ledger::PointsLedger;
