//! Pricing & fee computation
//!
//! Pure functions only - nothing in this module touches storage or state.
//! The order state machine feeds them and owns the side effects.

pub mod calculator;
pub mod delivery;

pub use calculator::{DiscountRate, POINTS_MIN_PURCHASE, PricingConfig, PricingInput, compute_summary};
pub use delivery::compute_delivery_fee;
