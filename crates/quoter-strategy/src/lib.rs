//! Quote calculation for the perp quoter.
//!
//! Pure functions from (model parameters, inventory, bounds, capital
//! settings) to per-symbol quote decisions. No I/O, no hidden state.

pub mod config;
pub mod quote;
pub mod rounding;

pub use config::SizingConfig;
pub use quote::{calculate_spreads, compute_quote, QuoteDecision, SkipReason};
pub use rounding::{round_price, round_size};
