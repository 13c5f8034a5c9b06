//! General-purpose handlers.
//!
//! - [`FlatBonusHandler`]: additive bonuses, with optional bonus and dice
//!   attributes folded into the value
//! - [`MultiplierHandler`]: multiplicative factors

mod flat;
mod multiplier;

pub use flat::{FlatBonusHandler, FlatBonusOptions};
pub use multiplier::MultiplierHandler;
