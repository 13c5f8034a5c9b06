//! Data-driven content on top of `rules-core`.
//!
//! This crate houses general-purpose handlers and the glue to run them:
//! - Flat additive bonuses and multipliers ([`handlers`])
//! - Standard registry assembly and batch processing ([`standard`])
//! - Handler schemas loaded from RON/TOML files ([`loaders`])
//!
//! Schemas are plain `ConfigSpec` values, so the same handlers serve any path
//! namespace the content defines.

pub mod handlers;
pub mod standard;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use handlers::{FlatBonusHandler, FlatBonusOptions, MultiplierHandler};
pub use standard::{StandardSchemas, process_batch, standard_registry};

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, LoadResult};
