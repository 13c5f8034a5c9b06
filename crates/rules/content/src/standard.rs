//! Standard registry assembly and batch processing.

use std::sync::Arc;

use rules_core::{
    Config, ConfigSpec, HandlerContext, Logger, ModifierCollection, PropertySource, RawModifier,
    Registry, RegistryError,
};

use crate::handlers::{FlatBonusHandler, FlatBonusOptions, MultiplierHandler};

/// Schemas for the standard handlers, one registry entry per schema.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StandardSchemas {
    pub flat_bonuses: Vec<ConfigSpec<FlatBonusOptions>>,
    pub multipliers: Vec<ConfigSpec>,
}

/// Builds a registry with a [`FlatBonusHandler`] or [`MultiplierHandler`]
/// under each schema's top-level path.
///
/// `source` is handed to every flat-bonus handler for binding reference
/// attributes.
///
/// # Errors
///
/// Returns the first [`RegistryError`] (duplicate or malformed path).
pub fn standard_registry(
    logger: Logger,
    schemas: StandardSchemas,
    source: Option<Arc<dyn PropertySource>>,
) -> Result<Registry, RegistryError> {
    let mut registry = Registry::with_logger(logger);

    for spec in schemas.flat_bonuses {
        let config = Arc::new(Config::build(spec));
        let path = config.top_level_path().to_owned();
        let source = source.clone();
        registry.add_handler(&path, move |context| {
            let handler = FlatBonusHandler::new(context, Arc::clone(&config));
            match &source {
                Some(source) => handler.with_source(Arc::clone(source)),
                None => handler,
            }
        })?;
    }

    for spec in schemas.multipliers {
        let config = Arc::new(Config::build(spec));
        let path = config.top_level_path().to_owned();
        registry.add_handler(&path, move |context| {
            MultiplierHandler::new(context, Arc::clone(&config))
        })?;
    }

    tracing::debug!(
        target: "rules::content",
        handlers = registry.len(),
        "assembled standard registry"
    );
    Ok(registry)
}

/// Dispatches `raws` through a fresh cache for `context`.
pub fn process_batch(
    registry: &Registry,
    context: HandlerContext,
    raws: &[RawModifier],
) -> ModifierCollection {
    let mut cache = registry.cache(context);
    let modifiers = cache.process_all(raws);
    tracing::debug!(
        target: "rules::content",
        descriptors = raws.len(),
        modifiers = modifiers.len(),
        "processed batch"
    );
    modifiers
}
