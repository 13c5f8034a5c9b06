//! Path to handler-constructor table.
//!
//! The registry is built once during setup and then only read. Paths are
//! lower-cased dot paths; an exact duplicate or a malformed path is a wiring
//! defect and returned as [`RegistryError`]. Registering both an ancestor and
//! a descendant path is valid (dispatch prefers the most specific) but is
//! reported through the [`Logger`] so overlapping content is visible.

mod cache;

pub use cache::HandlerCache;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::config::RulesConfig;
use crate::diagnostics::{DiagnosticKey, Logger};
use crate::error::RegistryError;
use crate::handler::{HandlerContext, ProcessModifier};

/// Type-erased handler constructor.
pub type HandlerCtor = Arc<dyn Fn(&HandlerContext) -> Arc<dyn ProcessModifier> + Send + Sync>;

/// Registry of handler constructors keyed by normalized path.
pub struct Registry {
    logger: Logger,
    handlers: BTreeMap<String, HandlerCtor>,
}

impl Registry {
    /// Creates an empty registry reporting shadowing through `tracing`.
    pub fn new() -> Self {
        Self::with_logger(Logger::tracing())
    }

    pub fn with_logger(logger: Logger) -> Self {
        Self {
            logger,
            handlers: BTreeMap::new(),
        }
    }

    /// Registers `constructor` under `path`.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::AlreadyRegistered`] if the normalized path is taken
    /// - [`RegistryError::MalformedPath`] on a leading, trailing or doubled dot
    pub fn add_handler<H, F>(&mut self, path: &str, constructor: F) -> Result<(), RegistryError>
    where
        H: ProcessModifier + 'static,
        F: Fn(&HandlerContext) -> H + Send + Sync + 'static,
    {
        let ctor: HandlerCtor =
            Arc::new(move |context| Arc::new(constructor(context)) as Arc<dyn ProcessModifier>);
        self.add_constructor(path, ctor)
    }

    /// Registers an already type-erased constructor.
    pub fn add_constructor(&mut self, path: &str, ctor: HandlerCtor) -> Result<(), RegistryError> {
        let path = path.to_lowercase();
        if self.handlers.contains_key(&path) {
            return Err(RegistryError::AlreadyRegistered(path));
        }
        if path.split(RulesConfig::PATH_SEPARATOR).any(str::is_empty) {
            return Err(RegistryError::MalformedPath(path));
        }

        let ancestors: Vec<&str> = self
            .handlers
            .keys()
            .map(String::as_str)
            .filter(|existing| is_strict_prefix(existing, &path))
            .collect();
        if !ancestors.is_empty() {
            self.logger.log(
                DiagnosticKey::ShadowedByAncestor,
                std::iter::once(path.as_str()).chain(ancestors),
            );
        }

        let descendants: Vec<&str> = self
            .handlers
            .keys()
            .map(String::as_str)
            .filter(|existing| is_strict_prefix(&path, existing))
            .collect();
        if !descendants.is_empty() {
            self.logger.log(
                DiagnosticKey::ShadowsDescendant,
                std::iter::once(path.as_str()).chain(descendants),
            );
        }

        tracing::debug!(target: "rules::registry", path = %path, "registered handler");
        self.handlers.insert(path, ctor);
        Ok(())
    }

    /// Constructor registered under exactly `path` (case-insensitive).
    pub fn constructor(&self, path: &str) -> Option<&HandlerCtor> {
        self.handlers.get(&path.to_lowercase())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.constructor(path).is_some()
    }

    /// Registered paths in lexical order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Starts a dispatch cache for one (logger, origin, type) context.
    pub fn cache(&self, context: HandlerContext) -> HandlerCache<'_> {
        HandlerCache::new(self, context)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("paths", &self.handlers.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// `ancestor` is a strict dot-prefix of `path`.
fn is_strict_prefix(ancestor: &str, path: &str) -> bool {
    path.len() > ancestor.len()
        && path.starts_with(ancestor)
        && path[ancestor.len()..].starts_with(RulesConfig::PATH_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::RawModifier;
    use crate::modifier::Modifier;

    struct Named(&'static str);

    impl ProcessModifier for Named {
        fn handler_name(&self) -> &'static str {
            self.0
        }

        fn process_modifier(&self, _raw: &RawModifier) -> Vec<Modifier> {
            Vec::new()
        }
    }

    #[test]
    fn paths_are_normalized() {
        let mut registry = Registry::with_logger(Logger::silent());
        registry.add_handler("Item.Damage", |_| Named("a")).unwrap();
        assert!(registry.contains("item.damage"));
        assert!(registry.contains("ITEM.DAMAGE"));
        assert_eq!(registry.paths().collect::<Vec<_>>(), vec!["item.damage"]);
    }

    #[test]
    fn duplicates_are_rejected_after_normalization() {
        let mut registry = Registry::with_logger(Logger::silent());
        registry.add_handler("item", |_| Named("h1")).unwrap();
        let err = registry.add_handler("ITEM", |_| Named("h2")).unwrap_err();
        assert_eq!(err, RegistryError::AlreadyRegistered("item".into()));
        assert!(err.to_string().contains("already registered"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn malformed_paths_are_rejected() {
        let mut registry = Registry::with_logger(Logger::silent());
        for path in [".item", "item.", "item..damage", ""] {
            assert!(matches!(
                registry.add_handler(path, |_| Named("h")),
                Err(RegistryError::MalformedPath(_))
            ));
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn ancestor_and_descendant_registrations_are_reported() {
        let (logger, log) = Logger::collecting();
        let mut registry = Registry::with_logger(logger);
        registry.add_handler("item.damage", |_| Named("h1")).unwrap();
        registry.add_handler("item", |_| Named("h2")).unwrap();

        let entries = log.drain();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key, DiagnosticKey::ShadowsDescendant);
        assert!(entries[0].mentions("item.damage"));

        registry.add_handler("item.damage.fire", |_| Named("h3")).unwrap();
        let entries = log.drain();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key, DiagnosticKey::ShadowedByAncestor);
        assert!(entries[0].mentions("item"));
        assert!(entries[0].mentions("item.damage"));
    }

    #[test]
    fn sibling_prefixes_are_not_ancestors() {
        let (logger, log) = Logger::collecting();
        let mut registry = Registry::with_logger(logger);
        registry.add_handler("item", |_| Named("h1")).unwrap();
        registry.add_handler("items", |_| Named("h2")).unwrap();
        assert!(log.is_empty());
    }
}
