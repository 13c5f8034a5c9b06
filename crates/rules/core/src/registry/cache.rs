//! Dispatch cache: requested path to handler instance.

use std::collections::HashMap;
use std::sync::Arc;

use super::Registry;
use crate::config::RulesConfig;
use crate::descriptor::RawModifier;
use crate::handler::{HandlerContext, NoopHandler, ProcessModifier};
use crate::modifier::{Modifier, ModifierCollection};

/// Memo of handler instances for one [`HandlerContext`].
///
/// Instances are keyed by the *resolved* registry path, so `item.weaponspeed`
/// and `item.range` both share the instance built for `item`. A cache must not
/// be reused for a different context; build a new one instead.
pub struct HandlerCache<'r> {
    registry: &'r Registry,
    context: HandlerContext,
    memo: HashMap<String, Arc<dyn ProcessModifier>>,
}

impl<'r> HandlerCache<'r> {
    pub fn new(registry: &'r Registry, context: HandlerContext) -> Self {
        Self {
            registry,
            context,
            memo: HashMap::new(),
        }
    }

    pub fn context(&self) -> &HandlerContext {
        &self.context
    }

    /// Number of memoized handler instances.
    pub fn len(&self) -> usize {
        self.memo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memo.is_empty()
    }

    /// Handler for the most specific registered prefix of `path`.
    ///
    /// Unknown paths get a fresh [`NoopHandler`] that is never memoized.
    pub fn get_handler(&mut self, path: &str) -> Arc<dyn ProcessModifier> {
        let registry = self.registry;
        let path = path.to_lowercase();
        let segments: Vec<&str> = path.split(RulesConfig::PATH_SEPARATOR).collect();

        for end in (1..=segments.len()).rev() {
            let prefix = segments[..end].join(".");
            if let Some(handler) = self.memo.get(&prefix) {
                return Arc::clone(handler);
            }
            if let Some(ctor) = registry.constructor(&prefix) {
                let handler = ctor(&self.context);
                tracing::debug!(
                    target: "rules::dispatch",
                    requested = %path,
                    resolved = %prefix,
                    handler = handler.handler_name(),
                    "instantiated handler"
                );
                self.memo.insert(prefix, Arc::clone(&handler));
                return handler;
            }
        }

        tracing::debug!(target: "rules::dispatch", requested = %path, "no handler registered");
        Arc::new(NoopHandler::new(self.context.logger.clone()))
    }

    /// Dispatches one descriptor.
    pub fn process(&mut self, raw: &RawModifier) -> Vec<Modifier> {
        self.get_handler(&raw.path).process_modifier(raw)
    }

    /// Dispatches every descriptor and collects the results in order.
    ///
    /// A descriptor that fails validation contributes nothing; the rest of the
    /// batch is unaffected.
    pub fn process_all<'a, I>(&mut self, raws: I) -> ModifierCollection
    where
        I: IntoIterator<Item = &'a RawModifier>,
    {
        raws.into_iter().flat_map(|raw| self.process(raw)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{DiagnosticKey, Logger};
    use crate::expression::of;

    struct Echo;

    impl ProcessModifier for Echo {
        fn handler_name(&self) -> &'static str {
            "echo"
        }

        fn process_modifier(&self, raw: &RawModifier) -> Vec<Modifier> {
            vec![Modifier::new(raw.path.clone(), raw.value.clone())]
        }
    }

    #[test]
    fn unknown_paths_are_not_memoized() {
        let registry = Registry::with_logger(Logger::silent());
        let mut cache = registry.cache(HandlerContext::new(Logger::silent()));
        let first = cache.get_handler("spell.range");
        let second = cache.get_handler("spell.range");
        assert_eq!(first.handler_name(), NoopHandler::NAME);
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(cache.is_empty());
    }

    #[test]
    fn process_all_skips_failures_and_keeps_order() {
        let mut registry = Registry::with_logger(Logger::silent());
        registry.add_handler("item", |_| Echo).unwrap();

        let (logger, log) = Logger::collecting();
        let mut cache = registry.cache(HandlerContext::new(logger));
        let raws = vec![
            RawModifier::new("item.ac", of(1.0)),
            RawModifier::new("spell.dc", of(2.0)),
            RawModifier::new("item.damage", of(3.0)),
        ];

        let collection = cache.process_all(&raws);
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.sum(), 4.0);
        assert_eq!(
            collection.iter().map(Modifier::path).collect::<Vec<_>>(),
            vec!["item.ac", "item.damage"]
        );
        assert_eq!(log.count(DiagnosticKey::NoHandler), 1);
        assert_eq!(cache.len(), 1);
    }
}
