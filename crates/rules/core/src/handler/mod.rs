//! Handlers: validation and construction strategies for one path namespace.
//!
//! A handler owns a [`Config`] schema and turns [`RawModifier`]s under its
//! top-level path into [`Modifier`]s. Every handler runs the same pipeline:
//!
//! 1. **Omission gate**: [`Handler::omit_for_value`] may drop values that
//!    have no effect (a flat `+0`, a `x1` multiplier).
//! 2. **Path resolution**: the descriptor path must resolve to a segment of
//!    the schema, otherwise `unknown-group-id`.
//! 3. **Required attributes**: each absent one is reported as
//!    `missing-descriptor`; any absence drops the descriptor.
//! 4. **Unknown attributes**: reported as `unknown-descriptor`, not fatal.
//! 5. **Build**: [`Handler::build_modifier`] produces zero or more modifiers.
//!
//! Data problems are reported through the context's [`Logger`] and never
//! returned as errors.

mod noop;

pub use noop::NoopHandler;

use crate::config::{Config, ConfigSegment, RulesConfig};
use crate::descriptor::{AttributeValue, RawModifier};
use crate::diagnostics::{DiagnosticKey, Logger};
use crate::expression::Expression;
use crate::modifier::{Modifier, Origin};

/// What a dispatch cache hands to every handler it instantiates.
#[derive(Clone, Debug, Default)]
pub struct HandlerContext {
    pub logger: Logger,
    /// Owner stamped onto every built modifier.
    pub origin: Option<Origin>,
    /// Default `type` for modifiers whose descriptor does not set one.
    pub modifier_type: Option<String>,
}

impl HandlerContext {
    pub fn new(logger: Logger) -> Self {
        Self {
            logger,
            origin: None,
            modifier_type: None,
        }
    }

    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn with_modifier_type(mut self, modifier_type: impl Into<String>) -> Self {
        self.modifier_type = Some(modifier_type.into());
        self
    }

    /// Modifier for `raw` carrying its attributes, the context origin and,
    /// when the descriptor has none, the context's default type.
    pub fn modifier_from(&self, raw: &RawModifier, value: Expression) -> Modifier {
        let mut attributes = raw.attributes.clone();
        if let Some(modifier_type) = &self.modifier_type {
            attributes
                .entry(RulesConfig::TYPE_ATTRIBUTE.to_owned())
                .or_insert_with(|| AttributeValue::Text(modifier_type.clone()));
        }
        Modifier::new(raw.path.clone(), value)
            .with_attributes(attributes)
            .with_origin(self.origin.clone())
    }
}

/// Handler strategy. Implementors supply the schema and the build step; the
/// validation pipeline comes from the [`ProcessModifier`] blanket impl.
pub trait Handler: Send + Sync {
    /// Per-segment schema payload.
    type Extension: Send + Sync;

    /// Returns a human-readable name for this handler (used in logging).
    fn name(&self) -> &'static str;

    fn context(&self) -> &HandlerContext;

    fn config(&self) -> &Config<Self::Extension>;

    /// Returns true to drop `value` before any validation.
    fn omit_for_value(&self, _value: &Expression) -> bool {
        false
    }

    /// Builds modifiers from a validated descriptor.
    fn build_modifier(
        &self,
        raw: &RawModifier,
        segment: &ConfigSegment<Self::Extension>,
    ) -> Vec<Modifier>;
}

/// Object-safe entry point used by the registry and dispatch cache.
pub trait ProcessModifier: Send + Sync {
    fn handler_name(&self) -> &'static str;

    fn process_modifier(&self, raw: &RawModifier) -> Vec<Modifier>;
}

impl<H: Handler> ProcessModifier for H {
    fn handler_name(&self) -> &'static str {
        self.name()
    }

    fn process_modifier(&self, raw: &RawModifier) -> Vec<Modifier> {
        if self.omit_for_value(&raw.value) {
            tracing::debug!(
                target: "rules::handler",
                handler = self.name(),
                path = %raw.path,
                value = %raw.value,
                "omitting modifier without effect"
            );
            return Vec::new();
        }

        let logger = &self.context().logger;
        let config = self.config();
        let Some(segment) = config.resolve(&raw.path) else {
            logger.log(
                DiagnosticKey::UnknownGroupId,
                [raw.path.as_str(), config.top_level_path()],
            );
            return Vec::new();
        };

        let missing: Vec<&str> = segment
            .required_attributes()
            .iter()
            .map(String::as_str)
            .filter(|attribute| !raw.attributes.contains_key(*attribute))
            .collect();
        if !missing.is_empty() {
            for attribute in missing {
                logger.log(DiagnosticKey::MissingDescriptor, [attribute, raw.path.as_str()]);
            }
            return Vec::new();
        }

        for attribute in raw.attributes.keys().filter(|key| !segment.permits(key)) {
            logger.log(
                DiagnosticKey::UnknownDescriptor,
                [attribute.as_str(), raw.path.as_str()],
            );
        }

        self.build_modifier(raw, segment)
    }
}
