//! Multiplicative modifiers: `actor.speed 0.5`, `item.damage.critical 2`.

use std::sync::Arc;

use rules_core::expression::{TriState, is_less_than_zero};
use rules_core::{
    Config, ConfigSegment, DiagnosticKey, Expression, Handler, HandlerContext, Modifier,
    RawModifier,
};

/// One factor per descriptor. Structural ones are dropped and factors that are
/// certainly negative are rejected.
pub struct MultiplierHandler {
    context: HandlerContext,
    config: Arc<Config>,
}

impl MultiplierHandler {
    pub const NAME: &'static str = "multiplier";

    pub fn new(context: &HandlerContext, config: Arc<Config>) -> Self {
        Self {
            context: context.clone(),
            config,
        }
    }
}

impl Handler for MultiplierHandler {
    type Extension = ();

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn context(&self) -> &HandlerContext {
        &self.context
    }

    fn config(&self) -> &Config {
        &self.config
    }

    fn omit_for_value(&self, value: &Expression) -> bool {
        value.is_one()
    }

    fn build_modifier(&self, raw: &RawModifier, _segment: &ConfigSegment) -> Vec<Modifier> {
        if is_less_than_zero(&raw.value) == TriState::True {
            self.context.logger.log(
                DiagnosticKey::InvalidDescriptor,
                ["value".to_owned(), raw.path.clone(), raw.value.to_string()],
            );
            return Vec::new();
        }
        vec![self.context.modifier_from(raw, raw.value.clone())]
    }
}
