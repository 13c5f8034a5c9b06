//! Additive bonuses: `item.damage 2`, `actor.ac 1 (bonus: @dex)`.

use std::sync::Arc;

use rules_core::expression::{of, plus, roll};
use rules_core::{
    AttributeValue, Config, ConfigSegment, DiagnosticKey, Expression, Handler, HandlerContext,
    Modifier, PropertySource, RawModifier, Roll,
};

/// Per-segment options for [`FlatBonusHandler`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FlatBonusOptions {
    /// Attribute whose number or reference is added to the value.
    pub bonus_attribute: Option<String>,
    /// Attribute holding extra dice notation added to the value.
    pub dice_attribute: Option<String>,
}

/// One additive modifier per descriptor. Structural zeros are dropped.
pub struct FlatBonusHandler {
    context: HandlerContext,
    config: Arc<Config<FlatBonusOptions>>,
    source: Option<Arc<dyn PropertySource>>,
}

impl FlatBonusHandler {
    pub const NAME: &'static str = "flat-bonus";

    pub fn new(context: &HandlerContext, config: Arc<Config<FlatBonusOptions>>) -> Self {
        Self {
            context: context.clone(),
            config,
            source: None,
        }
    }

    /// Source that reference attributes are bound against.
    pub fn with_source(mut self, source: Arc<dyn PropertySource>) -> Self {
        self.source = Some(source);
        self
    }

    fn bonus_term(&self, value: &AttributeValue) -> Result<Expression, String> {
        match value {
            AttributeValue::Number(n) => Ok(of(*n)),
            AttributeValue::Reference(spec) => self
                .source
                .as_ref()
                .map(|source| spec.bind(Arc::clone(source)))
                .ok_or_else(|| format!("no property source to bind {}", spec.original)),
            AttributeValue::Text(text) => Err(format!("expected a number or reference, got {text}")),
        }
    }

    fn dice_term(value: &AttributeValue) -> Result<Expression, String> {
        let notation = value
            .as_text()
            .ok_or_else(|| "expected dice notation".to_owned())?;
        Roll::parse(notation).map(roll).map_err(|e| e.to_string())
    }

    fn invalid(&self, raw: &RawModifier, attribute: &str, reason: String) {
        self.context.logger.log(
            DiagnosticKey::InvalidDescriptor,
            [attribute.to_owned(), raw.path.clone(), reason],
        );
    }
}

impl Handler for FlatBonusHandler {
    type Extension = FlatBonusOptions;

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn context(&self) -> &HandlerContext {
        &self.context
    }

    fn config(&self) -> &Config<FlatBonusOptions> {
        &self.config
    }

    fn omit_for_value(&self, value: &Expression) -> bool {
        value.is_zero()
    }

    fn build_modifier(
        &self,
        raw: &RawModifier,
        segment: &ConfigSegment<FlatBonusOptions>,
    ) -> Vec<Modifier> {
        let options = segment.extension();
        let mut value = raw.value.clone();

        if let Some((attribute, found)) = lookup(raw, &options.bonus_attribute) {
            match self.bonus_term(found) {
                Ok(term) => value = plus(value, term),
                Err(reason) => {
                    self.invalid(raw, attribute, reason);
                    return Vec::new();
                }
            }
        }

        if let Some((attribute, found)) = lookup(raw, &options.dice_attribute) {
            match Self::dice_term(found) {
                Ok(term) => value = plus(value, term),
                Err(reason) => {
                    self.invalid(raw, attribute, reason);
                    return Vec::new();
                }
            }
        }

        vec![self.context.modifier_from(raw, value)]
    }
}

/// The configured attribute and its value, if both are present.
fn lookup<'a>(
    raw: &'a RawModifier,
    attribute: &'a Option<String>,
) -> Option<(&'a str, &'a AttributeValue)> {
    let attribute = attribute.as_deref()?;
    raw.attribute(attribute).map(|found| (attribute, found))
}

#[cfg(test)]
mod tests {
    use rules_core::expression::{evaluate, stringify};
    use rules_core::{
        ConfigSpec, DiagnosticLog, Logger, ProcessModifier, PropertyTree, ReferenceSpec,
        SegmentSpec,
    };

    use super::*;

    fn config() -> Arc<Config<FlatBonusOptions>> {
        Arc::new(Config::build(
            ConfigSpec::new("item.damage")
                .optional(["bonus"])
                .with_extension(FlatBonusOptions {
                    bonus_attribute: Some("bonus".into()),
                    dice_attribute: None,
                })
                .sub_segment(
                    "fire",
                    SegmentSpec::new()
                        .optional(["dice"])
                        .with_extension(FlatBonusOptions {
                            bonus_attribute: None,
                            dice_attribute: Some("dice".into()),
                        }),
                ),
        ))
    }

    fn handler() -> (FlatBonusHandler, DiagnosticLog) {
        let (logger, log) = Logger::collecting();
        let handler = FlatBonusHandler::new(&HandlerContext::new(logger), config());
        (handler, log)
    }

    #[test]
    fn structural_zero_is_omitted() {
        let (handler, log) = handler();
        assert!(handler.process_modifier(&RawModifier::new("item.damage", of(0.0))).is_empty());
        assert!(log.is_empty());
    }

    #[test]
    fn builds_one_additive_modifier() {
        let (handler, log) = handler();
        let built = handler.process_modifier(
            &RawModifier::new("item.damage", of(2.0)).with_attribute("bonus", 3),
        );
        assert_eq!(built.len(), 1);
        assert_eq!(evaluate(built[0].value()), 5.0);
        assert!(built[0].is_bonus());
        assert!(log.is_empty());
    }

    #[test]
    fn reference_bonus_binds_against_source() {
        let actor = Arc::new(PropertyTree::new());
        actor.set("abilities.str.mod", 4);
        let (handler, _log) = handler();
        let handler = handler.with_source(actor.clone());

        let built = handler.process_modifier(
            &RawModifier::new("item.damage", of(1.0))
                .with_attribute("bonus", ReferenceSpec::new("abilities.str.mod", "@str")),
        );
        assert_eq!(evaluate(built[0].value()), 5.0);
        actor.set("abilities.str.mod", 1);
        assert_eq!(evaluate(built[0].value()), 2.0);
    }

    #[test]
    fn unbound_reference_is_invalid() {
        let (handler, log) = handler();
        let built = handler.process_modifier(
            &RawModifier::new("item.damage", of(1.0))
                .with_attribute("bonus", ReferenceSpec::new("level", "@level")),
        );
        assert!(built.is_empty());
        assert_eq!(log.count(DiagnosticKey::InvalidDescriptor), 1);
        assert!(log.entries()[0].mentions("bonus"));
    }

    #[test]
    fn dice_attribute_adds_a_roll() {
        let (handler, log) = handler();
        let built = handler.process_modifier(
            &RawModifier::new("item.damage.fire", of(1.0)).with_attribute("dice", "1d6"),
        );
        assert_eq!(stringify(built[0].value()), "1 + 1d6");

        let rejected = handler.process_modifier(
            &RawModifier::new("item.damage.fire", of(1.0)).with_attribute("dice", "1d"),
        );
        assert!(rejected.is_empty());
        assert_eq!(log.count(DiagnosticKey::InvalidDescriptor), 1);
    }
}
