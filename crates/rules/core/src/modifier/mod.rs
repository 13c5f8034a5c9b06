//! Modifiers - validated contributions to a derived quantity.
//!
//! A [`Modifier`] is built by a handler from a [`RawModifier`](crate::RawModifier)
//! and never changes afterwards. Whether it is a bonus or a malus is decided
//! once, at construction, from the conservative sign of its value:
//!
//! | sign test | `True` | `Unknown` | `False` |
//! |-----------|--------|-----------|---------|
//! | `is_greater_zero(value)` | bonus | bonus | not a bonus |
//! | `is_less_than_zero(value)` | malus | not a malus | not a malus |
//!
//! A value that is certainly zero is neither.

pub mod collection;
pub mod tooltip;

pub use collection::ModifierCollection;
pub use tooltip::{Tooltip, TooltipAccumulator, TooltipEntry, TooltipKind};

use std::collections::BTreeMap;

use crate::config::RulesConfig;
use crate::descriptor::AttributeValue;
use crate::expression::{
    Expression, TriState, abs, is_greater_zero, is_less_than_zero, stringify,
};

/// Owner of a modifier (the item, effect or feature that granted it).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Origin {
    pub id: String,
    pub name: String,
}

impl Origin {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Immutable modifier record.
#[derive(Clone, Debug, PartialEq)]
pub struct Modifier {
    path: String,
    value: Expression,
    attributes: BTreeMap<String, AttributeValue>,
    origin: Option<Origin>,
    selectable: bool,
    is_bonus: bool,
    is_malus: bool,
}

impl Modifier {
    pub fn new(path: impl Into<String>, value: Expression) -> Self {
        let is_bonus = is_greater_zero(&value) != TriState::False;
        let is_malus = is_less_than_zero(&value) == TriState::True;
        Self {
            path: path.into(),
            value,
            attributes: BTreeMap::new(),
            origin: None,
            selectable: false,
            is_bonus,
            is_malus,
        }
    }

    /// Replaces the attribute bag (builder pattern).
    pub fn with_attributes(mut self, attributes: BTreeMap<String, AttributeValue>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Adds one attribute (builder pattern).
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_origin(mut self, origin: Option<Origin>) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn value(&self) -> &Expression {
        &self.value
    }

    pub fn attributes(&self) -> &BTreeMap<String, AttributeValue> {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    pub fn origin(&self) -> Option<&Origin> {
        self.origin.as_ref()
    }

    pub fn is_selectable(&self) -> bool {
        self.selectable
    }

    pub fn is_bonus(&self) -> bool {
        self.is_bonus
    }

    pub fn is_malus(&self) -> bool {
        self.is_malus
    }

    /// Display name: the `name` attribute, else the origin's name, else the path.
    pub fn name(&self) -> &str {
        self.attribute(RulesConfig::NAME_ATTRIBUTE)
            .and_then(AttributeValue::as_text)
            .or_else(|| self.origin.as_ref().map(|origin| origin.name.as_str()))
            .unwrap_or(self.path.as_str())
    }

    /// The `type` attribute, if set.
    pub fn modifier_type(&self) -> Option<&str> {
        self.attribute(RulesConfig::TYPE_ATTRIBUTE)
            .and_then(AttributeValue::as_text)
    }

    pub fn formula(&self) -> String {
        stringify(&self.value)
    }

    /// `-|value|` for maluses, `+|value|` otherwise.
    pub fn signed_formula(&self) -> String {
        let sign = if self.is_malus { '-' } else { '+' };
        format!("{sign}{}", stringify(&abs(self.value.clone())))
    }

    pub fn tooltip_entry(&self) -> TooltipEntry {
        TooltipEntry {
            formula: self.signed_formula(),
            label: self.name().to_owned(),
            kind: if self.is_malus {
                TooltipKind::Malus
            } else {
                TooltipKind::Bonus
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::dice::Roll;
    use crate::expression::{PropertyTree, minus, of, plus, reference, roll};

    #[test]
    fn sign_classification() {
        assert!(Modifier::new("a", of(2.0)).is_bonus());
        assert!(Modifier::new("a", of(-2.0)).is_malus());
        assert!(!Modifier::new("a", of(-2.0)).is_bonus());
    }

    #[test]
    fn zero_is_neither_bonus_nor_malus() {
        let zero = Modifier::new("a", of(0.0));
        assert!(!zero.is_bonus());
        assert!(!zero.is_malus());

        let cancelled = Modifier::new("a", minus(of(2.0), of(2.0)));
        assert!(!cancelled.is_bonus());
        assert!(!cancelled.is_malus());
    }

    #[test]
    fn unknown_sign_defaults_to_bonus() {
        let actor = Arc::new(PropertyTree::new());
        actor.set("penalty", -5);
        let modifier = Modifier::new("a", reference("penalty", actor, "@penalty"));
        assert!(modifier.is_bonus());
        assert!(!modifier.is_malus());

        let swingy = Modifier::new("a", roll(Roll::parse("1d4 - 1d6").unwrap()));
        assert!(swingy.is_bonus());
    }

    #[test]
    fn negative_dice_are_maluses() {
        let modifier = Modifier::new("a", minus(of(0.0), roll(Roll::parse("1d4").unwrap())));
        assert!(modifier.is_malus());
        assert_eq!(modifier.signed_formula(), "-1d4");
    }

    #[test]
    fn bonus_of_unknown_sign_is_wrapped_in_abs() {
        let actor = Arc::new(PropertyTree::new());
        actor.set("level", 2);
        let level = reference("level", actor, "@level");
        assert_eq!(Modifier::new("a", level.clone()).signed_formula(), "+abs(level)");

        let compound = Modifier::new("a", plus(level, of(1.0)));
        assert!(compound.is_bonus());
        assert_eq!(compound.signed_formula(), "+abs(level + 1)");
    }

    #[test]
    fn bonus_of_known_sign_renders_plainly() {
        let dice = Modifier::new("a", roll(Roll::parse("1d6").unwrap()));
        assert_eq!(dice.signed_formula(), "+1d6");
    }

    #[test]
    fn name_falls_back_through_origin_to_path() {
        let bare = Modifier::new("item.damage", of(1.0));
        assert_eq!(bare.name(), "item.damage");

        let owned = bare
            .clone()
            .with_origin(Some(Origin::new("item-1", "Dagger")));
        assert_eq!(owned.name(), "Dagger");

        let named = owned.with_attribute("name", "Sharpened");
        assert_eq!(named.name(), "Sharpened");
    }

    #[test]
    fn tooltip_entry_uses_absolute_value() {
        let malus = Modifier::new("a", of(-3.0)).with_attribute("name", "Curse");
        assert_eq!(
            malus.tooltip_entry(),
            TooltipEntry {
                formula: "-3".into(),
                label: "Curse".into(),
                kind: TooltipKind::Malus,
            }
        );

        let bonus = Modifier::new("a", of(2.0)).with_attribute("type", "enhancement");
        assert_eq!(bonus.signed_formula(), "+2");
        assert_eq!(bonus.modifier_type(), Some("enhancement"));
    }
}
