//! Ordered modifier aggregates.

use super::{Modifier, TooltipAccumulator};
use crate::expression::{self, Expression, evaluate};

/// Ordered, filterable sequence of modifiers.
///
/// ```
/// # use rules_core::{Modifier, ModifierCollection};
/// # use rules_core::expression::of;
/// let modifiers: ModifierCollection = [2.0, 3.0, -1.0]
///     .into_iter()
///     .map(|n| Modifier::new("item.damage", of(n)))
///     .collect();
/// assert_eq!(modifiers.sum(), 4.0);
/// assert_eq!(modifiers.product(), -6.0);
/// assert_eq!(modifiers.maluses().len(), 1);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModifierCollection {
    modifiers: Vec<Modifier>,
}

impl ModifierCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, modifier: Modifier) {
        self.modifiers.push(modifier);
    }

    pub fn len(&self) -> usize {
        self.modifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Modifier> {
        self.modifiers.iter()
    }

    pub fn as_slice(&self) -> &[Modifier] {
        &self.modifiers
    }

    /// Members matching `predicate`, in order.
    pub fn filter(&self, predicate: impl Fn(&Modifier) -> bool) -> Self {
        self.modifiers
            .iter()
            .filter(|modifier| predicate(*modifier))
            .cloned()
            .collect()
    }

    pub fn bonuses(&self) -> Self {
        self.filter(Modifier::is_bonus)
    }

    pub fn maluses(&self) -> Self {
        self.filter(Modifier::is_malus)
    }

    pub fn by_type(&self, modifier_type: &str) -> Self {
        self.filter(|modifier| modifier.modifier_type() == Some(modifier_type))
    }

    /// Every member's value folded with `plus`.
    pub fn sum_expression(&self) -> Expression {
        expression::sum(self.modifiers.iter().map(|m| m.value().clone()))
    }

    /// Every member's value folded with `times`.
    pub fn product_expression(&self) -> Expression {
        expression::product(self.modifiers.iter().map(|m| m.value().clone()))
    }

    pub fn sum(&self) -> f64 {
        evaluate(&self.sum_expression())
    }

    pub fn product(&self) -> f64 {
        evaluate(&self.product_expression())
    }

    /// Distinct `type` attributes in first-seen order.
    pub fn types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = Vec::new();
        for modifier_type in self.modifiers.iter().filter_map(Modifier::modifier_type) {
            if !types.contains(&modifier_type) {
                types.push(modifier_type);
            }
        }
        types
    }

    /// Appends each member's signed formula term to `tooltip`.
    pub fn add_tooltip_entries<A>(&self, tooltip: &mut A)
    where
        A: TooltipAccumulator + ?Sized,
    {
        for modifier in &self.modifiers {
            tooltip.add_entry(modifier.tooltip_entry());
        }
    }
}

impl FromIterator<Modifier> for ModifierCollection {
    fn from_iter<I: IntoIterator<Item = Modifier>>(iter: I) -> Self {
        Self {
            modifiers: iter.into_iter().collect(),
        }
    }
}

impl Extend<Modifier> for ModifierCollection {
    fn extend<I: IntoIterator<Item = Modifier>>(&mut self, iter: I) {
        self.modifiers.extend(iter);
    }
}

impl IntoIterator for ModifierCollection {
    type Item = Modifier;
    type IntoIter = std::vec::IntoIter<Modifier>;

    fn into_iter(self) -> Self::IntoIter {
        self.modifiers.into_iter()
    }
}

impl<'a> IntoIterator for &'a ModifierCollection {
    type Item = &'a Modifier;
    type IntoIter = std::slice::Iter<'a, Modifier>;

    fn into_iter(self) -> Self::IntoIter {
        self.modifiers.iter()
    }
}
