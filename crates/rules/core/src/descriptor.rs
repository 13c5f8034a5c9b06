//! Raw modifier descriptors.
//!
//! A [`RawModifier`] is what an upstream parser produces from authored text
//! such as `item.damage.fire 1d6 (name: Flametongue)`: a routing path, a value
//! expression and a loosely typed attribute bag. Handlers validate the bag
//! against their schema and turn it into [`Modifier`](crate::Modifier)s.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::expression::{Expression, PropertySource, of, reference, times};

/// Sign attached to a reference attribute (`+@level` vs `-@level`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Sign {
    #[default]
    Positive,
    Negative,
}

/// Unbound reference as written in a descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReferenceSpec {
    pub property_path: String,
    /// Text as the author wrote it.
    pub original: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub sign: Sign,
}

impl ReferenceSpec {
    pub fn new(property_path: impl Into<String>, original: impl Into<String>) -> Self {
        Self {
            property_path: property_path.into(),
            original: original.into(),
            sign: Sign::Positive,
        }
    }

    /// Flips the sign (builder pattern).
    pub fn negated(mut self) -> Self {
        self.sign = match self.sign {
            Sign::Positive => Sign::Negative,
            Sign::Negative => Sign::Positive,
        };
        self
    }

    /// Binds the reference to a live source.
    ///
    /// A negative reference becomes `-1 * ref`.
    pub fn bind(&self, source: Arc<dyn PropertySource>) -> Expression {
        let bound = reference(self.property_path.clone(), source, self.original.clone());
        match self.sign {
            Sign::Positive => bound,
            Sign::Negative => times(of(-1.0), bound),
        }
    }
}

/// Value of one descriptor attribute.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum AttributeValue {
    Number(f64),
    Text(String),
    Reference(ReferenceSpec),
}

impl AttributeValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttributeValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<&ReferenceSpec> {
        match self {
            AttributeValue::Reference(spec) => Some(spec),
            _ => None,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(text: &str) -> Self {
        AttributeValue::Text(text.to_owned())
    }
}

impl From<String> for AttributeValue {
    fn from(text: String) -> Self {
        AttributeValue::Text(text)
    }
}

impl From<f64> for AttributeValue {
    fn from(n: f64) -> Self {
        AttributeValue::Number(n)
    }
}

impl From<i32> for AttributeValue {
    fn from(n: i32) -> Self {
        AttributeValue::Number(f64::from(n))
    }
}

impl From<ReferenceSpec> for AttributeValue {
    fn from(spec: ReferenceSpec) -> Self {
        AttributeValue::Reference(spec)
    }
}

/// Unvalidated modifier descriptor.
#[derive(Clone, Debug, PartialEq)]
pub struct RawModifier {
    pub path: String,
    pub attributes: BTreeMap<String, AttributeValue>,
    pub value: Expression,
}

impl RawModifier {
    pub fn new(path: impl Into<String>, value: Expression) -> Self {
        Self {
            path: path.into(),
            attributes: BTreeMap::new(),
            value,
        }
    }

    /// Adds an attribute (builder pattern).
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }
}
