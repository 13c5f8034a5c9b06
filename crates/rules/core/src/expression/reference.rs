//! Live property references.
//!
//! A [`Reference`] binds a dot-delimited property path to a [`PropertySource`]
//! and is resolved every time it is evaluated, so formulas such as
//! `@abilities.str.mod + 2` follow the owner's current data.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Object that can be queried for numeric properties by dot path.
pub trait PropertySource: Send + Sync + fmt::Debug {
    /// Numeric value at `path`, or `None` when the path is missing or the
    /// value there is not a number.
    fn lookup(&self, path: &str) -> Option<f64>;
}

impl PropertySource for HashMap<String, f64> {
    fn lookup(&self, path: &str) -> Option<f64> {
        self.get(path).copied()
    }
}

impl PropertySource for BTreeMap<String, f64> {
    fn lookup(&self, path: &str) -> Option<f64> {
        self.get(path).copied()
    }
}

/// Reference leaf: property path, bound source and display text.
#[derive(Clone)]
pub struct Reference {
    property_path: String,
    source: Arc<dyn PropertySource>,
    display: String,
}

impl Reference {
    pub fn new(
        property_path: impl Into<String>,
        source: Arc<dyn PropertySource>,
        display: impl Into<String>,
    ) -> Self {
        Self {
            property_path: property_path.into(),
            source,
            display: display.into(),
        }
    }

    pub fn property_path(&self) -> &str {
        &self.property_path
    }

    /// Text as written by the author (e.g. `@level`).
    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn source(&self) -> &Arc<dyn PropertySource> {
        &self.source
    }

    /// Current value of the referenced property; 0 when unresolvable.
    pub fn resolve(&self) -> f64 {
        self.source.lookup(&self.property_path).unwrap_or(0.0)
    }
}

impl PartialEq for Reference {
    fn eq(&self, other: &Self) -> bool {
        self.property_path == other.property_path
            && self.display == other.display
            && std::ptr::addr_eq(Arc::as_ptr(&self.source), Arc::as_ptr(&other.source))
    }
}

impl fmt::Debug for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reference")
            .field("property_path", &self.property_path)
            .field("display", &self.display)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// PropertyTree
// ============================================================================

/// Value stored in a [`PropertyTree`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum PropertyValue {
    Number(f64),
    Flag(bool),
    Text(String),
    Node(BTreeMap<String, PropertyValue>),
}

impl From<f64> for PropertyValue {
    fn from(n: f64) -> Self {
        PropertyValue::Number(n)
    }
}

impl From<i32> for PropertyValue {
    fn from(n: i32) -> Self {
        PropertyValue::Number(f64::from(n))
    }
}

impl From<bool> for PropertyValue {
    fn from(flag: bool) -> Self {
        PropertyValue::Flag(flag)
    }
}

impl From<&str> for PropertyValue {
    fn from(text: &str) -> Self {
        PropertyValue::Text(text.to_owned())
    }
}

/// Thread-safe nested property store usable as a live reference source.
///
/// Writers update values in place; every [`Reference`] bound to the tree sees
/// the new value on its next evaluation.
///
/// ```
/// # use rules_core::expression::{PropertySource, PropertyTree};
/// let actor = PropertyTree::new();
/// actor.set("abilities.str.mod", 3);
/// assert_eq!(actor.lookup("abilities.str.mod"), Some(3.0));
/// assert_eq!(actor.lookup("abilities.str"), None);
/// ```
#[derive(Debug, Default)]
pub struct PropertyTree {
    root: RwLock<BTreeMap<String, PropertyValue>>,
}

impl PropertyTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` at `path`, creating (or replacing) intermediate nodes.
    pub fn set(&self, path: &str, value: impl Into<PropertyValue>) {
        let mut root = self.root.write().unwrap_or_else(PoisonError::into_inner);
        let mut segments = path.split('.').peekable();
        let mut node = &mut *root;

        while let Some(segment) = segments.next() {
            if segments.peek().is_none() {
                node.insert(segment.to_owned(), value.into());
                return;
            }
            let child = node
                .entry(segment.to_owned())
                .or_insert_with(|| PropertyValue::Node(BTreeMap::new()));
            if !matches!(child, PropertyValue::Node(_)) {
                *child = PropertyValue::Node(BTreeMap::new());
            }
            let PropertyValue::Node(children) = child else {
                return;
            };
            node = children;
        }
    }

    /// Value at `path`, if present.
    pub fn get(&self, path: &str) -> Option<PropertyValue> {
        let root = self.root.read().unwrap_or_else(PoisonError::into_inner);
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = root.get(first)?;
        for segment in segments {
            match current {
                PropertyValue::Node(children) => current = children.get(segment)?,
                _ => return None,
            }
        }
        Some(current.clone())
    }

    /// Removes the value at `path`, returning it.
    pub fn remove(&self, path: &str) -> Option<PropertyValue> {
        let mut root = self.root.write().unwrap_or_else(PoisonError::into_inner);
        let (parent, leaf) = match path.rsplit_once('.') {
            Some((parent, leaf)) => (Some(parent), leaf),
            None => (None, path),
        };
        let mut node = &mut *root;
        if let Some(parent) = parent {
            for segment in parent.split('.') {
                match node.get_mut(segment)? {
                    PropertyValue::Node(children) => node = children,
                    _ => return None,
                }
            }
        }
        node.remove(leaf)
    }
}

impl PropertySource for PropertyTree {
    fn lookup(&self, path: &str) -> Option<f64> {
        match self.get(path)? {
            PropertyValue::Number(n) => Some(n),
            _ => None,
        }
    }
}
