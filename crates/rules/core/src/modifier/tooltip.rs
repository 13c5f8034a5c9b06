//! Tooltip contributions.
//!
//! Rendering is someone else's job; modifiers only hand over signed formula
//! terms with a label, tagged as bonus or malus.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum TooltipKind {
    Bonus,
    Malus,
}

/// One signed term, e.g. `+1d6` labelled `Flametongue`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TooltipEntry {
    pub formula: String,
    pub label: String,
    pub kind: TooltipKind,
}

impl fmt::Display for TooltipEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}, {}]", self.formula, self.label, self.kind.as_ref())
    }
}

/// Anything that collects tooltip entries.
pub trait TooltipAccumulator {
    fn add_entry(&mut self, entry: TooltipEntry);
}

impl TooltipAccumulator for Vec<TooltipEntry> {
    fn add_entry(&mut self, entry: TooltipEntry) {
        self.push(entry);
    }
}

/// Plain ordered accumulator.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tooltip {
    entries: Vec<TooltipEntry>,
}

impl Tooltip {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[TooltipEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All signed terms joined into one line: `+2 +1d6 -1`.
    pub fn formula(&self) -> String {
        self.entries
            .iter()
            .map(|entry| entry.formula.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl TooltipAccumulator for Tooltip {
    fn add_entry(&mut self, entry: TooltipEntry) {
        self.entries.push(entry);
    }
}
