//! Conservative comparison.
//!
//! Comparisons never evaluate concretely: a resolved roll might have come out
//! high this time, and a reference may change before it is read. Instead each
//! expression is bounded by a `[min, max]` [`Range`] and the comparison only
//! answers `True` or `False` when the ranges make the answer certain.
//!
//! | Leaf | Range |
//! |------|-------|
//! | `Amount(n)` | `[n, n]` |
//! | `Reference` | unknown |
//! | `NdF` | `[N, N * F]` |
//! | `NdF` with modifiers | unknown (warning logged) |
//! | multi-term roll | range of its scalar re-expression |
//!
//! Binary operators take the min/max over all four endpoint combinations,
//! since operand ranges may be negative. Unknown anywhere is unknown overall.

use super::{Expression, of};
use crate::dice::Roll;

/// Three-valued comparison result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TriState {
    True,
    False,
    Unknown,
}

impl TriState {
    pub const fn is_true(self) -> bool {
        matches!(self, Self::True)
    }

    pub const fn is_false(self) -> bool {
        matches!(self, Self::False)
    }

    pub const fn is_unknown(self) -> bool {
        matches!(self, Self::Unknown)
    }
}

impl From<bool> for TriState {
    fn from(value: bool) -> Self {
        if value { Self::True } else { Self::False }
    }
}

impl From<TriState> for Option<bool> {
    fn from(value: TriState) -> Self {
        match value {
            TriState::True => Some(true),
            TriState::False => Some(false),
            TriState::Unknown => None,
        }
    }
}

/// Inclusive bounds of an expression's possible values. NaN means unknown.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub const UNKNOWN: Self = Self {
        min: f64::NAN,
        max: f64::NAN,
    };

    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub const fn exact(value: f64) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.min.is_nan() || self.max.is_nan()
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    fn cross(self, other: Range, op: impl Fn(f64, f64) -> f64) -> Range {
        if self.is_unknown() || other.is_unknown() {
            return Range::UNKNOWN;
        }
        let candidates = [
            op(self.min, other.min),
            op(self.min, other.max),
            op(self.max, other.min),
            op(self.max, other.max),
        ];
        if candidates.iter().any(|c| c.is_nan()) {
            return Range::UNKNOWN;
        }
        Range {
            min: candidates.iter().copied().fold(f64::INFINITY, f64::min),
            max: candidates.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

/// Estimate the range of `expression`.
pub fn range(expression: &Expression) -> Range {
    match expression {
        Expression::Amount(literal) => Range::exact(literal.value()),
        Expression::Reference(_) => Range::UNKNOWN,
        Expression::Roll(roll) => roll_range(roll),
        Expression::Add(l, r) => range(l).cross(range(r), |a, b| a + b),
        Expression::Subtract(l, r) => range(l).cross(range(r), |a, b| a - b),
        Expression::Multiply(l, r) => range(l).cross(range(r), |a, b| a * b),
        Expression::Divide(l, r) => {
            let divisor = range(r);
            // a divisor that may be zero makes the quotient unbounded
            if divisor.contains(0.0) {
                return Range::UNKNOWN;
            }
            range(l).cross(divisor, |a, b| a / b)
        }
        Expression::Power(base, exponent) => {
            let base = range(base);
            // corners only bound x^y when x >= 0
            if base.is_unknown() || base.min < 0.0 {
                return Range::UNKNOWN;
            }
            base.cross(range(exponent), f64::powf)
        }
        Expression::Abs(arg) => {
            let inner = range(arg);
            if inner.is_unknown() {
                Range::UNKNOWN
            } else if inner.min >= 0.0 {
                inner
            } else if inner.max <= 0.0 {
                Range::new(-inner.max, -inner.min)
            } else {
                Range::new(0.0, inner.max.max(-inner.min))
            }
        }
    }
}

fn roll_range(roll: &Roll) -> Range {
    match roll.single_dice() {
        Some(dice) if dice.is_modified() => {
            tracing::warn!(
                target: "rules::compare",
                formula = %roll.formula(),
                modifiers = ?dice.modifiers,
                "cannot estimate the range of modified dice"
            );
            Range::UNKNOWN
        }
        Some(dice) => {
            let number = f64::from(dice.number);
            Range::new(number, number * f64::from(dice.faces))
        }
        None => range(&roll.to_expression()),
    }
}

/// `a > b`: true iff `a.min > b.max`, false iff `a.max <= b.min`.
pub fn is_greater_than(a: &Expression, b: &Expression) -> TriState {
    let (a, b) = (range(a), range(b));
    if a.is_unknown() || b.is_unknown() {
        TriState::Unknown
    } else if a.min > b.max {
        TriState::True
    } else if a.max <= b.min {
        TriState::False
    } else {
        TriState::Unknown
    }
}

/// `a < b`: true iff `a.max < b.min`, false iff `a.min >= b.max`.
pub fn is_less_than(a: &Expression, b: &Expression) -> TriState {
    let (a, b) = (range(a), range(b));
    if a.is_unknown() || b.is_unknown() {
        TriState::Unknown
    } else if a.max < b.min {
        TriState::True
    } else if a.min >= b.max {
        TriState::False
    } else {
        TriState::Unknown
    }
}

pub fn is_greater_zero(expression: &Expression) -> TriState {
    is_greater_than(expression, &of(0.0))
}

pub fn is_less_than_zero(expression: &Expression) -> TriState {
    is_less_than(expression, &of(0.0))
}
