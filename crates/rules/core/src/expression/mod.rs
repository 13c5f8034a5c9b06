//! Symbolic scalar expressions.
//!
//! An [`Expression`] is an immutable arithmetic tree whose leaves may be
//! known numbers, live property [`Reference`]s, or dice [`Roll`]s. Trees are
//! built through the smart constructors in this module ([`of`], [`plus`],
//! [`times`], ...) which fold algebraic identities at construction time, so
//! `plus(x, of(0))` *is* `x` rather than an `Add` node that evaluates to `x`.
//!
//! Four interpreters operate over the tree:
//!
//! - [`evaluate`]: concrete numeric value, resolving references now
//! - [`condense`]: partial evaluation of reference-free subtrees
//! - [`stringify`]: infix rendering for tooltips
//! - [`compare`]: conservative range-based sign/ordering checks
//!
//! ## Examples
//!
//! ```
//! # use rules_core::expression::*;
//! let six = plus(of(3.0), of(3.0));
//! assert_eq!(evaluate(&six), 6.0);
//! assert_eq!(stringify(&six), "3 + 3");
//!
//! let eighteen = times(six, of(3.0));
//! assert_eq!(stringify(&eighteen), "(3 + 3) * 3");
//! assert_eq!(evaluate(&eighteen), 18.0);
//! ```

pub mod compare;
pub mod condense;
pub mod evaluate;
pub mod reference;
pub mod stringify;

pub use compare::{
    Range, TriState, is_greater_than, is_greater_zero, is_less_than, is_less_than_zero, range,
};
pub use condense::{condense, is_condensable};
pub use evaluate::evaluate;
pub use reference::{PropertySource, PropertyTree, PropertyValue, Reference};
pub use stringify::stringify;

use std::fmt;
use std::sync::Arc;

use crate::dice::Roll;
use crate::error::ExpressionError;

// ============================================================================
// Expression Definition
// ============================================================================

/// A numeric literal.
///
/// Zero and one get their own variants so combinators can recognise the
/// additive and multiplicative identities structurally. [`of`] is the only
/// constructor that should be used; it guarantees `Number` never holds 0 or 1.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Literal {
    Zero,
    One,
    Number(f64),
}

impl Literal {
    pub fn value(self) -> f64 {
        match self {
            Literal::Zero => 0.0,
            Literal::One => 1.0,
            Literal::Number(n) => n,
        }
    }
}

/// Node of the symbolic arithmetic tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Expression {
    /// Known number.
    Amount(Literal),

    /// Property of a live source object, resolved when evaluated.
    Reference(Reference),

    /// Dice roll; evaluates to its resolved total.
    Roll(Arc<Roll>),

    Add(Arc<Expression>, Arc<Expression>),
    Subtract(Arc<Expression>, Arc<Expression>),
    Multiply(Arc<Expression>, Arc<Expression>),
    Divide(Arc<Expression>, Arc<Expression>),

    /// `base ^ exponent`
    Power(Arc<Expression>, Arc<Expression>),

    Abs(Arc<Expression>),
}

impl Expression {
    /// True for the zero literal only; a reference that happens to resolve to
    /// zero is not zero.
    pub fn is_zero(&self) -> bool {
        matches!(self, Expression::Amount(Literal::Zero))
    }

    /// True for the one literal only.
    pub fn is_one(&self) -> bool {
        matches!(self, Expression::Amount(Literal::One))
    }

    /// True for operator nodes, false for leaves.
    pub fn is_compound(&self) -> bool {
        !matches!(
            self,
            Expression::Amount(_) | Expression::Reference(_) | Expression::Roll(_)
        )
    }

    /// Literal value, if this node is an [`Expression::Amount`].
    pub fn as_amount(&self) -> Option<f64> {
        match self {
            Expression::Amount(literal) => Some(literal.value()),
            _ => None,
        }
    }

    /// True if a [`Reference`] occurs anywhere in this tree.
    pub fn contains_reference(&self) -> bool {
        match self {
            Expression::Amount(_) | Expression::Roll(_) => false,
            Expression::Reference(_) => true,
            Expression::Add(l, r)
            | Expression::Subtract(l, r)
            | Expression::Multiply(l, r)
            | Expression::Divide(l, r)
            | Expression::Power(l, r) => l.contains_reference() || r.contains_reference(),
            Expression::Abs(arg) => arg.contains_reference(),
        }
    }

    /// Number of [`Reference`] leaves in this tree.
    pub fn reference_count(&self) -> usize {
        match self {
            Expression::Amount(_) | Expression::Roll(_) => 0,
            Expression::Reference(_) => 1,
            Expression::Add(l, r)
            | Expression::Subtract(l, r)
            | Expression::Multiply(l, r)
            | Expression::Divide(l, r)
            | Expression::Power(l, r) => l.reference_count() + r.reference_count(),
            Expression::Abs(arg) => arg.reference_count(),
        }
    }

    pub fn evaluate(&self) -> f64 {
        evaluate(self)
    }

    pub fn condense(&self) -> Expression {
        condense(self)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&stringify(self))
    }
}

impl From<f64> for Expression {
    fn from(n: f64) -> Self {
        of(n)
    }
}

impl From<i32> for Expression {
    fn from(n: i32) -> Self {
        of(f64::from(n))
    }
}

impl From<Reference> for Expression {
    fn from(reference: Reference) -> Self {
        Expression::Reference(reference)
    }
}

impl From<Roll> for Expression {
    fn from(dice: Roll) -> Self {
        roll(dice)
    }
}

// ============================================================================
// Smart Constructors
// ============================================================================

/// Literal constructor. 0 and 1 map to the identity variants.
pub fn of(n: f64) -> Expression {
    let literal = if n == 0.0 {
        Literal::Zero
    } else if n == 1.0 {
        Literal::One
    } else {
        Literal::Number(n)
    };
    Expression::Amount(literal)
}

/// `left + right`; adding the zero literal returns the other operand.
pub fn plus(left: Expression, right: Expression) -> Expression {
    if left.is_zero() {
        return right;
    }
    if right.is_zero() {
        return left;
    }
    Expression::Add(Arc::new(left), Arc::new(right))
}

/// `left - right`. `x - 0 = x` and `0 - x = -1 * x`.
pub fn minus(left: Expression, right: Expression) -> Expression {
    if right.is_zero() {
        return left;
    }
    if left.is_zero() {
        return times(of(-1.0), right);
    }
    Expression::Subtract(Arc::new(left), Arc::new(right))
}

/// `left * right`; folds multiplication by the zero and one literals.
pub fn times(left: Expression, right: Expression) -> Expression {
    if left.is_zero() || right.is_zero() {
        return of(0.0);
    }
    if left.is_one() {
        return right;
    }
    if right.is_one() {
        return left;
    }
    Expression::Multiply(Arc::new(left), Arc::new(right))
}

/// `left / right`.
///
/// Fails only when `right` is structurally the zero literal. A reference
/// that resolves to zero at evaluation time is accepted.
pub fn divided_by(left: Expression, right: Expression) -> Result<Expression, ExpressionError> {
    if right.is_zero() {
        return Err(ExpressionError::DivisionByZero {
            dividend: stringify(&left),
        });
    }
    if right.is_one() {
        return Ok(left);
    }
    Ok(Expression::Divide(Arc::new(left), Arc::new(right)))
}

/// `base ^ exponent`, with `0 ^ 0 = 1`.
pub fn pow(base: Expression, exponent: Expression) -> Expression {
    if exponent.is_zero() {
        return of(1.0);
    }
    if exponent.is_one() {
        return base;
    }
    if base.is_zero() {
        return of(0.0);
    }
    if base.is_one() {
        return of(1.0);
    }
    Expression::Power(Arc::new(base), Arc::new(exponent))
}

/// Absolute value.
///
/// Literals fold immediately, `|-1 * x|` becomes `|x|`, and an argument whose
/// range is provably non-negative is returned as is.
pub fn abs(arg: Expression) -> Expression {
    match arg {
        Expression::Amount(literal) => of(literal.value().abs()),
        Expression::Abs(_) => arg,
        Expression::Multiply(ref l, ref r) if l.as_amount() == Some(-1.0) => abs((**r).clone()),
        other if range(&other).min >= 0.0 => other,
        other => Expression::Abs(Arc::new(other)),
    }
}

/// Reference leaf bound to a live source.
pub fn reference(
    property_path: impl Into<String>,
    source: Arc<dyn PropertySource>,
    display: impl Into<String>,
) -> Expression {
    Expression::Reference(Reference::new(property_path, source, display))
}

/// Dice roll leaf.
pub fn roll(dice: Roll) -> Expression {
    Expression::Roll(Arc::new(dice))
}

/// Sum of every expression, folded with [`plus`] from the zero literal.
pub fn sum<I>(expressions: I) -> Expression
where
    I: IntoIterator<Item = Expression>,
{
    expressions.into_iter().fold(of(0.0), plus)
}

/// Product of every expression, folded with [`times`] from the one literal.
pub fn product<I>(expressions: I) -> Expression
where
    I: IntoIterator<Item = Expression>,
{
    expressions.into_iter().fold(of(1.0), times)
}
