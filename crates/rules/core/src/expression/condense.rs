//! Partial evaluation.
//!
//! Condensing collapses every reference-free subtree into a single literal
//! while keeping references, and the operators directly above them, intact:
//!
//! ```text
//! (@str + (2 * 3)) * (4 - 1)   ->   (@str + 6) * 3
//! ```
//!
//! Rolls count as numeric leaves here (their resolved total is used).

use std::sync::Arc;

use super::{Expression, evaluate, of};

/// True if no [`Reference`](super::Reference) occurs in the subtree.
pub fn is_condensable(expression: &Expression) -> bool {
    !expression.contains_reference()
}

/// Partially evaluate `expression`.
pub fn condense(expression: &Expression) -> Expression {
    if is_condensable(expression) {
        return of(evaluate(expression));
    }

    match expression {
        Expression::Amount(_) | Expression::Roll(_) | Expression::Reference(_) => {
            expression.clone()
        }
        Expression::Add(l, r) => Expression::Add(condensed(l), condensed(r)),
        Expression::Subtract(l, r) => Expression::Subtract(condensed(l), condensed(r)),
        Expression::Multiply(l, r) => Expression::Multiply(condensed(l), condensed(r)),
        Expression::Divide(l, r) => Expression::Divide(condensed(l), condensed(r)),
        Expression::Power(l, r) => Expression::Power(condensed(l), condensed(r)),
        Expression::Abs(arg) => Expression::Abs(condensed(arg)),
    }
}

fn condensed(child: &Arc<Expression>) -> Arc<Expression> {
    if is_condensable(child) {
        Arc::new(of(evaluate(child)))
    } else {
        Arc::new(condense(child))
    }
}
