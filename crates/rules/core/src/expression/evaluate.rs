//! Concrete evaluation.

use super::Expression;

/// Evaluate an expression to a number.
///
/// - `Amount`: its value
/// - `Reference`: the bound property as of now, 0 if missing or non-numeric
/// - `Roll`: its resolved total, 0 if not yet rolled
/// - operators: applied to the recursively evaluated operands
pub fn evaluate(expression: &Expression) -> f64 {
    match expression {
        Expression::Amount(literal) => literal.value(),
        Expression::Reference(reference) => reference.resolve(),
        Expression::Roll(roll) => roll.total().unwrap_or(0.0),
        Expression::Add(l, r) => evaluate(l) + evaluate(r),
        Expression::Subtract(l, r) => evaluate(l) - evaluate(r),
        Expression::Multiply(l, r) => evaluate(l) * evaluate(r),
        Expression::Divide(l, r) => evaluate(l) / evaluate(r),
        Expression::Power(base, exponent) => evaluate(base).powf(evaluate(exponent)),
        Expression::Abs(arg) => evaluate(arg).abs(),
    }
}
