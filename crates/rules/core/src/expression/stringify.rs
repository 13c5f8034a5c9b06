//! Infix rendering.
//!
//! - literals render as numbers, references as their property path, rolls as
//!   their formula
//! - `+` and `-` always parenthesize themselves: `(l + r)`
//! - `*`, `/` and `^` parenthesize compound operands that are not already a
//!   single parenthesized group
//! - one redundant outer pair is stripped from the final result
//!
//! ```
//! # use rules_core::expression::*;
//! assert_eq!(stringify(&plus(of(3.0), of(3.0))), "3 + 3");
//! assert_eq!(stringify(&times(plus(of(3.0), of(3.0)), of(3.0))), "(3 + 3) * 3");
//! ```

use super::Expression;

/// Render `expression` as an infix formula.
pub fn stringify(expression: &Expression) -> String {
    strip_outer(&render(expression)).to_owned()
}

fn render(expression: &Expression) -> String {
    match expression {
        Expression::Amount(literal) => literal.value().to_string(),
        Expression::Reference(reference) => reference.property_path().to_owned(),
        Expression::Roll(roll) => roll.formula().to_owned(),
        Expression::Add(l, r) => format!("({} + {})", render(l), render(r)),
        Expression::Subtract(l, r) => format!("({} - {})", render(l), render(r)),
        Expression::Multiply(l, r) => format!("{} * {}", operand(l), operand(r)),
        Expression::Divide(l, r) => format!("{} / {}", operand(l), operand(r)),
        Expression::Power(base, exponent) => format!("{} ^ {}", operand(base), operand(exponent)),
        Expression::Abs(arg) => format!("abs({})", stringify(arg)),
    }
}

/// Operand of a multiplicative operator, grouped when needed.
fn operand(expression: &Expression) -> String {
    let rendered = render(expression);
    if needs_group(expression) && !is_wrapped(&rendered) {
        format!("({rendered})")
    } else {
        rendered
    }
}

fn needs_group(expression: &Expression) -> bool {
    match expression {
        Expression::Amount(_) | Expression::Reference(_) | Expression::Abs(_) => false,
        Expression::Roll(roll) => roll.terms().len() > 1,
        _ => true,
    }
}

/// True if the whole string is one parenthesized group: `(a + b)` is,
/// `(a + b) * (c + d)` is not.
fn is_wrapped(s: &str) -> bool {
    if !s.starts_with('(') || !s.ends_with(')') {
        return false;
    }
    let mut depth = 0usize;
    for (index, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return index == s.len() - 1;
                }
            }
            _ => {}
        }
    }
    false
}

fn strip_outer(s: &str) -> &str {
    if is_wrapped(s) { &s[1..s.len() - 1] } else { s }
}
