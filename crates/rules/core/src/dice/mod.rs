//! Dice rolls.
//!
//! A [`Roll`] is an ordered list of [`RollTerm`]s parsed from notation such as
//! `2d6 + 3` or `1d20kh1 - 1d4`. A roll may be *unresolved* (faces not yet
//! rolled) or *resolved* (every die carries its results and the roll has a
//! total).
//!
//! Inside an [`Expression`] a roll behaves in two ways:
//!
//! - evaluation and condensation read its resolved total (0 if unresolved)
//! - range comparison ignores the total and estimates `[min, max]` from the
//!   dice themselves
//!
//! Die modifiers (`kh1`, `r1`, `x`, ...) are kept as text. They are reported
//! back in the formula but do not alter rolled totals, and a modified die has
//! an unknown range.

pub mod rng;

pub use rng::{PcgRng, RngOracle, compute_seed};

use std::fmt;

use crate::config::RulesConfig;
use crate::error::DiceError;
use crate::expression::{self, Expression, divided_by, minus, of, plus, times};

// ============================================================================
// Terms
// ============================================================================

/// Arithmetic operator between roll terms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RollOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl RollOperator {
    pub const fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Subtract => '-',
            Self::Multiply => '*',
            Self::Divide => '/',
        }
    }

    fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Self::Add),
            '-' => Some(Self::Subtract),
            '*' => Some(Self::Multiply),
            '/' => Some(Self::Divide),
            _ => None,
        }
    }
}

/// `NdF` dice with optional modifiers and, once rolled, per-die results.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiceTerm {
    pub number: u32,
    pub faces: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub modifiers: Vec<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub results: Vec<u32>,
}

impl DiceTerm {
    pub fn new(number: u32, faces: u32) -> Self {
        Self {
            number,
            faces,
            modifiers: Vec::new(),
            results: Vec::new(),
        }
    }

    /// Adds a modifier such as `kh1` (builder pattern).
    pub fn with_modifier(mut self, modifier: impl Into<String>) -> Self {
        self.modifiers.push(modifier.into());
        self
    }

    /// Sets rolled results (builder pattern).
    pub fn with_results(mut self, results: Vec<u32>) -> Self {
        self.results = results;
        self
    }

    pub fn is_modified(&self) -> bool {
        !self.modifiers.is_empty()
    }

    pub fn is_rolled(&self) -> bool {
        !self.results.is_empty()
    }

    /// Sum of the rolled results, if rolled.
    pub fn total(&self) -> Option<f64> {
        self.is_rolled()
            .then(|| self.results.iter().map(|&face| f64::from(face)).sum())
    }
}

impl fmt::Display for DiceTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}{}", self.number, self.faces, self.modifiers.concat())
    }
}

/// One token of a dice formula.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RollTerm {
    Dice(DiceTerm),
    Number(f64),
    Operator(RollOperator),
}

impl fmt::Display for RollTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RollTerm::Dice(dice) => write!(f, "{dice}"),
            RollTerm::Number(n) => write!(f, "{n}"),
            RollTerm::Operator(op) => write!(f, "{}", op.symbol()),
        }
    }
}

// ============================================================================
// Roll
// ============================================================================

/// A dice formula, optionally resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct Roll {
    formula: String,
    terms: Vec<RollTerm>,
    total: Option<f64>,
}

impl Roll {
    /// Parses dice notation.
    ///
    /// ```
    /// # use rules_core::dice::{Roll, RollTerm};
    /// let roll = Roll::parse("2d6 + 3").unwrap();
    /// assert_eq!(roll.terms().len(), 3);
    /// assert!(!roll.is_resolved());
    /// ```
    pub fn parse(formula: &str) -> Result<Self, DiceError> {
        let formula = formula.trim();
        let terms = tokenize(formula)?;
        validate(formula, &terms)?;
        Ok(Self {
            formula: formula.to_owned(),
            terms,
            total: None,
        })
    }

    /// Builds a roll from already structured terms.
    ///
    /// If every dice term carries results, the total is computed.
    pub fn from_terms(terms: Vec<RollTerm>) -> Result<Self, DiceError> {
        let formula = terms
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        validate(&formula, &terms)?;
        let mut roll = Self {
            formula,
            terms,
            total: None,
        };
        roll.total = roll.computed_total();
        Ok(roll)
    }

    /// Single-term roll for one dice term.
    pub fn from_dice(dice: DiceTerm) -> Self {
        Self {
            formula: dice.to_string(),
            total: dice.total(),
            terms: vec![RollTerm::Dice(dice)],
        }
    }

    /// Marks the roll as resolved with an externally computed total.
    pub fn with_total(mut self, total: f64) -> Self {
        self.total = Some(total);
        self
    }

    pub fn formula(&self) -> &str {
        &self.formula
    }

    pub fn terms(&self) -> &[RollTerm] {
        &self.terms
    }

    pub fn total(&self) -> Option<f64> {
        self.total
    }

    pub fn is_resolved(&self) -> bool {
        self.total.is_some()
    }

    /// The dice term, if this roll consists of exactly one.
    pub fn single_dice(&self) -> Option<&DiceTerm> {
        match self.terms.as_slice() {
            [RollTerm::Dice(dice)] => Some(dice),
            _ => None,
        }
    }

    /// Rolls every die and returns the resolved roll.
    pub fn resolve(&self, rng: &dyn RngOracle, seed: u64) -> Roll {
        let mut dice_index = 0u32;
        let terms = self
            .terms
            .iter()
            .map(|term| match term {
                RollTerm::Dice(dice) => {
                    let term_index = dice_index;
                    dice_index += 1;
                    let results = (0..dice.number)
                        .map(|die| rng.roll_die(compute_seed(seed, term_index, die), dice.faces))
                        .collect();
                    RollTerm::Dice(dice.clone().with_results(results))
                }
                other => other.clone(),
            })
            .collect();

        let mut resolved = Roll {
            formula: self.formula.clone(),
            terms,
            total: None,
        };
        resolved.total = resolved.computed_total();

        tracing::debug!(
            target: "rules::dice",
            formula = %resolved.formula,
            total = ?resolved.total,
            "resolved roll"
        );
        resolved
    }

    /// Re-expresses the terms as a scalar expression tree.
    ///
    /// Every dice term becomes its own single-term [`Roll`] leaf and numbers
    /// become literals; `*` and `/` bind tighter than `+` and `-`, all
    /// left-associative.
    pub fn to_expression(&self) -> Expression {
        if self.single_dice().is_some() {
            return expression::roll(self.clone());
        }

        let mut sum = of(0.0);
        let mut sum_op = RollOperator::Add;
        let mut product: Option<Expression> = None;
        let mut op = RollOperator::Add;

        for term in &self.terms {
            let operand = match term {
                RollTerm::Operator(next) => {
                    op = *next;
                    continue;
                }
                RollTerm::Dice(dice) => expression::roll(Roll::from_dice(dice.clone())),
                RollTerm::Number(n) => of(*n),
            };

            product = Some(match (product.take(), op) {
                (None, _) => operand,
                (Some(p), RollOperator::Multiply) => times(p, operand),
                // literal zero divisors are rejected by `validate`
                (Some(p), RollOperator::Divide) => {
                    divided_by(p, operand).unwrap_or_else(|_| of(f64::NAN))
                }
                (Some(p), RollOperator::Add | RollOperator::Subtract) => {
                    sum = accumulate(sum, sum_op, p);
                    sum_op = op;
                    operand
                }
            });
        }

        match product {
            Some(p) => accumulate(sum, sum_op, p),
            None => sum,
        }
    }

    fn computed_total(&self) -> Option<f64> {
        let all_rolled = self.terms.iter().all(|term| match term {
            RollTerm::Dice(dice) => dice.is_rolled(),
            _ => true,
        });
        if !all_rolled {
            return None;
        }
        match self.single_dice() {
            Some(dice) => dice.total(),
            None => Some(expression::evaluate(&self.to_expression())),
        }
    }
}

impl fmt::Display for Roll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formula)
    }
}

fn accumulate(sum: Expression, op: RollOperator, operand: Expression) -> Expression {
    match op {
        RollOperator::Subtract => minus(sum, operand),
        _ => plus(sum, operand),
    }
}

// ============================================================================
// Parsing
// ============================================================================

fn tokenize(formula: &str) -> Result<Vec<RollTerm>, DiceError> {
    let chars: Vec<char> = formula.chars().collect();
    let unexpected = |token: String| DiceError::UnexpectedToken {
        formula: formula.to_owned(),
        token,
    };

    let mut terms = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        if let Some(op) = RollOperator::from_char(c) {
            terms.push(RollTerm::Operator(op));
            i += 1;
            continue;
        }
        if !(c.is_ascii_digit() || matches!(c, '.' | 'd' | 'D')) {
            return Err(unexpected(c.to_string()));
        }

        let start = i;
        while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
            i += 1;
        }
        let count: String = chars[start..i].iter().collect();

        if i < chars.len() && matches!(chars[i], 'd' | 'D') {
            i += 1;
            let faces_start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            let faces_text: String = chars[faces_start..i].iter().collect();
            let modifiers_start = i;
            while i < chars.len()
                && (chars[i].is_ascii_alphanumeric() || matches!(chars[i], '<' | '>' | '='))
            {
                i += 1;
            }
            let suffix: String = chars[modifiers_start..i].iter().collect();
            let token: String = chars[start..i].iter().collect();

            let number = if count.is_empty() {
                1
            } else {
                count.parse().map_err(|_| unexpected(token.clone()))?
            };
            let faces = faces_text.parse().map_err(|_| unexpected(token.clone()))?;
            terms.push(RollTerm::Dice(DiceTerm {
                number,
                faces,
                modifiers: split_modifiers(&suffix),
                results: Vec::new(),
            }));
        } else {
            if i < chars.len() && chars[i].is_ascii_alphabetic() {
                let end = chars[i..]
                    .iter()
                    .position(|c| !c.is_ascii_alphanumeric())
                    .map_or(chars.len(), |offset| i + offset);
                return Err(unexpected(chars[start..end].iter().collect()));
            }
            let value = count.parse().map_err(|_| unexpected(count.clone()))?;
            terms.push(RollTerm::Number(value));
        }
    }
    Ok(terms)
}

/// `kh1r1` -> `["kh1", "r1"]`: a new modifier starts at each letter that
/// follows a non-letter.
fn split_modifiers(suffix: &str) -> Vec<String> {
    let mut modifiers: Vec<String> = Vec::new();
    let mut previous_alpha = false;
    for c in suffix.chars() {
        let alpha = c.is_ascii_alphabetic();
        match modifiers.last_mut() {
            Some(current) if !(alpha && !previous_alpha) => current.push(c),
            _ => modifiers.push(c.to_string()),
        }
        previous_alpha = alpha;
    }
    modifiers
}

fn validate(formula: &str, terms: &[RollTerm]) -> Result<(), DiceError> {
    if terms.is_empty() {
        return Err(DiceError::Empty);
    }
    if terms.len() % 2 == 0 {
        return Err(DiceError::DanglingOperator(formula.to_owned()));
    }

    for (index, term) in terms.iter().enumerate() {
        let expects_operand = index % 2 == 0;
        match (term, expects_operand) {
            (RollTerm::Operator(_), true) | (RollTerm::Dice(_) | RollTerm::Number(_), false) => {
                return Err(DiceError::DanglingOperator(formula.to_owned()));
            }
            (RollTerm::Dice(dice), true) if dice.faces == 0 => {
                return Err(DiceError::ZeroFaces(formula.to_owned()));
            }
            (RollTerm::Dice(dice), true) if dice.number > RulesConfig::MAX_DICE_PER_TERM => {
                return Err(DiceError::TooManyDice {
                    formula: formula.to_owned(),
                    limit: RulesConfig::MAX_DICE_PER_TERM,
                });
            }
            (RollTerm::Dice(dice), true) if dice.faces > RulesConfig::MAX_DIE_FACES => {
                return Err(DiceError::TooManyFaces {
                    formula: formula.to_owned(),
                    limit: RulesConfig::MAX_DIE_FACES,
                });
            }
            (RollTerm::Number(n), true) if *n == 0.0 && index > 0 => {
                if terms[index - 1] == RollTerm::Operator(RollOperator::Divide) {
                    return Err(DiceError::DivisionByZero(formula.to_owned()));
                }
            }
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::evaluate;

    #[test]
    fn parses_dice_numbers_and_operators() {
        let roll = Roll::parse("2d6 + 3").unwrap();
        assert_eq!(
            roll.terms(),
            &[
                RollTerm::Dice(DiceTerm::new(2, 6)),
                RollTerm::Operator(RollOperator::Add),
                RollTerm::Number(3.0),
            ]
        );
        assert_eq!(roll.formula(), "2d6 + 3");
        assert_eq!(roll.total(), None);
    }

    #[test]
    fn parses_implicit_count_and_modifiers() {
        let roll = Roll::parse("d20kh1r1").unwrap();
        let dice = roll.single_dice().unwrap();
        assert_eq!(dice.number, 1);
        assert_eq!(dice.faces, 20);
        assert_eq!(dice.modifiers, vec!["kh1".to_string(), "r1".to_string()]);
        assert_eq!(dice.to_string(), "1d20kh1r1");
    }

    #[test]
    fn rejects_malformed_formulas() {
        assert_eq!(Roll::parse("  "), Err(DiceError::Empty));
        assert!(matches!(
            Roll::parse("2d6 +"),
            Err(DiceError::DanglingOperator(_))
        ));
        assert!(matches!(
            Roll::parse("+ 2"),
            Err(DiceError::DanglingOperator(_))
        ));
        assert!(matches!(
            Roll::parse("2 3"),
            Err(DiceError::DanglingOperator(_))
        ));
        assert!(matches!(Roll::parse("1d0"), Err(DiceError::ZeroFaces(_))));
        assert!(matches!(
            Roll::parse("1d6 / 0"),
            Err(DiceError::DivisionByZero(_))
        ));
        assert!(matches!(
            Roll::parse("2 + abc"),
            Err(DiceError::UnexpectedToken { .. })
        ));
        assert!(matches!(
            Roll::parse("3k"),
            Err(DiceError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn rejects_oversized_dice() {
        assert!(matches!(
            Roll::parse("4000000000d6"),
            Err(DiceError::TooManyDice { limit: RulesConfig::MAX_DICE_PER_TERM, .. })
        ));
        assert!(matches!(
            Roll::parse("1d6 + 1001d6"),
            Err(DiceError::TooManyDice { .. })
        ));
        assert!(matches!(
            Roll::parse("1d10001"),
            Err(DiceError::TooManyFaces { .. })
        ));
        assert!(matches!(
            Roll::from_terms(vec![RollTerm::Dice(DiceTerm::new(5_000, 6))]),
            Err(DiceError::TooManyDice { .. })
        ));

        let largest = Roll::parse("1000d10000").unwrap().resolve(&PcgRng, 3);
        assert_eq!(largest.single_dice().unwrap().results.len(), 1000);
    }

    #[test]
    fn to_expression_respects_precedence() {
        assert_eq!(evaluate(&Roll::parse("1 + 2 * 3").unwrap().to_expression()), 7.0);
        assert_eq!(evaluate(&Roll::parse("10 - 2 - 3").unwrap().to_expression()), 5.0);
        assert_eq!(evaluate(&Roll::parse("8 / 2 / 2").unwrap().to_expression()), 2.0);
    }

    #[test]
    fn resolve_is_deterministic_and_in_range() {
        let roll = Roll::parse("3d6 + 2").unwrap();
        let first = roll.resolve(&PcgRng, 99);
        let second = roll.resolve(&PcgRng, 99);
        assert_eq!(first, second);

        let total = first.total().unwrap();
        assert!((5.0..=20.0).contains(&total));

        let RollTerm::Dice(dice) = &first.terms()[0] else {
            panic!("first term should be dice");
        };
        assert_eq!(dice.results.len(), 3);
        assert_eq!(total, dice.total().unwrap() + 2.0);
    }

    #[test]
    fn from_terms_computes_total_when_rolled() {
        let roll = Roll::from_terms(vec![
            RollTerm::Dice(DiceTerm::new(2, 6).with_results(vec![4, 5])),
            RollTerm::Operator(RollOperator::Multiply),
            RollTerm::Number(2.0),
        ])
        .unwrap();
        assert_eq!(roll.formula(), "2d6 * 2");
        assert_eq!(roll.total(), Some(18.0));

        let unrolled = Roll::from_terms(vec![RollTerm::Dice(DiceTerm::new(1, 8))]).unwrap();
        assert_eq!(unrolled.total(), None);
    }

    #[test]
    fn split_modifiers_groups_by_letter_runs() {
        assert_eq!(split_modifiers("kh1r<2x"), vec!["kh1", "r<2", "x"]);
        assert!(split_modifiers("").is_empty());
    }
}
