//! Common error infrastructure for rules-core.
//!
//! Only programmer errors are represented as `Err` values: wiring defects such
//! as duplicate registrations or dividing by a literal zero. Problems with the
//! *content* of a modifier descriptor never surface here; they are reported
//! through the [`Logger`](crate::diagnostics::Logger) diagnostics channel and
//! the offending descriptor is dropped.

/// Severity level of an error, used for categorization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Invalid input handed to a fallible constructor (e.g. dice notation).
    Validation,

    /// Inconsistent wiring that indicates a bug in setup code.
    ///
    /// Examples: duplicate registry path, malformed registry path
    Internal,

    /// A structurally impossible value was requested.
    ///
    /// Examples: dividing by the zero literal
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all rules-core errors.
///
/// # Implementation Guidelines
///
/// - All error enums should implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity by who has to fix it, not by impact
pub trait RulesError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

// ============================================================================
// Expression Errors
// ============================================================================

/// Errors raised while constructing expressions.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ExpressionError {
    /// The divisor is structurally the zero literal.
    #[error("division by zero: cannot divide `{dividend}` by the literal 0")]
    DivisionByZero { dividend: String },
}

impl RulesError for ExpressionError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::DivisionByZero { .. } => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::DivisionByZero { .. } => "EXPRESSION_DIVISION_BY_ZERO",
        }
    }
}

// ============================================================================
// Registry Errors
// ============================================================================

/// Errors raised while registering handlers.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// A handler is already registered under the same normalized path.
    #[error("a handler for path `{0}` is already registered")]
    AlreadyRegistered(String),

    /// The path has a leading dot, trailing dot, or consecutive dots.
    #[error("malformed handler path `{0}`: empty path segment")]
    MalformedPath(String),
}

impl RulesError for RegistryError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Internal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyRegistered(_) => "REGISTRY_ALREADY_REGISTERED",
            Self::MalformedPath(_) => "REGISTRY_MALFORMED_PATH",
        }
    }
}

// ============================================================================
// Dice Errors
// ============================================================================

/// Errors raised while parsing dice notation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DiceError {
    /// The formula contains no terms.
    #[error("empty dice formula")]
    Empty,

    /// A token could not be read as a number, die or operator.
    #[error("unexpected token `{token}` in dice formula `{formula}`")]
    UnexpectedToken { formula: String, token: String },

    /// Operators and operands do not alternate.
    #[error("dangling operator in dice formula `{0}`")]
    DanglingOperator(String),

    /// A die with zero faces.
    #[error("die with zero faces in dice formula `{0}`")]
    ZeroFaces(String),

    /// A term is divided by the number 0.
    #[error("division by zero in dice formula `{0}`")]
    DivisionByZero(String),

    /// A dice term rolls more dice than allowed.
    #[error("too many dice in dice formula `{formula}` (at most {limit})")]
    TooManyDice { formula: String, limit: u32 },

    /// A die has more faces than allowed.
    #[error("too many faces in dice formula `{formula}` (at most {limit})")]
    TooManyFaces { formula: String, limit: u32 },
}

impl RulesError for DiceError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Empty => "DICE_EMPTY",
            Self::UnexpectedToken { .. } => "DICE_UNEXPECTED_TOKEN",
            Self::DanglingOperator(_) => "DICE_DANGLING_OPERATOR",
            Self::ZeroFaces(_) => "DICE_ZERO_FACES",
            Self::DivisionByZero(_) => "DICE_DIVISION_BY_ZERO",
            Self::TooManyDice { .. } => "DICE_TOO_MANY_DICE",
            Self::TooManyFaces { .. } => "DICE_TOO_MANY_FACES",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_errors_are_internal() {
        let err = RegistryError::AlreadyRegistered("item".into());
        assert!(err.severity().is_internal());
        assert_eq!(err.error_code(), "REGISTRY_ALREADY_REGISTERED");
        assert!(err.to_string().contains("already registered"));
    }

    #[test]
    fn dice_errors_are_validation() {
        let err = DiceError::Empty;
        assert_eq!(err.severity(), ErrorSeverity::Validation);
        assert!(!err.severity().is_internal());

        let err = DiceError::TooManyDice {
            formula: "2000d6".into(),
            limit: 1_000,
        };
        assert_eq!(err.error_code(), "DICE_TOO_MANY_DICE");
        assert!(err.to_string().contains("at most 1000"));
    }
}
