//! Rule-modifier engine: symbolic arithmetic and path-routed validation.
//!
//! `rules-core` turns loosely typed modifier descriptors (`item.damage.fire
//! 1d6`) into immutable [`Modifier`]s whose values stay symbolic until asked
//! for. Values are [`Expression`] trees evaluated, condensed, rendered and
//! compared by four interpreters in [`expression`]. Descriptors are routed by
//! path through a [`Registry`] of [`Handler`] constructors; each handler
//! validates against its [`Config`] schema and reports content problems via
//! the injected diagnostics [`Logger`] instead of failing.
//!
//! The crate is pure and synchronous: no I/O and no global state. A registry
//! is built once at startup and passed by reference to every [`HandlerCache`].
pub mod config;
pub mod descriptor;
pub mod diagnostics;
pub mod dice;
pub mod error;
pub mod expression;
pub mod handler;
pub mod modifier;
pub mod registry;

pub use config::{Config, ConfigSegment, ConfigSpec, RulesConfig, SegmentSpec};
pub use descriptor::{AttributeValue, RawModifier, ReferenceSpec, Sign};
pub use diagnostics::{Diagnostic, DiagnosticKey, DiagnosticLog, Logger};
pub use dice::{DiceTerm, PcgRng, RngOracle, Roll, RollOperator, RollTerm};
pub use error::{DiceError, ErrorSeverity, ExpressionError, RegistryError, RulesError};
pub use expression::{
    Expression, Literal, PropertySource, PropertyTree, PropertyValue, Range, Reference, TriState,
};
pub use handler::{Handler, HandlerContext, NoopHandler, ProcessModifier};
pub use modifier::{
    Modifier, ModifierCollection, Origin, Tooltip, TooltipAccumulator, TooltipEntry, TooltipKind,
};
pub use registry::{HandlerCache, HandlerCtor, Registry};
