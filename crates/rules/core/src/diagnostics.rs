//! Diagnostics channel for recoverable content problems.
//!
//! Handlers and the registry never fail on bad *data*. Instead they emit a
//! [`Diagnostic`] (a structured message key plus string arguments) through an
//! injected [`Logger`], drop the affected modifier, and carry on with the rest
//! of the batch. Callers decide where diagnostics end up: the tracing
//! subscriber, a UI notification queue, or an in-memory [`DiagnosticLog`].

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// Message key identifying the kind of problem a diagnostic reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::AsRefStr, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "kebab-case")]
pub enum DiagnosticKey {
    /// The requested path is outside the handler's configured namespace.
    UnknownGroupId,
    /// A required attribute is absent from the descriptor.
    MissingDescriptor,
    /// An attribute is neither required nor optional for the segment.
    UnknownDescriptor,
    /// An attribute is present but its value cannot be used.
    InvalidDescriptor,
    /// No handler is registered for any prefix of the requested path.
    NoHandler,
    /// A newly registered path has an already registered ancestor.
    ShadowedByAncestor,
    /// A newly registered path is an ancestor of already registered paths.
    ShadowsDescendant,
}

/// A structured diagnostic: message key plus positional arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Diagnostic {
    pub key: DiagnosticKey,
    pub args: Vec<String>,
}

impl Diagnostic {
    pub fn new<I, S>(key: DiagnosticKey, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key,
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Flattened message list: the key followed by every argument.
    pub fn messages(&self) -> Vec<&str> {
        std::iter::once(self.key.as_ref())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }

    /// Returns true if any argument equals `needle`.
    pub fn mentions(&self, needle: &str) -> bool {
        self.args.iter().any(|arg| arg == needle)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)?;
        if !self.args.is_empty() {
            write!(f, ": {}", self.args.join(", "))?;
        }
        Ok(())
    }
}

type Sink = dyn Fn(&Diagnostic) + Send + Sync;

/// Caller-supplied diagnostics callback.
///
/// Cloning a logger is cheap; clones share the same sink.
#[derive(Clone)]
pub struct Logger {
    sink: Arc<Sink>,
}

impl Logger {
    /// Wraps an arbitrary callback.
    pub fn new(sink: impl Fn(&Diagnostic) + Send + Sync + 'static) -> Self {
        Self {
            sink: Arc::new(sink),
        }
    }

    /// Forwards every diagnostic to `tracing` at warn level.
    pub fn tracing() -> Self {
        Self::new(|diagnostic| {
            tracing::warn!(
                target: "rules::diagnostics",
                key = diagnostic.key.as_ref(),
                args = ?diagnostic.args,
                "{}", diagnostic
            );
        })
    }

    /// Discards every diagnostic.
    pub fn silent() -> Self {
        Self::new(|_| {})
    }

    /// Returns a logger that records diagnostics into a shared [`DiagnosticLog`].
    pub fn collecting() -> (Self, DiagnosticLog) {
        let log = DiagnosticLog::default();
        let entries = Arc::clone(&log.entries);
        let logger = Self::new(move |diagnostic| {
            entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(diagnostic.clone());
        });
        (logger, log)
    }

    /// Emits a diagnostic built from a key and its arguments.
    pub fn log<I, S>(&self, key: DiagnosticKey, args: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.emit(&Diagnostic::new(key, args));
    }

    pub fn emit(&self, diagnostic: &Diagnostic) {
        (self.sink)(diagnostic);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::tracing()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger").finish_non_exhaustive()
    }
}

/// In-memory diagnostics store shared with a collecting [`Logger`].
#[derive(Clone, Debug, Default)]
pub struct DiagnosticLog {
    entries: Arc<Mutex<Vec<Diagnostic>>>,
}

impl DiagnosticLog {
    /// Snapshot of every diagnostic recorded so far.
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of recorded diagnostics with the given key.
    pub fn count(&self, key: DiagnosticKey) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|d| d.key == key)
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes and returns every recorded diagnostic.
    pub fn drain(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.entries.lock().unwrap_or_else(PoisonError::into_inner))
    }
}
