use super::ProcessModifier;
use crate::descriptor::RawModifier;
use crate::diagnostics::{DiagnosticKey, Logger};
use crate::modifier::Modifier;

/// Fallback for paths no registered handler covers. Builds nothing.
#[derive(Clone, Debug)]
pub struct NoopHandler {
    logger: Logger,
}

impl NoopHandler {
    pub const NAME: &'static str = "noop";

    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }
}

impl ProcessModifier for NoopHandler {
    fn handler_name(&self) -> &'static str {
        Self::NAME
    }

    fn process_modifier(&self, raw: &RawModifier) -> Vec<Modifier> {
        self.logger.log(DiagnosticKey::NoHandler, [raw.path.as_str()]);
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::of;

    #[test]
    fn reports_and_builds_nothing() {
        let (logger, log) = Logger::collecting();
        let handler = NoopHandler::new(logger);
        assert!(handler.process_modifier(&RawModifier::new("x.y", of(1.0))).is_empty());
        assert_eq!(log.count(DiagnosticKey::NoHandler), 1);
        assert!(log.entries()[0].mentions("x.y"));
    }
}
