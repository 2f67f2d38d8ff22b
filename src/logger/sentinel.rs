//! The scoped guard wrapping every check.
//!
//! Construction pushes the check's description onto the logger's message
//! stack and, if the logger was at depth zero, bumps the top-level-check
//! counter and notes entry in the recovery file. [`Drop`] decrements the
//! depth and, once it reaches zero again, routes the accumulated failure
//! text according to the test's [`TestMode`] inversion rules.
//!
//! Sentinels nest by construction order and Rust's own `Drop` order already
//! destroys them LIFO, so no manual stack is needed to keep nesting correct
//! — only the logger's message stack, which mirrors it for formatting.

use super::Logger;

/// Scoped guard created at the entry of every check.
///
/// Must not outlive the [`Logger`] it borrows; the borrow checker enforces
/// this rather than a documented convention.
pub struct Sentinel<'a> {
    logger: &'a mut Logger,
    description: String,
    top_level: bool,
    failures_on_entry: u64,
}

impl<'a> Sentinel<'a> {
    /// Opens a new check scope under `logger` named `description`.
    pub fn new(logger: &'a mut Logger, description: impl Into<String>) -> Self {
        let description = description.into();
        let failures_on_entry = logger.failures();
        let top_level = logger.enter(&description);
        Sentinel {
            logger,
            description,
            top_level,
            failures_on_entry,
        }
    }

    /// Records the outcome of the check this sentinel wraps. Should be
    /// called at most once per sentinel.
    pub fn record(&mut self, passed: bool, failure_text: &str) {
        self.logger.record(passed, failure_text);
    }

    /// Mutable access to the underlying logger, for nested checks created
    /// inside this scope.
    pub fn logger_mut(&mut self) -> &mut Logger {
        self.logger
    }

    pub fn logger(&self) -> &Logger {
        self.logger
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl Drop for Sentinel<'_> {
    fn drop(&mut self) {
        let failed_in_scope = self.logger.failures() != self.failures_on_entry;
        let panicking = std::thread::panicking();
        self.logger
            .exit(&self.description, self.top_level, failed_in_scope, panicking);
    }
}
