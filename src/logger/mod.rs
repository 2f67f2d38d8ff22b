//! Per-test check accounting.
//!
//! A [`Logger`] is created with a [`Test`](crate::test::Test) and destroyed
//! once [`Logger::finish`] produces its [`LogSummary`]. All mutation happens
//! through a [`Sentinel`](sentinel::Sentinel), which every check constructs
//! on entry and whose [`Drop`] impl performs the end-of-block bookkeeping
//! described in the module-level docs of [`sentinel`].

pub mod sentinel;

use std::fmt::Write as _;
use std::fs;
use std::ops::Add;
use std::path::PathBuf;
use std::time::Duration;

pub use sentinel::Sentinel;

use crate::kind::TestMode;

/// Process-wide side-channel files used to localize the last successful
/// check when the process crashes mid-run.
///
/// Only meaningful under serial execution: [`Runner::execute`](crate::runner::Runner::execute)
/// refuses to enable either file under concurrent execution, since both
/// require a single-writer invariant.
#[derive(Debug, Clone)]
pub struct RecoveryPaths {
    pub recovery_file: Option<PathBuf>,
    pub dump_file: Option<PathBuf>,
}

impl RecoveryPaths {
    pub fn none() -> Self {
        Self {
            recovery_file: None,
            dump_file: None,
        }
    }

    fn note_entry(&self, description: &str) {
        if let Some(path) = &self.recovery_file {
            let _ = fs::write(path, format!("check started: {description}\n"));
        }
        if let Some(path) = &self.dump_file {
            if let Ok(mut existing) = fs::read_to_string(path) {
                existing.push_str(description);
                existing.push('\n');
                let _ = fs::write(path, existing);
            } else {
                let _ = fs::write(path, format!("{description}\n"));
            }
        }
    }

    fn note_clean_exit(&self) {
        if let Some(path) = &self.recovery_file {
            let _ = fs::write(path, "");
        }
    }
}

/// A single logical check, identified by a monotone top-level index.
#[derive(Debug, Clone, Default)]
pub struct CheckRecord {
    pub top_level_index: u64,
    pub description: String,
    pub failure_text: String,
    pub critical: bool,
    pub depth: usize,
}

/// Process-local, per-test accounting mutated exclusively by
/// [`Sentinel`](sentinel::Sentinel)s.
#[derive(Debug)]
pub struct Logger {
    mode: TestMode,
    depth: usize,
    checks: u64,
    top_level_checks: u64,
    failures: u64,
    top_level_failures: u64,
    critical_failures: u64,
    performance_checks: u64,
    performance_failures: u64,
    message_stack: Vec<String>,
    pending: String,
    failure_messages: String,
    diagnostics_output: String,
    caught_exceptions: String,
    recovery: RecoveryPaths,
}

impl Logger {
    pub fn new(mode: TestMode) -> Self {
        Self {
            mode,
            depth: 0,
            checks: 0,
            top_level_checks: 0,
            failures: 0,
            top_level_failures: 0,
            critical_failures: 0,
            performance_checks: 0,
            performance_failures: 0,
            message_stack: Vec::new(),
            pending: String::new(),
            failure_messages: String::new(),
            diagnostics_output: String::new(),
            caught_exceptions: String::new(),
            recovery: RecoveryPaths::none(),
        }
    }

    pub fn with_recovery(mut self, recovery: RecoveryPaths) -> Self {
        self.recovery = recovery;
        self
    }

    pub fn mode(&self) -> TestMode {
        self.mode
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The total number of sentinels ever constructed under this logger,
    /// at any depth — the "deep check" count.
    pub fn checks(&self) -> u64 {
        self.checks
    }

    pub fn top_level_checks(&self) -> u64 {
        self.top_level_checks
    }

    pub fn failures(&self) -> u64 {
        self.failures
    }

    pub fn top_level_failures(&self) -> u64 {
        self.top_level_failures
    }

    pub fn critical_failures(&self) -> u64 {
        self.critical_failures
    }

    /// Records a check outcome. Called by [`crate::tester::check`] (never
    /// directly by user test bodies) at most once per
    /// [`Sentinel`](sentinel::Sentinel) scope.
    pub fn record(&mut self, passed: bool, failure_text: &str) {
        if !passed {
            self.failures += 1;
            let indent = "  ".repeat(self.depth.saturating_sub(1));
            let label = self
                .message_stack
                .last()
                .cloned()
                .unwrap_or_else(|| "<unnamed check>".to_string());
            let _ = writeln!(self.pending, "{indent}{label}: {failure_text}");
        }
    }

    pub fn record_performance(&mut self, passed: bool) {
        self.performance_checks += 1;
        if !passed {
            self.performance_failures += 1;
        }
    }

    pub fn record_caught_exception(&mut self, text: &str) {
        self.caught_exceptions.push_str(text);
        self.caught_exceptions.push('\n');
    }

    /// Directly records a critical failure, bypassing sentinel bookkeeping.
    /// Used by [`crate::test::Test::execute`] when a panic unwinds past
    /// every open sentinel without one having already tagged it critical
    /// (i.e. the panic occurred outside any check).
    pub fn record_critical(&mut self, description: &str, text: &str) {
        self.critical_failures += 1;
        self.top_level_failures += 1;
        let _ = writeln!(self.failure_messages, "{description}\n{text}");
    }

    fn enter(&mut self, description: &str) -> bool {
        let top_level = self.depth == 0;
        self.checks += 1;
        if top_level {
            self.top_level_checks += 1;
            self.recovery.note_entry(description);
        }
        self.message_stack.push(description.to_string());
        self.depth += 1;
        top_level
    }

    fn exit(
        &mut self,
        description: &str,
        top_level: bool,
        failed_in_scope: bool,
        panicking: bool,
    ) {
        self.depth -= 1;
        self.message_stack.pop();
        if !top_level {
            return;
        }

        if panicking {
            self.critical_failures += 1;
            self.top_level_failures += 1;
            let body = if self.pending.is_empty() {
                "check did not return normally".to_string()
            } else {
                std::mem::take(&mut self.pending)
            };
            let _ = writeln!(self.failure_messages, "{description}\n{body}");
            return;
        }

        self.recovery.note_clean_exit();

        match self.mode {
            TestMode::Standard => {
                if failed_in_scope {
                    self.top_level_failures += 1;
                    let body = std::mem::take(&mut self.pending);
                    let _ = writeln!(self.failure_messages, "{description}\n{body}");
                } else {
                    self.pending.clear();
                }
            }
            TestMode::FalsePositive => {
                if failed_in_scope {
                    // The real failure is exactly what a false-positive test
                    // is hunting for: quietly archive it, report nothing.
                    let body = std::mem::take(&mut self.pending);
                    let _ = writeln!(self.diagnostics_output, "{description}\n{body}");
                } else {
                    self.top_level_failures += 1;
                    let _ = writeln!(
                        self.failure_messages,
                        "{description}\nFalse Positive Failure: expected a failure but the check passed"
                    );
                }
            }
            TestMode::FalseNegative => {
                if failed_in_scope {
                    let body = std::mem::take(&mut self.pending);
                    let _ = writeln!(self.diagnostics_output, "{description}\n{body}");
                } else {
                    self.top_level_failures += 1;
                    let _ = writeln!(
                        self.failure_messages,
                        "{description}\nFalse Negative Failure: expected the check to pass but it failed"
                    );
                }
            }
        }
    }

    /// Consumes the logger, producing its immutable [`LogSummary`].
    pub fn finish(self, duration: Duration) -> LogSummary {
        LogSummary {
            checks: self.checks,
            top_level_checks: self.top_level_checks,
            failures: self.failures,
            top_level_failures: self.top_level_failures,
            critical_failures: self.critical_failures,
            performance_checks: self.performance_checks,
            performance_failures: self.performance_failures,
            duration,
            failure_messages: self.failure_messages,
            diagnostics_output: self.diagnostics_output,
            caught_exceptions: self.caught_exceptions,
        }
    }
}

/// The immutable outcome of one [`Test`](crate::test::Test). Monoidal under
/// component-wise addition: `(a + b) + c == a + (b + c)` and
/// `a + LogSummary::default() == a`.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LogSummary {
    pub checks: u64,
    pub top_level_checks: u64,
    pub failures: u64,
    pub top_level_failures: u64,
    pub critical_failures: u64,
    pub performance_checks: u64,
    pub performance_failures: u64,
    #[serde(skip, default)]
    pub duration: Duration,
    pub failure_messages: String,
    pub diagnostics_output: String,
    pub caught_exceptions: String,
}

impl LogSummary {
    pub fn is_success(&self) -> bool {
        self.top_level_failures == 0 && self.critical_failures == 0
    }
}

impl Add for LogSummary {
    type Output = LogSummary;

    fn add(mut self, rhs: LogSummary) -> LogSummary {
        self.checks += rhs.checks;
        self.top_level_checks += rhs.top_level_checks;
        self.failures += rhs.failures;
        self.top_level_failures += rhs.top_level_failures;
        self.critical_failures += rhs.critical_failures;
        self.performance_checks += rhs.performance_checks;
        self.performance_failures += rhs.performance_failures;
        self.duration += rhs.duration;
        if !rhs.failure_messages.is_empty() {
            if !self.failure_messages.is_empty() {
                self.failure_messages.push('\n');
            }
            self.failure_messages.push_str(&rhs.failure_messages);
        }
        if !rhs.diagnostics_output.is_empty() {
            if !self.diagnostics_output.is_empty() {
                self.diagnostics_output.push('\n');
            }
            self.diagnostics_output.push_str(&rhs.diagnostics_output);
        }
        if !rhs.caught_exceptions.is_empty() {
            if !self.caught_exceptions.is_empty() {
                self.caught_exceptions.push('\n');
            }
            self.caught_exceptions.push_str(&rhs.caught_exceptions);
        }
        self
    }
}
