//! [`Test`] and [`TestFamily`]: the composition that replaces the
//! `test -> basic_test<Checker> -> user test` inheritance chain (§9 design
//! notes) with a `Test` that owns a `Logger` and runs a boxed body.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::format::to_file_stem;
use crate::kind::TestMode;
use crate::logger::{Logger, LogSummary, RecoveryPaths};

/// The body of a user test: given a mutable [`Logger`], drives checks
/// through it. Implemented by closures via the blanket impl below, or
/// directly for test bodies that need more state than a closure captures.
pub trait TestBody: Send + Sync {
    fn run(&self, logger: &mut Logger);
}

impl<F: Fn(&mut Logger) + Send + Sync> TestBody for F {
    fn run(&self, logger: &mut Logger) {
        self(logger)
    }
}

/// A named unit with a single entry point, [`Test::execute`].
pub struct Test {
    name: String,
    source_file: PathBuf,
    mode: TestMode,
    materials_dir: Option<PathBuf>,
    body: Box<dyn TestBody>,
}

impl Test {
    pub fn new(name: impl Into<String>, source_file: impl Into<PathBuf>, body: impl TestBody + 'static) -> Self {
        Self {
            name: name.into(),
            source_file: source_file.into(),
            mode: TestMode::Standard,
            materials_dir: None,
            body: Box::new(body),
        }
    }

    pub fn with_mode(mut self, mode: TestMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_materials_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.materials_dir = Some(dir.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical path to the file declaring the test, relative to the
    /// project root — this crate's resolution of the
    /// `source_file`/`source_filename` open question (§9).
    pub fn source_file(&self) -> &Path {
        &self.source_file
    }

    pub fn mode(&self) -> TestMode {
        self.mode
    }

    pub fn materials_dir(&self) -> Option<&Path> {
        self.materials_dir.as_deref()
    }

    /// The diagnostic-file suffix for this test's mode (§6).
    pub fn diagnostic_suffix(&self) -> &'static str {
        match self.mode {
            TestMode::Standard => "Output",
            TestMode::FalsePositive => "FP",
            TestMode::FalseNegative => "FN",
        }
    }

    /// Runs the test body inside a panic boundary, producing a
    /// [`LogSummary`]. A panic is caught and logged as "Unexpected
    /// Exception" (string payload) or "Unknown Exception" (anything else)
    /// if no sentinel already tagged it critical on the way out.
    pub fn execute(&self, recovery: RecoveryPaths) -> LogSummary {
        let start = Instant::now();
        let mut logger = Logger::new(self.mode).with_recovery(recovery);

        let body = &self.body;
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            body.run(&mut logger);
        }));

        if let Err(payload) = result {
            if logger.critical_failures() == 0 {
                if let Some(message) = payload.downcast_ref::<&str>() {
                    logger.record_critical("Unexpected Exception", message);
                } else if let Some(message) = payload.downcast_ref::<String>() {
                    logger.record_critical("Unexpected Exception", message);
                } else {
                    logger.record_critical("Unknown Exception", "a non-string panic payload escaped the test body");
                }
            }
        }

        logger.finish(start.elapsed())
    }
}

/// Ensures a materials sub-tree is copied at most once per family
/// execution.
#[derive(Default)]
struct MaterialsDeduplicator {
    copied: HashSet<PathBuf>,
}

impl MaterialsDeduplicator {
    fn copy_if_needed(&mut self, source: &Path, dest: &Path) -> std::io::Result<()> {
        if self.copied.contains(source) {
            return Ok(());
        }
        copy_dir_recursive(source, dest)?;
        self.copied.insert(source.to_path_buf());
        Ok(())
    }
}

fn copy_dir_recursive(source: &Path, dest: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dest)?;
    for entry in fs::read_dir(source)? {
        let entry = entry?;
        let target = dest.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), target)?;
        }
    }
    Ok(())
}

/// A named collection of [`Test`]s sharing materials/repository paths.
pub struct TestFamily {
    name: String,
    tests: Vec<Test>,
    working_materials_root: Option<PathBuf>,
}

impl TestFamily {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tests: Vec::new(),
            working_materials_root: None,
        }
    }

    pub fn with_working_materials_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.working_materials_root = Some(root.into());
        self
    }

    pub fn push(&mut self, test: Test) {
        self.tests.push(test);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tests(&self) -> &[Test] {
        &self.tests
    }

    fn prepare_materials(&self, dedup: &mut MaterialsDeduplicator) {
        let Some(root) = &self.working_materials_root else {
            return;
        };
        for test in &self.tests {
            if let Some(materials) = test.materials_dir() {
                let dest = root.join(&self.name).join(to_file_stem(test.name()));
                if let Err(e) = dedup.copy_if_needed(materials, &dest) {
                    warn!("failed to copy materials for {}: {e}", test.name());
                }
            }
        }
    }

    /// Runs every test serially in the calling context, returning
    /// `(duration, summaries)`.
    pub fn execute_serial(&self, diagnostics_dir: Option<&Path>) -> (Duration, Vec<LogSummary>) {
        let start = Instant::now();
        let mut dedup = MaterialsDeduplicator::default();
        self.prepare_materials(&mut dedup);

        let summaries = self
            .tests
            .iter()
            .map(|test| {
                debug!(family = %self.name, test = test.name(), "running test");
                let summary = test.execute(RecoveryPaths::none());
                self.write_diagnostics(test, &summary, diagnostics_dir);
                summary
            })
            .collect();

        (start.elapsed(), summaries)
    }

    /// Runs every test concurrently on a [`tokio_scoped`] scope, returning
    /// `(duration, summaries)` in submission order. `tokio_scoped::scope`
    /// blocks the calling thread until every spawned task completes, which
    /// is what lets it borrow `&Test` without a `'static` bound.
    pub fn execute_concurrent(&self, diagnostics_dir: Option<&Path>) -> (Duration, Vec<LogSummary>) {
        let start = Instant::now();
        let mut dedup = MaterialsDeduplicator::default();
        self.prepare_materials(&mut dedup);

        let slots: std::sync::Mutex<Vec<Option<LogSummary>>> =
            std::sync::Mutex::new((0..self.tests.len()).map(|_| None).collect());

        tokio_scoped::scope(|scope| {
            for (index, test) in self.tests.iter().enumerate() {
                let slots = &slots;
                scope.spawn(async move {
                    debug!(family = %self.name, test = test.name(), "running test");
                    let summary = test.execute(RecoveryPaths::none());
                    slots.lock().expect("summary slots poisoned")[index] = Some(summary);
                });
            }
        });

        let summaries: Vec<LogSummary> = slots
            .into_inner()
            .expect("summary slots poisoned")
            .into_iter()
            .map(|slot| slot.expect("every slot is filled before the scope returns"))
            .collect();

        for (test, summary) in self.tests.iter().zip(&summaries) {
            self.write_diagnostics(test, summary, diagnostics_dir);
        }

        (start.elapsed(), summaries)
    }

    fn write_diagnostics(&self, test: &Test, summary: &LogSummary, diagnostics_dir: Option<&Path>) {
        let Some(dir) = diagnostics_dir else { return };
        let family_dir = dir.join(&self.name);
        if let Err(e) = fs::create_dir_all(&family_dir) {
            warn!("failed to create diagnostics dir {}: {e}", family_dir.display());
            return;
        }
        let file = family_dir.join(format!(
            "{}_{}.txt",
            to_file_stem(test.name()),
            test.diagnostic_suffix()
        ));
        let mut contents = summary.failure_messages.clone();
        if !summary.diagnostics_output.is_empty() {
            contents.push_str("\n--- diagnostics ---\n");
            contents.push_str(&summary.diagnostics_output);
        }
        if let Err(e) = fs::write(&file, contents) {
            warn!("failed to write diagnostic file {}: {e}", file.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successful_test_produces_a_passing_summary() {
        let test = Test::new("adds", "tests/math.rs", |logger: &mut Logger| {
            crate::tester::check(crate::kind::ComparisonKind::Equality, "sum", logger, &4, &4);
        });
        let summary = test.execute(RecoveryPaths::none());
        assert!(summary.is_success());
        assert_eq!(summary.checks, 1);
    }

    #[test]
    fn panicking_test_is_logged_as_a_critical_failure() {
        let test = Test::new("panics", "tests/math.rs", |_logger: &mut Logger| {
            panic!("boom");
        });
        let summary = test.execute(RecoveryPaths::none());
        assert!(!summary.is_success());
        assert_eq!(summary.critical_failures, 1);
        assert!(summary.failure_messages.contains("Unexpected Exception"));
        assert!(summary.failure_messages.contains("boom"));
    }

    #[test]
    fn family_execute_serial_aggregates_summaries() {
        let mut family = TestFamily::new("arithmetic");
        family.push(Test::new("a", "tests/math.rs", |logger: &mut Logger| {
            crate::tester::check(crate::kind::ComparisonKind::Equality, "d", logger, &1, &1);
        }));
        family.push(Test::new("b", "tests/math.rs", |logger: &mut Logger| {
            crate::tester::check(crate::kind::ComparisonKind::Equality, "d", logger, &1, &2);
        }));
        let (_, summaries) = family.execute_serial(None);
        assert_eq!(summaries.len(), 2);
        assert!(summaries[0].is_success());
        assert!(!summaries[1].is_success());
    }
}
