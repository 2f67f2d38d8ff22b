//! [`Runner`]: the top-level aggregate owning test families, the selection
//! filter, and the four concurrency levels (§4.3, §5).

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::error::{ConfigError, RunnerError};
use crate::logger::{LogSummary, RecoveryPaths};
use crate::test::TestFamily;

/// The four discrete concurrency levels a [`Runner`] can execute families
/// and tests at (§4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConcurrencyMode {
    /// Family by family, sequentially.
    #[default]
    Serial,
    /// Families in parallel, tests within each family serially.
    Family,
    /// Families in parallel, tests within each family in parallel.
    Test,
    /// As `Test`, plus the test body may itself submit work to the
    /// scheduler (this crate runs it identically to `Test`: nothing in the
    /// core prevents a test body from spawning its own scoped work, but no
    /// additional scheduling capacity is reserved for it).
    Deep,
}

impl ConcurrencyMode {
    pub fn from_async_depth(depth: u8) -> Result<Self, ConfigError> {
        match depth {
            0 => Ok(ConcurrencyMode::Family),
            1 => Ok(ConcurrencyMode::Test),
            2 => Ok(ConcurrencyMode::Deep),
            _ => Err(ConfigError::InvalidAsyncDepth(depth)),
        }
    }

    fn is_concurrent(self) -> bool {
        self != ConcurrencyMode::Serial
    }
}

/// Output-affecting flags separate from concurrency.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputMode {
    pub verbose: bool,
    pub write_files: bool,
}

/// The add-to-selection-set filter built from `test <family>` and
/// `source <path>` CLI arguments.
#[derive(Debug, Default)]
pub struct Selection {
    families: HashSet<String>,
    sources: HashSet<String>,
    marked: Mutex<HashSet<String>>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_family(&mut self, name: impl Into<String>) {
        self.families.insert(name.into());
    }

    pub fn add_source(&mut self, source: impl Into<String>) {
        self.sources.insert(source.into());
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty() && self.sources.is_empty()
    }

    /// True if `family` matches the selection (or the selection is empty,
    /// meaning "everything"), marking whichever entry matched as exercised.
    fn matches(&self, family: &TestFamily) -> bool {
        if self.is_empty() {
            return true;
        }
        if self.families.contains(family.name()) {
            self.marked.lock().unwrap().insert(family.name().to_string());
            return true;
        }
        for test in family.tests() {
            let stem = test.source_file().to_string_lossy().to_string();
            if self.sources.contains(&stem) {
                self.marked.lock().unwrap().insert(stem);
                return true;
            }
        }
        false
    }

    /// Selections that named a family or source which nothing matched.
    fn unmatched(&self) -> Vec<String> {
        let marked = self.marked.lock().unwrap();
        self.families
            .iter()
            .chain(self.sources.iter())
            .filter(|s| !marked.contains(*s))
            .cloned()
            .collect()
    }
}

/// Holds a collection of families, a selection set, an output mode, a
/// concurrency mode, a project-root path, and the recovery/dump file
/// configuration.
pub struct Runner {
    families: Vec<TestFamily>,
    selection: Selection,
    output_mode: OutputMode,
    concurrency: ConcurrencyMode,
    project_root: PathBuf,
    output_dir: PathBuf,
    recovery: RecoveryPaths,
}

/// The result of a full run: the coalesced grand-total summary plus each
/// family's own aggregate, in submission order.
pub struct RunOutcome {
    pub total: LogSummary,
    pub families: Vec<(String, LogSummary)>,
    pub duration: Duration,
}

impl Runner {
    pub fn new(project_root: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            families: Vec::new(),
            selection: Selection::new(),
            output_mode: OutputMode::default(),
            concurrency: ConcurrencyMode::Serial,
            project_root: project_root.into(),
            output_dir: output_dir.into(),
            recovery: RecoveryPaths::none(),
        }
    }

    pub fn with_concurrency(mut self, mode: ConcurrencyMode) -> Self {
        self.concurrency = mode;
        self
    }

    pub fn with_output_mode(mut self, mode: OutputMode) -> Self {
        self.output_mode = mode;
        self
    }

    pub fn with_recovery(mut self, recovery: RecoveryPaths) -> Self {
        self.recovery = recovery;
        self
    }

    pub fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    pub fn push_family(&mut self, family: TestFamily) -> Result<(), RunnerError> {
        if self.families.iter().any(|f| f.name() == family.name()) {
            return Err(RunnerError::DuplicateFamily(family.name().to_string()));
        }
        self.families.push(family);
        Ok(())
    }

    fn diagnostics_dir_for(&self, family: &str) -> Option<PathBuf> {
        if self.output_mode.write_files {
            Some(self.output_dir.join("DiagnosticsOutput").join(family))
        } else {
            None
        }
    }

    /// Executes the selected families according to the configured
    /// concurrency mode, returning the coalesced outcome.
    ///
    /// Returns [`RunnerError::ConcurrentRecoveryConflict`] before running
    /// anything if recovery or dump files are enabled alongside a
    /// non-serial concurrency mode, since both require a process-wide
    /// single-writer invariant.
    pub fn execute(&self) -> Result<RunOutcome, RunnerError> {
        if self.concurrency.is_concurrent()
            && (self.recovery.recovery_file.is_some() || self.recovery.dump_file.is_some())
        {
            return Err(RunnerError::ConcurrentRecoveryConflict);
        }

        std::fs::create_dir_all(&self.output_dir).map_err(|source| RunnerError::Io {
            path: self.output_dir.clone(),
            source,
        })?;

        let start = Instant::now();
        let selected: Vec<&TestFamily> = self
            .families
            .iter()
            .filter(|family| self.selection.matches(family))
            .collect();

        info!(
            concurrency = ?self.concurrency,
            families = selected.len(),
            "starting run"
        );

        let family_summaries: Vec<(String, LogSummary)> = match self.concurrency {
            ConcurrencyMode::Serial => selected
                .iter()
                .map(|family| {
                    let diagnostics = self.diagnostics_dir_for(family.name());
                    let (_, summaries) = family.execute_serial(diagnostics.as_deref());
                    (family.name().to_string(), fold(summaries))
                })
                .collect(),
            ConcurrencyMode::Family => {
                let slots: Mutex<Vec<Option<(String, LogSummary)>>> =
                    Mutex::new((0..selected.len()).map(|_| None).collect());
                tokio_scoped::scope(|scope| {
                    for (index, family) in selected.iter().enumerate() {
                        let slots = &slots;
                        let diagnostics = self.diagnostics_dir_for(family.name());
                        scope.spawn(async move {
                            let (_, summaries) = family.execute_serial(diagnostics.as_deref());
                            slots.lock().unwrap()[index] =
                                Some((family.name().to_string(), fold(summaries)));
                        });
                    }
                });
                slots
                    .into_inner()
                    .unwrap()
                    .into_iter()
                    .map(|s| s.expect("every slot filled before scope returns"))
                    .collect()
            }
            ConcurrencyMode::Test | ConcurrencyMode::Deep => selected
                .iter()
                .map(|family| {
                    let diagnostics = self.diagnostics_dir_for(family.name());
                    let (_, summaries) = family.execute_concurrent(diagnostics.as_deref());
                    (family.name().to_string(), fold(summaries))
                })
                .collect(),
        };

        for unmatched in self.selection.unmatched() {
            warn!("selection '{unmatched}' matched no family or source");
        }

        let total = family_summaries
            .iter()
            .fold(LogSummary::default(), |acc, (_, s)| acc + s.clone());

        Ok(RunOutcome {
            total,
            families: family_summaries,
            duration: start.elapsed(),
        })
    }

    pub fn project_root(&self) -> &std::path::Path {
        &self.project_root
    }
}

fn fold(summaries: Vec<LogSummary>) -> LogSummary {
    summaries.into_iter().fold(LogSummary::default(), |a, b| a + b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::ComparisonKind;
    use crate::logger::Logger;
    use crate::test::Test;

    fn passing_family(name: &str) -> TestFamily {
        let mut family = TestFamily::new(name);
        family.push(Test::new("t", "tests/t.rs", |logger: &mut Logger| {
            crate::tester::check(ComparisonKind::Equality, "d", logger, &1, &1);
        }));
        family
    }

    #[test]
    fn serial_execution_aggregates_across_families() {
        let mut runner = Runner::new(".", std::env::temp_dir().join("sequoia-check-test-serial"));
        runner.push_family(passing_family("a")).unwrap();
        runner.push_family(passing_family("b")).unwrap();
        let outcome = runner.execute().unwrap();
        assert_eq!(outcome.families.len(), 2);
        assert!(outcome.total.is_success());
    }

    #[test]
    fn duplicate_family_names_are_rejected() {
        let mut runner = Runner::new(".", std::env::temp_dir().join("sequoia-check-test-dup"));
        runner.push_family(passing_family("a")).unwrap();
        assert!(matches!(
            runner.push_family(passing_family("a")),
            Err(RunnerError::DuplicateFamily(_))
        ));
    }

    #[test]
    fn concurrent_execution_conflicts_with_recovery() {
        let recovery = RecoveryPaths {
            recovery_file: Some(PathBuf::from("Recovery.txt")),
            dump_file: None,
        };
        let mut runner = Runner::new(".", std::env::temp_dir().join("sequoia-check-test-conflict"))
            .with_concurrency(ConcurrencyMode::Family)
            .with_recovery(recovery);
        runner.push_family(passing_family("a")).unwrap();
        assert!(matches!(
            runner.execute(),
            Err(RunnerError::ConcurrentRecoveryConflict)
        ));
    }

    #[test]
    fn selection_filters_to_named_family_only() {
        let mut runner = Runner::new(".", std::env::temp_dir().join("sequoia-check-test-select"));
        runner.push_family(passing_family("a")).unwrap();
        runner.push_family(passing_family("b")).unwrap();
        runner.selection_mut().add_family("a");
        let outcome = runner.execute().unwrap();
        assert_eq!(outcome.families.len(), 1);
        assert_eq!(outcome.families[0].0, "a");
    }
}
