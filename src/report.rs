//! Console reporting: colored pass/fail/critical output plus a progress bar
//! for non-serial, non-verbose runs (§4.6, §7).

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::logger::LogSummary;
use crate::runner::{ConcurrencyMode, RunOutcome};

/// Prints per-family progress and a final summary to the terminal.
///
/// A progress bar is shown only when running non-serially and `verbose` is
/// off, mirroring this codebase's existing reporter: verbose output and a
/// progress bar fight for the same lines, so only one is ever active.
pub struct ConsoleReporter {
    verbose: bool,
    concurrency: ConcurrencyMode,
}

impl ConsoleReporter {
    pub fn new(verbose: bool, concurrency: ConcurrencyMode) -> Self {
        Self { verbose, concurrency }
    }

    fn progress_bar(&self, family_count: usize) -> Option<ProgressBar> {
        if self.verbose || self.concurrency == ConcurrencyMode::Serial || family_count == 0 {
            return None;
        }
        let bar = ProgressBar::new(family_count as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} families")
                .unwrap()
                .progress_chars("#>-"),
        );
        Some(bar)
    }

    fn status_label(summary: &LogSummary) -> console::StyledObject<&'static str> {
        if summary.critical_failures > 0 {
            style("CRIT").red().bold()
        } else if summary.is_success() {
            style("PASS").green()
        } else {
            style("FAIL").red()
        }
    }

    /// Prints one line per family as its summary becomes available,
    /// advancing the progress bar (if any).
    pub fn report_family(&self, bar: Option<&ProgressBar>, name: &str, summary: &LogSummary) {
        let status = Self::status_label(summary);
        let line = format!("{status} {name} ({} checks, {} failures)", summary.checks, summary.failures);
        match bar {
            Some(bar) => {
                bar.inc(1);
                if self.verbose || !summary.is_success() {
                    bar.println(line);
                }
            }
            None => println!("{line}"),
        }
        if self.verbose && !summary.failure_messages.is_empty() {
            for message_line in summary.failure_messages.lines() {
                println!("    {}", style(message_line).dim());
            }
        }
    }

    pub fn start(&self, family_count: usize) -> Option<ProgressBar> {
        self.progress_bar(family_count)
    }

    /// Prints the grand-total summary, returning the process exit code.
    pub fn finish(&self, bar: Option<ProgressBar>, outcome: &RunOutcome) -> i32 {
        if let Some(bar) = bar {
            bar.finish_and_clear();
        }

        println!();
        println!("Summary:");
        println!("  Families: {}", outcome.families.len());
        println!("  Checks:   {}", outcome.total.checks);
        println!("  Failures: {}", style(outcome.total.failures).red());
        if outcome.total.critical_failures > 0 {
            println!("  Critical: {}", style(outcome.total.critical_failures).red().bold());
        }
        println!("  Duration: {:?}", outcome.duration);

        if outcome.total.is_success() {
            println!();
            println!("{}", style("All checks passed.").green().bold());
            0
        } else {
            println!();
            println!("{}", style("Some checks failed.").red().bold());
            if !outcome.total.failure_messages.is_empty() {
                println!();
                for line in outcome.total.failure_messages.lines() {
                    println!("  {line}");
                }
            }
            1
        }
    }
}
