//! The generic `check` procedure family: compile-/runtime-dispatched value
//! comparison that routes its outcome through a [`Sentinel`].
//!
//! See the module-level selection rules in the crate docs for the exact
//! order in which [`check`] tries a registered tester, a fallback kind, and
//! finally native [`PartialEq`].

use std::fmt::Debug;

use crate::format::display_safe;
use crate::kind::{ComparatorKind, ComparisonKind};
use crate::logger::{Logger, Sentinel};
use crate::registry::{CheckOutcome, has_tester, lookup_tester};

/// Bound satisfied by every type `check` can compare: native equality plus
/// a debug rendering used when no dedicated tester supplies one.
pub trait Checkable: PartialEq + Debug + 'static {}
impl<T: PartialEq + Debug + 'static> Checkable for T {}

/// Optional hook that augments a failure message with domain-specific
/// advice once a mismatch has already been detected.
pub trait Advisor<T> {
    fn advise(&self, obtained: &T, predicted: &T) -> Option<String>;
}

impl<T, F: Fn(&T, &T) -> Option<String>> Advisor<T> for F {
    fn advise(&self, obtained: &T, predicted: &T) -> Option<String> {
        self(obtained, predicted)
    }
}

fn native_equality_message<T: Debug>(obtained: &T, predicted: &T) -> String {
    format!(
        "obtained: {}\npredicted: {}",
        display_safe(&format!("{obtained:?}")),
        display_safe(&format!("{predicted:?}")),
    )
}

fn resolve(kind: ComparisonKind) -> CheckOutcomeResolution {
    CheckOutcomeResolution { kind }
}

struct CheckOutcomeResolution {
    kind: ComparisonKind,
}

impl CheckOutcomeResolution {
    /// Applies the §4.1 selection rules for `T` and this resolution's kind,
    /// returning the outcome of whichever comparison applied.
    fn evaluate<T: Checkable>(&self, obtained: &T, predicted: &T) -> CheckOutcome {
        crate::builtin::ensure_registered();
        match self.kind {
            ComparisonKind::WithBestAvailable => {
                for probe in ComparisonKind::probe_order() {
                    if probe == ComparisonKind::Equality || has_tester::<T>(probe) {
                        return resolve(probe).evaluate(obtained, predicted);
                    }
                }
                unreachable!("Equality is always available via PartialEq");
            }
            kind => {
                if let Some(tester) = lookup_tester::<T>(kind) {
                    return tester(obtained, predicted);
                }
                if let Some(fallback) = kind.fallback() {
                    return resolve(fallback).evaluate(obtained, predicted);
                }
                // kind == Equality and no registered tester: native PartialEq.
                if obtained == predicted {
                    CheckOutcome::pass()
                } else {
                    CheckOutcome::fail(native_equality_message(obtained, predicted))
                }
            }
        }
    }
}

/// Performs one check of `obtained` against `predicted` under `kind`,
/// opening a [`Sentinel`] named `description` and recording the outcome.
pub fn check<T: Checkable>(
    kind: ComparisonKind,
    description: &str,
    logger: &mut Logger,
    obtained: &T,
    predicted: &T,
) -> bool {
    check_advised(kind, description, logger, obtained, predicted, None::<&dyn Advisor<T>>)
}

/// As [`check`], but with an [`Advisor`] consulted when the check fails.
pub fn check_advised<T: Checkable>(
    kind: ComparisonKind,
    description: &str,
    logger: &mut Logger,
    obtained: &T,
    predicted: &T,
    advisor: Option<&dyn Advisor<T>>,
) -> bool {
    let mut sentinel = Sentinel::new(logger, description);
    let outcome = resolve(kind).evaluate(obtained, predicted);
    let mut message = outcome.message;
    if !outcome.passed {
        if let Some(advisor) = advisor {
            if let Some(advice) = advisor.advise(obtained, predicted) {
                message = format!("{message}\nadvice: {advice}");
            }
        }
    }
    sentinel.record(outcome.passed, &message);
    outcome.passed
}

/// A user-supplied binary predicate, tagged so the failure message can be
/// formatted appropriately for its shape (§4.1.1).
pub fn check_with_comparator<T: Debug>(
    comparator_kind: ComparatorKind,
    description: &str,
    logger: &mut Logger,
    obtained: &T,
    predicted: &T,
    comparator: impl Fn(&T, &T) -> bool,
) -> bool {
    let mut sentinel = Sentinel::new(logger, description);
    let passed = comparator(obtained, predicted);
    let message = if passed {
        String::new()
    } else {
        report_for_comparator(comparator_kind, obtained, predicted)
    };
    sentinel.record(passed, &message);
    passed
}

fn report_for_comparator<T: Debug>(kind: ComparatorKind, obtained: &T, predicted: &T) -> String {
    let relation = match kind {
        ComparatorKind::Eq => "==",
        ComparatorKind::Lt => "<",
        ComparatorKind::Le => "<=",
        ComparatorKind::Gt => ">",
        ComparatorKind::Ge => ">=",
        ComparatorKind::WithinTolerance => "within tolerance of",
        ComparatorKind::Custom => "related by the supplied comparator to",
    };
    format!("{obtained:?} is not {relation} {predicted:?}")
}

/// Builds a comparator that accepts obtained values within `tolerance` of
/// the predicted value, for use with [`check_with_comparator`] and
/// [`ComparatorKind::WithinTolerance`].
pub fn within_tolerance(tolerance: f64) -> impl Fn(&f64, &f64) -> bool {
    move |obtained, predicted| (obtained - predicted).abs() <= tolerance
}
