//! The [`TestMode`] and [`ComparisonKind`] tags that drive dispatch and
//! mode-inversion throughout the rest of the crate.

/// Determines how a [`Sentinel`](crate::logger::Sentinel) inverts the
/// pass/fail outcome of the checks it wraps at logger depth zero.
///
/// See the mode-inversion table on [`Sentinel`](crate::logger::Sentinel) for
/// the exact routing rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestMode {
    /// Failures are real failures; passes are real passes.
    #[default]
    Standard,
    /// A pass is the failure being hunted for; an observed failure is
    /// filed quietly as a diagnostic.
    FalsePositive,
    /// A failure is expected; an observed pass is the failure being hunted
    /// for.
    FalseNegative,
}

/// Selects which comparison relation [`check`](crate::tester::check) uses
/// for a given pair of values.
///
/// `WeakEquivalence` falls back to `Equivalence`, which falls back to
/// `Equality`, when no dedicated tester is registered for the stronger
/// kind. `WithBestAvailable` probes, in order, `Equality`, `Equivalence`,
/// `WeakEquivalence`, then range traversal, and uses the first that applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonKind {
    Equality,
    Equivalence,
    WeakEquivalence,
    WithBestAvailable,
}

impl ComparisonKind {
    /// The next weaker kind this one falls back to, if any.
    pub fn fallback(self) -> Option<ComparisonKind> {
        match self {
            ComparisonKind::WeakEquivalence => Some(ComparisonKind::Equivalence),
            ComparisonKind::Equivalence => Some(ComparisonKind::Equality),
            ComparisonKind::Equality => None,
            ComparisonKind::WithBestAvailable => None,
        }
    }

    /// The probe order used by `WithBestAvailable`, strongest first.
    pub fn probe_order() -> [ComparisonKind; 3] {
        [
            ComparisonKind::Equality,
            ComparisonKind::Equivalence,
            ComparisonKind::WeakEquivalence,
        ]
    }

    pub fn label(self) -> &'static str {
        match self {
            ComparisonKind::Equality => "equality",
            ComparisonKind::Equivalence => "equivalence",
            ComparisonKind::WeakEquivalence => "weak_equivalence",
            ComparisonKind::WithBestAvailable => "with_best_available",
        }
    }
}

/// Tags a user-supplied binary predicate so the failure-message formatter
/// can pick an appropriate report generator (see
/// [`builtin::comparator`](crate::tester::report_for_comparator)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparatorKind {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
    WithinTolerance,
    Custom,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weak_equivalence_falls_back_through_equivalence_to_equality() {
        assert_eq!(
            ComparisonKind::WeakEquivalence.fallback(),
            Some(ComparisonKind::Equivalence)
        );
        assert_eq!(
            ComparisonKind::Equivalence.fallback(),
            Some(ComparisonKind::Equality)
        );
        assert_eq!(ComparisonKind::Equality.fallback(), None);
    }

    #[test]
    fn best_available_probes_strongest_first() {
        let order = ComparisonKind::probe_order();
        assert_eq!(order[0], ComparisonKind::Equality);
        assert_eq!(order[1], ComparisonKind::Equivalence);
        assert_eq!(order[2], ComparisonKind::WeakEquivalence);
    }

    #[test]
    fn test_mode_defaults_to_standard() {
        assert_eq!(TestMode::default(), TestMode::Standard);
    }
}
