//! Lockstep element-wise comparison of two finite ranges (§4.1.2).
//!
//! A size mismatch is reported as a single failure and element-level
//! comparison is skipped entirely; matching sizes recurse into
//! [`crate::tester::check`] per element, with the description prefixed by
//! the element's zero-based index.

use crate::kind::ComparisonKind;
use crate::logger::{Logger, Sentinel};
use crate::tester::{Checkable, check};

/// Compares two slices under `kind`, opening an outer sentinel named
/// `description` plus one nested sentinel per compared element.
pub fn check_range<T: Checkable>(
    kind: ComparisonKind,
    description: &str,
    logger: &mut Logger,
    obtained: &[T],
    predicted: &[T],
) -> bool {
    let mut sentinel = Sentinel::new(logger, description);
    if obtained.len() != predicted.len() {
        sentinel.record(
            false,
            &format!(
                "range size mismatch: obtained {} elements, predicted {}",
                obtained.len(),
                predicted.len()
            ),
        );
        return false;
    }
    sentinel.record(true, "");

    let inner_logger = sentinel.logger_mut();
    let mut all_passed = true;
    for (i, (o, p)) in obtained.iter().zip(predicted.iter()).enumerate() {
        let desc = format!("{description}[{i}]");
        if !check(kind, &desc, inner_logger, o, p) {
            all_passed = false;
        }
    }
    all_passed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::TestMode;
    use crate::logger::Logger;

    #[test]
    fn equal_ranges_report_zero_failures() {
        let mut logger = Logger::new(TestMode::Standard);
        assert!(check_range(
            ComparisonKind::Equality,
            "v",
            &mut logger,
            &[1, 2, 3],
            &[1, 2, 3]
        ));
        assert_eq!(logger.failures(), 0);
    }

    #[test]
    fn mismatched_length_reports_exactly_one_failure_and_skips_elements() {
        let mut logger = Logger::new(TestMode::Standard);
        assert!(!check_range(
            ComparisonKind::Equality,
            "v",
            &mut logger,
            &[1, 2],
            &[1, 2, 3]
        ));
        assert_eq!(logger.failures(), 1);
        assert_eq!(logger.checks(), 1);
    }

    #[test]
    fn element_mismatch_is_indexed_in_the_description() {
        let mut logger = Logger::new(TestMode::Standard);
        check_range(ComparisonKind::Equality, "v", &mut logger, &[1, 9], &[1, 2]);
        let summary = logger.finish(std::time::Duration::ZERO);
        assert!(summary.failure_messages.contains("v[1]"));
    }
}
