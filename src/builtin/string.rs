//! String and `&str` equality with windowed diff localization (§4.1.3).

use crate::format::string_diff_message;
use crate::logger::{Logger, Sentinel};
use crate::registry::CheckOutcome;

/// The windowed-diff equality comparison shared by [`check_string`] (called
/// directly) and the `String` tester registered with [`crate::registry`]
/// (reached through [`crate::tester::check`]).
pub(crate) fn diff_outcome(obtained: &str, predicted: &str) -> CheckOutcome {
    if obtained == predicted {
        CheckOutcome::pass()
    } else {
        CheckOutcome::fail(string_diff_message(obtained, predicted))
    }
}

/// Compares two strings for equality, reporting a windowed diff snippet on
/// mismatch rather than dumping both strings in full.
pub fn check_string(description: &str, logger: &mut Logger, obtained: &str, predicted: &str) -> bool {
    let mut sentinel = Sentinel::new(logger, description);
    let outcome = diff_outcome(obtained, predicted);
    let passed = outcome.passed;
    sentinel.record(passed, &outcome.message);
    passed
}
