//! Member-wise comparison of pairs and tuples, compile-time indexed
//! (§4.1.3).

use crate::kind::ComparisonKind;
use crate::logger::{Logger, Sentinel};
use crate::tester::{Checkable, check};

/// Compares `(A, B)` member-wise.
pub fn check_pair<A: Checkable, B: Checkable>(
    kind: ComparisonKind,
    description: &str,
    logger: &mut Logger,
    obtained: &(A, B),
    predicted: &(A, B),
) -> bool {
    let mut sentinel = Sentinel::new(logger, description);
    sentinel.record(true, "");
    let inner = sentinel.logger_mut();
    let first_ok = check(kind, &format!("{description}.0"), inner, &obtained.0, &predicted.0);
    let second_ok = check(kind, &format!("{description}.1"), inner, &obtained.1, &predicted.1);
    first_ok && second_ok
}

/// Compares `(A, B, C)` member-wise.
pub fn check_tuple3<A: Checkable, B: Checkable, C: Checkable>(
    kind: ComparisonKind,
    description: &str,
    logger: &mut Logger,
    obtained: &(A, B, C),
    predicted: &(A, B, C),
) -> bool {
    let mut sentinel = Sentinel::new(logger, description);
    sentinel.record(true, "");
    let inner = sentinel.logger_mut();
    let a_ok = check(kind, &format!("{description}.0"), inner, &obtained.0, &predicted.0);
    let b_ok = check(kind, &format!("{description}.1"), inner, &obtained.1, &predicted.1);
    let c_ok = check(kind, &format!("{description}.2"), inner, &obtained.2, &predicted.2);
    a_ok && b_ok && c_ok
}
