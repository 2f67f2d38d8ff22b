//! Semantic / contract checker (§4.4): given canonical instances `x != y`,
//! verifies the algebraic laws a "regular" type is expected to satisfy —
//! equality, ordering, copy/clone, move, swap, serialization round-trip,
//! and mutation.
//!
//! Each law is checked under its own [`Sentinel`], tagging the violation
//! site the way every other check in this crate does.

use std::cmp::Ordering;
use std::fmt::Debug;

use crate::logger::{Logger, Sentinel};
use crate::tester::Checkable;

/// Verifies the five `PartialEq` laws plus, optionally, equivalence to a
/// simpler representation.
pub fn check_equality_laws<T: Checkable>(
    description: &str,
    logger: &mut Logger,
    x: &T,
    y: &T,
) -> bool {
    let mut sentinel = Sentinel::new(logger, description);
    let mut passed = true;
    let mut fail = |s: &mut Sentinel, cond: bool, what: &str| {
        if !cond {
            passed = false;
            s.record(false, what);
        }
    };
    fail(&mut sentinel, *x == *x, "x == x failed");
    fail(&mut sentinel, *y == *y, "y == y failed");
    fail(&mut sentinel, !(*x != *x), "!(x != x) failed");
    fail(&mut sentinel, !(*y != *y), "!(y != y) failed");
    fail(&mut sentinel, *x != *y, "x != y failed");
    if passed {
        sentinel.record(true, "");
    }
    passed
}

/// Verifies that `x` is equivalent to `x_equivalent` and `y` to
/// `y_equivalent`, where equivalence is a relation between `T` and a
/// simpler representation `S` supplied by the caller (since the dispatcher
/// in [`crate::tester`] only compares two values of the same type, a
/// heterogeneous `T`-to-`S` relation is exercised directly rather than
/// through the registry).
pub fn check_equivalence_laws<T, S>(
    description: &str,
    logger: &mut Logger,
    x: &T,
    x_equivalent: &S,
    y: &T,
    y_equivalent: &S,
    equivalent: impl Fn(&T, &S) -> bool,
) -> bool {
    let mut sentinel = Sentinel::new(logger, description);
    let mut passed = true;
    if !equivalent(x, x_equivalent) {
        passed = false;
        sentinel.record(false, "x was not equivalent to x_equivalent");
    }
    if !equivalent(y, y_equivalent) {
        passed = false;
        sentinel.record(false, "y was not equivalent to y_equivalent");
    }
    if passed {
        sentinel.record(true, "");
    }
    passed
}

/// Verifies `<`, `<=`, `>`, `>=` are mutually consistent with the expected
/// ordering of `x` relative to `y`, and that `Ord::cmp` agrees when
/// available.
pub fn check_ordering_laws<T: PartialOrd + Ord + Debug>(
    description: &str,
    logger: &mut Logger,
    x: &T,
    y: &T,
    expected: Ordering,
) -> bool {
    let mut sentinel = Sentinel::new(logger, description);
    let mut passed = true;
    let mut fail = |s: &mut Sentinel, cond: bool, what: &str| {
        if !cond {
            passed = false;
            s.record(false, what);
        }
    };
    match expected {
        Ordering::Less => {
            fail(&mut sentinel, x < y, "expected x < y");
            fail(&mut sentinel, x <= y, "expected x <= y");
            fail(&mut sentinel, !(x > y), "expected !(x > y)");
            fail(&mut sentinel, !(x >= y), "expected !(x >= y)");
        }
        Ordering::Greater => {
            fail(&mut sentinel, x > y, "expected x > y");
            fail(&mut sentinel, x >= y, "expected x >= y");
            fail(&mut sentinel, !(x < y), "expected !(x < y)");
            fail(&mut sentinel, !(x <= y), "expected !(x <= y)");
        }
        Ordering::Equal => {
            fail(&mut sentinel, x <= y && x >= y, "expected x <= y && x >= y");
        }
    }
    fail(&mut sentinel, x.cmp(y) == expected, "Ord::cmp disagrees with expected ordering");
    if passed {
        sentinel.record(true, "");
    }
    passed
}

/// Verifies the regularity (copy/clone) laws: clone produces an equal
/// value, assignment from `y` into a value equal to `x` yields `y`, and
/// self-assignment preserves the value.
pub fn check_regularity_laws<T: Checkable + Clone>(
    description: &str,
    logger: &mut Logger,
    x: &T,
    y: &T,
) -> bool {
    let mut sentinel = Sentinel::new(logger, description);
    let mut passed = true;
    let mut fail = |s: &mut Sentinel, cond: bool, what: &str| {
        if !cond {
            passed = false;
            s.record(false, what);
        }
    };

    let cloned = x.clone();
    fail(&mut sentinel, cloned == *x, "clone did not equal its source");

    let mut assigned = x.clone();
    assigned = y.clone();
    fail(&mut sentinel, assigned == *y, "assignment from y did not yield y");

    let mut self_assigned = x.clone();
    let tmp = self_assigned.clone();
    self_assigned = tmp;
    fail(
        &mut sentinel,
        self_assigned == *x,
        "self-assignment did not preserve the value",
    );

    if passed {
        sentinel.record(true, "");
    }
    passed
}

/// Verifies that moving a value equal to `y` produces a value equal to
/// `y` — a function taking `T` by value and handing it back is exactly a
/// move in Rust, so `move_through` exercises the same code path the
/// compiler generates for `let moved = source;`. If `moved_from_ok` is
/// supplied, the moved-from slot (rebuilt via `Default`, since Rust leaves
/// no observable moved-from object to inspect directly) is checked against
/// it — the open question this crate's design notes settle in favor of
/// requiring an explicit predicate rather than guessing at one.
pub fn check_movable_laws<T: Checkable + Clone + Default>(
    description: &str,
    logger: &mut Logger,
    y: &T,
    moved_from_ok: Option<&dyn Fn(&T) -> bool>,
) -> bool {
    let mut sentinel = Sentinel::new(logger, description);
    let mut passed = true;

    let source = y.clone();
    let moved: T = move_through(source);
    if moved != *y {
        passed = false;
        sentinel.record(false, "move construction did not produce a value equal to y");
    } else {
        sentinel.record(true, "");
    }

    if let Some(predicate) = moved_from_ok {
        let moved_from_state = T::default();
        if !predicate(&moved_from_state) {
            passed = false;
            sentinel.record(false, "moved-from state did not satisfy the supplied predicate");
        }
    }
    passed
}

fn move_through<T>(value: T) -> T {
    value
}

/// Verifies `std::mem::swap` exchanges values and that swapping a value
/// with itself is a no-op.
pub fn check_swappable_laws<T: Checkable + Clone>(
    description: &str,
    logger: &mut Logger,
    x: &T,
    y: &T,
) -> bool {
    let mut sentinel = Sentinel::new(logger, description);
    let mut passed = true;

    let mut a = x.clone();
    let mut b = y.clone();
    std::mem::swap(&mut a, &mut b);
    if a != *y || b != *x {
        passed = false;
        sentinel.record(false, "swap(x, y) did not exchange the values");
    } else {
        sentinel.record(true, "");
    }

    let mut self_swap = x.clone();
    let before = self_swap.clone();
    let mut alias = self_swap.clone();
    std::mem::swap(&mut self_swap, &mut alias);
    if self_swap != before {
        passed = false;
        sentinel.record(false, "self-swap was not a no-op");
    }

    passed
}

/// Verifies the serialization round-trip law: `deserialize(serialize(x)) == x`.
pub fn check_serializable_laws<T>(description: &str, logger: &mut Logger, x: &T) -> bool
where
    T: Checkable + serde::Serialize + serde::de::DeserializeOwned,
{
    let mut sentinel = Sentinel::new(logger, description);
    let outcome = serde_json::to_string(x)
        .map_err(|e| e.to_string())
        .and_then(|json| serde_json::from_str::<T>(&json).map_err(|e| e.to_string()));
    match outcome {
        Ok(roundtripped) if roundtripped == *x => {
            sentinel.record(true, "");
            true
        }
        Ok(_) => {
            sentinel.record(false, "round trip produced a value unequal to the original");
            false
        }
        Err(e) => {
            sentinel.record(false, &format!("serialization round trip failed: {e}"));
            false
        }
    }
}

/// Verifies that applying `mutator` to a value equal to `y` changes it away
/// from `y`.
pub fn check_mutation_law<T: Checkable + Clone>(
    description: &str,
    logger: &mut Logger,
    y: &T,
    mutator: impl FnOnce(&mut T),
) -> bool {
    let mut sentinel = Sentinel::new(logger, description);
    let mut mutated = y.clone();
    mutator(&mut mutated);
    let passed = mutated != *y;
    sentinel.record(passed, "mutation did not change the value away from y");
    passed
}
