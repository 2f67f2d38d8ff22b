//! Variant-like sums and optionals: active-alternative/has-value parity is
//! checked first, then the contents (§4.1.3).

use crate::kind::ComparisonKind;
use crate::logger::{Logger, Sentinel};
use crate::tester::{Checkable, check};

/// A two-alternative sum type, standing in for the mandated "variants"
/// specialization. Library and user code alike can compare any
/// two-alternative sum through [`check_variant2`] by first mapping it into
/// this shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Variant2<A, B> {
    A(A),
    B(B),
}

impl<A, B> Variant2<A, B> {
    fn index(&self) -> usize {
        match self {
            Variant2::A(_) => 0,
            Variant2::B(_) => 1,
        }
    }
}

/// A three-alternative sum type.
#[derive(Debug, Clone, PartialEq)]
pub enum Variant3<A, B, C> {
    A(A),
    B(B),
    C(C),
}

impl<A, B, C> Variant3<A, B, C> {
    fn index(&self) -> usize {
        match self {
            Variant3::A(_) => 0,
            Variant3::B(_) => 1,
            Variant3::C(_) => 2,
        }
    }
}

/// Checks the active alternative index first; only compares contents when
/// both sides agree on which alternative is active.
pub fn check_variant2<A: Checkable, B: Checkable>(
    kind: ComparisonKind,
    description: &str,
    logger: &mut Logger,
    obtained: &Variant2<A, B>,
    predicted: &Variant2<A, B>,
) -> bool {
    let mut sentinel = Sentinel::new(logger, description);
    if obtained.index() != predicted.index() {
        sentinel.record(
            false,
            &format!(
                "active alternative differs: obtained index {}, predicted index {}",
                obtained.index(),
                predicted.index()
            ),
        );
        return false;
    }
    sentinel.record(true, "");
    let inner = sentinel.logger_mut();
    match (obtained, predicted) {
        (Variant2::A(o), Variant2::A(p)) => check(kind, description, inner, o, p),
        (Variant2::B(o), Variant2::B(p)) => check(kind, description, inner, o, p),
        _ => unreachable!("index parity checked above"),
    }
}

/// As [`check_variant2`], for three alternatives.
pub fn check_variant3<A: Checkable, B: Checkable, C: Checkable>(
    kind: ComparisonKind,
    description: &str,
    logger: &mut Logger,
    obtained: &Variant3<A, B, C>,
    predicted: &Variant3<A, B, C>,
) -> bool {
    let mut sentinel = Sentinel::new(logger, description);
    if obtained.index() != predicted.index() {
        sentinel.record(
            false,
            &format!(
                "active alternative differs: obtained index {}, predicted index {}",
                obtained.index(),
                predicted.index()
            ),
        );
        return false;
    }
    sentinel.record(true, "");
    let inner = sentinel.logger_mut();
    match (obtained, predicted) {
        (Variant3::A(o), Variant3::A(p)) => check(kind, description, inner, o, p),
        (Variant3::B(o), Variant3::B(p)) => check(kind, description, inner, o, p),
        (Variant3::C(o), Variant3::C(p)) => check(kind, description, inner, o, p),
        _ => unreachable!("index parity checked above"),
    }
}

/// Checks has-value parity first, then the contents.
pub fn check_option<T: Checkable>(
    kind: ComparisonKind,
    description: &str,
    logger: &mut Logger,
    obtained: &Option<T>,
    predicted: &Option<T>,
) -> bool {
    let mut sentinel = Sentinel::new(logger, description);
    if obtained.is_some() != predicted.is_some() {
        sentinel.record(
            false,
            &format!(
                "has-value parity differs: obtained {}, predicted {}",
                obtained.is_some(),
                predicted.is_some()
            ),
        );
        return false;
    }
    sentinel.record(true, "");
    match (obtained, predicted) {
        (Some(o), Some(p)) => check(kind, description, sentinel.logger_mut(), o, p),
        (None, None) => true,
        _ => unreachable!("has-value parity checked above"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::TestMode;
    use crate::logger::Logger;

    #[test]
    fn variant_fails_on_alternative_mismatch() {
        let mut logger = Logger::new(TestMode::Standard);
        let obtained: Variant2<i32, f64> = Variant2::A(0);
        let predicted: Variant2<i32, f64> = Variant2::B(0.0);
        assert!(!check_variant2(
            ComparisonKind::Equality,
            "v",
            &mut logger,
            &obtained,
            &predicted
        ));
    }

    #[test]
    fn variant_passes_when_alternative_and_value_match() {
        let mut logger = Logger::new(TestMode::Standard);
        let obtained: Variant2<i32, f64> = Variant2::A(1);
        let predicted: Variant2<i32, f64> = Variant2::A(1);
        assert!(check_variant2(
            ComparisonKind::Equality,
            "v",
            &mut logger,
            &obtained,
            &predicted
        ));
    }

    #[test]
    fn option_fails_on_has_value_mismatch() {
        let mut logger = Logger::new(TestMode::Standard);
        assert!(!check_option(
            ComparisonKind::Equality,
            "o",
            &mut logger,
            &None::<i32>,
            &Some(0)
        ));
    }

    #[test]
    fn option_passes_when_both_none() {
        let mut logger = Logger::new(TestMode::Standard);
        assert!(check_option(
            ComparisonKind::Equality,
            "o",
            &mut logger,
            &None::<i32>,
            &None::<i32>
        ));
    }
}
