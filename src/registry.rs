//! The dynamic type-and-kind keyed tester registry.
//!
//! Rust has no stable specialization, so "does a tester for `(T, kind)`
//! exist?" cannot be answered as a compile-time trait-bound branch the way
//! it can in a language with partial template specialization. This module
//! implements the alternative this framework's design notes sanction for
//! dynamically-typed targets: a registry keyed by type identity and kind,
//! consulted with an explicit priority order by [`crate::tester::check`].
//!
//! Of the mandated shapes in [`crate::builtin`], only `String` is a single
//! concrete type with one `TypeId` to register against; it registers itself
//! lazily via [`std::sync::OnceLock`] the first time [`crate::tester::check`]
//! runs (see [`crate::builtin::ensure_registered`]). The others (pairs,
//! tuples, variants, options, paths, smart pointers) are generic over their
//! component types, so they have no single `TypeId` to register against and
//! are called directly by name instead. User testers register explicitly
//! through [`register_tester`].

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use crate::kind::ComparisonKind;

/// The outcome of a single tester invocation: whether the check passed and,
/// if not, the text describing the mismatch.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub passed: bool,
    pub message: String,
}

impl CheckOutcome {
    pub fn pass() -> Self {
        CheckOutcome {
            passed: true,
            message: String::new(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        CheckOutcome {
            passed: false,
            message: message.into(),
        }
    }
}

/// A registered comparison procedure for `T` under some [`ComparisonKind`].
pub type TesterFn<T> = dyn Fn(&T, &T) -> CheckOutcome + Send + Sync;

type ErasedTester = Box<dyn Any + Send + Sync>;

fn registry() -> &'static Mutex<HashMap<(TypeId, ComparisonKind), ErasedTester>> {
    static REGISTRY: OnceLock<Mutex<HashMap<(TypeId, ComparisonKind), ErasedTester>>> =
        OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Registers a tester for `(T, kind)`. If a tester is already registered
/// for that pair, it is replaced.
pub fn register_tester<T, F>(kind: ComparisonKind, f: F)
where
    T: 'static,
    F: Fn(&T, &T) -> CheckOutcome + Send + Sync + 'static,
{
    let erased: Arc<TesterFn<T>> = Arc::new(f);
    registry()
        .lock()
        .expect("tester registry poisoned")
        .insert((TypeId::of::<T>(), kind), Box::new(erased));
}

/// Looks up a tester registered for `(T, kind)`, if any.
pub fn lookup_tester<T: 'static>(kind: ComparisonKind) -> Option<Arc<TesterFn<T>>> {
    registry()
        .lock()
        .expect("tester registry poisoned")
        .get(&(TypeId::of::<T>(), kind))
        .and_then(|boxed| boxed.downcast_ref::<Arc<TesterFn<T>>>())
        .cloned()
}

/// True if some tester is registered for `(T, kind)`.
pub fn has_tester<T: 'static>(kind: ComparisonKind) -> bool {
    registry()
        .lock()
        .expect("tester registry poisoned")
        .contains_key(&(TypeId::of::<T>(), kind))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Wrapped(i32);

    #[test]
    fn register_and_lookup_round_trips() {
        register_tester::<Wrapped, _>(ComparisonKind::Equivalence, |a, b| {
            if a.0 == b.0 {
                CheckOutcome::pass()
            } else {
                CheckOutcome::fail("mismatch")
            }
        });
        assert!(has_tester::<Wrapped>(ComparisonKind::Equivalence));
        let tester = lookup_tester::<Wrapped>(ComparisonKind::Equivalence).unwrap();
        let outcome = tester(&Wrapped(1), &Wrapped(1));
        assert!(outcome.passed);
    }

    #[test]
    fn missing_registration_returns_none() {
        assert!(lookup_tester::<Wrapped>(ComparisonKind::WeakEquivalence).is_none());
    }
}
