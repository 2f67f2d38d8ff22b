//! Value-testers mandated for the library core (§4.1.3): strings, pairs,
//! tuples, variant-like sums, optionals, filesystem paths, and smart
//! pointers.
//!
//! Only `String`'s tester is reached through [`crate::registry`] and hence
//! through the generic [`crate::tester::check`] entry point: it is the one
//! mandated shape that is a single, concrete, non-generic type, so it has a
//! single `TypeId` to register against. [`ensure_registered`] performs that
//! registration lazily, guarded by a [`std::sync::OnceLock`], the first time
//! `check` runs. The rest (pairs, tuples, variants, options, paths, smart
//! pointers) are generic over their component types — `check_pair::<A, B>`
//! exists once per monomorphization, not once per crate — so there is no
//! single `TypeId` to hang a registration on; call them directly by name.

use std::sync::OnceLock;

use crate::kind::ComparisonKind;

pub mod pair_tuple;
pub mod path;
pub mod smart_ptr;
pub mod string;
pub mod variant_option;

pub use pair_tuple::{check_pair, check_tuple3};
pub use path::check_path;
pub use smart_ptr::{check_arc, check_arc_weak, check_rc, check_weak};
pub use string::check_string;
pub use variant_option::{Variant2, Variant3, check_option, check_variant2, check_variant3};

/// Registers `String`'s windowed-diff equality tester with
/// [`crate::registry`]. Idempotent and cheap to call on every
/// [`crate::tester::check`] invocation after the first.
pub(crate) fn ensure_registered() {
    static INIT: OnceLock<()> = OnceLock::new();
    INIT.get_or_init(|| {
        crate::registry::register_tester::<String, _>(ComparisonKind::Equality, |obtained, predicted| {
            string::diff_outcome(obtained, predicted)
        });
    });
}
