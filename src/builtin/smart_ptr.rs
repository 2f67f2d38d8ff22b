//! Smart-pointer value-testers: `Rc`/`Arc` compare their pointees; `Weak`
//! pointers compare via their upgrade target, with both-dead treated as
//! equal (§4.1.3).

use std::rc::{Rc, Weak as RcWeak};
use std::sync::{Arc, Weak as ArcWeak};

use crate::kind::ComparisonKind;
use crate::logger::{Logger, Sentinel};
use crate::tester::{Checkable, check};

pub fn check_rc<T: Checkable>(
    kind: ComparisonKind,
    description: &str,
    logger: &mut Logger,
    obtained: &Rc<T>,
    predicted: &Rc<T>,
) -> bool {
    check(kind, description, logger, obtained.as_ref(), predicted.as_ref())
}

pub fn check_arc<T: Checkable>(
    kind: ComparisonKind,
    description: &str,
    logger: &mut Logger,
    obtained: &Arc<T>,
    predicted: &Arc<T>,
) -> bool {
    check(kind, description, logger, obtained.as_ref(), predicted.as_ref())
}

/// Upgrades both sides and compares. Two dead weak pointers count as equal;
/// one dead and one alive is a failure.
pub fn check_weak<T: Checkable>(
    kind: ComparisonKind,
    description: &str,
    logger: &mut Logger,
    obtained: &RcWeak<T>,
    predicted: &RcWeak<T>,
) -> bool {
    let mut sentinel = Sentinel::new(logger, description);
    match (obtained.upgrade(), predicted.upgrade()) {
        (None, None) => {
            sentinel.record(true, "");
            true
        }
        (Some(o), Some(p)) => {
            sentinel.record(true, "");
            check(kind, description, sentinel.logger_mut(), o.as_ref(), p.as_ref())
        }
        (obtained_alive, predicted_alive) => {
            sentinel.record(
                false,
                &format!(
                    "weak pointer liveness differs: obtained alive = {}, predicted alive = {}",
                    obtained_alive.is_some(),
                    predicted_alive.is_some()
                ),
            );
            false
        }
    }
}

/// As [`check_weak`], for `std::sync::Weak`.
pub fn check_arc_weak<T: Checkable>(
    kind: ComparisonKind,
    description: &str,
    logger: &mut Logger,
    obtained: &ArcWeak<T>,
    predicted: &ArcWeak<T>,
) -> bool {
    let mut sentinel = Sentinel::new(logger, description);
    match (obtained.upgrade(), predicted.upgrade()) {
        (None, None) => {
            sentinel.record(true, "");
            true
        }
        (Some(o), Some(p)) => {
            sentinel.record(true, "");
            check(kind, description, sentinel.logger_mut(), o.as_ref(), p.as_ref())
        }
        (obtained_alive, predicted_alive) => {
            sentinel.record(
                false,
                &format!(
                    "weak pointer liveness differs: obtained alive = {}, predicted alive = {}",
                    obtained_alive.is_some(),
                    predicted_alive.is_some()
                ),
            );
            false
        }
    }
}
