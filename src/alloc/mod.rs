//! Allocation instrumentation (§4.5): counting allocators, per-event
//! predictions, and the propagation-trait interaction that selects between
//! "with propagation" and "without propagation" prediction variants for
//! assignment and swap.

pub mod scoped;

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::error::AllocationError;
use crate::logger::{Logger, Sentinel};

/// The allocation events the instrumentation subsystem can predict and
/// verify (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    Initialization,
    Copy,
    Move,
    Mutation,
    ParaCopy,
    ParaMove,
    AssignProp,
    Assign,
    MoveAssign,
    CopyLikeMoveAssign,
    Comparison,
    Spectator,
    Serialization,
    Swap,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Event::Initialization => "initialization",
            Event::Copy => "copy",
            Event::Move => "move",
            Event::Mutation => "mutation",
            Event::ParaCopy => "para_copy",
            Event::ParaMove => "para_move",
            Event::AssignProp => "assign_prop",
            Event::Assign => "assign",
            Event::MoveAssign => "move_assign",
            Event::CopyLikeMoveAssign => "copy_like_move_assign",
            Event::Comparison => "comparison",
            Event::Spectator => "spectator",
            Event::Serialization => "serialization",
            Event::Swap => "swap",
        };
        f.write_str(label)
    }
}

/// A strongly typed expected allocation count for one [`Event`].
///
/// `adjustment` applies a uniform platform-specific shift (the original
/// instrumentation's debug-iterator overhead); Rust has no debug-iterator
/// concept, so it defaults to zero and exists only for symmetry with
/// predictions ported from elsewhere.
#[derive(Debug, Clone, Copy)]
pub struct AllocationPrediction {
    pub event: Event,
    pub value: i64,
    pub adjustment: i64,
}

impl AllocationPrediction {
    pub fn new(event: Event, value: i64) -> Self {
        Self {
            event,
            value,
            adjustment: 0,
        }
    }

    pub fn with_adjustment(mut self, adjustment: i64) -> Self {
        self.adjustment = adjustment;
        self
    }

    fn expected(&self) -> i64 {
        self.value + self.adjustment
    }
}

/// A counting allocator handle: increments a shared counter on each
/// allocation. Clones share the same counter, which is the measurement
/// mechanism for container allocator propagation.
#[derive(Debug, Clone, Default)]
pub struct CountingAllocatorHandle {
    counter: Arc<AtomicI64>,
}

impl CountingAllocatorHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_allocation(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }

    pub fn count(&self) -> i64 {
        self.counter.load(Ordering::SeqCst)
    }

    /// True when `self` and `other` share the same underlying counter, the
    /// Rust analogue of pointer/handle equality between allocator
    /// instances.
    pub fn shares_counter_with(&self, other: &CountingAllocatorHandle) -> bool {
        Arc::ptr_eq(&self.counter, &other.counter)
    }
}

/// Bundles (a) a getter that retrieves a container's counting allocator
/// handle and (b) the expected per-event prediction for that allocator.
pub struct AllocationInfo<T, G: Fn(&T) -> CountingAllocatorHandle> {
    pub getter: G,
    _marker: std::marker::PhantomData<T>,
}

impl<T, G: Fn(&T) -> CountingAllocatorHandle> AllocationInfo<T, G> {
    pub fn new(getter: G) -> Self {
        Self {
            getter,
            _marker: std::marker::PhantomData,
        }
    }

    pub fn handle(&self, container: &T) -> CountingAllocatorHandle {
        (self.getter)(container)
    }
}

/// Snapshots the handle's counter, invokes `operation`, and compares the
/// delta against `prediction`, recording the outcome under a sentinel.
pub fn check_allocation<T, R>(
    description: &str,
    logger: &mut Logger,
    handle: &CountingAllocatorHandle,
    prediction: AllocationPrediction,
    operation: impl FnOnce() -> R,
) -> (R, bool) {
    let mut sentinel = Sentinel::new(logger, description);
    let before = handle.count();
    let result = operation();
    let observed = handle.count() - before;
    let expected = prediction.expected();
    let passed = observed == expected;
    if passed {
        sentinel.record(true, "");
    } else {
        let error = AllocationError::Mismatch {
            event: prediction.event.to_string(),
            predicted: expected,
            observed,
        };
        sentinel.record(false, &error.to_string());
    }
    (result, passed)
}

/// Describes how a container's allocator responds to the standard
/// propagation traits, used to select between "with propagation" and
/// "without propagation" predictions for assignment and swap (§4.5).
#[derive(Debug, Clone, Copy, Default)]
pub struct AllocatorPropagation {
    pub propagate_on_copy_assign: bool,
    pub propagate_on_move_assign: bool,
    pub propagate_on_swap: bool,
    pub is_always_equal: bool,
}

impl AllocatorPropagation {
    /// Picks the assignment prediction to use given whether the two source
    /// allocators compare equal. Propagation semantics require the sources
    /// to differ; calling this when they don't returns an error rather than
    /// silently picking a branch.
    pub fn select_assign<'a>(
        &self,
        sources_equal: bool,
        with_propagation: &'a AllocationPrediction,
        without_propagation: &'a AllocationPrediction,
    ) -> Result<&'a AllocationPrediction, crate::error::AllocationError> {
        if self.is_always_equal || !sources_equal {
            if sources_equal && !self.is_always_equal {
                return Err(crate::error::AllocationError::SourcesMustDiffer);
            }
            Ok(if self.propagate_on_copy_assign {
                with_propagation
            } else {
                without_propagation
            })
        } else {
            Err(crate::error::AllocationError::SourcesMustDiffer)
        }
    }

    /// Human-readable explanation of which flag chose which branch, for the
    /// advice hook mentioned in §4.5.
    pub fn advice(&self) -> String {
        format!(
            "propagate_on_copy_assign={}, propagate_on_move_assign={}, propagate_on_swap={}, is_always_equal={}",
            self.propagate_on_copy_assign,
            self.propagate_on_move_assign,
            self.propagate_on_swap,
            self.is_always_equal
        )
    }
}
