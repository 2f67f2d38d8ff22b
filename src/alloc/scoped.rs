//! Scoped (nested) allocator predictions, modeled as an explicit sequence
//! indexed by level rather than as type-level recursion (§9 design notes).

use crate::alloc::{AllocationPrediction, CountingAllocatorHandle};
use crate::error::AllocationError;
use crate::logger::{Logger, Sentinel};

/// One level of a scoped-allocator prediction sequence: the allocator
/// handle at that level plus its expected prediction.
pub struct ScopedLevel {
    pub handle: CountingAllocatorHandle,
    pub prediction: AllocationPrediction,
}

/// A sequence of per-level predictions for a container whose allocator is
/// itself nested (scoped): index 0 is the outer allocator, subsequent
/// indices are inner levels.
pub struct ScopedAllocationPlan {
    levels: Vec<ScopedLevel>,
}

impl ScopedAllocationPlan {
    pub fn new(levels: Vec<ScopedLevel>) -> Self {
        Self { levels }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Runs `operation` once, then checks every level's delta against its
    /// prediction, recursing by index.
    pub fn check<R>(
        &self,
        description: &str,
        logger: &mut Logger,
        operation: impl FnOnce() -> R,
    ) -> (R, bool) {
        let mut sentinel = Sentinel::new(logger, description);
        let before: Vec<i64> = self.levels.iter().map(|l| l.handle.count()).collect();
        let result = operation();

        let mut all_passed = true;
        for (i, level) in self.levels.iter().enumerate() {
            let observed = level.handle.count() - before[i];
            let expected = level.prediction.value + level.prediction.adjustment;
            if observed != expected {
                all_passed = false;
                let error = AllocationError::Mismatch {
                    event: format!("{} (level {i})", level.prediction.event),
                    predicted: expected,
                    observed,
                };
                sentinel.record(false, &error.to_string());
            }
        }
        if all_passed {
            sentinel.record(true, "");
        }
        (result, all_passed)
    }

    /// Validates that a container reporting `actual_levels` nested
    /// allocators matches the number of predictions supplied.
    pub fn validate_level_count(&self, actual_levels: usize) -> Result<(), AllocationError> {
        if self.levels.len() == actual_levels {
            Ok(())
        } else {
            Err(AllocationError::LevelMismatch {
                predicted_levels: self.levels.len(),
                actual_levels,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::Event;
    use crate::kind::TestMode;
    use crate::logger::Logger;

    #[test]
    fn every_level_is_checked_against_its_own_prediction() {
        let outer = CountingAllocatorHandle::new();
        let inner = CountingAllocatorHandle::new();
        let plan = ScopedAllocationPlan::new(vec![
            ScopedLevel {
                handle: outer.clone(),
                prediction: AllocationPrediction::new(Event::Initialization, 1),
            },
            ScopedLevel {
                handle: inner.clone(),
                prediction: AllocationPrediction::new(Event::Initialization, 2),
            },
        ]);

        let mut logger = Logger::new(TestMode::Standard);
        let (_, passed) = plan.check("scoped", &mut logger, || {
            outer.record_allocation();
            inner.record_allocation();
            inner.record_allocation();
        });
        assert!(passed);
    }

    #[test]
    fn level_count_mismatch_is_reported() {
        let plan = ScopedAllocationPlan::new(vec![ScopedLevel {
            handle: CountingAllocatorHandle::new(),
            prediction: AllocationPrediction::new(Event::Initialization, 0),
        }]);
        assert!(plan.validate_level_count(2).is_err());
        assert!(plan.validate_level_count(1).is_ok());
    }
}
