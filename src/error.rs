//! Crate-wide error taxonomy.
//!
//! Check failures are never represented as [`Err`] values — they are data,
//! recorded by the [`Logger`](crate::logger::Logger). The error types here
//! cover framework misuse and I/O failures that surround the check path:
//! loading configuration, setting up a [`Runner`](crate::runner::Runner), and
//! walking the filesystem for materials and path comparisons.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid async depth {0}, expected 0-2")]
    InvalidAsyncDepth(u8),
}

/// Errors raised while setting up or executing a [`Runner`](crate::runner::Runner).
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error(
        "recovery or dump file enabled under concurrent execution; these require a single-writer invariant"
    )]
    ConcurrentRecoveryConflict,

    #[error("duplicate test family name: {0}")]
    DuplicateFamily(String),

    #[error("io error while preparing output directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by the allocation-instrumentation subsystem.
#[derive(Debug, Error)]
pub enum AllocationError {
    #[error("allocator prediction mismatch for '{event}': predicted {predicted}, observed {observed}")]
    Mismatch {
        event: String,
        predicted: i64,
        observed: i64,
    },

    #[error("scoped allocator prediction sequence has {predicted_levels} levels but container reports {actual_levels}")]
    LevelMismatch {
        predicted_levels: usize,
        actual_levels: usize,
    },

    #[error("propagation semantics require unequal source allocators before this assignment test")]
    SourcesMustDiffer,
}

/// Top-level error aggregating the subsystem error types, used at crate
/// boundaries where callers want a single `Result` type.
#[derive(Debug, Error)]
pub enum CrateError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Runner(#[from] RunnerError),

    #[error(transparent)]
    Allocation(#[from] AllocationError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
