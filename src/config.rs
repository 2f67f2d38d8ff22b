//! Runner configuration: an optional `sequoia.toml` beside the project root,
//! overridden by CLI flags (§6.1).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::runner::ConcurrencyMode;

/// Serde-deserializable runner defaults. Every field can be overridden by a
/// matching CLI flag; `Runner::execute` never consults this type directly,
/// it only shapes how `main.rs` builds a [`Runner`](crate::runner::Runner).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub output_dir: PathBuf,
    pub concurrency: ConcurrencyMode,
    pub verbose: bool,
    pub recovery: bool,
    pub dump: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./output"),
            concurrency: ConcurrencyMode::Serial,
            verbose: false,
            recovery: false,
            dump: false,
        }
    }
}

impl RunnerConfig {
    /// Loads `path` if it exists, applying `${VAR}`/`${VAR:-default}`/`~`
    /// expansion to `output_dir`. A missing file is not an error: the
    /// built-in defaults are returned unchanged.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: RunnerConfig =
            toml::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.output_dir = expand_path(&config.output_dir);
        Ok(config)
    }

    /// Applies CLI overrides on top of the loaded (or default) config.
    /// Only flags explicitly set by the user take precedence.
    pub fn with_overrides(
        mut self,
        output_dir: Option<PathBuf>,
        concurrency: Option<ConcurrencyMode>,
        verbose: bool,
        recovery: bool,
        dump: bool,
    ) -> Self {
        if let Some(output_dir) = output_dir {
            self.output_dir = expand_path(&output_dir);
        }
        if let Some(concurrency) = concurrency {
            self.concurrency = concurrency;
        }
        self.verbose = self.verbose || verbose;
        self.recovery = self.recovery || recovery;
        self.dump = self.dump || dump;
        self
    }
}

fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    match shellexpand::full(&raw) {
        Ok(expanded) => PathBuf::from(expanded.into_owned()),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_built_in_defaults() {
        let config = RunnerConfig::load(Path::new("/nonexistent/sequoia.toml")).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("./output"));
        assert_eq!(config.concurrency, ConcurrencyMode::Serial);
        assert!(!config.verbose);
    }

    #[test]
    fn file_values_are_loaded_and_env_vars_expanded() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("sequoia.toml");
        unsafe {
            std::env::set_var("SEQUOIA_CHECK_TEST_OUTPUT", "built");
        }
        std::fs::write(
            &config_path,
            "output_dir = \"${SEQUOIA_CHECK_TEST_OUTPUT}/results\"\nconcurrency = \"family\"\nverbose = true\n",
        )
        .unwrap();

        let config = RunnerConfig::load(&config_path).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("built/results"));
        assert_eq!(config.concurrency, ConcurrencyMode::Family);
        assert!(config.verbose);
    }

    #[test]
    fn cli_overrides_win_over_file_values() {
        let config = RunnerConfig::default().with_overrides(
            Some(PathBuf::from("/tmp/from-cli")),
            Some(ConcurrencyMode::Deep),
            true,
            false,
            false,
        );
        assert_eq!(config.output_dir, PathBuf::from("/tmp/from-cli"));
        assert_eq!(config.concurrency, ConcurrencyMode::Deep);
        assert!(config.verbose);
    }
}
