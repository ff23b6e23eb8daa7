use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration at '{path}'")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration")]
    Parse(#[from] toml::de::Error),
}

/// What the engine does when a rule redirects to a position at or before the
/// current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub enum BackwardJumpPolicy {
    /// Re-execute from the target; the re-run steps are appended again.
    #[default]
    Allow,
    /// Fail the run with [`RuleError::BackwardJump`](crate::RuleError::BackwardJump).
    Reject,
}

impl BackwardJumpPolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Reject => "reject",
        }
    }
}

impl fmt::Display for BackwardJumpPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the engine does when a revert fails while unwinding a failed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub enum CompensationFailurePolicy {
    /// Keep reverting the remaining steps.
    #[default]
    Continue,
    /// Stop unwinding at the first failed revert.
    Abort,
}

impl CompensationFailurePolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Continue => "continue",
            Self::Abort => "abort",
        }
    }
}

impl fmt::Display for CompensationFailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engine behavior settings, read from the `[engine]` table of a TOML file.
///
/// ```toml
/// [engine]
/// backward-jumps = "reject"
/// compensation-failure = "abort"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct RuleEngineConfig {
    backward_jumps: BackwardJumpPolicy,
    compensation_failure: CompensationFailurePolicy,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    engine: RuleEngineConfig,
}

impl RuleEngineConfig {
    /// Parse the `[engine]` table of a TOML document.
    ///
    /// A document without the table yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid TOML or holds unknown
    /// policy values.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content)?;
        Ok(file.engine)
    }

    /// Read and parse a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    #[must_use]
    pub fn backward_jumps(&self) -> BackwardJumpPolicy {
        self.backward_jumps
    }

    #[must_use]
    pub fn compensation_failure(&self) -> CompensationFailurePolicy {
        self.compensation_failure
    }

    #[must_use]
    pub fn with_backward_jumps(mut self, policy: BackwardJumpPolicy) -> Self {
        self.backward_jumps = policy;
        self
    }

    #[must_use]
    pub fn with_compensation_failure(mut self, policy: CompensationFailurePolicy) -> Self {
        self.compensation_failure = policy;
        self
    }
}
