use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Error;

/// Runtime configuration for a [`JudgeService`](crate::JudgeService).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JudgeConfig {
    /// Parent directory for per-execution workspaces.
    pub scratch_root: PathBuf,
    pub max_concurrent_executions: usize,
    pub toolchains: Toolchains,
}

/// Interpreter and compiler names used by the language adapters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Toolchains {
    pub python: String,
    pub node: String,
    pub java: String,
    pub javac: String,
    pub cxx: String,
    /// Passed to the C++ compiler as `-std=<cpp_std>`.
    pub cpp_std: String,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            scratch_root: std::env::temp_dir().join("code-judge"),
            max_concurrent_executions: 4,
            toolchains: Toolchains::default(),
        }
    }
}

impl Default for Toolchains {
    fn default() -> Self {
        Self {
            python: "python3".to_string(),
            node: "node".to_string(),
            java: "java".to_string(),
            javac: "javac".to_string(),
            cxx: "g++".to_string(),
            cpp_std: "c++17".to_string(),
        }
    }
}

impl JudgeConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, Error> {
        let config: Self = toml::from_str(raw).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file. Missing keys take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.max_concurrent_executions == 0 {
            return Err(Error::Config(
                "max_concurrent_executions must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
