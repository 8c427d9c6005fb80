//! Engine and logging configuration.

use serde::{Deserialize, Serialize};

use crate::foundation::error::{StrataError, StrataResult};

/// Block scheduling and engine behaviour.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of contiguous blocks each filter/kernel job is split into.
    pub blocks: usize,
    /// Run blocks on a rayon pool when `true`, sequentially otherwise.
    pub parallel: bool,
    /// Override rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
    /// Keep a copy of the initial frame so [`crate::RenderEngine::revert`] can restore it.
    pub allow_revert: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            blocks: default_blocks(),
            parallel: true,
            threads: None,
            allow_revert: true,
        }
    }
}

fn default_blocks() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

impl EngineConfig {
    /// Sequential execution with the given block count (handy for tests and embedding).
    pub fn sequential(blocks: usize) -> Self {
        Self {
            blocks,
            parallel: false,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> StrataResult<()> {
        if self.blocks == 0 {
            return Err(StrataError::validation("engine 'blocks' must be >= 1"));
        }
        if self.threads == Some(0) {
            return Err(StrataError::validation(
                "engine 'threads' must be >= 1 when set",
            ));
        }
        Ok(())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "stratafx=debug,warn").
    pub level: String,
    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
