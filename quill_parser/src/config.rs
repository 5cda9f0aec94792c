//! Parser configuration loader.

use anyhow::ensure;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Largest accepted `max_depth`.
pub const MAX_DEPTH_LIMIT: usize = 1024;

/// Stack reserved for the tree builder per nesting level.
const STACK_PER_LEVEL: usize = 128 * 1024;
/// Stack reserved for the tree builder regardless of nesting.
const STACK_BASE: usize = 1024 * 1024;

/// Tunables of a parse session. Every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Ceiling in milliseconds for draining the token stream.
    pub accumulate_timeout_ms: u64,
    /// Capacity of the token stream between scanner and parser.
    pub stream_capacity: usize,
    /// Maximum grammar nesting depth, at most [`MAX_DEPTH_LIMIT`].
    pub max_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self { accumulate_timeout_ms: 5000, stream_capacity: 5, max_depth: 64 }
    }
}

impl ParserConfig {
    /// Read a YAML configuration file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: ParserConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every field is in range.
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.stream_capacity > 0, "stream_capacity must be at least 1");
        ensure!(
            (1..=MAX_DEPTH_LIMIT).contains(&self.max_depth),
            "max_depth must be between 1 and {MAX_DEPTH_LIMIT}, got {}",
            self.max_depth
        );
        Ok(())
    }

    /// Nesting depth enforced by the parser: `max_depth` capped at
    /// [`MAX_DEPTH_LIMIT`].
    pub fn depth_limit(&self) -> usize {
        self.max_depth.min(MAX_DEPTH_LIMIT)
    }

    /// Stack size of the thread that builds the tree, large enough for
    /// [`ParserConfig::depth_limit`] nested levels in unoptimized builds.
    pub fn stack_size(&self) -> usize {
        STACK_BASE + self.depth_limit() * STACK_PER_LEVEL
    }

    /// Accumulation timeout as a [`Duration`].
    pub fn accumulate_timeout(&self) -> Duration {
        Duration::from_millis(self.accumulate_timeout_ms)
    }
}
