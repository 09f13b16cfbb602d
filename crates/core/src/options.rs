//! Graph configuration.
//!
//! [`GraphOptions`] selects how strictly the graph checks its callers. Options
//! can be built in code or read from a TOML document:
//!
//! ```ignore
//! use relgraph_core::{AssertionMode, GraphOptions};
//!
//! let opts = GraphOptions::new().assertions(AssertionMode::Trust);
//! let from_file = GraphOptions::from_toml_str("assertions = \"strict\"")?;
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, GraphResult};

/// How schema/usage checks are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssertionMode {
    /// Type compatibility and inverse agreement are checked and reported as errors.
    Strict,
    /// The caller is trusted; mismatches are accepted and logged.
    Trust,
}

impl Default for AssertionMode {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            AssertionMode::Strict
        } else {
            AssertionMode::Trust
        }
    }
}

/// Options for constructing a graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GraphOptions {
    /// Checking mode.
    pub assertions: AssertionMode,
}

impl GraphOptions {
    /// Create options with build-dependent defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options that check everything regardless of build profile.
    pub fn strict() -> Self {
        Self::new().assertions(AssertionMode::Strict)
    }

    /// Set the checking mode.
    pub fn assertions(mut self, mode: AssertionMode) -> Self {
        self.assertions = mode;
        self
    }

    /// Whether checked assertions run.
    pub fn is_strict(&self) -> bool {
        self.assertions == AssertionMode::Strict
    }

    /// Parse options from TOML text.
    pub fn from_toml_str(text: &str) -> GraphResult<Self> {
        toml::from_str(text).map_err(|e| GraphError::InvalidConfig(e.to_string()))
    }
}
