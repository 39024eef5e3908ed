//! Context configuration and the execution-mode switch.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::env;

/// Whether operations run immediately or are recorded into a [`Graph`](crate::Graph).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Operations execute as they are called; scopes live on the context.
    #[default]
    Eager,
    /// Operations are recorded into a graph; scopes live on the graph.
    Graph,
}

impl ExecutionMode {
    pub fn is_eager(self) -> bool {
        matches!(self, ExecutionMode::Eager)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExecutionMode::Eager => "eager",
            ExecutionMode::Graph => "graph",
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings applied when an [`ExecutionContext`](crate::ExecutionContext) is created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    pub mode: ExecutionMode,
}

impl ContextConfig {
    /// Defaults overridden by the process environment.
    ///
    /// `GRAPH_SCOPE_EAGER=0` starts new contexts in graph-building mode; any truthy value (or
    /// leaving the variable unset) keeps them eager.
    pub fn from_env() -> Self {
        let mut config = ContextConfig::default();
        if let Some(eager) = env::eager_override() {
            config.mode = if eager {
                ExecutionMode::Eager
            } else {
                ExecutionMode::Graph
            };
        }
        config
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }
}
