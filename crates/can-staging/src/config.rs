//! Staging configuration

use serde::{Deserialize, Serialize};

/// Size budget of the persisted payload, in characters
pub const DEFAULT_PERSISTENCE_BUDGET: usize = 1500;

/// Query parameter that carries the payload
pub const DEFAULT_QUERY_PARAM: &str = "pending_changes";

/// Staging store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StagingConfig {
    /// Payloads of this many characters or more are not written
    pub persistence_budget: usize,
    /// Name of the slot in the query string
    pub query_param: String,
}

impl StagingConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With persistence budget
    #[inline]
    #[must_use]
    pub fn with_persistence_budget(mut self, budget: usize) -> Self {
        self.persistence_budget = budget;
        self
    }

    /// With query parameter name
    #[inline]
    #[must_use]
    pub fn with_query_param(mut self, name: impl Into<String>) -> Self {
        self.query_param = name.into();
        self
    }
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            persistence_budget: DEFAULT_PERSISTENCE_BUDGET,
            query_param: DEFAULT_QUERY_PARAM.to_string(),
        }
    }
}
