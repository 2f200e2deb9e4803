//! Router configuration.

use serde::Deserialize;

use crate::error::Result;

/// How registration treats a template that names the same capture twice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateCaptures {
    /// Fail registration with [`RouterError::DuplicateCapture`](crate::RouterError).
    #[default]
    Reject,
    /// Accept the template; the last occurrence's value is the one kept.
    LastWins,
}

/// Settings applied when a [`Router`](crate::Router) is built.
///
/// ```
/// use oxide_regex_router::{DuplicateCaptures, RouterConfig};
///
/// let config = RouterConfig::from_json(r#"{"max_idle_buffers": 16}"#).unwrap();
/// assert_eq!(config.max_idle_buffers, 16);
/// assert_eq!(config.duplicate_captures, DuplicateCaptures::Reject);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouterConfig {
    /// Upper bound on parameter buffers kept idle in the pool.
    pub max_idle_buffers: usize,
    /// Buffers allocated up front when the router is built.
    pub prewarm_buffers: usize,
    /// Policy for repeated capture names within one template.
    pub duplicate_captures: DuplicateCaptures,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            max_idle_buffers: 256,
            prewarm_buffers: 0,
            duplicate_captures: DuplicateCaptures::Reject,
        }
    }
}

impl RouterConfig {
    /// Parses a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
