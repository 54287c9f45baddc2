use serde::{Deserialize, Serialize};

/// Settings for a batch recipe run.
///
/// Every field has a default so a partial JSON document deserializes:
///
/// ```rust
/// use rewrite_engine::config::RunConfig;
///
/// let config: RunConfig = serde_json::from_str(r#"{"parallel": false}"#).unwrap();
/// assert!(!config.parallel);
/// assert!(config.fail_on_cancel);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Visit source files on a thread pool.
    pub parallel: bool,
    /// Pool size when running in parallel; `None` uses one thread per core.
    pub max_threads: Option<usize>,
    /// Report a cancelled run as an error instead of returning partial results.
    pub fail_on_cancel: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig { parallel: true, max_threads: None, fail_on_cancel: true }
    }
}

impl RunConfig {
    pub fn sequential() -> Self {
        RunConfig { parallel: false, ..RunConfig::default() }
    }
}
