//! Snapshot feed location.

use std::path::PathBuf;

use serde::Deserialize;

/// `[feed]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedConfig {
    /// JSON file rewritten by the market collector.
    #[serde(default = "default_path")]
    pub path: PathBuf,
}

fn default_path() -> PathBuf {
    PathBuf::from("snapshots.json")
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}
