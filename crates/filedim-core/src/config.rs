//! Scan configuration types.

use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Configuration for a scan run.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ScanConfig {
    /// Root paths to reconcile, processed sequentially.
    pub roots: Vec<PathBuf>,

    /// Maximum number of entries to visit per run (None = unlimited).
    /// Exceeding the budget truncates the scan; truncation is not an error.
    #[builder(default)]
    #[serde(default)]
    pub max_entries: Option<u64>,

    /// Delete stored entries whose path no longer exists on disk.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub prune: bool,
}

fn default_true() -> bool {
    true
}

impl ScanConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match &self.roots {
            Some(roots) if roots.is_empty() => Err("At least one root path is required".to_string()),
            None => Err("At least one root path is required".to_string()),
            _ => Ok(()),
        }
    }
}

impl ScanConfig {
    /// Create a new scan config builder.
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::default()
    }

    /// Create a simple config for scanning a single root with defaults.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            roots: vec![root.into()],
            max_entries: None,
            prune: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = ScanConfig::builder()
            .roots(vec![PathBuf::from("/home/user")])
            .max_entries(Some(500u64))
            .prune(false)
            .build()
            .unwrap();

        assert_eq!(config.roots, vec![PathBuf::from("/home/user")]);
        assert_eq!(config.max_entries, Some(500));
        assert!(!config.prune);
    }

    #[test]
    fn test_config_simple() {
        let config = ScanConfig::new("/home/user");
        assert_eq!(config.roots.len(), 1);
        assert!(config.prune);
        assert!(config.max_entries.is_none());
    }

    #[test]
    fn test_config_requires_roots() {
        let result = ScanConfig::builder().roots(Vec::<PathBuf>::new()).build();
        assert!(result.is_err());
    }
}
