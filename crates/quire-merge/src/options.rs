//! Merge configuration.

use serde::{Deserialize, Serialize};

/// How conflicted output is rendered.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeOptions {
    /// Label after the `<<<<<<<` marker.
    pub fork_label: String,
    /// Label after the `>>>>>>>` marker.
    pub upstream_label: String,
    /// Include the base lines in a `|||||||` section.
    pub show_base: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            fork_label: "fork".into(),
            upstream_label: "upstream".into(),
            show_base: false,
        }
    }
}

impl MergeOptions {
    /// Options with custom side labels.
    pub fn labeled(fork: impl Into<String>, upstream: impl Into<String>) -> Self {
        Self {
            fork_label: fork.into(),
            upstream_label: upstream.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let options: MergeOptions = toml::from_str("show_base = true").unwrap();
        assert!(options.show_base);
        assert_eq!(options.fork_label, "fork");
        assert_eq!(options.upstream_label, "upstream");
    }

    #[test]
    fn labeled_keeps_base_hidden() {
        let options = MergeOptions::labeled("tim", "sim");
        assert_eq!(options.fork_label, "tim");
        assert!(!options.show_base);
    }
}
