//! Optional JSON configuration file
//!
//! ```json
//! {
//!   "labeling": { "frequency": "hour", "delay": 1.5 },
//!   "group": { "min_censored_fraction": 0.05, "seed": 42 }
//! }
//! ```
//!
//! Every field is optional. Command-line flags take precedence over the file.

use std::path::Path;

use serde::Deserialize;
use youtrend_analysis::group::GroupConfig;
use youtrend_dataset::labeling::{Frequency, LabelingConfig};

use crate::util;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct Config {
    pub labeling: LabelingConfig,
    pub group: GroupConfig,
}

impl Config {
    pub(crate) fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => util::read_json_file("config", path),
            None => Ok(Self::default()),
        }
    }
}

/// Labeling flags shared by the commands that label snapshots.
#[derive(Debug, Clone, Default, clap::Args)]
pub(crate) struct LabelingArg {
    /// Scraping frequency of the snapshots (hour or day)
    #[arg(long)]
    pub frequency: Option<Frequency>,
    /// Censoring delay, in units of the frequency
    #[arg(long)]
    pub delay: Option<f64>,
}

impl LabelingArg {
    pub(crate) fn resolve(&self, config: &LabelingConfig) -> LabelingConfig {
        LabelingConfig {
            frequency: self.frequency.unwrap_or(config.frequency),
            delay: self.delay.unwrap_or(config.delay),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"labeling": {"frequency": "day", "delay": 2.0}, "group": {"seed": 7}}"#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.group.seed, 7);
        assert_eq!(config.group.min_censored_fraction, 0.05);

        let arg = LabelingArg {
            frequency: None,
            delay: Some(0.5),
        };
        let labeling = arg.resolve(&config.labeling);
        assert_eq!(labeling.frequency, Frequency::Day);
        assert_eq!(labeling.delay, 0.5);
    }

    #[test]
    fn test_missing_file_is_default() {
        assert_eq!(Config::load(None).unwrap(), Config::default());
    }
}
