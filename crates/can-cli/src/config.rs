//! TOML configuration for the command-line front end

use anyhow::{Context, Result};
use can_core::Modifier;
use can_staging::StagingConfig;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Everything the binary reads from `--config`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct CliConfig {
    pub(crate) staging: StagingConfig,
    pub(crate) modifier: Modifier,
    /// Document number to owner email
    pub(crate) owners: BTreeMap<String, String>,
}

impl CliConfig {
    /// Load from a file, or defaults when no file is given
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("could not read config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    pub(crate) fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Slot file used when `--slot` is absent
    pub(crate) fn default_slot(&self) -> PathBuf {
        PathBuf::from(format!("{}.json", self.staging.query_param))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn full_file() {
        let config = CliConfig::parse(
            r#"
            [staging]
            persistence_budget = 900
            query_param = "edits"

            [modifier]
            email = "planner@example.com"
            name = "Planner"

            [owners]
            "CAN-100" = "creator@example.com"
            "#,
        )
        .unwrap();

        assert_eq!(config.staging.persistence_budget, 900);
        assert_eq!(config.modifier.email, "planner@example.com");
        assert_eq!(config.owners["CAN-100"], "creator@example.com");
        assert_eq!(config.default_slot(), PathBuf::from("edits.json"));
    }

    #[test]
    fn missing_sections_use_defaults() {
        let config = CliConfig::parse("[modifier]\nemail = \"a@example.com\"\n").unwrap();
        assert_eq!(config.staging, StagingConfig::default());
        assert_eq!(config.modifier.name, "");
        assert!(config.owners.is_empty());
        assert_eq!(config.default_slot(), PathBuf::from("pending_changes.json"));
    }

    #[test]
    fn no_file_means_defaults() {
        assert_eq!(CliConfig::load(None).unwrap(), CliConfig::default());
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(CliConfig::load(Some(&dir.path().join("missing.toml"))).is_err());
    }
}
