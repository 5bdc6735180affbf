//! Battle configuration loaded from TOML.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use siege_bridge_core::{BridgePosition, MovementKind, PassabilityRules};
use thiserror::Error;

/// Settings applied when a battle is set up.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BattleConfig {
    /// Castle bridge settings.
    pub bridge: BridgeConfig,
}

/// Castle bridge settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    /// Position of the bridge when the battle starts.
    pub initial_position: BridgePosition,
    /// Movement kinds that ignore the bridge.
    pub bypass: Vec<MovementKind>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            initial_position: BridgePosition::Raised,
            bypass: vec![MovementKind::Flying],
        }
    }
}

impl BridgeConfig {
    /// Converts the bypass list into passability rules.
    #[must_use]
    pub fn rules(&self) -> PassabilityRules {
        PassabilityRules::new(self.bypass.clone())
    }
}

/// Errors raised while loading a battle configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read battle config at {}", .path.display())]
    Read {
        /// Location of the file that failed to load.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The configuration contents are not valid.
    #[error("failed to parse battle config")]
    Parse(#[from] toml::de::Error),
}

impl BattleConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Reads and parses the configuration stored at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = BattleConfig::from_toml_str("").expect("parse");
        assert_eq!(config, BattleConfig::default());
        assert_eq!(config.bridge.initial_position, BridgePosition::Raised);
        assert!(config.bridge.rules().bypasses(MovementKind::Flying));
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = BattleConfig::from_toml_str(
            r#"
            [bridge]
            initial_position = "lowered"
            bypass = ["flying", "teleporting"]
            "#,
        )
        .expect("parse");

        assert_eq!(config.bridge.initial_position, BridgePosition::Lowered);
        let rules = config.bridge.rules();
        assert!(rules.bypasses(MovementKind::Teleporting));
        assert!(!rules.bypasses(MovementKind::Ground));
    }

    #[test]
    fn empty_bypass_list_lets_nothing_through() {
        let config = BattleConfig::from_toml_str("[bridge]\nbypass = []\n").expect("parse");
        assert!(!config.bridge.rules().bypasses(MovementKind::Flying));
        assert_eq!(config.bridge.initial_position, BridgePosition::Raised);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let error = BattleConfig::from_toml_str("[bridge]\nheight = 3\n")
            .expect_err("unknown field must fail");
        assert!(matches!(error, ConfigError::Parse(_)));
    }

    #[test]
    fn unknown_movement_kind_is_rejected() {
        let result = BattleConfig::from_toml_str("[bridge]\nbypass = [\"burrowing\"]\n");
        assert!(result.is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let error = BattleConfig::load("does/not/exist.toml").expect_err("missing file");
        match error {
            ConfigError::Read { path, .. } => {
                assert_eq!(path, PathBuf::from("does/not/exist.toml"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
