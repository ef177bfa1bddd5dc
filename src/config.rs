//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults (title column only)
//! 2. Config file: `--config <file>`, else `$XDG_CONFIG_HOME/mm2csv/mm2csv.toml`
//! 3. Environment variables: `MM2CSV_*` prefix
//! 4. Command line flags (can only switch a column on)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::Deserialize;

use crate::application::ApplicationError;
use crate::domain::ConvertOptions;

/// Prefix of the environment variables read by [`Settings::load`].
pub const ENV_PREFIX: &str = "MM2CSV";

/// Which optional columns precede the title.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Settings {
    /// Emit the dotted hierarchy path
    pub numbers: bool,
    /// Emit the `parent.node` identifier pair
    pub ids: bool,
    /// Emit the leaf marker
    pub leaf: bool,
}

/// Raw settings for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct RawSettings {
    pub numbers: Option<bool>,
    pub ids: Option<bool>,
    pub leaf: Option<bool>,
}

/// Get the XDG config directory for mm2csv.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "mm2csv").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("mm2csv.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            numbers: overlay.numbers.unwrap_or(self.numbers),
            ids: overlay.ids.unwrap_or(self.ids),
            leaf: overlay.leaf.unwrap_or(self.leaf),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// An explicit `config_file` must exist; the global file is optional.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let settings = Self::load_files(config_file)?;
        Self::apply_env_overrides(settings, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_files(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let defaults = Self::default();

        if let Some(path) = config_file {
            if !path.is_file() {
                return Err(ApplicationError::Config {
                    message: format!("config file not found: {}", path.display()),
                });
            }
            return Ok(defaults.merge_with(&load_raw_settings(path)?));
        }

        match global_config_path() {
            Some(global_path) if global_path.exists() => {
                Ok(defaults.merge_with(&load_raw_settings(&global_path)?))
            }
            _ => Ok(defaults),
        }
    }

    /// Apply environment variables as explicit overrides.
    ///
    /// Values are parsed leniently by the config crate (`true`, `1`, `yes`,
    /// `on` and their negations); anything else is a config error.
    pub fn apply_env_overrides(
        settings: Self,
        environment: Environment,
    ) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(environment)
            .build()
            .map_err(config_err)?;

        let overlay = RawSettings {
            numbers: env_flag(&config, "numbers")?,
            ids: env_flag(&config, "ids")?,
            leaf: env_flag(&config, "leaf")?,
        };
        Ok(settings.merge_with(&overlay))
    }

    /// Switch on every column requested on the command line.
    pub fn with_flags(self, numbers: bool, ids: bool, leaf: bool) -> Self {
        Self {
            numbers: self.numbers || numbers,
            ids: self.ids || ids,
            leaf: self.leaf || leaf,
        }
    }

    /// Walker options for these settings.
    pub fn convert_options(&self) -> ConvertOptions {
        ConvertOptions {
            include_numbers: self.numbers,
            include_ids: self.ids,
            include_leaf_marker: self.leaf,
        }
    }
}

fn env_flag(config: &Config, key: &str) -> Result<Option<bool>, ApplicationError> {
    match config.get_bool(key) {
        Ok(value) => Ok(Some(value)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(config_err(e)),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let source: config::Map<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX).source(Some(source))
    }

    #[test]
    fn given_defaults_when_converting_then_only_title_column() {
        let options = Settings::default().convert_options();
        assert_eq!(options, ConvertOptions::default());
    }

    #[test]
    fn given_env_vars_when_applying_overrides_then_flags_are_set() {
        let settings = Settings::apply_env_overrides(
            Settings::default(),
            env(&[("MM2CSV_NUMBERS", "true"), ("MM2CSV_LEAF", "1")]),
        )
        .unwrap();

        assert_eq!(
            settings,
            Settings {
                numbers: true,
                ids: false,
                leaf: true
            }
        );
    }

    #[test]
    fn given_env_var_false_when_applying_overrides_then_file_value_is_replaced() {
        let base = Settings {
            numbers: true,
            ids: true,
            leaf: true,
        };

        let settings =
            Settings::apply_env_overrides(base, env(&[("MM2CSV_IDS", "false")])).unwrap();

        assert!(!settings.ids);
        assert!(settings.numbers);
    }

    #[test]
    fn given_unparseable_env_value_when_applying_overrides_then_config_error() {
        let result =
            Settings::apply_env_overrides(Settings::default(), env(&[("MM2CSV_LEAF", "maybe")]));
        assert!(matches!(result, Err(ApplicationError::Config { .. })));
    }

    #[test]
    fn given_settings_when_adding_flags_then_flags_only_switch_on() {
        let base = Settings {
            numbers: true,
            ids: false,
            leaf: false,
        };

        let settings = base.with_flags(false, true, false);

        assert_eq!(
            settings,
            Settings {
                numbers: true,
                ids: true,
                leaf: false
            }
        );
    }
}
