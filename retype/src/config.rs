use std::path::PathBuf;

use derive_more::From;
use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use typeline::config::DEFAULT_TAB_WIDTH;

const SETTINGS_FILE: &str = "settings.toml";
const ENV_PREFIX: &str = "RETYPE_";
/// Read by the log filter directly, see [`crate::logging`]
pub const LOG_ENV: &str = "RETYPE_LOG";
const MAX_TAB_WIDTH: usize = 16;

#[derive(Debug, From, Error)]
pub enum ConfigError {
    #[error("Configuration directory '{}' does not exist", .0.display())]
    #[from(skip)]
    MissingDirectory(PathBuf),

    #[error("Failed to parse config: {0}")]
    Parse(Box<figment::Error>),

    #[error("Invalid tab width {0}, expected a value between 1 and {MAX_TAB_WIDTH}")]
    #[from(skip)]
    InvalidTabWidth(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Columns a tab is displayed as
    pub tab_width: usize,
    /// Columns to wrap the text to, 0 wraps to the terminal width
    pub wrap_width: usize,
    pub log: LogSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tab_width: DEFAULT_TAB_WIDTH,
            wrap_width: 0,
            log: LogSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LogSettings {
    /// `tracing` filter directives, like `info` or `typeline=debug`
    pub filter: String,
    /// Where `retype.log` is written, defaults to the platform data directory
    pub directory: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            directory: None,
        }
    }
}

/// Values given on the command line, which take precedence over everything else
#[derive(Debug, Default, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tab_width: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrap_width: Option<usize>,
}

impl Settings {
    /// Layer defaults, `settings.toml`, `RETYPE_*` environment variables and
    /// command line overrides
    pub fn load(override_dir: Option<PathBuf>, overrides: &Overrides) -> Result<Self, ConfigError> {
        // Grab default configuration
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(dir) = &override_dir
            && !dir.is_dir()
        {
            return Err(ConfigError::MissingDirectory(dir.clone()));
        }

        let config_dir = override_dir.or_else(|| project_dirs().map(|dirs| dirs.config_dir().to_path_buf()));
        if let Some(settings_toml) = config_dir.map(|dir| dir.join(SETTINGS_FILE))
            && settings_toml.exists()
        {
            figment = figment.merge(Toml::file(settings_toml));
        }

        let settings: Self = figment
            .merge(Env::prefixed(ENV_PREFIX).ignore(&["LOG"]).split("__"))
            .merge(Serialized::defaults(overrides))
            .extract()
            .map_err(Box::new)?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_TAB_WIDTH).contains(&self.tab_width) {
            return Err(ConfigError::InvalidTabWidth(self.tab_width));
        }

        Ok(())
    }
}

impl LogSettings {
    /// The configured log directory, or the platform default
    pub fn directory(&self) -> Option<PathBuf> {
        self.directory
            .clone()
            .or_else(|| project_dirs().map(|dirs| dirs.data_local_dir().to_path_buf()))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "Retype", "retype")
}
