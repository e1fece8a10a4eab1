//! Layered TOML settings for the workspace navigator.
//!
//! Sources are merged in ascending precedence: the user-level config file
//! (`wsnav.toml` in the platform config directory), then `.wsnav.toml`,
//! then `wsnav.toml` in the project root. Every file is optional; absent
//! files fall back to defaults.

use std::path::Path;

use config::{Config, ConfigError as ExternalConfigError, File, FileFormat};
use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration build/deserialize error")]
    Config(#[from] ExternalConfigError),
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Verbose diagnostics in the CLI.
    pub debug: bool,
    /// Prune marker bags for vanished paths on every reload.
    pub clear_stale_markers: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: false,
            clear_stale_markers: true,
        }
    }
}

impl Settings {
    pub fn new(project_root: &Path) -> Result<Self, ConfigError> {
        let user_config_file = ProjectDirs::from("com.github", "wsnav", "wsnav")
            .map(|proj_dirs| proj_dirs.config_dir().join("wsnav.toml"));

        Self::load_from_paths(project_root, user_config_file.as_deref())
    }

    fn load_from_paths(
        project_root: &Path,
        user_config_path: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = user_config_path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
        }

        builder = builder.add_source(
            File::from(project_root.join(".wsnav.toml"))
                .format(FileFormat::Toml)
                .required(false),
        );

        builder = builder.add_source(
            File::from(project_root.join("wsnav.toml"))
                .format(FileFormat::Toml)
                .required(false),
        );

        let config = builder.build()?;
        let settings = config.try_deserialize()?;
        Ok(settings)
    }
}
