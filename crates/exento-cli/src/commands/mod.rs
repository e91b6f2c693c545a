//! CLI subcommands.

pub mod config;
pub mod extract;
pub mod report;

use std::path::Path;

use exento_core::models::config::ExentoConfig;

/// Load the configuration from an explicit path, the default location, or defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<ExentoConfig> {
    if let Some(path) = config_path {
        return Ok(ExentoConfig::from_file(Path::new(path))?);
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        Ok(ExentoConfig::from_file(&default_path)?)
    } else {
        Ok(ExentoConfig::default())
    }
}
