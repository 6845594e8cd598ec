pub mod config;
pub mod live;
pub mod replay;
pub mod workout;

use std::path::Path;

use pacekeeper_core::{Config, Result};

/// Load the config from an explicit path, or the default location.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    Ok(config)
}

pub fn save_config(config: &Config, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => config.save_to(path)?,
        None => config.save()?,
    }
    Ok(())
}
