pub mod config;
pub mod run;

use std::path::Path;

use anyhow::Context;
use fnshim::AdapterConfig;

/// Load the configuration file if one was given, else defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<AdapterConfig> {
    match path {
        Some(path) => AdapterConfig::from_file(path)
            .with_context(|| format!("loading adapter config from {}", path.display())),
        None => Ok(AdapterConfig::default()),
    }
}
