//! CLI configuration utilities

use anyhow::{Context, Result};
use ovoz_core::ClientConfig;
use std::path::Path;

/// Config file looked up in the data directory
pub const CONFIG_FILE: &str = "config.toml";

/// Load the client configuration.
///
/// Sources, lowest precedence first: built-in defaults, the config file
/// (`explicit` if given, else `config.toml` in `data_dir` when present),
/// then `OVOZ_*` environment variables such as `OVOZ_API_URL`.
pub fn load_client_config(data_dir: &Path, explicit: Option<&Path>) -> Result<ClientConfig> {
    let defaults = ClientConfig::default();

    let mut builder = config::Config::builder()
        .set_default("api_url", defaults.api_url)?
        .set_default("timeout_secs", defaults.timeout_secs)?
        .set_default("login_path", defaults.login_path)?;

    builder = match explicit {
        Some(path) => builder.add_source(config::File::from(path)),
        None => builder.add_source(config::File::from(data_dir.join(CONFIG_FILE)).required(false)),
    };

    let settings = builder
        .add_source(config::Environment::with_prefix("OVOZ").try_parsing(true))
        .build()
        .context("Failed to load configuration")?;

    let config: ClientConfig = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}
