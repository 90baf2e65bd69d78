use serde::Deserialize;

use crate::{cli::Args, error::Result};

const DEFAULT_CONFIG_PATH: &str = "config/client.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub username: String,
    pub timezone: String,
    /// Prefilled in the creation form.
    pub wallet_address: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
            username: String::new(),
            timezone: "UTC".to_string(),
            wallet_address: String::new(),
        }
    }
}

/// Reads the config file and `CRYPTOTX_CLIENT_*` variables, then applies the
/// command-line overrides.
pub fn load(args: &Args) -> Result<AppConfig> {
    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("CRYPTOTX_CLIENT"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    apply_overrides(&mut settings, args);
    Ok(settings)
}

fn apply_overrides(settings: &mut AppConfig, args: &Args) {
    if let Some(base_url) = &args.base_url {
        settings.base_url = base_url.clone();
    }
    if let Some(username) = &args.username {
        settings.username = username.clone();
    }
    if let Some(timezone) = &args.timezone {
        settings.timezone = timezone.clone();
    }
    if let Some(wallet_address) = &args.wallet_address {
        settings.wallet_address = wallet_address.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn flags_override_file_values() {
        let args = Args::try_parse_from([
            "cryptotx-client",
            "--base-url",
            "http://exchange.local:8080",
            "--timezone",
            "Europe/Warsaw",
            "me",
        ])
        .unwrap();
        let mut settings = AppConfig {
            username: "alice".to_string(),
            ..Default::default()
        };
        apply_overrides(&mut settings, &args);

        assert_eq!(settings.base_url, "http://exchange.local:8080");
        assert_eq!(settings.timezone, "Europe/Warsaw");
        assert_eq!(settings.username, "alice");
    }
}
