//! Configuration commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;

const REDACTED: &str = "[REDACTED]";

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration (token redacted)
    Show,
}

#[derive(Debug, Serialize)]
pub struct ConfigShowOutput {
    #[serde(flatten)]
    pub config: Config,
}

impl ConfigShowOutput {
    pub fn redacted(config: &Config) -> Self {
        let mut config = config.clone();
        if config.backend.api_token.is_some() {
            config.backend.api_token = Some(REDACTED.to_string());
        }
        Self { config }
    }
}

impl CommandOutput for ConfigShowOutput {
    fn to_human(&self) -> String {
        serde_yaml::to_string(&self.config).unwrap_or_default()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.config).unwrap_or_default()
    }
}

pub fn execute(args: &ConfigArgs, config: &Config, json_mode: bool) -> Result<()> {
    match args.command {
        ConfigCommands::Show => output(&ConfigShowOutput::redacted(config), json_mode),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_redacts_token() {
        let mut config = Config::default();
        config.backend.api_token = Some("super-secret".to_string());

        let out = ConfigShowOutput::redacted(&config);
        let json = out.to_json();
        assert_eq!(json["backend"]["api_token"], REDACTED);
        assert!(!out.to_human().contains("super-secret"));
        assert_eq!(json["resolution"]["min_score"], 0.3);
    }

    #[test]
    fn test_show_without_token() {
        let out = ConfigShowOutput::redacted(&Config::default());
        assert!(out.to_json()["backend"]["api_token"].is_null());
    }
}
