//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use super::commands::chat::ChatArgs;
use super::commands::config::ConfigArgs;
use super::commands::parse::ParseArgs;

#[derive(Parser, Debug)]
#[command(name = "sprintpilot")]
#[command(about = "SprintPilot - conversational tool-call orchestrator", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Config file to load instead of .sprintpilot/config.yaml
    #[arg(short, long, global = true, env = "SPRINTPILOT_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Talk to the assistant; writers ask for confirmation before running
    Chat(ChatArgs),

    /// Parse a model response offline and show what would run
    Parse(ParseArgs),

    /// Configuration commands
    Config(ConfigArgs),
}
