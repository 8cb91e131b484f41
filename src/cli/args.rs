//! CLI argument definitions and `LaunchProfile` construction.
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};

use super::{build_launch_args, resolve_config_path, LaunchProfile};

/// Parsed command intent from CLI.
#[derive(Debug, Clone)]
pub enum ParsedCommand {
    RunServer(LaunchProfile),
    Cli(CliCommand),
}

/// Top-level optional CLI commands.
#[derive(Debug, Clone, Subcommand)]
pub enum CliCommand {
    /// Print the messages that would be sent to the model, without calling it.
    #[command(about = "Preview the compiled system/user messages for a prompt (no network)")]
    Compile(CompileArgs),
}

/// Arguments for `compile`.
#[derive(Debug, Clone, Args)]
pub struct CompileArgs {
    /// Raw prompt text, exactly as a client would send it.
    #[arg(long)]
    pub prompt: String,
    /// Optional programming language hint.
    #[arg(long)]
    pub language: Option<String>,
}

/// Command-line arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    author,
    version,
    about = "Refine Prompt MCP server (stdio)",
    long_about = None
)]
pub struct LaunchProfileArgs {
    /// Path to config.toml (overrides REFINE_PROMPT_CONFIG).
    #[arg(long = "config")]
    pub config_override: Option<PathBuf>,
    /// Optional CLI command mode.
    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

impl LaunchProfileArgs {
    /// Build a `LaunchProfile` from CLI args and environment variables.
    pub fn build(self) -> Result<LaunchProfile> {
        let (config_path, config_source) = resolve_config_path(self.config_override)?;
        let launch_args = build_launch_args(&config_path);

        Ok(LaunchProfile {
            config_path,
            config_source,
            launch_args,
        })
    }

    /// Parse CLI args into either server launch mode or utility command mode.
    pub fn into_command(self) -> Result<ParsedCommand> {
        match self.command {
            Some(command) => {
                validate_command(&command)?;
                Ok(ParsedCommand::Cli(command))
            }
            None => Ok(ParsedCommand::RunServer(self.build()?)),
        }
    }
}

fn validate_command(command: &CliCommand) -> Result<()> {
    match command {
        CliCommand::Compile(args) => {
            if args.prompt.trim().is_empty() {
                return Err(anyhow!("invalid prompt: must not be empty"));
            }
        }
    }

    Ok(())
}
