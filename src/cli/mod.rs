//! CLI entrypoint module structure.
use anyhow::Result;
use serde_json::json;

use crate::tools::refine::{compile, ValidatedArgs};

pub mod args;
pub mod profile;

pub use args::{CliCommand, CompileArgs, LaunchProfileArgs, ParsedCommand};
pub use profile::{build_launch_args, resolve_config_path, ConfigSource, LaunchProfile};

/// Execute CLI command mode and return a user-facing result payload.
pub fn execute_cli_command(command: CliCommand) -> Result<String> {
    match command {
        CliCommand::Compile(args) => compile_preview(args),
    }
}

/// Compile a prompt offline and format the message pair as JSON.
fn compile_preview(args: CompileArgs) -> Result<String> {
    let validated = ValidatedArgs::new(&args.prompt, args.language);
    let messages = compile(&validated);

    let payload = json!({
        "cleaned_prompt": validated.prompt,
        "language": validated.language,
        "system": messages.system,
        "user": messages.user,
    });

    Ok(serde_json::to_string_pretty(&payload)?)
}
