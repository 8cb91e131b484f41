use std::process::ExitCode;

use anyhow::Error;
use rmcp::ServiceExt;

use crate::{
    cli::LaunchProfile,
    lib::telemetry::{emit_runtime_mode, RuntimeModeTelemetry},
    server::{config::ServerConfig, runtime::RefinePromptServer},
};

/// Bundles a fatal startup/runtime error message with an exit code.
#[derive(Debug)]
pub struct RuntimeExit {
    message: String,
    exit_code: ExitCode,
}

impl RuntimeExit {
    pub fn from_error(err: impl Into<Error>) -> Self {
        let err = err.into();
        Self {
            message: format!("{err:?}"),
            exit_code: ExitCode::FAILURE,
        }
    }

    /// Failure to establish or keep the stdio transport.
    pub fn transport(err: impl Into<Error>) -> Self {
        let err = err.into();
        Self {
            message: format!("Fatal error starting or running the MCP server: {err:?}"),
            exit_code: ExitCode::FAILURE,
        }
    }

    pub fn report(self) -> ExitCode {
        tracing::error!(target: "refine_prompt::runtime", reason = %self.message, "Exiting");
        eprintln!("{}", self.message);
        self.exit_code
    }

    pub fn exit_code(&self) -> ExitCode {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Build the server from configuration and serve MCP over stdio until the client disconnects.
pub async fn run_server(profile: LaunchProfile, config: ServerConfig) -> Result<(), RuntimeExit> {
    let server = RefinePromptServer::from_config(&config).map_err(RuntimeExit::from_error)?;
    let tools = server.dispatcher().names();

    emit_runtime_mode(&RuntimeModeTelemetry {
        transport: "stdio",
        config_path: config.source_path.to_string_lossy().as_ref(),
        config_file_found: config.file_found,
        model: &config.provider.model,
        credential_present: config.provider.has_credential(),
        tools: &tools,
        launch_args: &profile.launch_args,
    });

    run_stdio(server).await
}

async fn run_stdio(server: RefinePromptServer) -> Result<(), RuntimeExit> {
    let running = server
        .serve(rmcp::transport::stdio())
        .await
        .map_err(RuntimeExit::transport)?;
    tracing::info!(
        target: "refine_prompt::runtime",
        "Refine Prompt server running and connected via stdio"
    );
    let reason = running.waiting().await.map_err(RuntimeExit::transport)?;
    tracing::info!(
        target: "refine_prompt::runtime",
        reason = ?reason,
        "MCP session closed"
    );
    Ok(())
}
