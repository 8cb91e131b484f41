//! Telemetry initialization and tool-call span helpers.

use std::time::Instant;

use anyhow::Result;
use serde::Serialize;
use tracing::{info, info_span, warn, Span};
use tracing_subscriber::{fmt, EnvFilter};
use uuid::Uuid;

/// Maximum number of characters of prompt text copied into log events.
pub const PREVIEW_CHARS: usize = 100;

/// Initialize `tracing` and format developer logs.
///
/// Logs always go to stderr; stdout carries the MCP protocol stream.
pub fn init_tracing() -> Result<()> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to initialize tracing: {err}"))
}

/// Truncate `text` to at most [`PREVIEW_CHARS`] characters for logging.
pub fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

/// Span helper to record start and finish of a single tool call.
pub struct CallSpan {
    span: Span,
    started_at: Instant,
    request_id: Uuid,
    tool: String,
}

impl CallSpan {
    /// Start a call span.
    pub fn start(tool: &str) -> Self {
        let request_id = Uuid::new_v4();
        let span = info_span!(
            target: "refine_prompt::dispatch",
            "tool_call",
            %request_id,
            tool
        );
        Self {
            span,
            started_at: Instant::now(),
            request_id,
            tool: tool.to_string(),
        }
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Close the span after a successful call.
    pub fn succeed(self, output_chars: usize) {
        let elapsed_ms = self.started_at.elapsed().as_millis();
        let _entered = self.span.enter();
        info!(
            target: "refine_prompt::dispatch",
            request_id = %self.request_id,
            tool = %self.tool,
            status = "succeeded",
            output_chars,
            elapsed_ms,
            "Completed tool call"
        );
    }

    /// Close the span after a failed call.
    pub fn fail(self, code: &'static str, retryable: bool, message: &str) {
        let elapsed_ms = self.started_at.elapsed().as_millis();
        let _entered = self.span.enter();
        warn!(
            target: "refine_prompt::dispatch",
            request_id = %self.request_id,
            tool = %self.tool,
            status = "failed",
            code,
            retryable,
            reason = message,
            elapsed_ms,
            "Tool call failed"
        );
    }
}

/// Payload for logging MCP runtime state as structured telemetry.
#[derive(Debug, Serialize)]
pub struct RuntimeModeTelemetry<'a> {
    pub transport: &'a str,
    pub config_path: &'a str,
    pub config_file_found: bool,
    pub model: &'a str,
    pub credential_present: bool,
    pub tools: &'a [String],
    pub launch_args: &'a [String],
}

/// Emit runtime mode to `tracing`.
pub fn emit_runtime_mode(telemetry: &RuntimeModeTelemetry<'_>) {
    info!(
        target: "refine_prompt::runtime",
        transport = telemetry.transport,
        config_path = telemetry.config_path,
        config_file_found = telemetry.config_file_found,
        model = telemetry.model,
        credential_present = telemetry.credential_present,
        tools = ?telemetry.tools,
        launch_args = ?telemetry.launch_args,
        "Started MCP server"
    );
}
