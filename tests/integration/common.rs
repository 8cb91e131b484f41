use std::{io, path::PathBuf, process::Stdio, sync::Arc};

use anyhow::{Context, Result};
use httpmock::MockServer;
use refine_prompt_mcp::{
    server::{config::ProviderConfig, runtime::RefinePromptServer},
    tools::refine::AnthropicProvider,
};
use rmcp::{
    model::{CallToolResult, ClientInfo, RawContent},
    serve_client,
    service::{RoleClient, RunningService},
    ServiceExt,
};
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, ReadBuf},
    process::{Child, ChildStdin, ChildStdout, Command},
    task::JoinHandle,
};

pub const BINARY_PATH: &str = env!("CARGO_BIN_EXE_refine-prompt-mcp");
pub const TEST_KEY_ENV: &str = "REFINE_PROMPT_TEST_KEY";
pub const TEST_KEY: &str = "sk-test-integration";

pub type ServerTask = JoinHandle<Result<()>>;

/// Spawn the release binary the way an MCP client would, with stdio piped.
pub async fn spawn_server_process(
    envs: &[(&str, &str)],
) -> Result<(Child, ChildIoBridge, Option<JoinHandle<()>>)> {
    let mut command = Command::new(BINARY_PATH);
    command
        .env("REFINE_PROMPT_CONFIG", fixture("tests/fixtures/config_valid.toml"))
        .env_remove(TEST_KEY_ENV)
        .env_remove("REFINE_PROMPT_MODEL")
        .env_remove("REFINE_PROMPT_BASE_URL")
        .envs(envs.iter().copied())
        .kill_on_drop(true)
        .stdout(Stdio::piped())
        .stdin(Stdio::piped())
        .stderr(Stdio::piped());
    let mut child = command.spawn().context("failed to spawn server process")?;
    let stdout = child.stdout.take().context("child stdout")?;
    let stdin = child.stdin.take().context("child stdin")?;
    let bridge = ChildIoBridge::new(stdout, stdin);
    let stderr_handle = child.stderr.take().map(|mut stderr| {
        tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stderr.read_to_end(&mut buf).await;
        })
    });
    Ok((child, bridge, stderr_handle))
}

pub fn fixture(relative: &str) -> String {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    root.join(relative).display().to_string()
}

/// Provider settings aimed at a mock Messages endpoint.
pub fn provider_config(server: &MockServer, api_key: Option<&str>) -> ProviderConfig {
    ProviderConfig {
        base_url: server.base_url(),
        model: "claude-integration".into(),
        timeout_secs: 5,
        api_key: api_key.map(str::to_string),
        ..ProviderConfig::default()
    }
}

/// Serve a [`RefinePromptServer`] in-process over a duplex pipe and connect a client to it.
pub async fn connect_in_process(
    config: ProviderConfig,
) -> Result<(RunningService<RoleClient, ClientInfo>, ServerTask)> {
    let provider = AnthropicProvider::new(config)?;
    let server = RefinePromptServer::with_provider(Arc::new(provider));
    let (server_transport, client_transport) = tokio::io::duplex(4096);

    let server_task = tokio::spawn(async move {
        server.serve(server_transport).await?.waiting().await?;
        Result::<_, anyhow::Error>::Ok(())
    });
    let client = serve_client(ClientInfo::default(), client_transport).await?;
    Ok((client, server_task))
}

/// Text of the first content block of a tool result.
pub fn first_text(result: &CallToolResult) -> String {
    match result.content.first().map(|content| &content.raw) {
        Some(RawContent::Text(text)) => text.text.clone(),
        other => panic!("expected a text block, got {other:?}"),
    }
}

pub struct ChildIoBridge {
    stdout: ChildStdout,
    stdin: ChildStdin,
}

impl ChildIoBridge {
    pub fn new(stdout: ChildStdout, stdin: ChildStdin) -> Self {
        Self { stdout, stdin }
    }
}

impl AsyncRead for ChildIoBridge {
    fn poll_read(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> std::task::Poll<io::Result<()>> {
        std::pin::Pin::new(&mut self.stdout).poll_read(cx, buf)
    }
}

impl AsyncWrite for ChildIoBridge {
    fn poll_write(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
        data: &[u8],
    ) -> std::task::Poll<io::Result<usize>> {
        std::pin::Pin::new(&mut self.stdin).poll_write(cx, data)
    }

    fn poll_flush(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<io::Result<()>> {
        std::pin::Pin::new(&mut self.stdin).poll_flush(cx)
    }

    fn poll_shutdown(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<io::Result<()>> {
        std::pin::Pin::new(&mut self.stdin).poll_shutdown(cx)
    }
}
