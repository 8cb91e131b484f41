use std::sync::Arc;

use rmcp::{
    handler::server::ServerHandler,
    model::{
        CallToolRequestParam, CallToolResult, ErrorData, Implementation, ListToolsResult,
        PaginatedRequestParam, ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
};
use tracing::debug;

use crate::{
    server::config::ServerConfig,
    tools::{
        refine::{AnthropicProvider, CompletionProvider, RefinePromptTool},
        ToolDispatcher, ToolHandler,
    },
};

use super::{build_instructions, SERVER_NAME};

/// MCP handler that answers discovery and call requests through a [`ToolDispatcher`].
#[derive(Clone)]
pub struct RefinePromptServer {
    dispatcher: ToolDispatcher,
    instructions: Arc<String>,
}

impl RefinePromptServer {
    pub fn new(dispatcher: ToolDispatcher, instructions: String) -> Self {
        Self {
            dispatcher,
            instructions: Arc::new(instructions),
        }
    }

    /// Register `refine_prompt` on top of the given completion provider.
    pub fn with_provider(provider: Arc<dyn CompletionProvider>) -> Self {
        let instructions = build_instructions(provider.model());
        let tool = RefinePromptTool::new(provider);
        let dispatcher = ToolDispatcher::new([Arc::new(tool) as Arc<dyn ToolHandler>]);
        Self::new(dispatcher, instructions)
    }

    /// Build the server with the Anthropic provider described by `config`.
    pub fn from_config(config: &ServerConfig) -> Result<Self, reqwest::Error> {
        let provider = AnthropicProvider::new(config.provider.clone())?;
        Ok(Self::with_provider(Arc::new(provider)))
    }

    pub fn dispatcher(&self) -> &ToolDispatcher {
        &self.dispatcher
    }
}

impl ServerHandler for RefinePromptServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Implementation::from_build_env()
            },
            instructions: Some((*self.instructions).clone()),
            ..ServerInfo::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        debug!(target: "refine_prompt::runtime", "list_tools handler called");
        Ok(ListToolsResult::with_all_items(self.dispatcher.list()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        debug!(
            target: "refine_prompt::runtime",
            tool = %request.name,
            "call_tool handler called"
        );
        Ok(self
            .dispatcher
            .dispatch(&request.name, request.arguments)
            .await)
    }
}
