//! The `refine_prompt` tool: validate, compile, then ask the model for a rewrite.

pub mod compiler;
pub mod provider;
pub mod request;

use std::sync::Arc;

use async_trait::async_trait;
use rmcp::model::{JsonObject, Tool};
use tracing::info;

use crate::lib::{errors::RefineError, telemetry::preview};

use super::ToolHandler;

pub use compiler::{clean_prompt, compile, CompiledMessagePair};
pub use provider::{AnthropicProvider, CompletionProvider, CompletionResult};
pub use request::{input_schema, validate_arguments, RefinePromptArgs, ValidatedArgs};

pub const REFINE_TOOL_ID: &str = "refine_prompt";

pub const REFINE_TOOL_DESCRIPTION: &str = "This tool MUST be used whenever a user asks to refine, rewrite, improve, enhance, or optimize a prompt. It transforms raw prompts into more effective versions that are clearer, more detailed, and better structured to improve results from Large Language Models (LLMs). When users mention 'refine prompt' or similar phrases, use this tool.";

/// Handler for `refine_prompt`, backed by any [`CompletionProvider`].
#[derive(Clone)]
pub struct RefinePromptTool {
    provider: Arc<dyn CompletionProvider>,
}

impl RefinePromptTool {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl ToolHandler for RefinePromptTool {
    fn descriptor(&self) -> Tool {
        Tool::new(REFINE_TOOL_ID, REFINE_TOOL_DESCRIPTION, input_schema())
    }

    async fn call(&self, arguments: Option<JsonObject>) -> Result<String, RefineError> {
        let args = validate_arguments(arguments)?;
        info!(
            target: "refine_prompt::dispatch",
            language = args.language.as_deref().unwrap_or(""),
            prompt = %preview(&args.prompt),
            "Received prompt to rewrite"
        );

        let messages = compile(&args);
        let completion = self.provider.complete(&messages).await?;
        info!(
            target: "refine_prompt::dispatch",
            rewritten = %preview(&completion.text),
            "Rewrote prompt"
        );
        Ok(completion.text)
    }
}
