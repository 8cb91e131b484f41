//! MCP tools registered on the server and the dispatcher that routes calls to them.

pub mod refine;

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use rmcp::model::{CallToolResult, Content, JsonObject, Tool};
use tracing::{debug, warn, Instrument};

use crate::lib::{errors::RefineError, telemetry::CallSpan};

/// A single named capability exposed to MCP clients.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Descriptor returned from `tools/list`.
    fn descriptor(&self) -> Tool;

    /// Run the tool and return the text block placed in the response.
    async fn call(&self, arguments: Option<JsonObject>) -> Result<String, RefineError>;
}

/// Immutable name-to-handler mapping built once at startup.
#[derive(Clone)]
pub struct ToolDispatcher {
    by_name: Arc<BTreeMap<String, Arc<dyn ToolHandler>>>,
}

impl ToolDispatcher {
    pub fn new<I>(handlers: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn ToolHandler>>,
    {
        let by_name = handlers
            .into_iter()
            .map(|handler| (handler.descriptor().name.to_string(), handler))
            .collect();
        Self {
            by_name: Arc::new(by_name),
        }
    }

    /// Tool names in registration-independent (sorted) order.
    pub fn names(&self) -> Vec<String> {
        self.by_name.keys().cloned().collect()
    }

    /// Descriptors for discovery requests.
    pub fn list(&self) -> Vec<Tool> {
        self.by_name
            .values()
            .map(|handler| handler.descriptor())
            .collect()
    }

    /// Route a call by exact name and wrap the outcome in a tool result.
    ///
    /// Failures never escape as protocol errors: every outcome is a
    /// `CallToolResult`, with `is_error` set when the call did not succeed.
    pub async fn dispatch(&self, name: &str, arguments: Option<JsonObject>) -> CallToolResult {
        let Some(handler) = self.by_name.get(name) else {
            let err = RefineError::UnknownTool {
                name: name.to_string(),
            };
            warn!(
                target: "refine_prompt::dispatch",
                tool = name,
                code = err.code(),
                "Attempted to call unknown tool"
            );
            return error_result(format!("Error: {err}"));
        };

        let call_span = CallSpan::start(name);
        debug!(
            target: "refine_prompt::dispatch",
            request_id = %call_span.request_id(),
            tool = name,
            "Dispatching tool call"
        );
        let outcome = handler
            .call(arguments)
            .instrument(call_span.span().clone())
            .await;

        match outcome {
            Ok(text) => {
                call_span.succeed(text.chars().count());
                CallToolResult::success(vec![Content::text(text)])
            }
            Err(err) => {
                let message = format!("Error executing tool '{name}': {err}");
                call_span.fail(err.code(), err.retryable(), &err.to_string());
                error_result(message)
            }
        }
    }
}

fn error_result(message: String) -> CallToolResult {
    CallToolResult::error(vec![Content::text(message)])
}
