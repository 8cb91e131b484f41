use crate::tools::refine::REFINE_TOOL_ID;

/// Server name announced during the MCP handshake.
pub const SERVER_NAME: &str = "refine-prompt";

/// Build the `ServerInfo.instructions` string shown to MCP clients.
pub fn build_instructions(model: &str) -> String {
    format!(
        "Call `{tool}` whenever the user asks to refine, rewrite, improve, enhance, or optimize a prompt. Pass the raw prompt as `prompt` and, for code-related prompts, the target programming language as `language`. Rewrites are produced by {model}.",
        tool = REFINE_TOOL_ID,
    )
}
