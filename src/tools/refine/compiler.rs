//! Prompt compilation: turns validated arguments into the system/user message pair.
//!
//! Everything here is pure string assembly. The conditional fragments are kept
//! as separate constants so each branch can be checked on its own.

use serde::Serialize;

use super::request::ValidatedArgs;

/// Marker word stripped from the start of incoming prompts.
pub const REFINE_MARKER: &str = "refine";

/// Fence language used for code-block examples when no hint is given.
pub const FALLBACK_FENCE_LANGUAGE: &str = "plaintext";

pub const ROLE_SECTION: &str = "<role>
You are an expert Prompt Engineer AI assistant. Your primary function is to rewrite raw user prompts into highly effective, detailed, and well-structured prompts optimized for Large Language Models (LLMs) like Claude, GPT-4, Gemini, etc., across a wide range of tasks (coding, writing, analysis, brainstorming, etc.).
</role>";

pub const TASK_STATEMENT: &str = "Analyze the provided raw user prompt and transform it into an improved prompt that maximizes the clarity, context, and detail needed for another LLM to generate the best possible response.";

pub const GENERIC_CONTEXT_NOTE: &str =
    "If the prompt involves specific domains (e.g., scientific, legal), ensure terminology is correct.";

pub const GUIDELINES_INTRO: &str =
    "Follow these guidelines meticulously when rewriting the prompt:";

pub const GUIDELINE_CLARIFY: &str = "1.  **Clarify Objective & Scope:** Identify the core goal. If the original prompt is vague, refine it to be specific and unambiguous. Define the scope clearly.";

pub const GUIDELINE_CONTEXT_HEAD: &str = "2.  **Inject Essential Context:** Determine what background information or context the target LLM needs. This might include:
    *   Target audience or persona for the response.
    *   Relevant background details or constraints mentioned or implied.
    *   Source data or information to use (if applicable).";

pub const GUIDELINE_CONTEXT_TAIL: &str =
    "    *   If crucial context seems missing, structure the rewritten prompt to explicitly ask the user to provide it.";

pub const GUIDELINES_REST: &str = "4.  **Specify Output Format:** Clearly define the desired format for the *final* LLM's response (e.g., JSON object with specific keys, bulleted list, email draft, Python function, analytical report, comparison table).
5.  **Define Constraints & Requirements:** Include explicit requirements like desired length, tone (e.g., formal, casual, witty), style guidelines, performance needs, specific algorithms/techniques to use or avoid (use positive framing: \"Use algorithm X\" instead of \"Don't use Y\").
6.  **Incorporate Examples (If Helpful):** For complex requests, provide concise examples of desired input/output or behavior to illustrate the task.
7.  **Break Down Complexity:** For multi-step or complex tasks, structure the prompt to encourage a step-by-step approach (Chain of Thought) or decompose it into logical sub-tasks.
8.  **Preserve Original Intent:** Critically ensure the rewritten prompt accurately reflects the user's original goal, merely enhancing its effectiveness. Do not introduce unrelated tasks.
9.  **Use Action Verbs:** Start instructions with clear action verbs.";

pub const OUTPUT_FORMAT_SECTION: &str = "<output_format>
Your output MUST be ONLY the rewritten, optimized prompt text, ready to be sent to another LLM. Do NOT include any explanations, introductions, apologies, commentary, markdown formatting markers (```markdown`), or any text other than the final prompt itself.
</output_format>";

pub const USER_PAYLOAD_INSTRUCTION: &str = "Rewrite the following user prompt:";

pub const PROMPT_DELIMITER: &str = "---";

/// Message pair sent to the completion provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledMessagePair {
    pub system: String,
    pub user: String,
}

/// Strip a leading `refine` marker (optionally followed by a comma) and trim.
///
/// The marker only matches as a whole word, so `refinement ...` is left alone.
pub fn clean_prompt(raw: &str) -> String {
    let text = raw.trim_start();
    strip_marker(text).unwrap_or(text).trim().to_string()
}

fn strip_marker(text: &str) -> Option<&str> {
    let head = text.get(..REFINE_MARKER.len())?;
    if !head.eq_ignore_ascii_case(REFINE_MARKER) {
        return None;
    }
    let rest = &text[REFINE_MARKER.len()..];
    match rest.chars().next() {
        Some(',') => Some(&rest[1..]),
        Some(next) if next.is_alphanumeric() || next == '_' => None,
        _ => Some(rest),
    }
}

/// Build the message pair for already-cleaned arguments.
pub fn compile(args: &ValidatedArgs) -> CompiledMessagePair {
    CompiledMessagePair {
        system: system_instruction(args.language.as_deref()),
        user: user_payload(&args.prompt),
    }
}

pub fn system_instruction(language: Option<&str>) -> String {
    let task_note = language.map(language_task_note).unwrap_or_default();
    let context_note = language
        .map(language_context_note)
        .unwrap_or_else(|| GENERIC_CONTEXT_NOTE.to_string());
    let fence = language.unwrap_or(FALLBACK_FENCE_LANGUAGE);

    format!(
        "{ROLE_SECTION}

<task>
{TASK_STATEMENT}
{task_note}
</task>

<instructions>
{GUIDELINES_INTRO}
{GUIDELINE_CLARIFY}
{GUIDELINE_CONTEXT_HEAD}
    *   {context_note}
{GUIDELINE_CONTEXT_TAIL}
{structure}
{GUIDELINES_REST}
</instructions>

{OUTPUT_FORMAT_SECTION}",
        structure = structure_guideline(fence),
    )
}

pub fn user_payload(cleaned_prompt: &str) -> String {
    format!("{USER_PAYLOAD_INSTRUCTION}\n\n{PROMPT_DELIMITER}\n{cleaned_prompt}\n{PROMPT_DELIMITER}")
}

fn language_task_note(language: &str) -> String {
    format!(
        "\nThis specific prompt seems code-related, targeting the '{language}' programming language. Pay special attention to coding-specific instructions if applicable."
    )
}

fn language_context_note(language: &str) -> String {
    format!(
        "For coding tasks related to '{language}': Explicitly mention the language, relevant libraries/frameworks, data structures, or existing code snippets if provided/implied."
    )
}

fn structure_guideline(fence: &str) -> String {
    format!(
        "3.  **Structure for Clarity:** Use clear formatting (Markdown preferred) like headings, lists, or numbered steps to break down the request logically. Use code blocks (e.g., ```{fence} ... ```) for any code examples or data."
    )
}
