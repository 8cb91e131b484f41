use std::sync::Arc;

use rmcp::model::JsonObject;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

use crate::lib::errors::RefineError;

use super::compiler::clean_prompt;
use super::REFINE_TOOL_ID;

/// Input for `refine_prompt`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[schemars(title = "refine_prompt_Arguments")]
pub struct RefinePromptArgs {
    /// The raw user prompt that needs rewriting.
    pub prompt: String,
    /// Optional: The primary programming language if the prompt is code-related (e.g., typescript, python). Helps tailor coding prompts.
    #[serde(default)]
    #[schemars(with = "String")]
    pub language: Option<String>,
}

/// Arguments after validation and prompt cleaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedArgs {
    /// Cleaned prompt; may be empty when the raw prompt held only the marker word.
    pub prompt: String,
    pub language: Option<String>,
}

impl ValidatedArgs {
    /// Clean the raw prompt and normalize an empty language hint to `None`.
    pub fn new(raw_prompt: &str, language: Option<String>) -> Self {
        Self {
            prompt: clean_prompt(raw_prompt),
            language: language.filter(|lang| !lang.is_empty()),
        }
    }
}

impl From<RefinePromptArgs> for ValidatedArgs {
    fn from(args: RefinePromptArgs) -> Self {
        ValidatedArgs::new(&args.prompt, args.language)
    }
}

/// Parse the untyped call payload into [`ValidatedArgs`] in one pass.
pub fn validate_arguments(arguments: Option<JsonObject>) -> Result<ValidatedArgs, RefineError> {
    let Some(arguments) = arguments else {
        return Err(RefineError::invalid_arguments(
            "No arguments provided for tool call.",
        ));
    };

    serde_json::from_value::<RefinePromptArgs>(Value::Object(arguments))
        .map(ValidatedArgs::from)
        .map_err(|err| {
            RefineError::invalid_arguments(format!(
                "Invalid arguments for tool '{REFINE_TOOL_ID}'. Expected: {{ prompt: string, language?: string }} ({err})"
            ))
        })
}

/// JSON schema advertised for the tool input.
pub fn input_schema() -> Arc<JsonObject> {
    let schema = schemars::schema_for!(RefinePromptArgs);
    let mut object = serde_json::to_value(&schema)
        .ok()
        .and_then(|value| value.as_object().cloned())
        .unwrap_or_default();
    object.remove("$schema");
    Arc::new(object)
}
