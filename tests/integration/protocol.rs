use anyhow::Result;
use httpmock::{Method::POST, MockServer};
use rmcp::model::CallToolRequestParam;
use serde_json::json;

use crate::common::{connect_in_process, first_text, provider_config};

fn refine_args(prompt: &str, language: Option<&str>) -> rmcp::model::JsonObject {
    let mut args = json!({ "prompt": prompt });
    if let Some(language) = language {
        args["language"] = json!(language);
    }
    args.as_object().cloned().unwrap_or_default()
}

#[tokio::test]
async fn list_tools_advertises_only_refine_prompt() -> Result<()> {
    let upstream = MockServer::start();
    let (client, server_task) = connect_in_process(provider_config(&upstream, None)).await?;

    let list = client.list_tools(None).await;

    let _ = client.cancel().await;
    let _ = server_task.await;

    let list = list?;
    assert_eq!(list.tools.len(), 1, "exactly one tool: {:?}", list.tools);
    let tool = &list.tools[0];
    assert_eq!(tool.name.as_ref(), "refine_prompt");
    assert!(tool
        .description
        .as_deref()
        .is_some_and(|text| text.starts_with("This tool MUST be used")));
    assert_eq!(tool.input_schema.get("required"), Some(&json!(["prompt"])));
    assert_eq!(
        tool.input_schema
            .get("properties")
            .and_then(|props| props.get("language"))
            .and_then(|lang| lang.get("type")),
        Some(&json!("string"))
    );
    Ok(())
}

#[tokio::test]
async fn unknown_tool_returns_error_envelope() -> Result<()> {
    let upstream = MockServer::start();
    let (client, server_task) = connect_in_process(provider_config(&upstream, None)).await?;

    let result = client
        .call_tool(CallToolRequestParam {
            name: "nonexistent".into(),
            arguments: None,
        })
        .await;

    let _ = client.cancel().await;
    let _ = server_task.await;

    let result = result.expect("unknown tools are reported in-band, not as protocol errors");
    assert_eq!(result.is_error, Some(true));
    assert_eq!(first_text(&result), "Error: Unknown tool called: nonexistent");
    Ok(())
}

#[tokio::test]
async fn invalid_arguments_never_reach_the_provider() -> Result<()> {
    let upstream = MockServer::start();
    let mock = upstream.mock(|when, then| {
        when.method(POST).path("/v1/messages");
        then.status(200);
    });
    let (client, server_task) =
        connect_in_process(provider_config(&upstream, Some("sk-test"))).await?;

    let missing = client
        .call_tool(CallToolRequestParam {
            name: "refine_prompt".into(),
            arguments: Some(json!({}).as_object().cloned().unwrap_or_default()),
        })
        .await;
    let wrong_type = client
        .call_tool(CallToolRequestParam {
            name: "refine_prompt".into(),
            arguments: Some(json!({ "prompt": 123 }).as_object().cloned().unwrap_or_default()),
        })
        .await;

    let _ = client.cancel().await;
    let _ = server_task.await;

    for result in [missing?, wrong_type?] {
        assert_eq!(result.is_error, Some(true));
        let text = first_text(&result);
        assert!(
            text.starts_with("Error executing tool 'refine_prompt': Invalid arguments"),
            "unexpected text: {text}"
        );
    }
    assert_eq!(mock.hits(), 0);
    Ok(())
}

#[tokio::test]
async fn missing_credential_is_reported_without_network_call() -> Result<()> {
    let upstream = MockServer::start();
    let mock = upstream.mock(|when, then| {
        when.method(POST).path("/v1/messages");
        then.status(200);
    });
    let (client, server_task) = connect_in_process(provider_config(&upstream, None)).await?;

    let result = client
        .call_tool(CallToolRequestParam {
            name: "refine_prompt".into(),
            arguments: Some(refine_args("hello", None)),
        })
        .await;

    let _ = client.cancel().await;
    let _ = server_task.await;

    let result = result?;
    assert_eq!(result.is_error, Some(true));
    let text = first_text(&result);
    assert!(text.starts_with("Error executing tool 'refine_prompt':"));
    assert!(text.contains("ANTHROPIC_API_KEY"), "unexpected text: {text}");
    assert_eq!(mock.hits(), 0);
    Ok(())
}

#[tokio::test]
async fn refine_prompt_returns_model_output() -> Result<()> {
    let upstream = MockServer::start();
    let refined = "You are an expert Python developer. Write a function that sorts a list of integers in ascending order and returns a new list.";
    let mock = upstream.mock(|when, then| {
        when.method(POST)
            .path("/v1/messages")
            .header("x-api-key", "sk-test")
            .body_contains("targeting the 'python' programming language")
            .body_contains("---\\nwrite code to sort a list\\n---");
        then.status(200).json_body(json!({
            "id": "msg_01",
            "type": "message",
            "role": "assistant",
            "content": [{ "type": "text", "text": format!("  {refined}\n") }],
            "stop_reason": "end_turn"
        }));
    });
    let (client, server_task) =
        connect_in_process(provider_config(&upstream, Some("sk-test"))).await?;

    let result = client
        .call_tool(CallToolRequestParam {
            name: "refine_prompt".into(),
            arguments: Some(refine_args("refine write code to sort a list", Some("python"))),
        })
        .await;

    let _ = client.cancel().await;
    let _ = server_task.await;

    let result = result?;
    assert_ne!(result.is_error, Some(true));
    let text = first_text(&result);
    assert_eq!(text, refined);
    assert!(!text.contains("Rewrite the following"));
    mock.assert();
    Ok(())
}

#[tokio::test]
async fn upstream_failure_is_wrapped_in_error_envelope() -> Result<()> {
    let upstream = MockServer::start();
    upstream.mock(|when, then| {
        when.method(POST).path("/v1/messages");
        then.status(529).json_body(json!({
            "type": "error",
            "error": { "type": "overloaded_error", "message": "Overloaded" }
        }));
    });
    let (client, server_task) =
        connect_in_process(provider_config(&upstream, Some("sk-test"))).await?;

    let result = client
        .call_tool(CallToolRequestParam {
            name: "refine_prompt".into(),
            arguments: Some(refine_args("summarize this article", None)),
        })
        .await;

    let _ = client.cancel().await;
    let _ = server_task.await;

    let result = result?;
    assert_eq!(result.is_error, Some(true));
    let text = first_text(&result);
    assert!(text.starts_with("Error executing tool 'refine_prompt':"));
    assert!(text.contains("Overloaded"), "unexpected text: {text}");
    Ok(())
}
