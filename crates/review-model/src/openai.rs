//! OpenAI-compatible chat completions adapter.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::http::{build_http_client, resolve_api_key, truncate};
use crate::types::{ChatMessage, ChatRequest, ChatResponse, TokenUsage, ToolCall, ToolChoice};
use crate::{LanguageModel, ModelBackend, ModelError, ModelSettings};

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const AUTH_ENV_VAR: &str = "OPENAI_API_KEY";

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: Option<u64>,
    completion_tokens: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct OpenAiFunction {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiToolCall {
    id: String,
    function: OpenAiFunction,
}

#[derive(Debug, Deserialize)]
struct OpenAiMessage {
    content: Option<Value>,
    #[serde(default)]
    tool_calls: Vec<OpenAiToolCall>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

pub struct OpenAiModel {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: Option<f32>,
}

impl std::fmt::Debug for OpenAiModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiModel")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish()
    }
}

impl OpenAiModel {
    pub fn from_settings(settings: &ModelSettings) -> Result<Self, ModelError> {
        let backend = ModelBackend::OpenAi;
        let api_key = resolve_api_key(backend, settings.api_key.as_deref(), AUTH_ENV_VAR)?;
        Ok(Self {
            client: build_http_client(backend, settings.request_timeout())?,
            endpoint: resolve_chat_endpoint(settings.endpoint.as_deref()),
            api_key,
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
        })
    }
}

#[async_trait]
impl LanguageModel for OpenAiModel {
    fn backend(&self) -> ModelBackend {
        ModelBackend::OpenAi
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ModelError> {
        let backend = self.backend();
        tracing::debug!(
            model = %self.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "openai chat request"
        );
        let payload = build_payload(&self.model, self.max_tokens, self.temperature, request);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ModelError::transport(backend, e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Api {
                backend,
                status,
                body: truncate(&body, 320),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ModelError::invalid_response(backend, e.to_string()))?;

        parse_response(body)
    }
}

pub(crate) fn build_payload(
    model: &str,
    default_max_tokens: u32,
    default_temperature: Option<f32>,
    request: &ChatRequest,
) -> Value {
    let mut messages = Vec::new();
    if let Some(system) = request.system.as_deref() {
        if !system.trim().is_empty() {
            messages.push(json!({ "role": "system", "content": system }));
        }
    }

    for message in &request.messages {
        messages.push(match message {
            ChatMessage::User { content } => json!({ "role": "user", "content": content }),
            ChatMessage::Assistant { text, tool_calls } => {
                let mut value = json!({ "role": "assistant", "content": text });
                if !tool_calls.is_empty() {
                    value["tool_calls"] = Value::Array(
                        tool_calls
                            .iter()
                            .map(|call| {
                                json!({
                                    "id": call.id,
                                    "type": "function",
                                    "function": {
                                        "name": call.name,
                                        "arguments": call.arguments.to_string(),
                                    }
                                })
                            })
                            .collect(),
                    );
                }
                value
            }
            ChatMessage::Tool {
                call_id, content, ..
            } => json!({
                "role": "tool",
                "tool_call_id": call_id,
                "content": content,
            }),
        });
    }

    let mut payload = json!({
        "model": model,
        "messages": messages,
        "max_tokens": request.max_tokens.unwrap_or(default_max_tokens),
    });
    if let Some(temp) = request.temperature.or(default_temperature) {
        payload["temperature"] = json!(temp);
    }
    if !request.tools.is_empty() {
        payload["tools"] = Value::Array(
            request
                .tools
                .iter()
                .map(|tool| {
                    json!({
                        "type": "function",
                        "function": {
                            "name": tool.name,
                            "description": tool.description,
                            "parameters": tool.input_schema,
                        }
                    })
                })
                .collect(),
        );
        payload["tool_choice"] = match &request.tool_choice {
            ToolChoice::Auto => json!("auto"),
            ToolChoice::None => json!("none"),
            ToolChoice::Tool(name) => json!({ "type": "function", "function": { "name": name } }),
        };
    }

    payload
}

pub(crate) fn parse_response(body: Value) -> Result<ChatResponse, ModelError> {
    let backend = ModelBackend::OpenAi;
    let body: OpenAiResponse = serde_json::from_value(body)
        .map_err(|e| ModelError::invalid_response(backend, e.to_string()))?;

    let choice = body
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ModelError::invalid_response(backend, "response did not include choices"))?;

    let text = choice
        .message
        .content
        .as_ref()
        .map(extract_text)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty());

    let tool_calls = choice
        .message
        .tool_calls
        .into_iter()
        .map(|call| {
            let arguments = serde_json::from_str(&call.function.arguments).map_err(|e| {
                ModelError::invalid_response(
                    backend,
                    format!("tool call '{}' arguments are not JSON: {}", call.function.name, e),
                )
            })?;
            Ok(ToolCall {
                id: call.id,
                name: call.function.name,
                arguments,
            })
        })
        .collect::<Result<Vec<_>, ModelError>>()?;

    let usage = body
        .usage
        .map(|usage| TokenUsage {
            input_tokens: usage.prompt_tokens.unwrap_or(0),
            output_tokens: usage.completion_tokens.unwrap_or(0),
        })
        .unwrap_or_default();

    Ok(ChatResponse {
        text,
        tool_calls,
        stop_reason: choice.finish_reason,
        usage,
    })
}

fn extract_text(content: &Value) -> String {
    match content {
        Value::String(text) => text.clone(),
        Value::Array(parts) => parts
            .iter()
            .filter_map(|part| part.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    }
}

fn resolve_chat_endpoint(endpoint: Option<&str>) -> String {
    let endpoint = endpoint.unwrap_or(DEFAULT_ENDPOINT);
    if endpoint.contains("/chat/completions") {
        endpoint.to_string()
    } else {
        format!("{}/chat/completions", endpoint.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_arguments_are_serialized_as_strings() {
        let request = ChatRequest::new(vec![
            ChatMessage::user("go"),
            ChatMessage::Assistant {
                text: None,
                tool_calls: vec![ToolCall {
                    id: "call_1".into(),
                    name: "visit_page".into(),
                    arguments: json!({"url": "https://x.test"}),
                }],
            },
            ChatMessage::tool_result("call_1", "page text", false),
        ])
        .with_system("sys");

        let payload = build_payload("gpt-test", 512, None, &request);
        let messages = payload["messages"].as_array().unwrap();
        assert_eq!(messages[0]["role"], "system");
        assert!(messages[2]["tool_calls"][0]["function"]["arguments"].is_string());
        assert_eq!(messages[3]["role"], "tool");
        assert!(payload.get("tools").is_none());
    }

    #[test]
    fn parses_function_calls() {
        let body = json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_9",
                        "type": "function",
                        "function": {"name": "submit_review", "arguments": "{\"verdict\":\"APPROVE\"}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {"prompt_tokens": 900, "completion_tokens": 100}
        });
        let response = parse_response(body).unwrap();
        assert!(response.text.is_none());
        assert_eq!(response.tool_calls[0].arguments["verdict"], "APPROVE");
        assert_eq!(response.usage.input_tokens, 900);
    }

    #[test]
    fn malformed_arguments_are_rejected() {
        let body = json!({
            "choices": [{
                "message": {
                    "content": "",
                    "tool_calls": [{"id": "c", "function": {"name": "t", "arguments": "{not json"}}]
                },
                "finish_reason": "tool_calls"
            }]
        });
        assert!(matches!(
            parse_response(body),
            Err(ModelError::InvalidResponse { .. })
        ));
    }

    #[test]
    fn endpoint_resolution() {
        assert_eq!(resolve_chat_endpoint(None), DEFAULT_ENDPOINT);
        assert_eq!(
            resolve_chat_endpoint(Some("http://localhost:8000/v1/")),
            "http://localhost:8000/v1/chat/completions"
        );
    }
}
