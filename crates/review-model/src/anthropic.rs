//! Anthropic Messages API adapter.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::http::{build_http_client, resolve_api_key, truncate};
use crate::types::{ChatMessage, ChatRequest, ChatResponse, TokenUsage, ToolCall, ToolChoice};
use crate::{LanguageModel, ModelBackend, ModelError, ModelSettings};

pub const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
pub const AUTH_ENV_VAR: &str = "ANTHROPIC_API_KEY";
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Deserialize)]
struct AnthropicContent {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
    id: Option<String>,
    name: Option<String>,
    input: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: Option<u64>,
    output_tokens: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
    stop_reason: Option<String>,
    usage: Option<AnthropicUsage>,
}

pub struct AnthropicModel {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: Option<f32>,
}

impl std::fmt::Debug for AnthropicModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicModel")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish()
    }
}

impl AnthropicModel {
    pub fn from_settings(settings: &ModelSettings) -> Result<Self, ModelError> {
        let backend = ModelBackend::Anthropic;
        let api_key = resolve_api_key(backend, settings.api_key.as_deref(), AUTH_ENV_VAR)?;
        Ok(Self {
            client: build_http_client(backend, settings.request_timeout())?,
            endpoint: resolve_messages_endpoint(settings.endpoint.as_deref()),
            api_key,
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
        })
    }

    fn build_payload(&self, request: &ChatRequest) -> Value {
        build_payload(&self.model, self.max_tokens, self.temperature, request)
    }
}

#[async_trait]
impl LanguageModel for AnthropicModel {
    fn backend(&self) -> ModelBackend {
        ModelBackend::Anthropic
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
            "anthropic chat request"
        );
        let payload = self.build_payload(request);

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
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
    let mut payload = json!({
        "model": model,
        "max_tokens": request.max_tokens.unwrap_or(default_max_tokens),
        "messages": convert_messages(&request.messages),
    });

    if let Some(temp) = request.temperature.or(default_temperature) {
        payload["temperature"] = json!(temp);
    }
    if let Some(system) = request.system.as_deref() {
        if !system.trim().is_empty() {
            payload["system"] = json!(system);
        }
    }
    if !request.tools.is_empty() {
        payload["tools"] = Value::Array(
            request
                .tools
                .iter()
                .map(|tool| {
                    json!({
                        "name": tool.name,
                        "description": tool.description,
                        "input_schema": tool.input_schema,
                    })
                })
                .collect(),
        );
        payload["tool_choice"] = match &request.tool_choice {
            ToolChoice::Auto => json!({ "type": "auto" }),
            ToolChoice::None => json!({ "type": "none" }),
            ToolChoice::Tool(name) => json!({ "type": "tool", "name": name }),
        };
    }

    payload
}

/// Consecutive tool results are folded into one user turn, as the API requires.
fn convert_messages(messages: &[ChatMessage]) -> Vec<Value> {
    let mut converted: Vec<Value> = Vec::with_capacity(messages.len());
    let mut pending_results: Vec<Value> = Vec::new();

    for message in messages {
        if let ChatMessage::Tool {
            call_id,
            content,
            is_error,
        } = message
        {
            pending_results.push(json!({
                "type": "tool_result",
                "tool_use_id": call_id,
                "content": content,
                "is_error": is_error,
            }));
            continue;
        }

        if !pending_results.is_empty() {
            converted.push(json!({
                "role": "user",
                "content": std::mem::take(&mut pending_results),
            }));
        }

        match message {
            ChatMessage::User { content } => converted.push(json!({
                "role": "user",
                "content": content,
            })),
            ChatMessage::Assistant { text, tool_calls } => {
                let mut blocks = Vec::new();
                if let Some(text) = text.as_deref().filter(|t| !t.is_empty()) {
                    blocks.push(json!({ "type": "text", "text": text }));
                }
                for call in tool_calls {
                    blocks.push(json!({
                        "type": "tool_use",
                        "id": call.id,
                        "name": call.name,
                        "input": call.arguments,
                    }));
                }
                converted.push(json!({ "role": "assistant", "content": blocks }));
            }
            ChatMessage::Tool { .. } => {}
        }
    }

    if !pending_results.is_empty() {
        converted.push(json!({ "role": "user", "content": pending_results }));
    }

    converted
}

pub(crate) fn parse_response(body: Value) -> Result<ChatResponse, ModelError> {
    let backend = ModelBackend::Anthropic;
    let body: AnthropicResponse = serde_json::from_value(body)
        .map_err(|e| ModelError::invalid_response(backend, e.to_string()))?;

    let text = body
        .content
        .iter()
        .filter(|part| part.content_type == "text")
        .filter_map(|part| part.text.as_deref())
        .collect::<Vec<_>>()
        .join("\n");

    let mut tool_calls = Vec::new();
    for part in body.content.iter().filter(|p| p.content_type == "tool_use") {
        let (Some(id), Some(name)) = (part.id.clone(), part.name.clone()) else {
            return Err(ModelError::invalid_response(
                backend,
                "tool_use block without id or name",
            ));
        };
        tool_calls.push(ToolCall {
            id,
            name,
            arguments: part.input.clone().unwrap_or(Value::Object(Default::default())),
        });
    }

    let usage = body
        .usage
        .map(|usage| TokenUsage {
            input_tokens: usage.input_tokens.unwrap_or(0),
            output_tokens: usage.output_tokens.unwrap_or(0),
        })
        .unwrap_or_default();

    let text = text.trim();
    Ok(ChatResponse {
        text: (!text.is_empty()).then(|| text.to_string()),
        tool_calls,
        stop_reason: body.stop_reason,
        usage,
    })
}

fn resolve_messages_endpoint(endpoint: Option<&str>) -> String {
    let endpoint = endpoint.unwrap_or(DEFAULT_ENDPOINT);
    if endpoint.ends_with("/messages") {
        endpoint.to_string()
    } else {
        format!("{}/messages", endpoint.trim_end_matches('/'))
    }
}
