//! Scripted in-process model.
//!
//! Replays a queue of canned turns and records every request it receives.
//! Used by tests and by offline fixture runs.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::types::{ChatRequest, ChatResponse, TokenUsage, ToolCall};
use crate::{LanguageModel, ModelBackend, ModelError};

#[derive(Debug, Clone)]
enum ScriptedStep {
    Respond(ChatResponse),
    Fail(String),
}

#[derive(Debug)]
pub struct ScriptedModel {
    model: String,
    steps: Mutex<VecDeque<ScriptedStep>>,
    requests: Mutex<Vec<ChatRequest>>,
    delay: Option<Duration>,
    usage_per_turn: TokenUsage,
    call_counter: AtomicUsize,
}

impl ScriptedModel {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            steps: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            delay: None,
            usage_per_turn: TokenUsage::default(),
            call_counter: AtomicUsize::new(0),
        }
    }

    /// Sleep before every turn; used to exercise caller timeouts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Token usage reported on every successful turn.
    pub fn with_usage(mut self, input_tokens: u64, output_tokens: u64) -> Self {
        self.usage_per_turn = TokenUsage {
            input_tokens,
            output_tokens,
        };
        self
    }

    pub fn then_response(self, response: ChatResponse) -> Self {
        self.push(ScriptedStep::Respond(response));
        self
    }

    pub fn then_text(self, text: impl Into<String>) -> Self {
        self.then_response(ChatResponse {
            text: Some(text.into()),
            stop_reason: Some("end_turn".to_string()),
            ..Default::default()
        })
    }

    pub fn then_tool_call(self, name: impl Into<String>, arguments: Value) -> Self {
        let id = format!("call_{}", self.queued());
        self.then_response(ChatResponse {
            tool_calls: vec![ToolCall {
                id,
                name: name.into(),
                arguments,
            }],
            stop_reason: Some("tool_use".to_string()),
            ..Default::default()
        })
    }

    pub fn then_error(self, message: impl Into<String>) -> Self {
        self.push(ScriptedStep::Fail(message.into()));
        self
    }

    /// Requests received so far, in order.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.call_counter.load(Ordering::SeqCst)
    }

    fn push(&self, step: ScriptedStep) {
        if let Ok(mut steps) = self.steps.lock() {
            steps.push_back(step);
        }
    }

    fn queued(&self) -> usize {
        self.steps.lock().map(|steps| steps.len()).unwrap_or(0)
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    fn backend(&self) -> ModelBackend {
        ModelBackend::Scripted
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ModelError> {
        self.call_counter.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let step = self
            .steps
            .lock()
            .ok()
            .and_then(|mut steps| steps.pop_front());

        match step {
            Some(ScriptedStep::Respond(mut response)) => {
                if response.usage == TokenUsage::default() {
                    response.usage = self.usage_per_turn;
                }
                Ok(response)
            }
            Some(ScriptedStep::Fail(message)) => {
                Err(ModelError::transport(ModelBackend::Scripted, message))
            }
            None => Err(ModelError::transport(
                ModelBackend::Scripted,
                "script exhausted",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChatMessage;

    #[tokio::test]
    async fn replays_in_order_then_exhausts() {
        let model = ScriptedModel::new("scripted")
            .with_usage(10, 2)
            .then_text("first")
            .then_error("upstream 500");
        let request = ChatRequest::new(vec![ChatMessage::user("hi")]);

        let first = model.chat(&request).await.unwrap();
        assert_eq!(first.text.as_deref(), Some("first"));
        assert_eq!(first.usage.total(), 12);

        assert!(model.chat(&request).await.is_err());
        let exhausted = model.chat(&request).await.unwrap_err();
        assert!(exhausted.to_string().contains("script exhausted"));
        assert_eq!(model.call_count(), 3);
        assert_eq!(model.requests().len(), 3);
    }
}
