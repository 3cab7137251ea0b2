//! Structured output on top of tool calling.
//!
//! The model is forced to call a single tool whose input schema is the
//! desired output shape; the tool arguments are the structured value. If a
//! provider answers in plain text instead, the first JSON object in the text
//! is parsed as a repair step.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::types::{ChatMessage, ChatRequest, TokenUsage, ToolChoice, ToolSpec};
use crate::{LanguageModel, ModelError};

/// Name, description and JSON Schema of the expected output.
#[derive(Debug, Clone)]
pub struct OutputSchema {
    pub name: String,
    pub description: String,
    pub schema: Value,
}

impl OutputSchema {
    pub fn new(name: impl Into<String>, description: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            schema,
        }
    }

    fn as_tool(&self) -> ToolSpec {
        ToolSpec {
            name: self.name.clone(),
            description: self.description.clone(),
            input_schema: self.schema.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Structured<T> {
    pub value: T,
    pub usage: TokenUsage,
}

pub async fn generate_structured<T: DeserializeOwned>(
    model: &dyn LanguageModel,
    instructions: &str,
    prompt: String,
    output: &OutputSchema,
) -> Result<Structured<T>, ModelError> {
    let request = ChatRequest::new(vec![ChatMessage::user(prompt)])
        .with_system(instructions)
        .with_tools(vec![output.as_tool()], ToolChoice::Tool(output.name.clone()));

    let response = model.chat(&request).await?;

    let raw = match response
        .tool_calls
        .iter()
        .find(|call| call.name == output.name)
    {
        Some(call) => call.arguments.clone(),
        None => response
            .text
            .as_deref()
            .and_then(extract_first_json_object)
            .and_then(|json| serde_json::from_str(&json).ok())
            .ok_or_else(|| ModelError::StructuredOutput {
                tool: output.name.clone(),
                message: "no tool call and no JSON object in text".to_string(),
            })?,
    };

    let value = serde_json::from_value(raw).map_err(|e| ModelError::StructuredOutput {
        tool: output.name.clone(),
        message: e.to_string(),
    })?;

    Ok(Structured {
        value,
        usage: response.usage,
    })
}

fn extract_first_json_object(raw: &str) -> Option<String> {
    let start = raw.find('{')?;
    let mut depth = 0_i32;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in raw[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(raw[start..start + offset + 1].to_string());
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScriptedModel;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Verdict {
        verdict: String,
    }

    fn schema() -> OutputSchema {
        OutputSchema::new(
            "submit_verdict",
            "Submit the verdict",
            json!({"type": "object", "properties": {"verdict": {"type": "string"}}}),
        )
    }

    #[tokio::test]
    async fn reads_forced_tool_call() {
        let model = ScriptedModel::new("scripted")
            .then_tool_call("submit_verdict", json!({"verdict": "APPROVE"}));
        let out: Structured<Verdict> =
            generate_structured(&model, "judge", "org".to_string(), &schema())
                .await
                .unwrap();
        assert_eq!(out.value.verdict, "APPROVE");

        let requests = model.requests();
        assert_eq!(
            requests[0].tool_choice,
            ToolChoice::Tool("submit_verdict".to_string())
        );
    }

    #[tokio::test]
    async fn repairs_json_embedded_in_text() {
        let model = ScriptedModel::new("scripted")
            .then_text("Sure! {\"verdict\": \"DENY\", \"note\": \"a } in string\"} done");
        let out: Structured<Verdict> =
            generate_structured(&model, "judge", "org".to_string(), &schema())
                .await
                .unwrap();
        assert_eq!(out.value.verdict, "DENY");
    }

    #[tokio::test]
    async fn schema_mismatch_is_an_error() {
        let model =
            ScriptedModel::new("scripted").then_tool_call("submit_verdict", json!({"other": 1}));
        let err = generate_structured::<Verdict>(&model, "judge", "org".to_string(), &schema())
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::StructuredOutput { .. }));
    }
}
