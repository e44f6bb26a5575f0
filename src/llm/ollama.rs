use crate::llm::client::{parse_tool_arguments, LLMClient, LLMResponse};
use crate::types::{AppError, Result, ToolCall, ToolDefinition};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

/// Ollama client speaking the `/api/chat` protocol
pub struct OllamaClient {
    http_client: reqwest::Client,
    base_url: String,
    model: String,
    temperature: f32,
}

impl OllamaClient {
    pub fn new(base_url: String, model: String) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| AppError::LLM(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            temperature: 0.7,
        })
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    async fn chat(&self, messages: &[(String, String)], tools: &[ToolDefinition]) -> Result<LLMResponse> {
        let messages: Vec<Value> = messages
            .iter()
            .map(|(role, content)| json!({ "role": role, "content": content }))
            .collect();

        let mut body = json!({
            "model": self.model,
            "messages": messages,
            "stream": false,
            "options": {
                "temperature": self.temperature
            }
        });

        if !tools.is_empty() {
            let tools: Vec<Value> = tools
                .iter()
                .map(|t| {
                    json!({
                        "type": "function",
                        "function": {
                            "name": t.name,
                            "description": t.description,
                            "parameters": t.parameters
                        }
                    })
                })
                .collect();
            body["tools"] = Value::Array(tools);
        }

        let url = format!("{}/api/chat", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::LLM(format!("Ollama request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::LLM(format!(
                "Ollama request failed ({}): {}",
                status, text
            )));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| AppError::LLM(format!("Failed to parse Ollama response: {}", e)))?;

        parse_chat_response(&json)
    }
}

/// Parse a non-streaming `/api/chat` response body
pub(crate) fn parse_chat_response(json: &Value) -> Result<LLMResponse> {
    let message = json
        .get("message")
        .ok_or_else(|| AppError::LLM("No message in Ollama response".into()))?;

    let content = message
        .get("content")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    let tool_calls: Vec<ToolCall> = message
        .get("tool_calls")
        .and_then(|v| v.as_array())
        .map(|calls| {
            calls
                .iter()
                .filter_map(|tc| {
                    let func = tc.get("function")?;
                    let name = func.get("name")?.as_str()?.to_string();
                    let arguments = match func.get("arguments") {
                        // Some models send the arguments as an encoded string
                        Some(Value::String(raw)) => parse_tool_arguments(&name, raw),
                        Some(args) => args.clone(),
                        None => json!({}),
                    };
                    Some(ToolCall {
                        id: uuid::Uuid::new_v4().to_string(),
                        name,
                        arguments,
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    let finish_reason = if tool_calls.is_empty() {
        json.get("done_reason")
            .and_then(|v| v.as_str())
            .unwrap_or("stop")
            .to_string()
    } else {
        "tool_calls".to_string()
    };

    Ok(LLMResponse {
        content,
        tool_calls,
        finish_reason,
    })
}

#[async_trait]
impl LLMClient for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let messages = [("user".to_string(), prompt.to_string())];
        Ok(self.chat(&messages, &[]).await?.content)
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        let messages = [
            ("system".to_string(), system.to_string()),
            ("user".to_string(), prompt.to_string()),
        ];
        Ok(self.chat(&messages, &[]).await?.content)
    }


    async fn generate_with_tools(
        &self,
        messages: &[(String, String)],
        tools: &[ToolDefinition],
    ) -> Result<LLMResponse> {
        self.chat(messages, tools).await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
