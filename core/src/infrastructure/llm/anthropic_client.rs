use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{
    common::ProviderCredentials,
    menu_analysis::{
        entities::ProviderError,
        ports::LLMClient,
        value_objects::{CompletionRequest, Provider},
    },
};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 1024;
const JSON_INSTRUCTION: &str = "Respond with a single JSON document and nothing else.";

#[derive(Debug, Clone)]
pub struct AnthropicClient {
    api_key: String,
    model_name: String,
    base_url: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl AnthropicClient {
    pub fn new(credentials: ProviderCredentials) -> Self {
        Self {
            api_key: credentials.api_key,
            model_name: credentials.model,
            base_url: credentials
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            client: Client::new(),
        }
    }

    fn build_request(&self, request: &CompletionRequest) -> MessagesRequest {
        // No native JSON mode; ask for it in the system prompt instead.
        let system = match (&request.system_prompt, request.want_json) {
            (Some(prompt), true) => Some(format!("{}\n\n{}", prompt, JSON_INSTRUCTION)),
            (Some(prompt), false) => Some(prompt.clone()),
            (None, true) => Some(JSON_INSTRUCTION.to_string()),
            (None, false) => None,
        };

        MessagesRequest {
            model: self.model_name.clone(),
            max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            system,
            messages: vec![Message {
                role: "user",
                content: request.prompt.clone(),
            }],
        }
    }

    async fn call_anthropic_api(&self, body: MessagesRequest) -> Result<String, ProviderError> {
        let url = format!("{}/v1/messages", self.base_url.trim_end_matches('/'));
        debug!(model = %self.model_name, "Sending request to Anthropic");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Anthropic API request failed: {}", e);
                ProviderError::unavailable(Provider::Anthropic, format!("request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Anthropic API error: {} - {}", status, error_text);
            return Err(ProviderError::unavailable(
                Provider::Anthropic,
                format!("HTTP {} - {}", status, error_text),
            ));
        }

        let body = response.text().await.map_err(|e| {
            tracing::error!("Failed to read Anthropic response: {}", e);
            ProviderError::unavailable(Provider::Anthropic, format!("failed to read body: {}", e))
        })?;

        parse_messages_response(&body)
    }
}

/// Concatenated text blocks of a messages response.
fn parse_messages_response(body: &str) -> Result<String, ProviderError> {
    let response: MessagesResponse = serde_json::from_str(body).map_err(|e| {
        tracing::error!("Failed to parse Anthropic response: {}", e);
        // A 200 that is not an API envelope came from a proxy or an outage page.
        ProviderError::unavailable(Provider::Anthropic, format!("unexpected envelope: {}", e))
    })?;

    let text: String = response
        .content
        .into_iter()
        .filter(|block| block.kind == "text")
        .filter_map(|block| block.text)
        .collect();

    if text.trim().is_empty() {
        return Err(ProviderError::unavailable(
            Provider::Anthropic,
            "empty completion",
        ));
    }

    Ok(text)
}

impl LLMClient for AnthropicClient {
    async fn generate(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        let body = self.build_request(&request);
        self.call_anthropic_api(body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> AnthropicClient {
        AnthropicClient::new(ProviderCredentials {
            api_key: "sk-ant-test".to_string(),
            model: "claude-3-5-haiku-latest".to_string(),
            base_url: Some("http://localhost:9999/".to_string()),
        })
    }

    #[test]
    fn test_request_defaults_max_tokens_and_appends_json_instruction() {
        let request = CompletionRequest::new(Provider::Anthropic, "Dish: Burger")
            .with_system_prompt("You are a nutritionist")
            .expecting_json();

        let body = serde_json::to_value(client().build_request(&request)).unwrap();

        assert_eq!(body["max_tokens"], DEFAULT_MAX_TOKENS);
        assert_eq!(body["messages"][0]["role"], "user");
        let system = body["system"].as_str().unwrap();
        assert!(system.starts_with("You are a nutritionist"));
        assert!(system.ends_with(JSON_INSTRUCTION));
    }

    #[test]
    fn test_request_without_system_prompt() {
        let request = CompletionRequest::new(Provider::Anthropic, "hi").with_max_tokens(64);
        let body = serde_json::to_value(client().build_request(&request)).unwrap();

        assert!(body.get("system").is_none());
        assert_eq!(body["max_tokens"], 64);
    }

    #[test]
    fn test_parse_messages_response_joins_text_blocks() {
        let body = r#"{
            "id": "msg_1",
            "type": "message",
            "content": [
                { "type": "text", "text": "{\"healthScore\": " },
                { "type": "tool_use", "id": "t1", "name": "noop", "input": {} },
                { "type": "text", "text": "71}" }
            ],
            "stop_reason": "end_turn"
        }"#;

        assert_eq!(parse_messages_response(body).unwrap(), "{\"healthScore\": 71}");
    }

    #[test]
    fn test_empty_or_broken_response() {
        let empty = parse_messages_response(r#"{ "content": [] }"#).unwrap_err();
        assert!(empty.is_unavailable());

        let broken = parse_messages_response("overloaded").unwrap_err();
        assert!(broken.is_unavailable());
        assert!(broken.to_string().contains("unexpected envelope"));
        assert_eq!(broken.provider(), Provider::Anthropic);
    }
}
