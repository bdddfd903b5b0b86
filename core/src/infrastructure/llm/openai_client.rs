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

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone)]
pub struct OpenAIClient {
    api_key: String,
    model_name: String,
    base_url: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

impl OpenAIClient {
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

    fn build_request(&self, request: &CompletionRequest) -> ChatRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(system_prompt) = &request.system_prompt {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: Some(system_prompt.clone()),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: Some(request.prompt.clone()),
        });

        ChatRequest {
            model: self.model_name.clone(),
            messages,
            max_tokens: request.max_tokens,
            response_format: request.want_json.then_some(ResponseFormat {
                kind: "json_object",
            }),
        }
    }

    async fn call_openai_api(&self, body: ChatRequest) -> Result<String, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        debug!(model = %self.model_name, "Sending request to OpenAI");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("OpenAI API request failed: {}", e);
                ProviderError::unavailable(Provider::OpenAI, format!("request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("OpenAI API error: {} - {}", status, error_text);
            return Err(ProviderError::unavailable(
                Provider::OpenAI,
                format!("HTTP {} - {}", status, error_text),
            ));
        }

        let body = response.text().await.map_err(|e| {
            tracing::error!("Failed to read OpenAI response: {}", e);
            ProviderError::unavailable(Provider::OpenAI, format!("failed to read body: {}", e))
        })?;

        parse_chat_response(&body)
    }
}

/// First non-empty choice of a chat completion body.
fn parse_chat_response(body: &str) -> Result<String, ProviderError> {
    let response: ChatResponse = serde_json::from_str(body).map_err(|e| {
        tracing::error!("Failed to parse OpenAI response: {}", e);
        // A 200 that is not an API envelope came from a proxy or an outage page.
        ProviderError::unavailable(Provider::OpenAI, format!("unexpected envelope: {}", e))
    })?;

    response
        .choices
        .into_iter()
        .filter_map(|choice| choice.message.content)
        .find(|content| !content.trim().is_empty())
        .ok_or_else(|| ProviderError::unavailable(Provider::OpenAI, "empty completion"))
}

impl LLMClient for OpenAIClient {
    async fn generate(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        let body = self.build_request(&request);
        self.call_openai_api(body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OpenAIClient {
        OpenAIClient::new(ProviderCredentials {
            api_key: "sk-test".to_string(),
            model: "gpt-4o-mini".to_string(),
            base_url: None,
        })
    }

    #[test]
    fn test_request_carries_system_prompt_and_json_mode() {
        let request = CompletionRequest::new(Provider::OpenAI, "Dish: Salmon")
            .with_system_prompt("You are a nutritionist")
            .with_max_tokens(1024)
            .expecting_json();

        let body = serde_json::to_value(client().build_request(&request)).unwrap();

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "Dish: Salmon");
        assert_eq!(body["max_tokens"], 1024);
        assert_eq!(body["response_format"]["type"], "json_object");
    }

    #[test]
    fn test_plain_request_omits_optional_fields() {
        let request = CompletionRequest::new(Provider::OpenAI, "hello");
        let body = serde_json::to_value(client().build_request(&request)).unwrap();

        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert!(body.get("max_tokens").is_none());
        assert!(body.get("response_format").is_none());
    }

    #[test]
    fn test_parse_chat_response() {
        let body = r#"{
            "id": "chatcmpl-1",
            "choices": [
                { "index": 0, "message": { "role": "assistant", "content": "{\"items\": []}" } }
            ]
        }"#;

        assert_eq!(parse_chat_response(body).unwrap(), "{\"items\": []}");
    }

    #[test]
    fn test_empty_or_broken_response() {
        let empty = parse_chat_response(r#"{ "choices": [] }"#).unwrap_err();
        assert!(empty.is_unavailable());

        let null_content = parse_chat_response(
            r#"{ "choices": [{ "message": { "role": "assistant", "content": null } }] }"#,
        )
        .unwrap_err();
        assert!(null_content.is_unavailable());

        let broken = parse_chat_response("<html>gateway</html>").unwrap_err();
        assert!(broken.is_unavailable());
        assert!(broken.to_string().contains("unexpected envelope"));
        assert_eq!(broken.provider(), Provider::OpenAI);
    }
}
