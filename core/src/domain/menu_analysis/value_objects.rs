use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::menu_analysis::entities::{ErrorCode, OcrResult, UserProfile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Provider {
    #[serde(rename = "OPENAI")]
    OpenAI,
    #[serde(rename = "ANTHROPIC")]
    Anthropic,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAI => "OPENAI",
            Provider::Anthropic => "ANTHROPIC",
        }
    }

    pub fn alternate(&self) -> Self {
        match self {
            Provider::OpenAI => Provider::Anthropic,
            Provider::Anthropic => Provider::OpenAI,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAI),
            "anthropic" => Ok(Provider::Anthropic),
            other => Err(format!("unknown provider '{}'", other)),
        }
    }
}

/// One call to the provider gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub max_tokens: Option<u32>,
    pub system_prompt: Option<String>,
    pub want_json: bool,
    pub provider: Provider,
}

impl CompletionRequest {
    pub fn new(provider: Provider, prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens: None,
            system_prompt: None,
            want_json: false,
            provider,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn expecting_json(mut self) -> Self {
        self.want_json = true;
        self
    }
}

/// Provider reply after backend-specific envelopes have been stripped.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderPayload {
    Text(String),
    Json(serde_json::Value),
}

#[derive(Debug, Clone)]
pub struct AnalyzeMenuInput {
    pub ocr_result: OcrResult,
    pub user_profile: UserProfile,
    pub provider: Provider,
}

/// Orchestrator states. `Failed` is terminal and reachable from any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Structuring,
    Analyzing,
    Aggregating,
    Done,
    Failed(ErrorCode),
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed(_))
    }
}
