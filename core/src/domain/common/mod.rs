use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::{NoContext, Timestamp, Uuid};

use crate::domain::menu_analysis::policies::AnalysisPolicy;

pub mod entities;
pub mod services;

#[derive(Clone, Debug)]
pub struct MenuLensConfig {
    pub llm: LLMConfig,
    pub pipeline: PipelineConfig,
}

#[derive(Clone, Debug)]
pub struct LLMConfig {
    pub openai: Option<ProviderCredentials>,
    pub anthropic: Option<ProviderCredentials>,
    pub request_timeout: Duration,
}

#[derive(Clone, Debug)]
pub struct ProviderCredentials {
    pub api_key: String,
    pub model: String,
    /// Overrides the vendor endpoint, e.g. for a proxy.
    pub base_url: Option<String>,
}

#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub max_concurrent_dishes: usize,
    pub policy: AnalysisPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_dishes: 4,
            policy: AnalysisPolicy::default(),
        }
    }
}

impl LLMConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
}

pub fn generate_timestamp() -> (DateTime<Utc>, Timestamp) {
    let now = Utc::now();
    let seconds = now.timestamp().try_into().unwrap_or(0);
    let timestamp = Timestamp::from_unix(NoContext, seconds, 0);

    (now, timestamp)
}

pub fn generate_uuid_v7() -> Uuid {
    let (_, timestamp) = generate_timestamp();
    Uuid::new_v7(timestamp)
}
