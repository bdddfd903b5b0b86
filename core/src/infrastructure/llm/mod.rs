pub mod anthropic_client;
pub mod openai_client;
pub mod provider_gateway;

pub use anthropic_client::AnthropicClient;
pub use openai_client::OpenAIClient;
pub use provider_gateway::HttpProviderGateway;
