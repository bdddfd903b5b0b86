use tracing::info;

use crate::{
    domain::{
        common::{MenuLensConfig, entities::app_errors::CoreError, services::Service},
        menu_analysis::value_objects::Provider,
    },
    infrastructure::llm::{AnthropicClient, HttpProviderGateway, OpenAIClient},
};

pub type MenuLensGateway = HttpProviderGateway<OpenAIClient, AnthropicClient>;
pub type MenuLensService = Service<MenuLensGateway>;

pub async fn create_service(config: MenuLensConfig) -> Result<MenuLensService, CoreError> {
    if config.llm.openai.is_none() && config.llm.anthropic.is_none() {
        return Err(CoreError::InvalidConfiguration(
            "at least one of OpenAI or Anthropic must have an API key".to_string(),
        ));
    }

    if config.llm.request_timeout.is_zero() {
        return Err(CoreError::InvalidConfiguration(
            "provider request timeout must be greater than zero".to_string(),
        ));
    }

    let openai = config.llm.openai.map(OpenAIClient::new);
    let anthropic = config.llm.anthropic.map(AnthropicClient::new);

    info!(
        openai = openai.is_some(),
        anthropic = anthropic.is_some(),
        max_concurrent_dishes = config.pipeline.max_concurrent_dishes,
        partial_failure = ?config.pipeline.policy.partial_failure,
        "Creating menu analysis service"
    );

    let gateway = HttpProviderGateway::new(openai, anthropic, config.llm.request_timeout);

    Ok(Service::new(
        gateway,
        config.pipeline.policy,
        config.pipeline.max_concurrent_dishes,
    ))
}

/// Provider used when a request does not name one.
pub fn default_provider(config: &MenuLensConfig) -> Provider {
    if config.llm.openai.is_some() {
        Provider::OpenAI
    } else {
        Provider::Anthropic
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        common::{LLMConfig, PipelineConfig, ProviderCredentials},
        menu_analysis::ports::ProviderGateway,
    };

    fn credentials() -> ProviderCredentials {
        ProviderCredentials {
            api_key: "key".to_string(),
            model: "model".to_string(),
            base_url: None,
        }
    }

    fn config(openai: bool, anthropic: bool) -> MenuLensConfig {
        MenuLensConfig {
            llm: LLMConfig {
                openai: openai.then(credentials),
                anthropic: anthropic.then(credentials),
                request_timeout: LLMConfig::DEFAULT_TIMEOUT,
            },
            pipeline: PipelineConfig::default(),
        }
    }

    #[tokio::test]
    async fn test_requires_a_provider() {
        let err = create_service(config(false, false)).await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfiguration(_)));
    }

    #[tokio::test]
    async fn test_single_provider_is_enough() {
        let service = create_service(config(false, true)).await.unwrap();
        assert!(service.provider_gateway.is_configured(Provider::Anthropic));
        assert!(!service.provider_gateway.is_configured(Provider::OpenAI));
    }

    #[test]
    fn test_default_provider_prefers_openai() {
        assert_eq!(default_provider(&config(true, true)), Provider::OpenAI);
        assert_eq!(default_provider(&config(false, true)), Provider::Anthropic);
    }
}
