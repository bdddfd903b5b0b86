use std::time::Duration;

use tracing::{debug, instrument, warn};

use crate::domain::menu_analysis::{
    entities::ProviderError,
    helpers::extract_json,
    ports::{LLMClient, ProviderGateway},
    value_objects::{CompletionRequest, Provider, ProviderPayload},
};

/// Dispatches completion requests to the configured vendor backends.
#[derive(Debug, Clone)]
pub struct HttpProviderGateway<O, A>
where
    O: LLMClient,
    A: LLMClient,
{
    openai: Option<O>,
    anthropic: Option<A>,
    request_timeout: Duration,
}

impl<O, A> HttpProviderGateway<O, A>
where
    O: LLMClient,
    A: LLMClient,
{
    pub fn new(openai: Option<O>, anthropic: Option<A>, request_timeout: Duration) -> Self {
        Self {
            openai,
            anthropic,
            request_timeout,
        }
    }

    async fn generate(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        let provider = request.provider;
        match provider {
            Provider::OpenAI => match &self.openai {
                Some(client) => client.generate(request).await,
                None => Err(not_configured(provider)),
            },
            Provider::Anthropic => match &self.anthropic {
                Some(client) => client.generate(request).await,
                None => Err(not_configured(provider)),
            },
        }
    }
}

fn not_configured(provider: Provider) -> ProviderError {
    ProviderError::unavailable(provider, "no API key configured")
}

impl<O, A> ProviderGateway for HttpProviderGateway<O, A>
where
    O: LLMClient,
    A: LLMClient,
{
    #[instrument(skip_all, fields(provider = %request.provider, want_json = request.want_json))]
    async fn complete(&self, request: CompletionRequest) -> Result<ProviderPayload, ProviderError> {
        let provider = request.provider;
        let want_json = request.want_json;

        let text = tokio::time::timeout(self.request_timeout, self.generate(request))
            .await
            .map_err(|_| {
                warn!(timeout = ?self.request_timeout, "Provider call timed out");
                ProviderError::unavailable(
                    provider,
                    format!("timed out after {:?}", self.request_timeout),
                )
            })??;

        debug!(response_len = text.len(), "Provider replied");

        if !want_json {
            return Ok(ProviderPayload::Text(text));
        }

        extract_json(&text).map(ProviderPayload::Json).ok_or_else(|| {
            ProviderError::malformed(provider, "reply did not contain a JSON document")
        })
    }

    fn is_configured(&self, provider: Provider) -> bool {
        match provider {
            Provider::OpenAI => self.openai.is_some(),
            Provider::Anthropic => self.anthropic.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::future::BoxFuture;
    use serde_json::json;

    use super::*;
    use crate::domain::menu_analysis::ports::MockLLMClient;

    type Gateway = HttpProviderGateway<MockLLMClient, MockLLMClient>;

    fn text(body: &str) -> BoxFuture<'static, Result<String, ProviderError>> {
        let body = body.to_string();
        Box::pin(async move { Ok(body) })
    }

    fn client_replying(body: &'static str) -> MockLLMClient {
        let mut client = MockLLMClient::new();
        client.expect_generate().times(1).returning(move |_| text(body));
        client
    }

    fn unused_client() -> MockLLMClient {
        let mut client = MockLLMClient::new();
        client.expect_generate().never();
        client
    }

    #[tokio::test]
    async fn test_routes_to_requested_backend() {
        let gateway: Gateway = HttpProviderGateway::new(
            Some(unused_client()),
            Some(client_replying("plain words")),
            Duration::from_secs(5),
        );

        let payload = gateway
            .complete(CompletionRequest::new(Provider::Anthropic, "hello"))
            .await
            .unwrap();

        assert_eq!(payload, ProviderPayload::Text("plain words".to_string()));
    }

    #[tokio::test]
    async fn test_json_replies_are_unwrapped() {
        let gateway: Gateway = HttpProviderGateway::new(
            Some(client_replying("Sure!\n```json\n{\"items\": [{\"name\": \"Soup\"}]}\n```")),
            None,
            Duration::from_secs(5),
        );

        let payload = gateway
            .complete(CompletionRequest::new(Provider::OpenAI, "menu").expecting_json())
            .await
            .unwrap();

        assert_eq!(
            payload,
            ProviderPayload::Json(json!({ "items": [{ "name": "Soup" }] }))
        );
    }

    #[tokio::test]
    async fn test_unparseable_json_is_malformed() {
        let gateway: Gateway = HttpProviderGateway::new(
            Some(client_replying("I could not read the menu")),
            None,
            Duration::from_secs(5),
        );

        let err = gateway
            .complete(CompletionRequest::new(Provider::OpenAI, "menu").expecting_json())
            .await
            .unwrap_err();

        assert!(!err.is_unavailable());
        assert_eq!(err.provider(), Provider::OpenAI);
    }

    #[tokio::test]
    async fn test_missing_backend_is_unavailable() {
        let gateway: Gateway =
            HttpProviderGateway::new(Some(unused_client()), None, Duration::from_secs(5));

        assert!(gateway.is_configured(Provider::OpenAI));
        assert!(!gateway.is_configured(Provider::Anthropic));

        let err = gateway
            .complete(CompletionRequest::new(Provider::Anthropic, "hello"))
            .await
            .unwrap_err();
        assert!(err.is_unavailable());
    }

    #[tokio::test]
    async fn test_backend_errors_pass_through() {
        let mut client = MockLLMClient::new();
        client.expect_generate().times(1).returning(|request| {
            let err = ProviderError::unavailable(request.provider, "HTTP 503");
            Box::pin(async move { Err(err) })
        });
        let gateway: Gateway = HttpProviderGateway::new(Some(client), None, Duration::from_secs(5));

        let err = gateway
            .complete(CompletionRequest::new(Provider::OpenAI, "hello"))
            .await
            .unwrap_err();

        assert_eq!(err, ProviderError::unavailable(Provider::OpenAI, "HTTP 503"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_backend_times_out() {
        let mut client = MockLLMClient::new();
        client.expect_generate().times(1).returning(|_| {
            Box::pin(async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok("too late".to_string())
            })
        });
        let gateway: Gateway =
            HttpProviderGateway::new(None, Some(client), Duration::from_secs(30));

        let err = gateway
            .complete(CompletionRequest::new(Provider::Anthropic, "hello"))
            .await
            .unwrap_err();

        assert!(err.is_unavailable());
        assert!(err.to_string().contains("timed out after 30s"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sub_second_timeout_is_reported_precisely() {
        let mut client = MockLLMClient::new();
        client.expect_generate().times(1).returning(|_| {
            Box::pin(async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok("too late".to_string())
            })
        });
        let gateway: Gateway =
            HttpProviderGateway::new(Some(client), None, Duration::from_millis(250));

        let err = gateway
            .complete(CompletionRequest::new(Provider::OpenAI, "hello"))
            .await
            .unwrap_err();

        assert!(err.is_unavailable());
        assert!(err.to_string().contains("timed out after 250ms"));
    }
}
