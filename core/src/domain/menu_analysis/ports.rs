use std::future::Future;

use crate::domain::menu_analysis::{
    entities::{AnalysisResults, Failure, ProviderError},
    value_objects::{AnalyzeMenuInput, CompletionRequest, Provider, ProviderPayload},
};

/// Uniform entry point to the AI backends used by every analysis stage.
///
/// Implementations enforce the per-call timeout and normalize both vendors'
/// replies into a [`ProviderPayload`]. They never retry.
#[cfg_attr(test, mockall::automock)]
pub trait ProviderGateway: Send + Sync {
    fn complete(
        &self,
        request: CompletionRequest,
    ) -> impl Future<Output = Result<ProviderPayload, ProviderError>> + Send;

    /// Whether a backend is configured for the given provider.
    fn is_configured(&self, provider: Provider) -> bool;
}

/// A single vendor backend (OpenAI, Anthropic) returning raw completion text.
#[cfg_attr(test, mockall::automock)]
pub trait LLMClient: Send + Sync {
    fn generate(
        &self,
        request: CompletionRequest,
    ) -> impl Future<Output = Result<String, ProviderError>> + Send;
}

/// Menu analysis use case consumed by the HTTP layer.
pub trait MenuAnalysisService: Send + Sync {
    fn analyze(
        &self,
        input: AnalyzeMenuInput,
    ) -> impl Future<Output = Result<AnalysisResults, Failure>> + Send;

    /// Like [`MenuAnalysisService::analyze`], but gives up with `CANCELLED` as
    /// soon as `cancellation` resolves. No partial result is ever returned.
    fn analyze_with_cancellation<C>(
        &self,
        input: AnalyzeMenuInput,
        cancellation: C,
    ) -> impl Future<Output = Result<AnalysisResults, Failure>> + Send
    where
        C: Future<Output = ()> + Send;
}
