use std::{any::Any, future::Future, panic::AssertUnwindSafe};

use futures::{FutureExt, future::join_all};
use tracing::{debug, error, info, instrument, warn};

use crate::domain::{
    common::{generate_timestamp, generate_uuid_v7, services::Service},
    menu_analysis::{
        aggregator::aggregate,
        analyzer::analyze_dish,
        entities::{
            AnalysisResults, DishAnalysis, DishError, ErrorCode, Failure, RawMenuItem, UserProfile,
        },
        normalizer::normalize_ocr_text,
        policies::PartialFailurePolicy,
        ports::{MenuAnalysisService, ProviderGateway},
        structurer::structure_menu,
        value_objects::{AnalyzeMenuInput, PipelineState, Provider},
    },
};

/// Tracks the orchestrator state for one request.
#[derive(Debug)]
struct PipelineRun {
    state: PipelineState,
}

impl PipelineRun {
    fn new() -> Self {
        Self {
            state: PipelineState::Idle,
        }
    }

    fn advance(&mut self, next: PipelineState) {
        debug_assert!(!self.state.is_terminal(), "pipeline already finished");
        debug!(from = ?self.state, to = ?next, "Pipeline transition");
        self.state = next;
    }
}

impl<G> MenuAnalysisService for Service<G>
where
    G: ProviderGateway,
{
    async fn analyze(&self, input: AnalyzeMenuInput) -> Result<AnalysisResults, Failure> {
        match AssertUnwindSafe(self.run_pipeline(input)).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => {
                let reason = panic_message(panic.as_ref());
                error!(reason = %reason, "Menu analysis panicked");
                Err(Failure::analysis_failed(reason))
            }
        }
    }

    async fn analyze_with_cancellation<C>(
        &self,
        input: AnalyzeMenuInput,
        cancellation: C,
    ) -> Result<AnalysisResults, Failure>
    where
        C: Future<Output = ()> + Send,
    {
        tokio::select! {
            biased;
            _ = cancellation => {
                warn!("Menu analysis cancelled by caller");
                Err(Failure::cancelled())
            }
            result = self.analyze(input) => result,
        }
    }
}

impl<G> Service<G>
where
    G: ProviderGateway,
{
    #[instrument(skip_all, fields(request_id = %generate_uuid_v7(), provider = %input.provider))]
    async fn run_pipeline(&self, input: AnalyzeMenuInput) -> Result<AnalysisResults, Failure> {
        let mut run = PipelineRun::new();
        let result = self.execute(&input, &mut run).await;

        match &result {
            Ok(results) => {
                run.advance(PipelineState::Done);
                info!(
                    dish_count = results.dishes.len(),
                    average_health_score = results.average_health_score,
                    "Menu analysis completed"
                );
            }
            Err(failure) => {
                run.advance(PipelineState::Failed(failure.code));
                warn!(
                    code = %failure.code,
                    details = failure.details.as_deref().unwrap_or_default(),
                    "Menu analysis failed"
                );
            }
        }

        result
    }

    async fn execute(
        &self,
        input: &AnalyzeMenuInput,
        run: &mut PipelineRun,
    ) -> Result<AnalysisResults, Failure> {
        let menu_text = normalize_ocr_text(&input.ocr_result)?;

        run.advance(PipelineState::Structuring);
        let (items, provider) = self
            .structure_with_fallback(&menu_text, &input.user_profile, input.provider)
            .await?;

        run.advance(PipelineState::Analyzing);
        let outcomes = self
            .analyze_dishes(&items, &input.user_profile, provider)
            .await?;
        let dishes = apply_partial_failure_policy(self.policy.partial_failure, outcomes)?;

        run.advance(PipelineState::Aggregating);
        let (timestamp, _) = generate_timestamp();
        aggregate(dishes, timestamp)
    }

    /// Structure the menu, retrying once on the alternate provider when the
    /// requested one is unavailable. Returns the provider that answered.
    async fn structure_with_fallback(
        &self,
        menu_text: &str,
        profile: &UserProfile,
        provider: Provider,
    ) -> Result<(Vec<RawMenuItem>, Provider), Failure> {
        let gateway = self.provider_gateway.as_ref();

        match structure_menu(gateway, menu_text, profile, provider).await {
            Ok(items) => Ok((items, provider)),
            Err(failure) if failure.code == ErrorCode::ProviderUnavailable => {
                let alternate = provider.alternate();
                if !self.policy.retry.structuring_fallback || !gateway.is_configured(alternate) {
                    return Err(failure);
                }

                warn!(
                    provider = %provider,
                    alternate = %alternate,
                    details = failure.details.as_deref().unwrap_or_default(),
                    "Structuring provider unavailable, retrying with alternate"
                );
                let items = structure_menu(gateway, menu_text, profile, alternate).await?;
                Ok((items, alternate))
            }
            Err(failure) => Err(failure),
        }
    }

    /// Analyze every item concurrently, bounded by the shared permit pool.
    /// Outcomes are returned in menu order.
    async fn analyze_dishes(
        &self,
        items: &[RawMenuItem],
        profile: &UserProfile,
        provider: Provider,
    ) -> Result<Vec<Result<DishAnalysis, DishError>>, Failure> {
        let tasks = items.iter().map(|item| async move {
            let _permit = self.dish_permits.acquire().await.map_err(|e| {
                Failure::analysis_failed(format!("dish permit pool closed: {}", e))
            })?;
            Ok::<_, Failure>(self.analyze_dish_with_fallback(item, profile, provider).await)
        });

        join_all(tasks).await.into_iter().collect()
    }

    async fn analyze_dish_with_fallback(
        &self,
        item: &RawMenuItem,
        profile: &UserProfile,
        provider: Provider,
    ) -> Result<DishAnalysis, DishError> {
        let gateway = self.provider_gateway.as_ref();

        match analyze_dish(gateway, item, profile, provider).await {
            Err(error)
                if error.is_provider_unavailable()
                    && self.policy.retry.dish_fallback
                    && gateway.is_configured(provider.alternate()) =>
            {
                warn!(
                    dish = %item.name,
                    alternate = %provider.alternate(),
                    "Dish provider unavailable, retrying with alternate"
                );
                analyze_dish(gateway, item, profile, provider.alternate()).await
            }
            outcome => outcome,
        }
    }
}

/// Keep successful dishes according to the configured policy.
pub fn apply_partial_failure_policy(
    policy: PartialFailurePolicy,
    outcomes: Vec<Result<DishAnalysis, DishError>>,
) -> Result<Vec<DishAnalysis>, Failure> {
    let total = outcomes.len();
    let mut dishes = Vec::with_capacity(total);
    let mut failures = Vec::new();

    for outcome in outcomes {
        match outcome {
            Ok(dish) => dishes.push(dish),
            Err(error) if policy == PartialFailurePolicy::AbortOnAny => {
                return Err(error.into());
            }
            Err(error) => {
                warn!(
                    dish = %error.dish(),
                    code = %error.code(),
                    error = %error,
                    "Dish excluded from results"
                );
                failures.push(error.to_string());
            }
        }
    }

    if dishes.is_empty() {
        return Err(Failure::new(
            ErrorCode::DishProcessingFailed,
            "None of the dishes could be analyzed",
        )
        .with_details(failures.join("; ")));
    }

    if !failures.is_empty() {
        info!(
            analyzed = dishes.len(),
            failed = failures.len(),
            total,
            "Continuing with partially analyzed menu"
        );
    }

    Ok(dishes)
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
