use std::{fmt, sync::Arc};

use tokio::sync::Semaphore;

use crate::domain::menu_analysis::{policies::AnalysisPolicy, ports::ProviderGateway};

/// Application service. Holds the provider gateway plus the only state shared
/// across requests: the permit pool bounding concurrent dish analyses.
pub struct Service<G>
where
    G: ProviderGateway,
{
    pub(crate) provider_gateway: Arc<G>,
    pub(crate) policy: AnalysisPolicy,
    pub(crate) dish_permits: Arc<Semaphore>,
}

impl<G> Clone for Service<G>
where
    G: ProviderGateway,
{
    fn clone(&self) -> Self {
        Self {
            provider_gateway: Arc::clone(&self.provider_gateway),
            policy: self.policy.clone(),
            dish_permits: Arc::clone(&self.dish_permits),
        }
    }
}

impl<G> fmt::Debug for Service<G>
where
    G: ProviderGateway,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Service")
            .field("policy", &self.policy)
            .field("available_dish_permits", &self.dish_permits.available_permits())
            .finish_non_exhaustive()
    }
}

impl<G> Service<G>
where
    G: ProviderGateway,
{
    pub fn new(provider_gateway: G, policy: AnalysisPolicy, max_concurrent_dishes: usize) -> Self {
        Self {
            provider_gateway: Arc::new(provider_gateway),
            policy,
            dish_permits: Arc::new(Semaphore::new(
                max_concurrent_dishes.clamp(1, Semaphore::MAX_PERMITS),
            )),
        }
    }
}
