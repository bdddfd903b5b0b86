use std::sync::Arc;

use menulens_core::{
    application::MenuLensService, domain::menu_analysis::value_objects::Provider,
};

use crate::args::Args;

#[derive(Clone)]
pub struct AppState {
    pub args: Arc<Args>,
    pub service: MenuLensService,
    /// Used when a request does not name a provider.
    pub default_provider: Provider,
    pub providers: Vec<Provider>,
}

impl AppState {
    pub fn new(
        args: Arc<Args>,
        service: MenuLensService,
        default_provider: Provider,
        providers: Vec<Provider>,
    ) -> Self {
        Self {
            args,
            service,
            default_provider,
            providers,
        }
    }
}
