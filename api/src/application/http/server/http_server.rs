use std::sync::{Arc, OnceLock};

use crate::application::http::health::health_routes;
use crate::application::http::menu_analysis::router::menu_analysis_routes;
use crate::application::http::server::app_state::AppState;
use crate::application::http::server::openapi::ApiDoc;
use crate::args::Args;

use anyhow::Context;
use axum::Router;
use axum::http::header::{ACCEPT, CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum_prometheus::PrometheusMetricLayer;
use axum_prometheus::metrics_exporter_prometheus::PrometheusHandle;
use menulens_core::{
    application::{create_service, default_provider},
    domain::{common::MenuLensConfig, menu_analysis::value_objects::Provider},
};
use tower_http::cors::CorsLayer;
use tracing::{debug, info_span};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// The Prometheus recorder is process-global and can only be installed once.
static METRIC_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn metric_layer() -> (PrometheusMetricLayer<'static>, PrometheusHandle) {
    let mut installed = None;
    let handle = METRIC_HANDLE
        .get_or_init(|| {
            let (layer, handle) = PrometheusMetricLayer::pair();
            installed = Some(layer);
            handle
        })
        .clone();

    (installed.unwrap_or_else(PrometheusMetricLayer::new), handle)
}

pub async fn state(args: Arc<Args>) -> Result<AppState, anyhow::Error> {
    let menulens_config: MenuLensConfig = MenuLensConfig::from(args.as_ref().clone());

    let providers: Vec<Provider> = [
        (Provider::OpenAI, menulens_config.llm.openai.is_some()),
        (Provider::Anthropic, menulens_config.llm.anthropic.is_some()),
    ]
    .into_iter()
    .filter_map(|(provider, configured)| configured.then_some(provider))
    .collect();
    let default_provider = default_provider(&menulens_config);

    let service = create_service(menulens_config).await?;

    Ok(AppState::new(args, service, default_provider, providers))
}

///  Returns the [`Router`] of this application.
pub fn router(state: AppState) -> Result<Router, anyhow::Error> {
    let trace_layer = tower_http::trace::TraceLayer::new_for_http().make_span_with(
        |request: &axum::extract::Request| {
            let uri: String = request.uri().to_string();
            info_span!("http_request", method = ?request.method(), uri)
        },
    );

    let allowed_origins = state
        .args
        .server
        .allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .with_context(|| format!("invalid allowed origin '{}'", origin))
        })
        .collect::<Result<Vec<HeaderValue>, _>>()?;

    debug!("Allowed origins: {:?}", allowed_origins);

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_origin(allowed_origins)
        .allow_headers([CONTENT_TYPE, CONTENT_LENGTH, ACCEPT]);

    let (prometheus_layer, metric_handle) = metric_layer();

    let mut openapi = ApiDoc::openapi();
    let mut paths = openapi.paths.clone();
    paths.paths = openapi
        .paths
        .paths
        .into_iter()
        .map(|(path, item)| (format!("{}{path}", state.args.server.root_path), item))
        .collect();
    openapi.paths = paths;

    let root_path = state.args.server.root_path.clone();
    let api_docs_url = format!("{}/api-docs/openapi.json", root_path);

    let router = axum::Router::new()
        .merge(SwaggerUi::new(format!("{}/swagger-ui", root_path)).url(api_docs_url, openapi))
        .merge(menu_analysis_routes(state.clone()))
        .merge(health_routes(&root_path))
        .route(
            &format!("{}/metrics", root_path),
            get(|| async move { metric_handle.render() }),
        )
        .layer(trace_layer)
        .layer(cors)
        .layer(prometheus_layer)
        .with_state(state);
    Ok(router)
}
