use super::handlers::analyze_menu::{__path_analyze_menu, analyze_menu};
use crate::application::http::server::app_state::AppState;
use axum::{Router, routing::post};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(paths(analyze_menu))]
pub struct MenuAnalysisApiDoc;

pub fn menu_analysis_routes(state: AppState) -> Router<AppState> {
    Router::new().route(
        &format!("{}/menu-analysis", state.args.server.root_path),
        post(analyze_menu),
    )
}
