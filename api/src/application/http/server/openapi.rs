use crate::application::http::{health::HealthApiDoc, menu_analysis::router::MenuAnalysisApiDoc};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "MenuLens API"
    ),
    nest(
        (path = "/menu-analysis", api = MenuAnalysisApiDoc),
        (path = "/health", api = HealthApiDoc),
    )
)]
pub struct ApiDoc;
