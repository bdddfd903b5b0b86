use axum::extract::State;
use menulens_core::domain::menu_analysis::{
    entities::{AnalysisResults, OcrResult, UserProfile},
    ports::MenuAnalysisService,
    value_objects::AnalyzeMenuInput,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::http::{
    menu_analysis::validators::AnalyzeMenuRequest,
    server::{
        api_entities::{
            api_error::{ApiError, ApiErrorResponse, ValidateJson},
            response::Response,
        },
        app_state::AppState,
    },
};

#[derive(Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AnalyzeMenuResponse {
    pub data: AnalysisResults,
}

#[utoipa::path(
    post,
    path = "",
    tag = "menu-analysis",
    summary = "Analyze a menu",
    description = "Structures OCR menu text into dishes and scores each dish against the user's goals and restrictions",
    responses(
        (status = 200, body = AnalyzeMenuResponse),
        (status = 400, description = "Missing OCR text or invalid request", body = ApiErrorResponse),
        (status = 422, description = "No menu items could be extracted", body = ApiErrorResponse),
        (status = 502, description = "Dish analysis failed", body = ApiErrorResponse),
        (status = 503, description = "Provider unavailable", body = ApiErrorResponse)
    ),
    request_body = AnalyzeMenuRequest
)]
pub async fn analyze_menu(
    State(state): State<AppState>,
    ValidateJson(payload): ValidateJson<AnalyzeMenuRequest>,
) -> Result<Response<AnalyzeMenuResponse>, ApiError> {
    let provider = payload.provider.unwrap_or(state.default_provider);

    let input = AnalyzeMenuInput {
        ocr_result: OcrResult::new(payload.ocr_text, payload.confidence),
        user_profile: UserProfile::new(
            payload.goals,
            payload.restrictions,
            payload.recent_patterns,
        ),
        provider,
    };

    // Axum drops this future when the client disconnects, which cancels every
    // in-flight provider call with it.
    let results = state
        .service
        .analyze(input)
        .await
        .map_err(|failure| ApiError::analysis(failure, state.args.server.expose_error_details))?;

    Ok(Response::OK(AnalyzeMenuResponse { data: results }))
}
