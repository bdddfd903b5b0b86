use menulens_core::domain::menu_analysis::value_objects::Provider;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeMenuRequest {
    /// Raw text from the OCR step. Blank text is rejected by the pipeline.
    #[validate(length(max = 20000, message = "ocrText must be at most 20000 characters"))]
    pub ocr_text: String,

    #[validate(range(min = 0.0, max = 1.0, message = "confidence must be between 0 and 1"))]
    pub confidence: Option<f32>,

    #[serde(default)]
    #[validate(length(max = 20, message = "at most 20 goals are allowed"))]
    pub goals: Vec<String>,

    #[serde(default)]
    #[validate(length(max = 50, message = "at most 50 restrictions are allowed"))]
    pub restrictions: Vec<String>,

    #[serde(default)]
    #[validate(length(max = 50, message = "at most 50 recent patterns are allowed"))]
    pub recent_patterns: Vec<String>,

    /// Defaults to OPENAI when configured, otherwise ANTHROPIC.
    pub provider: Option<Provider>,
}
