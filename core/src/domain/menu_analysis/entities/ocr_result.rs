use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::common::generate_timestamp;

/// Text extracted from a menu image by the external OCR service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OcrResult {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    pub processed_at: DateTime<Utc>,
}

impl OcrResult {
    pub fn new(text: impl Into<String>, confidence: Option<f32>) -> Self {
        let (now, _) = generate_timestamp();

        Self {
            text: text.into(),
            confidence,
            processed_at: now,
        }
    }
}
