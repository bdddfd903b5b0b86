use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::domain::menu_analysis::value_objects::Provider;

/// Stable failure codes surfaced by the analysis pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    MissingOcrText,
    MenuStructuringFailed,
    DishProcessingFailed,
    InvalidDish,
    DishNotFound,
    ProviderUnavailable,
    ProviderMalformedResponse,
    AnalysisFailed,
    Cancelled,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::MissingOcrText => "MISSING_OCR_TEXT",
            ErrorCode::MenuStructuringFailed => "MENU_STRUCTURING_FAILED",
            ErrorCode::DishProcessingFailed => "DISH_PROCESSING_FAILED",
            ErrorCode::InvalidDish => "INVALID_DISH",
            ErrorCode::DishNotFound => "DISH_NOT_FOUND",
            ErrorCode::ProviderUnavailable => "PROVIDER_UNAVAILABLE",
            ErrorCode::ProviderMalformedResponse => "PROVIDER_MALFORMED_RESPONSE",
            ErrorCode::AnalysisFailed => "ANALYSIS_FAILED",
            ErrorCode::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed failure returned across the pipeline boundary.
///
/// `message` is safe to log; `details` may carry raw provider text and is only
/// meant for developers.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize, ToSchema)]
#[error("{code}: {message}")]
pub struct Failure {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl Failure {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn missing_ocr_text() -> Self {
        Self::new(ErrorCode::MissingOcrText, "OCR text is empty")
    }

    pub fn menu_structuring_failed(details: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::MenuStructuringFailed,
            "No menu items could be extracted from the menu text",
        )
        .with_details(details)
    }

    pub fn analysis_failed(details: impl Into<String>) -> Self {
        Self::new(ErrorCode::AnalysisFailed, "Menu analysis failed unexpectedly")
            .with_details(details)
    }

    pub fn cancelled() -> Self {
        Self::new(ErrorCode::Cancelled, "Menu analysis was cancelled")
    }
}

/// Errors reported by the provider gateway for a single call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("{provider} is unavailable: {reason}")]
    Unavailable { provider: Provider, reason: String },

    #[error("{provider} returned a malformed response: {reason}")]
    MalformedResponse { provider: Provider, reason: String },
}

impl ProviderError {
    pub fn unavailable(provider: Provider, reason: impl Into<String>) -> Self {
        ProviderError::Unavailable {
            provider,
            reason: reason.into(),
        }
    }

    pub fn malformed(provider: Provider, reason: impl Into<String>) -> Self {
        ProviderError::MalformedResponse {
            provider,
            reason: reason.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ProviderError::Unavailable { .. } => ErrorCode::ProviderUnavailable,
            ProviderError::MalformedResponse { .. } => ErrorCode::ProviderMalformedResponse,
        }
    }

    pub fn provider(&self) -> Provider {
        match self {
            ProviderError::Unavailable { provider, .. }
            | ProviderError::MalformedResponse { provider, .. } => *provider,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, ProviderError::Unavailable { .. })
    }
}

impl From<ProviderError> for Failure {
    fn from(error: ProviderError) -> Self {
        let message = match &error {
            ProviderError::Unavailable { .. } => "The analysis provider is unavailable",
            ProviderError::MalformedResponse { .. } => {
                "The analysis provider returned an unreadable response"
            }
        };
        Failure::new(error.code(), message).with_details(error.to_string())
    }
}

/// Failure scoped to one dish. The orchestrator decides whether it aborts the
/// request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DishError {
    #[error("failed to analyze dish '{dish}': {source}")]
    ProcessingFailed {
        dish: String,
        #[source]
        source: ProviderError,
    },

    #[error("analysis of dish '{dish}' is invalid: {reason}")]
    InvalidDish { dish: String, reason: String },
}

impl DishError {
    pub fn code(&self) -> ErrorCode {
        match self {
            DishError::ProcessingFailed { .. } => ErrorCode::DishProcessingFailed,
            DishError::InvalidDish { .. } => ErrorCode::InvalidDish,
        }
    }

    pub fn dish(&self) -> &str {
        match self {
            DishError::ProcessingFailed { dish, .. } | DishError::InvalidDish { dish, .. } => dish,
        }
    }

    /// True when the provider could not be reached, as opposed to answering badly.
    pub fn is_provider_unavailable(&self) -> bool {
        matches!(self, DishError::ProcessingFailed { source, .. } if source.is_unavailable())
    }
}

impl From<DishError> for Failure {
    fn from(error: DishError) -> Self {
        let message = match &error {
            DishError::ProcessingFailed { .. } => "A dish could not be analyzed",
            DishError::InvalidDish { .. } => "A dish analysis was incomplete",
        };
        Failure::new(error.code(), message).with_details(error.to_string())
    }
}
