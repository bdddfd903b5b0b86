use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use menulens_core::domain::menu_analysis::entities::{ErrorCode, Failure};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;
use utoipa::ToSchema;
use validator::Validate;

/// Non-standard "client closed request".
const CLIENT_CLOSED_REQUEST: u16 = 499;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    InternalServerError(String),

    #[error(transparent)]
    Analysis(Failure),
}

#[derive(Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Wrap a pipeline failure, keeping raw details only when exposed.
    pub fn analysis(mut failure: Failure, expose_details: bool) -> Self {
        if !expose_details {
            failure.details = None;
        }
        ApiError::Analysis(failure)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Analysis(failure) => status_for(failure.code),
        }
    }

    fn body(self) -> ApiErrorResponse {
        match self {
            ApiError::BadRequest(message) => ApiErrorResponse {
                code: "INVALID_REQUEST".to_string(),
                message,
                details: None,
            },
            ApiError::InternalServerError(message) => ApiErrorResponse {
                code: ErrorCode::AnalysisFailed.to_string(),
                message,
                details: None,
            },
            ApiError::Analysis(failure) => ApiErrorResponse {
                code: failure.code.to_string(),
                message: failure.message,
                details: failure.details,
            },
        }
    }
}

pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::MissingOcrText => StatusCode::BAD_REQUEST,
        ErrorCode::MenuStructuringFailed => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCode::DishProcessingFailed
        | ErrorCode::InvalidDish
        | ErrorCode::ProviderMalformedResponse => StatusCode::BAD_GATEWAY,
        ErrorCode::ProviderUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::DishNotFound | ErrorCode::AnalysisFailed => StatusCode::INTERNAL_SERVER_ERROR,
        ErrorCode::Cancelled => StatusCode::from_u16(CLIENT_CLOSED_REQUEST)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = %status, error = %self, "Request failed");
        } else {
            tracing::debug!(status = %status, error = %self, "Request rejected");
        }

        (status, Json(self.body())).into_response()
    }
}

/// JSON body extractor that runs `validator` rules before the handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidateJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

        value
            .validate()
            .map_err(|e| ApiError::BadRequest(format!("Invalid request: {}", e)))?;

        Ok(ValidateJson(value))
    }
}
