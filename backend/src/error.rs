//! Error handling for the Maritime Weather Assistant
//!
//! Provides consistent error responses in English and Korean

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::GridError;
use thiserror::Error;

use crate::external::weather::ProviderError;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_ko: String,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // External service errors
    #[error("Weather service unavailable")]
    WeatherServiceUnavailable,

    #[error("Weather provider error: {0}")]
    WeatherProvider(#[from] ProviderError),

    #[error("Language model error: {0}")]
    LanguageModel(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_ko: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl From<GridError> for AppError {
    fn from(err: GridError) -> Self {
        let message_ko = match &err {
            GridError::InvalidStep { .. } => "격자 간격은 0보다 커야 합니다",
            GridError::InvalidRadius(_) => "검색 반경이 올바르지 않습니다",
            GridError::InvalidCoordinate { .. } => "좌표가 허용 범위를 벗어났습니다",
            GridError::WrappingWindow { .. } => "경도 범위가 날짜변경선을 넘습니다",
            GridError::TooManyCells { .. } => "조회할 격자 수가 너무 많습니다",
        };
        AppError::Validation {
            field: err.field().to_string(),
            message: err.to_string(),
            message_ko: message_ko.to_string(),
        }
    }
}

impl AppError {
    fn status_and_detail(&self) -> (StatusCode, ErrorDetail) {
        match self {
            AppError::Validation {
                field,
                message,
                message_ko,
            } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message_en: message.clone(),
                    message_ko: message_ko.clone(),
                    field: Some(field.clone()),
                },
            ),
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message_en: msg.clone(),
                    message_ko: format!("입력값이 올바르지 않습니다: {}", msg),
                    field: None,
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message_en: format!("{} not found", resource),
                    message_ko: format!("{}을(를) 찾을 수 없습니다", resource),
                    field: None,
                },
            ),
            AppError::WeatherServiceUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorDetail {
                    code: "WEATHER_SERVICE_UNAVAILABLE".to_string(),
                    message_en: "Weather service is temporarily unavailable".to_string(),
                    message_ko: "날씨 서비스를 일시적으로 사용할 수 없습니다".to_string(),
                    field: None,
                },
            ),
            AppError::WeatherProvider(err) => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail {
                    code: "WEATHER_PROVIDER_ERROR".to_string(),
                    message_en: format!("Weather provider error: {}", err),
                    message_ko: "날씨 데이터를 가져오는 데 실패했습니다".to_string(),
                    field: None,
                },
            ),
            AppError::LanguageModel(msg) => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail {
                    code: "LANGUAGE_MODEL_ERROR".to_string(),
                    message_en: format!("Language model error: {}", msg),
                    message_ko: "AI 응답을 가져오는 데 실패했습니다".to_string(),
                    field: None,
                },
            ),
            AppError::Configuration(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorDetail {
                    code: "CONFIGURATION_ERROR".to_string(),
                    message_en: format!("Configuration error: {}", msg),
                    message_ko: format!("설정 오류: {}", msg),
                    field: None,
                },
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = self.status_and_detail();

        // Log the error for debugging
        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::debug!("Rejected request: {}", self);
        }

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_error_maps_to_bad_request() {
        let err: AppError = GridError::InvalidStep {
            axis: "longitude",
            value: 0.0,
        }
        .into();

        let (status, detail) = err.status_and_detail();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(detail.code, "VALIDATION_ERROR");
        assert_eq!(detail.field.as_deref(), Some("lonStep"));
    }

    #[test]
    fn test_provider_error_maps_to_bad_gateway() {
        let err: AppError = ProviderError::MissingData("data".to_string()).into();
        let (status, detail) = err.status_and_detail();
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(detail.code, "WEATHER_PROVIDER_ERROR");
    }

    #[test]
    fn test_unavailable_is_server_error() {
        let response = AppError::WeatherServiceUnavailable.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_every_variant_has_a_specific_status() {
        let errors = [
            AppError::ValidationError("bad".to_string()),
            AppError::NotFound("forecast".to_string()),
            AppError::WeatherServiceUnavailable,
            AppError::LanguageModel("timeout".to_string()),
            AppError::Configuration("missing key".to_string()),
        ];
        let statuses: Vec<StatusCode> = errors
            .into_iter()
            .map(|e| e.status_and_detail().0)
            .collect();

        assert_eq!(
            statuses,
            vec![
                StatusCode::BAD_REQUEST,
                StatusCode::NOT_FOUND,
                StatusCode::SERVICE_UNAVAILABLE,
                StatusCode::BAD_GATEWAY,
                StatusCode::SERVICE_UNAVAILABLE,
            ]
        );
        assert!(!statuses.contains(&StatusCode::INTERNAL_SERVER_ERROR));
    }
}
