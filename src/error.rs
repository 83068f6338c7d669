/*
 * Responsibility
 * - アプリ共通の AppError 定義 (起動時エラー + HTTP で返すエラー)
 * - IntoResponse 実装 (HTTP status / JSON error body)
 * - ActionError / SessionError / ConfigError を統一的に変換
 */
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::config::ConfigError;
use crate::mvc::{ActionError, results};
use crate::services::session::SessionError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid request: {0}")]
    BadRequest(String),

    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }
}

impl From<ActionError> for AppError {
    fn from(e: ActionError) -> Self {
        match e {
            ActionError::BadRequest(message) => AppError::BadRequest(message),
            ActionError::Session(err) => AppError::Session(err),
            ActionError::Runtime(err) => {
                tracing::error!(error = %err, "action failed");
                AppError::Internal
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest(message) => {
                results::error(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
            }
            AppError::Internal => results::error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_SERVER_ERROR",
                "internal server error",
            ),
            // Backend / config details stay in the logs.
            other => {
                tracing::error!(error = %other, "request failed");
                results::error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_SERVER_ERROR",
                    "internal server error",
                )
            }
        }
    }
}
