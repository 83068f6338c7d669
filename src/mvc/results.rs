/*
 * Responsibility
 * - Action が返すレスポンス (Result) を組み立てる小さなヘルパ
 * - エラー body は {"error": {"code", "message"}} に揃える
 */
use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

/// JSON error response in the shape every endpoint uses.
pub fn error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    let body = ErrorResponse {
        error: ErrorBody {
            code,
            message: message.into(),
        },
    };
    (status, Json(body)).into_response()
}

pub fn ok_json<T: Serialize>(body: T) -> Response {
    (StatusCode::OK, Json(body)).into_response()
}

/// Plain `401 Unauthorized`.
pub fn unauthorized() -> Response {
    error(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "unauthorized")
}

/// `401` with a `WWW-Authenticate` challenge for the given scheme.
pub fn unauthorized_with_challenge(scheme: &'static str) -> Response {
    let mut res = unauthorized();
    res.headers_mut()
        .insert(header::WWW_AUTHENTICATE, header::HeaderValue::from_static(scheme));
    res
}

/// `303 See Other` to `location`.
pub fn redirect(location: &str) -> Response {
    Redirect::to(location).into_response()
}
