//! Transport layers shared by every route, authenticated or not.
//!
//! Authentication is not one of them: it wraps individual actions
//! (`security::AuthenticatedLayer`), so public routes never see it.
//! Limits come from `HttpConfig`. Rejections produced here use the same
//! `{"error":{"code","message"}}` body as the handlers.

use axum::Router;
use axum::body::Body;
use axum::error_handling::HandleErrorLayer;
use axum::http::{Request, StatusCode, header::HeaderName};
use axum::response::Response;
use tower::timeout::{TimeoutLayer, error::Elapsed};
use tower::{BoxError, ServiceBuilder};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::HttpConfig;
use crate::mvc::results;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

async fn render_layer_error(err: BoxError) -> Response {
    if err.is::<Elapsed>() {
        return results::error(
            StatusCode::REQUEST_TIMEOUT,
            "REQUEST_TIMEOUT",
            "request timed out",
        );
    }

    tracing::error!(error = %err, "middleware failed");
    results::error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_SERVER_ERROR",
        "internal server error",
    )
}

fn request_span(req: &Request<Body>) -> tracing::Span {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "http",
        method = %req.method(),
        path = %req.uri().path(),
        request_id,
    )
}

pub fn apply(router: Router, config: &HttpConfig) -> Router {
    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);

    // Outermost first. The id is set before the trace span opens so every
    // log line of the request carries it.
    let layers = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(render_layer_error))
        .layer(SetRequestIdLayer::new(
            request_id_header.clone(),
            MakeRequestUuid,
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header))
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .layer(RequestBodyLimitLayer::new(config.body_limit_bytes))
        .layer(TimeoutLayer::new(config.request_timeout));

    router.layer(layers)
}
