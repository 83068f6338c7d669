//! Bridges axum routes to `Action`s.
//!
//! For each request: load the session named by the session cookie, build a
//! `RequestContext` from the request head, run the action, and render either
//! its response or its failure. Both failure paths of `Action::call` end up in
//! the same place.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use futures::FutureExt;
use futures::future::BoxFuture;

use crate::error::AppError;
use crate::mvc::{Action, BoxAction, RequestContext, Session};
use crate::services::session::SessionError;
use crate::state::AppState;

/// axum handler running `action`.
///
/// ```ignore
/// .route("/me", get(invoker::handler(auth.layer(action_fn(me)))))
/// ```
pub fn handler<A: Action>(
    action: A,
) -> impl Fn(State<AppState>, Request) -> BoxFuture<'static, Response> + Clone + Send + Sync + 'static
{
    let action: BoxAction = Arc::new(action);
    move |State(state): State<AppState>, req: Request| invoke(state, action.clone(), req).boxed()
}

pub async fn invoke(state: AppState, action: BoxAction, req: Request) -> Response {
    let (parts, _) = req.into_parts();

    let session = match load_session(&state, &parts.headers).await {
        Ok(session) => session,
        Err(err) => {
            tracing::warn!(
                error = ?err,
                backend = state.sessions.backend_name(),
                "session lookup failed"
            );
            return AppError::from(err).into_response();
        }
    };

    let ctx = RequestContext::from_parts(&parts, session);

    let outcome = match action.call(ctx) {
        Ok(deferred) => deferred.await,
        Err(err) => Err(err),
    };

    match outcome {
        Ok(res) => res,
        Err(err) => AppError::from(err).into_response(),
    }
}

async fn load_session(state: &AppState, headers: &HeaderMap) -> Result<Session, SessionError> {
    let jar = CookieJar::from_headers(headers);
    let Some(cookie) = jar.get(&state.session.cookie_name) else {
        return Ok(Session::new());
    };

    Ok(state.sessions.load(cookie.value()).await?.unwrap_or_default())
}
