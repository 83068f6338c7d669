/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - 認証が必要な route は Action を AuthenticatedLayer で包んでから invoker に渡す
 */
use axum::{
    Router,
    routing::{get, post},
};
use tower::Layer;

use crate::{
    api::invoker,
    mvc::action_fn,
    security::AuthenticatedLayer,
    state::AppState,
};

use crate::api::v1::handlers::{
    health::health,
    me::me,
    session::{login, logout},
};

pub fn routes(state: &AppState) -> Router<AppState> {
    let authenticated = AuthenticatedLayer::new(state.authenticator.clone());

    Router::new()
        .route("/health", get(health))
        .route("/session", post(login).delete(logout))
        .route("/me", get(invoker::handler(authenticated.layer(action_fn(me)))))
}
