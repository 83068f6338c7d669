/*
 * Responsibility
 * - GET /me: 認証済みユーザーを返す Action
 * - username は Authenticated が実行中だけ RequestContext に載せる
 */
use axum::response::Response;

use crate::{
    api::v1::dto::session::SessionResponse,
    mvc::{ActionError, RequestContext, results},
};

pub async fn me(ctx: RequestContext) -> Result<Response, ActionError> {
    // Only reachable behind `Authenticated`, so a missing username is a wiring bug.
    let username = ctx
        .username()
        .ok_or_else(|| ActionError::wrap("me called without an authenticated user"))?;

    Ok(results::ok_json(SessionResponse { username }))
}
