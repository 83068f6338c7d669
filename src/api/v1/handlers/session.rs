/*
 * Responsibility
 * - POST /session: session を作成し cookie を発行 (login)
 * - DELETE /session: session を破棄し cookie を消す (logout)
 * - 資格情報の検証はしない (username をそのまま session に載せるだけ)
 */
use axum::{Json, extract::State, http::StatusCode};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use uuid::Uuid;

use crate::{
    api::v1::dto::session::{LoginRequest, SessionResponse},
    error::AppError,
    mvc::{Session, USERNAME},
    state::AppState,
};

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(StatusCode, CookieJar, Json<SessionResponse>), AppError> {
    req.validate().map_err(AppError::bad_request)?;

    let username = req.username.trim().to_string();
    let session_id = Uuid::new_v4().to_string();
    let session: Session = [(USERNAME, username.as_str())].into_iter().collect();

    state
        .sessions
        .save(&session_id, &session, state.session.ttl)
        .await?;

    tracing::info!(username = %username, "session created");

    let cookie = Cookie::build((state.session.cookie_name.clone(), session_id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);

    Ok((
        StatusCode::CREATED,
        jar.add(cookie),
        Json(SessionResponse { username }),
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(StatusCode, CookieJar), AppError> {
    if let Some(cookie) = jar.get(&state.session.cookie_name) {
        state.sessions.remove(cookie.value()).await?;
    }

    let jar = jar.remove(Cookie::build(state.session.cookie_name.clone()).path("/"));
    Ok((StatusCode::NO_CONTENT, jar))
}
