/*
 * Responsibility
 * - tracing / panic hook の初期化
 * - Config読み込み → 依存生成 (SessionStore, Authenticator) → Router 組み立て
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::{Config, HttpConfig, SessionBackend};
use crate::error::AppError;
use crate::middleware;
use crate::security::build_authenticator;
use crate::services::session::{MemorySessionStore, SessionStore, ValkeySessionStore};
use crate::state::AppState;

fn init_tracing() {
    // RUST_LOG wins if set. Ex:
    // RUST_LOG=info,authn_guard=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // stderr can be hidden depending on how the process is launched.
        tracing::error!(?info, "panic");

        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<(), AppError> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config.http);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Resolve process-level services. Any failure here aborts startup.
pub async fn build_state(config: &Config) -> Result<AppState, AppError> {
    let authenticator = build_authenticator(&config.auth)?;

    let sessions: Arc<dyn SessionStore> = match &config.session.backend {
        SessionBackend::Memory => {
            let store = MemorySessionStore::new();
            store.spawn_sweeper(config.session.sweep_interval);
            Arc::new(store)
        }
        SessionBackend::Valkey { url } => Arc::new(ValkeySessionStore::new(url).await?),
    };
    tracing::info!(backend = sessions.backend_name(), "session store ready");

    Ok(AppState::new(sessions, authenticator, config.session.clone()))
}

pub fn build_router(state: AppState, http: &HttpConfig) -> Router {
    let router = Router::new()
        .nest("/api/v1", api::v1::routes(&state))
        .with_state(state);

    middleware::http::apply(router, http)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::security::{Authenticator, BearerAuthenticator, SessionAuthenticator};
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
        response::Response,
    };
    use crate::mvc::Session;
    use crate::services::session::{SessionError, SessionResult};
    use async_trait::async_trait;
    use std::time::Duration;
    use tower::ServiceExt;

    fn app_with(authenticator: Arc<dyn Authenticator>) -> (Router, MemorySessionStore) {
        let store = MemorySessionStore::new();
        let state = AppState::new(
            Arc::new(store.clone()),
            authenticator,
            SessionConfig::default(),
        );
        (build_router(state, &HttpConfig::default()), store)
    }

    /// A backend that refuses every connection.
    struct UnreachableStore;

    #[async_trait]
    impl SessionStore for UnreachableStore {
        fn backend_name(&self) -> &'static str {
            "unreachable"
        }

        async fn load(&self, _id: &str) -> SessionResult<Option<Session>> {
            Err(SessionError::BackendConnection("connection refused".into()))
        }

        async fn save(&self, _id: &str, _session: &Session, _ttl: Duration) -> SessionResult<()> {
            Err(SessionError::BackendConnection("connection refused".into()))
        }

        async fn remove(&self, _id: &str) -> SessionResult<()> {
            Err(SessionError::BackendConnection("connection refused".into()))
        }
    }

    async fn json_body(res: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn login(app: &Router, username: &str) -> String {
        let res = app
            .clone()
            .oneshot(
                Request::post("/api/v1/session")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        serde_json::json!({ "username": username }).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);

        let set_cookie = res.headers()[header::SET_COOKIE].to_str().unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    fn get_me(cookie: Option<&str>) -> Request<Body> {
        let mut req = Request::get("/api/v1/me");
        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE, cookie);
        }
        req.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let (app, _) = app_with(Arc::new(SessionAuthenticator));
        let res = app
            .oneshot(Request::get("/api/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().contains_key(middleware::http::REQUEST_ID_HEADER));
    }

    #[tokio::test]
    async fn me_without_session_is_401() {
        let (app, _) = app_with(Arc::new(SessionAuthenticator));
        let res = app.oneshot(get_me(None)).await.unwrap();

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(res).await["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn me_with_unknown_session_is_401() {
        let (app, _) = app_with(Arc::new(SessionAuthenticator));
        let res = app.oneshot(get_me(Some("session=forged"))).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn login_then_me_returns_the_user() {
        let (app, store) = app_with(Arc::new(SessionAuthenticator));
        let cookie = login(&app, "alice").await;
        assert_eq!(store.len().await, 1);

        let res = app.clone().oneshot(get_me(Some(&cookie))).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(json_body(res).await["username"], "alice");
    }

    #[tokio::test]
    async fn logout_ends_the_session() {
        let (app, store) = app_with(Arc::new(SessionAuthenticator));
        let cookie = login(&app, "alice").await;

        let res = app
            .clone()
            .oneshot(
                Request::delete("/api/v1/session")
                    .header(header::COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        assert_eq!(store.len().await, 0);

        let res = app.oneshot(get_me(Some(&cookie))).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn invalid_login_is_400() {
        let (app, _) = app_with(Arc::new(SessionAuthenticator));
        let res = app
            .oneshot(
                Request::post("/api/v1/session")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"username":"  "}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(res).await["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn bearer_authenticator_ignores_the_session_cookie() {
        let (app, _) = app_with(Arc::new(BearerAuthenticator::new([("t0k3n", "ci-bot")])));
        let cookie = login(&app, "alice").await;

        let res = app.clone().oneshot(get_me(Some(&cookie))).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(res.headers()[header::WWW_AUTHENTICATE], "Bearer");

        let res = app
            .oneshot(
                Request::get("/api/v1/me")
                    .header(header::AUTHORIZATION, "Bearer t0k3n")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(json_body(res).await["username"], "ci-bot");
    }

    #[tokio::test]
    async fn session_backend_failure_is_500_not_401() {
        let state = AppState::new(
            Arc::new(UnreachableStore),
            Arc::new(SessionAuthenticator),
            SessionConfig::default(),
        );
        let app = build_router(state, &HttpConfig::default());

        let res = app.oneshot(get_me(Some("session=abc"))).await.unwrap();

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(res).await;
        assert_eq!(body["error"]["code"], "INTERNAL_SERVER_ERROR");
        assert_eq!(body["error"]["message"], "internal server error");
    }
}
