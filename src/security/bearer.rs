/*
 * Responsibility
 * - `Authorization: Bearer <token>` から username を引く (静的トークン表)
 * - トークンの検証 (署名など) はしない。表に無ければ未認証として扱う
 */
use std::collections::HashMap;

use axum::{http::header, response::Response};

use crate::mvc::{ActionError, RequestContext, results};

use super::Authenticator;

/// Identity from a static bearer-token table, for service-to-service calls.
#[derive(Debug, Clone, Default)]
pub struct BearerAuthenticator {
    tokens: HashMap<String, String>,
}

impl BearerAuthenticator {
    pub fn new<I, K, V>(tokens: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            tokens: tokens
                .into_iter()
                .map(|(t, u)| (t.into(), u.into()))
                .collect(),
        }
    }
}

impl Authenticator for BearerAuthenticator {
    fn name(&self) -> &'static str {
        "bearer"
    }

    fn username(&self, ctx: &RequestContext) -> Result<Option<String>, ActionError> {
        let token = ctx
            .header(header::AUTHORIZATION.as_str())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim);

        Ok(token.and_then(|t| self.tokens.get(t)).cloned())
    }

    fn on_unauthorized(&self, _ctx: &RequestContext) -> Result<Response, ActionError> {
        Ok(results::unauthorized_with_challenge("Bearer"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mvc::Session;
    use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, Uri};

    fn ctx_with_auth(value: &'static str) -> RequestContext {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        RequestContext::new(Method::GET, Uri::from_static("/"), headers, Session::new())
    }

    fn authenticator() -> BearerAuthenticator {
        BearerAuthenticator::new([("s3cr3t", "build-bot")])
    }

    #[test]
    fn known_token_maps_to_user() {
        let name = authenticator().username(&ctx_with_auth("Bearer s3cr3t")).unwrap();
        assert_eq!(name.as_deref(), Some("build-bot"));
    }

    #[test]
    fn unknown_token_is_unauthenticated() {
        let name = authenticator().username(&ctx_with_auth("Bearer nope")).unwrap();
        assert_eq!(name, None);
    }

    #[test]
    fn other_schemes_are_ignored() {
        let name = authenticator()
            .username(&ctx_with_auth("Basic czNjcjN0"))
            .unwrap();
        assert_eq!(name, None);
    }

    #[test]
    fn session_is_not_consulted() {
        let ctx = RequestContext::with_session([("username", "alice")].into_iter().collect());
        assert_eq!(authenticator().username(&ctx).unwrap(), None);
    }

    #[test]
    fn fallback_carries_challenge() {
        let res = authenticator()
            .on_unauthorized(&ctx_with_auth("Bearer nope"))
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(res.headers()[header::WWW_AUTHENTICATE], "Bearer");
    }
}
