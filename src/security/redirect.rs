//! Session-based identity with a login redirect instead of a bare 401.
//!
//! Browser-facing routes use this so an anonymous visitor lands on the login
//! page and can be sent back afterwards via `return_to`.

use axum::response::Response;
use url::form_urlencoded;

use crate::mvc::{ActionError, RequestContext, results};

use super::Authenticator;

#[derive(Debug, Clone)]
pub struct RedirectAuthenticator {
    login_path: String,
}

impl RedirectAuthenticator {
    pub fn new(login_path: impl Into<String>) -> Self {
        Self {
            login_path: login_path.into(),
        }
    }

    fn location_for(&self, ctx: &RequestContext) -> String {
        let original = ctx
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");

        let query: String = form_urlencoded::Serializer::new(String::new())
            .append_pair("return_to", original)
            .finish();

        let sep = if self.login_path.contains('?') { '&' } else { '?' };
        format!("{}{}{}", self.login_path, sep, query)
    }
}

impl Authenticator for RedirectAuthenticator {
    fn name(&self) -> &'static str {
        "redirect"
    }

    fn on_unauthorized(&self, ctx: &RequestContext) -> Result<Response, ActionError> {
        Ok(results::redirect(&self.location_for(ctx)))
    }
}
