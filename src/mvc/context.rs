//! Per-request state handed to actions.
//!
//! A `RequestContext` is a handle: clones share the same attribute map, so a
//! wrapper can give a clone to the action it decorates and still observe (or
//! clear) attributes after that action has finished.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use axum::http::{HeaderMap, Method, Uri, request::Parts};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request attribute carrying the authenticated principal's name.
pub const USERNAME: &str = "username";

/// Session key/value data as loaded by the surrounding pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Session(HashMap<String, String>);

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }
}

impl<K, V> FromIterator<(K, V)> for Session
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[derive(Debug)]
struct Inner {
    id: Uuid,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    session: Session,
    attributes: RwLock<HashMap<String, String>>,
}

#[derive(Debug, Clone)]
pub struct RequestContext {
    inner: Arc<Inner>,
}

impl RequestContext {
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, session: Session) -> Self {
        Self {
            inner: Arc::new(Inner {
                id: Uuid::new_v4(),
                method,
                uri,
                headers,
                session,
                attributes: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Build from the head of an HTTP request plus the session the pipeline loaded for it.
    pub fn from_parts(parts: &Parts, session: Session) -> Self {
        Self::new(
            parts.method.clone(),
            parts.uri.clone(),
            parts.headers.clone(),
            session,
        )
    }

    /// A `GET /` context with no headers. Handy when only the session matters.
    pub fn with_session(session: Session) -> Self {
        Self::new(Method::GET, Uri::from_static("/"), HeaderMap::new(), session)
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn method(&self) -> &Method {
        &self.inner.method
    }

    pub fn uri(&self) -> &Uri {
        &self.inner.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.inner.headers
    }

    /// Header value as UTF-8, `None` if absent or not valid text.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.inner.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    pub fn attribute(&self, key: &str) -> Option<String> {
        self.inner
            .attributes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn set_attribute(&self, key: impl Into<String>, value: impl Into<String>) {
        self.inner
            .attributes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value.into());
    }

    pub fn remove_attribute(&self, key: &str) -> Option<String> {
        self.inner
            .attributes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
    }

    /// The authenticated user, present only while an authenticated action runs.
    pub fn username(&self) -> Option<String> {
        self.attribute(USERNAME)
    }

    pub fn set_username(&self, username: Option<String>) {
        match username {
            Some(name) => self.set_attribute(USERNAME, name),
            None => self.clear_username(),
        }
    }

    pub fn clear_username(&self) {
        self.remove_attribute(USERNAME);
    }
}
