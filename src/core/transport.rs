//! Remote entity API abstraction
//!
//! The store speaks to the remote authority through [`RemoteTransport`], so it
//! is agnostic to whether requests go over HTTP or to an in-process fake.
//! Timeouts are the transport's concern; the store enforces none.

use crate::core::error::TransportError;
use crate::core::normalize::WireRecord;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

/// HTTP verbs used against the entity API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        };
        f.write_str(s)
    }
}

/// One request against the entity API
///
/// `path` is relative to the API base, e.g. `suppliers/` or `suppliers/3/`.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<WireRecord>,
    pub bearer_token: Option<String>,
}

impl RemoteRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            bearer_token: None,
        }
    }

    pub fn with_body(mut self, body: WireRecord) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_bearer_token(mut self, token: Option<String>) -> Self {
        self.bearer_token = token;
        self
    }

    /// The `Authorization` header value, if a token is present
    pub fn authorization(&self) -> Option<String> {
        self.bearer_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(|t| format!("Bearer {}", t))
    }
}

/// A response as received, body kept as raw text
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteResponse {
    pub status: u16,
    pub body: String,
}

impl RemoteResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Build a response with a JSON body
    pub fn json(status: u16, body: &Value) -> Self {
        Self::new(status, body.to_string())
    }

    /// 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the body as JSON; empty or invalid bodies yield `None`
    pub fn json_body(&self) -> Option<Value> {
        if self.body.trim().is_empty() {
            return None;
        }
        serde_json::from_str(&self.body).ok()
    }
}

/// Sends requests to the remote authority
#[async_trait]
pub trait RemoteTransport: Send + Sync {
    /// Perform one request
    ///
    /// Non-success statuses are returned as responses, not errors; an `Err`
    /// means no response was obtained at all.
    async fn send(&self, request: RemoteRequest) -> Result<RemoteResponse, TransportError>;
}

/// Source of the bearer token, owned by an auth collaborator
pub trait TokenSource: Send + Sync {
    fn token(&self) -> Option<String>;
}

impl<F> TokenSource for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn token(&self) -> Option<String> {
        self()
    }
}

/// No authentication
#[derive(Debug, Clone, Copy, Default)]
pub struct NoToken;

impl TokenSource for NoToken {
    fn token(&self) -> Option<String> {
        None
    }
}

/// A fixed token
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

impl TokenSource for StaticToken {
    fn token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}
