//! HTTP transport for the remote entity API, built on reqwest

use crate::config::ClientConfig;
use crate::core::error::TransportError;
use crate::core::transport::{Method, RemoteRequest, RemoteResponse, RemoteTransport};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use std::time::Duration;

/// Sends entity requests over HTTP
///
/// Paths are joined onto `base_url`, so a base of
/// `http://127.0.0.1:8000/api` and a path of `suppliers/3/` hit
/// `http://127.0.0.1:8000/api/suppliers/3/`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport with a per-request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::new(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
        Self::new(config.api_base.clone(), config.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a request path
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn http_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait]
impl RemoteTransport for HttpTransport {
    async fn send(&self, request: RemoteRequest) -> Result<RemoteResponse, TransportError> {
        let url = self.url(&request.path);
        let mut builder = self.client.request(http_method(request.method), &url);

        if let Some(auth) = request.authorization() {
            builder = builder.header(AUTHORIZATION, auth);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::debug!(method = %request.method, %url, error = %e, "request failed");
            TransportError::new(e.to_string())
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::new(format!("failed to read response body: {}", e)))?;

        tracing::debug!(method = %request.method, %url, status, "response received");
        Ok(RemoteResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let transport =
            HttpTransport::new("http://127.0.0.1:8000/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(transport.base_url(), "http://127.0.0.1:8000/api");
        assert_eq!(
            transport.url("suppliers/"),
            "http://127.0.0.1:8000/api/suppliers/"
        );
        assert_eq!(
            transport.url("/suppliers/3/"),
            "http://127.0.0.1:8000/api/suppliers/3/"
        );
    }

    #[test]
    fn test_from_config() {
        let config = ClientConfig::default_config();
        let transport = HttpTransport::from_config(&config).unwrap();
        assert_eq!(transport.base_url(), config.api_base);
    }
}
