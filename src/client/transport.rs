//! HTTP transport seam
//!
//! The gateways and the session bootstrapper talk to the backend through
//! the [`HttpTransport`] trait rather than reqwest directly, so tests can
//! script unreachable backends and malformed bodies. The production
//! implementation wraps a shared `reqwest::Client`.

use crate::core::error::{AdminError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use std::fmt;
use std::time::Duration;

/// HTTP method subset used by the REST surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        };
        f.write_str(s)
    }
}

/// A single request against the backend, path relative to the base URL
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub bearer: Option<String>,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            bearer: None,
            body: None,
        }
    }

    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    pub fn maybe_bearer(mut self, token: Option<String>) -> Self {
        self.bearer = token;
        self
    }

    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Raw response before envelope decoding
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Bytes,
}

/// Transport abstraction between the data-access layer and the wire.
///
/// `execute` fails only for network-level problems (connection refused,
/// timeout, DNS); every received response, whatever its status, is returned
/// as a [`RawResponse`] and classified during envelope decoding.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<RawResponse>;
}

/// Production transport backed by reqwest
pub struct ReqwestTransport {
    client: Client,
    base_url: String,
}

impl ReqwestTransport {
    /// Build a transport with an explicit per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AdminError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: ApiRequest) -> Result<RawResponse> {
        let url = self.url_for(&request.path);
        tracing::debug!(method = %request.method, url = %url, "Issuing backend request");

        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
        };

        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| AdminError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| AdminError::Network(e.to_string()))?;

        Ok(RawResponse { status, body })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted transport for exercising fallback and session paths.

    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Transport that replays a queue of canned outcomes and records every
    /// request it receives.
    pub struct ScriptedTransport {
        responses: Mutex<VecDeque<Result<RawResponse>>>,
        requests: Mutex<Vec<ApiRequest>>,
    }

    impl ScriptedTransport {
        pub fn new() -> Self {
            Self {
                responses: Mutex::new(VecDeque::new()),
                requests: Mutex::new(Vec::new()),
            }
        }

        /// Queue a response with the given status and JSON body.
        pub fn push_json(&self, status: u16, body: serde_json::Value) {
            self.responses.lock().unwrap().push_back(Ok(RawResponse {
                status,
                body: Bytes::from(body.to_string()),
            }));
        }

        /// Queue a response with a raw (possibly non-JSON) body.
        pub fn push_raw(&self, status: u16, body: &str) {
            self.responses.lock().unwrap().push_back(Ok(RawResponse {
                status,
                body: Bytes::from(body.to_string()),
            }));
        }

        /// Queue a network-level failure (backend unreachable).
        pub fn push_unreachable(&self) {
            self.responses
                .lock()
                .unwrap()
                .push_back(Err(AdminError::Network("connection refused".into())));
        }

        /// Requests seen so far, in order.
        pub fn seen(&self) -> Vec<ApiRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpTransport for ScriptedTransport {
        async fn execute(&self, request: ApiRequest) -> Result<RawResponse> {
            self.requests.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(AdminError::Network("no scripted response".into())))
        }
    }
}
