//! Backend client: transport seam and envelope normalization

pub mod envelope;
pub mod transport;

use crate::core::error::Result;
use envelope::{decode_empty, decode_envelope, decode_token};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use transport::{ApiRequest, HttpTransport, Method};

/// Thin convenience wrapper pairing a transport with envelope decoding.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn HttpTransport>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        bearer: Option<String>,
    ) -> Result<T> {
        let response = self
            .transport
            .execute(ApiRequest::new(Method::Get, path).maybe_bearer(bearer))
            .await?;
        decode_envelope(&response)
    }

    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        bearer: Option<String>,
        body: serde_json::Value,
    ) -> Result<T> {
        let response = self
            .transport
            .execute(ApiRequest::new(Method::Post, path).maybe_bearer(bearer).json(body))
            .await?;
        decode_envelope(&response)
    }

    pub async fn put_json<T: DeserializeOwned>(
        &self,
        path: &str,
        bearer: Option<String>,
        body: serde_json::Value,
    ) -> Result<T> {
        let response = self
            .transport
            .execute(ApiRequest::new(Method::Put, path).maybe_bearer(bearer).json(body))
            .await?;
        decode_envelope(&response)
    }

    pub async fn delete(&self, path: &str, bearer: Option<String>) -> Result<()> {
        let response = self
            .transport
            .execute(ApiRequest::new(Method::Delete, path).maybe_bearer(bearer))
            .await?;
        decode_empty(&response)
    }

    /// POST the token-issuance endpoint and return the bearer token.
    pub async fn request_token(&self, path: &str) -> Result<String> {
        let response = self
            .transport
            .execute(ApiRequest::new(Method::Post, path))
            .await?;
        decode_token(&response)
    }
}
