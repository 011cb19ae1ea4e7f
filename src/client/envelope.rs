//! Envelope decoding and response normalization
//!
//! Every backend response is expected to follow the `{success, data,
//! message, token}` envelope. Decoding fails closed: a non-2xx status, a
//! non-JSON body, `success: false`, or a missing `data` field is an
//! explicit error — never an empty or partially-trusted value.

use crate::client::transport::RawResponse;
use crate::core::error::{AdminError, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// The backend's top-level response wrapper
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: serde::Deserialize<'de>"))]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

fn classify_status(status: u16) -> Result<()> {
    match status {
        200..=299 => Ok(()),
        401 | 403 => Err(AdminError::Unauthorized(status)),
        other => Err(AdminError::Status(other)),
    }
}

fn parse_envelope<T: DeserializeOwned>(response: &RawResponse) -> Result<ApiEnvelope<T>> {
    serde_json::from_slice(&response.body)
        .map_err(|e| AdminError::MalformedResponse(e.to_string()))
}

/// Decode an enveloped payload into the target type.
///
/// The `data` field is only trusted when `success` is true; when the
/// backend reports failure the message is surfaced as a domain error.
pub fn decode_envelope<T: DeserializeOwned>(response: &RawResponse) -> Result<T> {
    classify_status(response.status)?;
    let envelope = parse_envelope::<T>(response)?;

    if !envelope.success {
        return Err(AdminError::Domain(
            envelope
                .message
                .unwrap_or_else(|| "Backend reported failure".to_string()),
        ));
    }

    envelope
        .data
        .ok_or_else(|| AdminError::MalformedResponse("envelope is missing data".to_string()))
}

/// Decode a token-issuance response, returning the bearer token.
pub fn decode_token(response: &RawResponse) -> Result<String> {
    classify_status(response.status)?;
    let envelope = parse_envelope::<serde_json::Value>(response)?;

    if !envelope.success {
        return Err(AdminError::Domain(
            envelope
                .message
                .unwrap_or_else(|| "Token issuance rejected".to_string()),
        ));
    }

    envelope
        .token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AdminError::MalformedResponse("envelope is missing token".to_string()))
}

/// Decode a write acknowledgement that may have no body at all.
///
/// Delete endpoints answer 200 or 204 with an empty body, or with an
/// envelope; both count as success as long as the envelope does not
/// report failure.
pub fn decode_empty(response: &RawResponse) -> Result<()> {
    classify_status(response.status)?;

    if response.body.is_empty() {
        return Ok(());
    }

    let envelope = parse_envelope::<serde_json::Value>(response)?;
    if !envelope.success {
        return Err(AdminError::Domain(
            envelope
                .message
                .unwrap_or_else(|| "Backend reported failure".to_string()),
        ));
    }
    Ok(())
}
