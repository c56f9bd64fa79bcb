//! Status checking and JSON decoding shared by the wire clients.

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::{Result, SyncError};

pub(crate) fn authorized(builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => builder.bearer_auth(token),
        None => builder,
    }
}

/// Passes the response through if its status is one of `accepted`, otherwise
/// turns it into [`SyncError::Status`] carrying the response body.
pub(crate) async fn check_status(
    response: Response,
    operation: &'static str,
    accepted: &[StatusCode],
) -> Result<Response> {
    let status = response.status();
    if accepted.contains(&status) {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(SyncError::status(operation, status, body))
}

pub(crate) async fn decode_json<T: DeserializeOwned>(
    response: Response,
    operation: &'static str,
) -> Result<T> {
    let text = response
        .text()
        .await
        .map_err(|e| SyncError::transport(operation, e))?;
    serde_json::from_str(&text).map_err(|source| SyncError::Decode { operation, source })
}
