//! Shared handling for token endpoint responses.

use {reqwest::StatusCode, serde_json::Value, tracing::debug};

use crate::error::{Provider, ProviderError, Result, snippet};

/// Read a token endpoint response into JSON.
///
/// Anything but 200 is an auth failure. An empty 200 body is reported
/// separately from a body that fails to parse.
pub(crate) async fn read_token_response(
    provider: Provider,
    url: &str,
    response: reqwest::Response,
) -> Result<Value> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|source| ProviderError::Transport { provider, source })?;
    debug!(%provider, status = status.as_u16(), bytes = body.len(), "token endpoint responded");
    parse_token_body(provider, url, status, &body)
}

pub(crate) fn parse_token_body(
    provider: Provider,
    url: &str,
    status: StatusCode,
    body: &str,
) -> Result<Value> {
    if status != StatusCode::OK {
        return Err(ProviderError::Auth {
            provider,
            status: status.as_u16(),
            body: snippet(body),
        });
    }
    if body.trim().is_empty() {
        return Err(ProviderError::EmptyResponse {
            provider,
            url: url.to_string(),
        });
    }
    serde_json::from_str(body)
        .map_err(|e| ProviderError::protocol(provider, format!("invalid JSON: {e}")))
}

/// Non-empty string at a JSON pointer.
pub(crate) fn string_at<'a>(value: &'a Value, pointer: &str) -> Option<&'a str> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}
