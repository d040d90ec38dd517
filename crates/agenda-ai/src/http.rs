//! Shared HTTP plumbing for the reasoning-service clients.

use std::time::Duration;

use reqwest::StatusCode;

use crate::AiError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest error body excerpt carried into an `AiError`.
const ERROR_EXCERPT_CHARS: usize = 200;

pub(crate) fn build_http(timeout: Duration) -> Result<reqwest::Client, AiError> {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(timeout)
        .build()
        .map_err(|e| AiError::NetworkError(format!("failed to build HTTP client: {e}")))
}

/// Send a prepared request and decode the JSON body, classifying failures.
pub(crate) async fn send_json(
    request: reqwest::RequestBuilder,
) -> Result<serde_json::Value, AiError> {
    let response = request.send().await.map_err(classify_transport)?;

    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(classify_status(status, &text));
    }

    response
        .json()
        .await
        .map_err(|e| AiError::ParseError(e.to_string()))
}

fn classify_transport(err: reqwest::Error) -> AiError {
    if err.is_timeout() {
        AiError::Timeout
    } else {
        AiError::NetworkError(err.to_string())
    }
}

pub(crate) fn classify_status(status: StatusCode, body: &str) -> AiError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return AiError::RateLimited;
    }
    let excerpt = body.chars().take(ERROR_EXCERPT_CHARS).collect::<String>();
    let detail = format!("HTTP {status}: {excerpt}");
    if status.is_server_error() {
        AiError::ServerError(detail)
    } else {
        AiError::ApiError(detail)
    }
}
