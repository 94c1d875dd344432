use crate::error::{RagError, Result};
use reqwest::{Client, StatusCode};
use std::time::Duration;

pub fn build_http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| RagError::config(format!("failed to build HTTP client: {}", e)))
}

/// Rate limits and server-side failures are worth another attempt; anything
/// else (auth, bad request) will fail the same way again.
pub fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

pub fn classify_reqwest_error(service: &str, err: reqwest::Error) -> RagError {
    if err.is_timeout() || err.is_connect() || err.is_request() {
        RagError::transient(service, err)
    } else {
        RagError::external(service, err)
    }
}

pub fn status_error(service: &str, status: StatusCode, body: &str) -> RagError {
    let message = format!("request failed: Status {}, Body: {}", status, body);
    if is_retryable_status(status) {
        RagError::transient(service, message)
    } else {
        RagError::external(service, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable_status(StatusCode::BAD_GATEWAY));
        assert!(!is_retryable_status(StatusCode::UNAUTHORIZED));
        assert!(!is_retryable_status(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn test_status_error_carries_body() {
        let err = status_error("deepseek", StatusCode::UNAUTHORIZED, "invalid key");
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("invalid key"));

        let err = status_error("deepseek", StatusCode::SERVICE_UNAVAILABLE, "");
        assert!(err.is_retryable());
    }
}
