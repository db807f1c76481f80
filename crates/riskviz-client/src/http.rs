//! Shared request plumbing: the uniform error envelope and the mapping from
//! HTTP outcomes to `RiskvizError`.

use riskviz_core::RiskvizError;
use serde::Deserialize;

/// The backend's uniform error envelope: non-2xx bodies carry a
/// human-readable `detail` string.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    detail: Option<String>,
}

/// Extracts the `detail` field from a non-2xx response body, if the body is a
/// well-formed envelope. Anything else yields `None` and callers fall back to
/// a generic message.
pub(crate) fn detail_from_body(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.detail)
}

/// Converts a non-2xx response into a `Backend` error, consuming the body.
pub(crate) async fn error_from_response(response: reqwest::Response) -> RiskvizError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let detail = detail_from_body(&body);
    if detail.is_none() && !body.is_empty() {
        tracing::debug!(status, "non-envelope error body: {}", body);
    }
    RiskvizError::backend(status, detail)
}

/// Converts a send failure (connection error, timeout) into a `Transport`
/// error.
pub(crate) fn transport_error(path: &str, err: reqwest::Error) -> RiskvizError {
    RiskvizError::transport(format!("request to {} failed: {}", path, err))
}

/// Converts a body-decoding failure into a `Transport` error; the response
/// arrived but was not usable.
pub(crate) fn decode_error(path: &str, err: reqwest::Error) -> RiskvizError {
    RiskvizError::transport(format!("failed to parse {} response: {}", path, err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_from_envelope_body() {
        assert_eq!(
            detail_from_body(r#"{"detail":"No workbook loaded"}"#),
            Some("No workbook loaded".to_string())
        );
    }

    #[test]
    fn test_missing_or_malformed_detail_yields_none() {
        assert_eq!(detail_from_body(r#"{"error":"boom"}"#), None);
        assert_eq!(detail_from_body("<html>502</html>"), None);
        assert_eq!(detail_from_body(""), None);
        assert_eq!(detail_from_body(r#"{"detail":null}"#), None);
    }
}
