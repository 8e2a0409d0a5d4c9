// Provider error taxonomy and HTTP status classification

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("authentication rejected by translation provider: {0}")]
    Auth(String),

    #[error("translation quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("network failure: {0}")]
    Network(String),

    #[error("translation request timed out after {0:?}")]
    Timeout(Duration),

    #[error("invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("provider returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("provider misconfigured: {0}")]
    Misconfigured(String),
}

impl ProviderError {
    /// Only transport-level failures may be retried; everything else is a
    /// statement from the provider that will not change on a second attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, ProviderError::Network(_) | ProviderError::Timeout(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::Auth(_) => "auth",
            ProviderError::QuotaExceeded(_) => "quota",
            ProviderError::UnsupportedLanguage(_) => "unsupported_language",
            ProviderError::Network(_) => "network",
            ProviderError::Timeout(_) => "timeout",
            ProviderError::InvalidResponse(_) => "invalid_response",
            ProviderError::Http { .. } => "http",
            ProviderError::Misconfigured(_) => "config",
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        ProviderError::Network(e.to_string())
    }
}

fn mentions_quota(body: &str) -> bool {
    let lower = body.to_ascii_lowercase();
    lower.contains("quota") || lower.contains("limit exceeded") || lower.contains("ratelimit")
}

fn mentions_language(body: &str) -> bool {
    let lower = body.to_ascii_lowercase();
    lower.contains("language") || lower.contains("not supported") || lower.contains("invalid value")
}

fn truncate(body: &str) -> String {
    const MAX: usize = 300;
    let trimmed = body.trim();
    if trimmed.len() <= MAX {
        return trimmed.to_string();
    }
    let mut end = MAX;
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &trimmed[..end])
}

/// Map a non-success HTTP response to a distinguishable error kind.
pub fn classify_status(status: u16, body: &str, target_lang: &str) -> ProviderError {
    match status {
        401 => ProviderError::Auth(truncate(body)),
        403 if mentions_quota(body) => ProviderError::QuotaExceeded(truncate(body)),
        403 => ProviderError::Auth(truncate(body)),
        // 456 is DeepL's "quota exceeded"
        429 | 456 => ProviderError::QuotaExceeded(truncate(body)),
        400 if mentions_language(body) => ProviderError::UnsupportedLanguage(target_lang.to_string()),
        500..=599 => ProviderError::Network(format!("server error {}: {}", status, truncate(body))),
        _ => ProviderError::Http {
            status,
            body: truncate(body),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_auth_and_quota() {
        assert!(matches!(classify_status(401, "bad key", "fr"), ProviderError::Auth(_)));
        assert!(matches!(classify_status(403, "API key not valid", "fr"), ProviderError::Auth(_)));
        assert!(matches!(
            classify_status(403, "Daily Limit Exceeded: quota", "fr"),
            ProviderError::QuotaExceeded(_)
        ));
        assert!(matches!(classify_status(429, "", "fr"), ProviderError::QuotaExceeded(_)));
        assert!(matches!(classify_status(456, "", "fr"), ProviderError::QuotaExceeded(_)));
    }

    #[test]
    fn classifies_unsupported_language() {
        let err = classify_status(400, r#"{"error":{"message":"Invalid Value: target language"}}"#, "xx");
        assert_eq!(err, ProviderError::UnsupportedLanguage("xx".to_string()));
    }

    #[test]
    fn kinds_name_the_failure() {
        assert_eq!(classify_status(401, "", "fr").kind(), "auth");
        assert_eq!(classify_status(429, "", "fr").kind(), "quota");
        assert_eq!(ProviderError::Timeout(std::time::Duration::from_secs(1)).kind(), "timeout");
        assert_eq!(ProviderError::Misconfigured("no key".into()).kind(), "config");
    }

    #[test]
    fn server_errors_are_transient() {
        let err = classify_status(503, "unavailable", "fr");
        assert!(err.is_transient());
        assert!(!classify_status(400, "bad request", "fr").is_transient());
        assert!(!ProviderError::Auth(String::new()).is_transient());
    }

    #[test]
    fn truncates_long_bodies_on_char_boundary() {
        let body = "é".repeat(400);
        match classify_status(418, &body, "fr") {
            ProviderError::Http { status, body } => {
                assert_eq!(status, 418);
                assert!(body.ends_with("..."));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
