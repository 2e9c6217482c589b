//! Error taxonomy for provider flows.

use std::fmt;

use thiserror::Error;

/// Response bodies embedded in errors are cut to this many characters.
pub const BODY_SNIPPET_LEN: usize = 512;

pub type Result<T> = std::result::Result<T, ProviderError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Aplos,
    Virtuous,
}

impl Provider {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Aplos => "aplos",
            Self::Virtuous => "virtuous",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Machine-readable error tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Auth,
    Protocol,
    EmptyResponse,
    Decryption,
    KeyLoad,
    Fetch,
    Transport,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Protocol => "protocol",
            Self::EmptyResponse => "empty_response",
            Self::Decryption => "decryption",
            Self::KeyLoad => "key_load",
            Self::Fetch => "fetch",
            Self::Transport => "transport",
        }
    }
}

/// Why a token could not be decrypted. Every stage collapses into
/// [`ProviderError::Decryption`].
#[derive(Debug, Error)]
pub enum DecryptionError {
    #[error("token is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("RSA decryption failed: {0}")]
    Rsa(#[from] rsa::Error),

    #[error("decrypted token is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider} token endpoint returned {status}: {body}")]
    Auth {
        provider: Provider,
        status: u16,
        body: String,
    },

    #[error("unexpected response from {provider}: {reason}")]
    Protocol { provider: Provider, reason: String },

    #[error("{provider} returned an empty response body from {url} (check the endpoint URL)")]
    EmptyResponse { provider: Provider, url: String },

    #[error("failed to decrypt access token: {0}")]
    Decryption(#[from] DecryptionError),

    #[error("failed to load private key: {0}")]
    KeyLoad(String),

    #[error("failed to fetch {resource}: {reason}")]
    Fetch {
        resource: &'static str,
        status: Option<u16>,
        reason: String,
    },

    #[error("request to {provider} failed: {source}")]
    Transport {
        provider: Provider,
        #[source]
        source: reqwest::Error,
    },
}

impl ProviderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Auth { .. } => ErrorKind::Auth,
            Self::Protocol { .. } => ErrorKind::Protocol,
            Self::EmptyResponse { .. } => ErrorKind::EmptyResponse,
            Self::Decryption(_) => ErrorKind::Decryption,
            Self::KeyLoad(_) => ErrorKind::KeyLoad,
            Self::Fetch { .. } => ErrorKind::Fetch,
            Self::Transport { .. } => ErrorKind::Transport,
        }
    }

    pub(crate) fn protocol(provider: Provider, reason: impl Into<String>) -> Self {
        Self::Protocol {
            provider,
            reason: reason.into(),
        }
    }

    pub(crate) fn fetch(
        resource: &'static str,
        status: Option<u16>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Fetch {
            resource,
            status,
            reason: reason.into(),
        }
    }
}

/// Truncate a response body for inclusion in an error message.
pub fn snippet(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(BODY_SNIPPET_LEN) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_error_display_and_kind() {
        let err = ProviderError::Auth {
            provider: Provider::Virtuous,
            status: 401,
            body: "invalid_grant".into(),
        };
        assert_eq!(
            err.to_string(),
            "virtuous token endpoint returned 401: invalid_grant"
        );
        assert_eq!(err.kind(), ErrorKind::Auth);
        assert_eq!(err.kind().as_str(), "auth");
    }

    #[test]
    fn decryption_wraps_cause() {
        let cause = String::from_utf8(vec![0xff, 0xfe]).unwrap_err();
        let err: ProviderError = DecryptionError::from(cause).into();
        assert_eq!(err.kind(), ErrorKind::Decryption);
        assert!(
            err.to_string()
                .starts_with("failed to decrypt access token: decrypted token is not valid UTF-8")
        );
    }

    #[test]
    fn snippet_truncates_long_bodies() {
        let long = "x".repeat(BODY_SNIPPET_LEN + 40);
        let s = snippet(&long);
        assert_eq!(s.len(), BODY_SNIPPET_LEN + 3);
        assert!(s.ends_with("..."));
        assert_eq!(snippet("  short  "), "short");
    }

    #[test]
    fn snippet_respects_char_boundaries() {
        let body = "é".repeat(BODY_SNIPPET_LEN + 1);
        let s = snippet(&body);
        assert_eq!(s.chars().count(), BODY_SNIPPET_LEN + 3);
    }
}
