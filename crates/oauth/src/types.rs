use {
    secrecy::{ExposeSecret, Secret},
    serde::Serialize,
};

/// Characters of a token shown in previews.
pub const TOKEN_PREVIEW_LEN: usize = 20;

/// A bearer token. Only [`AccessToken::preview`] is safe to log or return.
#[derive(Clone)]
pub struct AccessToken(Secret<String>);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Secret::new(token.into()))
    }

    /// Full token value, for `Authorization` headers only.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// First [`TOKEN_PREVIEW_LEN`] characters followed by `...`.
    pub fn preview(&self) -> String {
        token_preview(self.expose())
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AccessToken").field(&self.preview()).finish()
    }
}

pub fn token_preview(token: &str) -> String {
    let head: String = token.chars().take(TOKEN_PREVIEW_LEN).collect();
    format!("{head}...")
}

/// Base64 ciphertext returned by the Aplos auth endpoint in encrypted-token
/// mode. Must be decrypted before use.
#[derive(Clone)]
pub struct EncryptedToken(String);

impl EncryptedToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for EncryptedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("EncryptedToken")
            .field(&format!("{} bytes", self.0.len()))
            .finish()
    }
}

/// Summary of an Aplos `accounts` listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountListing {
    /// First entry of `data.accounts`, `null` when the list is empty.
    pub sample_account: Option<serde_json::Value>,
    /// `meta.resource_count`, when present.
    pub resource_count: Option<u64>,
}
