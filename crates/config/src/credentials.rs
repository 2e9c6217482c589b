//! Validated, immutable provider credentials built once at startup.

use std::time::Duration;

use secrecy::Secret;

/// Default outbound request timeout.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Fully validated configuration. A provider is `None` when it has no
/// configuration at all.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub aplos: Option<AplosCredentials>,
    pub virtuous: Option<VirtuousCredentials>,
    pub http: HttpSettings,
}

/// Which Aplos authentication contract to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AplosAuthMode {
    /// POST `grant_type=client_credentials`, token returned in clear.
    ClientCredentials,
    /// GET `/auth/{client_id}`, token returned RSA-encrypted.
    EncryptedToken,
}

impl AplosAuthMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ClientCredentials => "client_credentials",
            Self::EncryptedToken => "encrypted_token",
        }
    }
}

#[derive(Debug, Clone)]
pub enum AplosAuth {
    ClientSecret(Secret<String>),
    /// PEM text exactly as configured (escaped newlines are normalized when
    /// the key is parsed).
    PrivateKey(Secret<String>),
}

impl AplosAuth {
    pub fn mode(&self) -> AplosAuthMode {
        match self {
            Self::ClientSecret(_) => AplosAuthMode::ClientCredentials,
            Self::PrivateKey(_) => AplosAuthMode::EncryptedToken,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AplosCredentials {
    pub client_id: String,
    pub auth: AplosAuth,
    pub token_url: Option<String>,
    pub base_url: Option<String>,
    pub fetch_accounts: bool,
}

impl AplosCredentials {
    /// Base URL the encrypted-token flow appends `auth/{client_id}` to.
    /// `token_url` wins over `base_url`.
    pub fn auth_base(&self) -> Option<&str> {
        self.token_url.as_deref().or(self.base_url.as_deref())
    }
}

#[derive(Debug, Clone)]
pub struct VirtuousCredentials {
    pub username: String,
    pub password: Secret<String>,
    pub token_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpSettings {
    /// `None` means no timeout.
    pub timeout: Option<Duration>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: Some(DEFAULT_HTTP_TIMEOUT),
        }
    }
}
