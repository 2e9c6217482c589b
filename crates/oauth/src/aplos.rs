//! Aplos token exchange and account listing.
//!
//! Token contract: the token is always read from `data.token`. In
//! client-credentials mode it is the bearer token itself; in encrypted-token
//! mode it is base64 RSA ciphertext.

use {
    reqwest::{Client, Url},
    rsa::RsaPrivateKey,
    secrecy::{ExposeSecret, Secret},
    serde_json::Value,
    steward_config::{AplosAuth, AplosCredentials},
    tracing::{debug, info},
};

use crate::{
    decrypt::{decrypt_token, load_private_key},
    error::{Provider, ProviderError, Result, snippet},
    response::{read_token_response, string_at},
    types::{AccessToken, AccountListing, EncryptedToken},
};

const PROVIDER: Provider = Provider::Aplos;
const ACCOUNTS: &str = "aplos accounts";

/// Prepend `https://` when there is no scheme and make sure the URL ends in
/// exactly one `/`.
pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim();
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed.trim_start_matches('/'))
    };
    format!("{}/", with_scheme.trim_end_matches('/'))
}

/// `<base>/auth/<client_id>` for the encrypted-token flow. The client id is
/// percent-encoded as a single path segment.
pub fn auth_url(base: &str, client_id: &str) -> Result<String> {
    let mut url = Url::parse(&normalize_base_url(base))
        .map_err(|e| ProviderError::protocol(PROVIDER, format!("invalid auth base URL: {e}")))?;
    url.path_segments_mut()
        .map_err(|()| ProviderError::protocol(PROVIDER, "auth base URL cannot carry a path"))?
        .pop_if_empty()
        .extend(["auth", client_id]);
    Ok(url.into())
}

/// `<base>/accounts`.
pub fn accounts_url(base: &str) -> String {
    format!("{}accounts", normalize_base_url(base))
}

/// Aplos API client bound to one set of credentials.
#[derive(Clone)]
pub struct AplosClient {
    http: Client,
    credentials: AplosCredentials,
    key: Option<RsaPrivateKey>,
}

impl std::fmt::Debug for AplosClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AplosClient")
            .field("client_id", &self.credentials.client_id)
            .field("mode", &self.credentials.auth.mode().as_str())
            .field("key", &self.key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl AplosClient {
    /// Build a client. In encrypted-token mode the private key is parsed here
    /// so a bad key fails at startup rather than on the first request.
    pub fn new(http: Client, credentials: AplosCredentials) -> Result<Self> {
        let key = match &credentials.auth {
            AplosAuth::PrivateKey(pem) => Some(load_private_key(pem.expose_secret())?),
            AplosAuth::ClientSecret(_) => None,
        };
        Ok(Self {
            http,
            credentials,
            key,
        })
    }

    pub fn credentials(&self) -> &AplosCredentials {
        &self.credentials
    }

    /// Whether accounts should be fetched after authenticating.
    pub fn fetches_accounts(&self) -> bool {
        self.credentials.fetch_accounts
    }

    /// Obtain a usable bearer token using the configured auth mode.
    pub async fn acquire_token(&self) -> Result<AccessToken> {
        let token = match (&self.credentials.auth, &self.key) {
            (AplosAuth::ClientSecret(secret), _) => self.client_credentials_token(secret).await?,
            (AplosAuth::PrivateKey(_), Some(key)) => {
                let encrypted = self.request_encrypted_token().await?;
                decrypt_token(encrypted.as_str(), key)?
            },
            (AplosAuth::PrivateKey(pem), None) => {
                let key = load_private_key(pem.expose_secret())?;
                let encrypted = self.request_encrypted_token().await?;
                decrypt_token(encrypted.as_str(), &key)?
            },
        };
        info!(token = %token.preview(), "aplos access token acquired");
        Ok(token)
    }

    async fn client_credentials_token(&self, secret: &Secret<String>) -> Result<AccessToken> {
        let Some(url) = self.credentials.token_url.as_deref() else {
            return Err(ProviderError::protocol(PROVIDER, "no token endpoint configured"));
        };
        debug!(url, "requesting aplos token (client credentials)");

        let response = self
            .http
            .post(url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", secret.expose_secret().as_str()),
            ])
            .send()
            .await
            .map_err(|source| ProviderError::Transport {
                provider: PROVIDER,
                source,
            })?;

        let body = read_token_response(PROVIDER, url, response).await?;
        let token = string_at(&body, "/data/token")
            .ok_or_else(|| ProviderError::protocol(PROVIDER, "response has no data.token"))?;
        Ok(AccessToken::new(token))
    }

    /// GET `/auth/{client_id}`; the returned token still needs decrypting.
    pub async fn request_encrypted_token(&self) -> Result<EncryptedToken> {
        let Some(base) = self.credentials.auth_base() else {
            return Err(ProviderError::protocol(PROVIDER, "no auth base URL configured"));
        };
        let url = auth_url(base, &self.credentials.client_id)?;
        debug!(url = %url, "requesting aplos token (encrypted)");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| ProviderError::Transport {
                provider: PROVIDER,
                source,
            })?;

        let body = read_token_response(PROVIDER, &url, response).await?;
        let token = string_at(&body, "/data/token").ok_or_else(|| {
            ProviderError::protocol(PROVIDER, "response has no string data.token")
        })?;
        Ok(EncryptedToken::new(token))
    }

    /// Fetch accounts from the configured `base_url`.
    pub async fn fetch_accounts(&self, token: &AccessToken) -> Result<AccountListing> {
        let Some(base) = self.credentials.base_url.as_deref() else {
            return Err(ProviderError::fetch(ACCOUNTS, None, "no base URL configured"));
        };
        fetch_aplos_accounts(&self.http, token, base).await
    }
}

/// One-shot form of [`AplosClient::acquire_token`].
pub async fn acquire_aplos_token(
    http: &Client,
    credentials: &AplosCredentials,
) -> Result<AccessToken> {
    AplosClient::new(http.clone(), credentials.clone())?
        .acquire_token()
        .await
}

/// GET `<base_url>/accounts` with bearer auth.
pub async fn fetch_aplos_accounts(
    http: &Client,
    token: &AccessToken,
    base_url: &str,
) -> Result<AccountListing> {
    let url = accounts_url(base_url);
    debug!(url = %url, "fetching aplos accounts");

    let response = http
        .get(&url)
        .bearer_auth(token.expose())
        .send()
        .await
        .map_err(|e| ProviderError::fetch(ACCOUNTS, None, e.to_string()))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ProviderError::fetch(ACCOUNTS, Some(status.as_u16()), e.to_string()))?;

    if !status.is_success() {
        return Err(ProviderError::fetch(
            ACCOUNTS,
            Some(status.as_u16()),
            format!("status {}: {}", status.as_u16(), snippet(&body)),
        ));
    }

    let listing = parse_accounts(&body)
        .map_err(|reason| ProviderError::fetch(ACCOUNTS, Some(status.as_u16()), reason))?;
    debug!(
        resource_count = listing.resource_count,
        has_sample = listing.sample_account.is_some(),
        "aplos accounts fetched"
    );
    Ok(listing)
}

fn parse_accounts(body: &str) -> std::result::Result<AccountListing, String> {
    if body.trim().is_empty() {
        return Err("empty response body".into());
    }
    let value: Value = serde_json::from_str(body).map_err(|e| format!("invalid JSON: {e}"))?;
    let accounts = value
        .pointer("/data/accounts")
        .and_then(Value::as_array)
        .ok_or("response has no data.accounts list")?;

    Ok(AccountListing {
        sample_account: accounts.first().cloned(),
        resource_count: value.pointer("/meta/resource_count").and_then(Value::as_u64),
    })
}
