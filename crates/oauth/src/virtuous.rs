//! Virtuous password-grant token exchange.

use {
    reqwest::Client,
    secrecy::ExposeSecret,
    steward_config::VirtuousCredentials,
    tracing::{debug, info},
};

use crate::{
    error::{Provider, ProviderError, Result},
    response::{read_token_response, string_at},
    types::AccessToken,
};

const PROVIDER: Provider = Provider::Virtuous;

#[derive(Clone)]
pub struct VirtuousClient {
    http: Client,
    credentials: VirtuousCredentials,
}

impl std::fmt::Debug for VirtuousClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtuousClient")
            .field("username", &self.credentials.username)
            .field("password", &"[REDACTED]")
            .field("token_url", &self.credentials.token_url)
            .finish()
    }
}

impl VirtuousClient {
    pub fn new(http: Client, credentials: VirtuousCredentials) -> Self {
        Self { http, credentials }
    }

    pub fn credentials(&self) -> &VirtuousCredentials {
        &self.credentials
    }

    pub async fn acquire_token(&self) -> Result<AccessToken> {
        let url = self.credentials.token_url.as_str();
        debug!(url, "requesting virtuous token (password grant)");

        let response = self
            .http
            .post(url)
            .form(&[
                ("grant_type", "password"),
                ("username", self.credentials.username.as_str()),
                ("password", self.credentials.password.expose_secret().as_str()),
            ])
            .send()
            .await
            .map_err(|source| ProviderError::Transport {
                provider: PROVIDER,
                source,
            })?;

        let body = read_token_response(PROVIDER, url, response).await?;
        let token = string_at(&body, "/access_token")
            .ok_or_else(|| ProviderError::protocol(PROVIDER, "response has no access_token"))?;

        let token = AccessToken::new(token);
        info!(token = %token.preview(), "virtuous access token acquired");
        Ok(token)
    }
}

/// One-shot form of [`VirtuousClient::acquire_token`].
pub async fn acquire_virtuous_token(
    http: &Client,
    credentials: &VirtuousCredentials,
) -> Result<AccessToken> {
    VirtuousClient::new(http.clone(), credentials.clone())
        .acquire_token()
        .await
}
