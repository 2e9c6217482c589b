use std::time::Duration;

use {
    secrecy::{ExposeSecret, Secret},
    tracing::{debug, warn},
};

use crate::{
    credentials::{
        AplosAuth, AplosCredentials, HttpSettings, ResolvedConfig, VirtuousCredentials,
    },
    error::ConfigError,
    loader::vars,
    schema::{AplosSection, HttpSection, StewardConfig, VirtuousSection},
};

impl StewardConfig {
    /// Validate the merged config into typed credentials.
    ///
    /// A provider with no configuration at all is disabled. A provider with
    /// some but not all of its required fields is an error, so a typo in one
    /// variable never silently turns a provider off.
    pub fn resolve(&self) -> Result<ResolvedConfig, ConfigError> {
        Ok(ResolvedConfig {
            aplos: resolve_aplos(&self.aplos)?,
            virtuous: resolve_virtuous(&self.virtuous)?,
            http: resolve_http(&self.http),
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn non_empty_secret(value: &Option<Secret<String>>) -> Option<Secret<String>> {
    value
        .as_ref()
        .filter(|s| !s.expose_secret().trim().is_empty())
        .cloned()
}

/// Token endpoints must be absolute http(s) URLs.
fn check_endpoint(var: &'static str, value: &str) -> Result<(), ConfigError> {
    let parsed = url::Url::parse(value).map_err(|e| ConfigError::InvalidUrl {
        var,
        value: value.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::InvalidUrl {
            var,
            value: value.to_string(),
            reason: format!("unsupported scheme {other:?}"),
        }),
    }
}

fn resolve_aplos(section: &AplosSection) -> Result<Option<AplosCredentials>, ConfigError> {
    if section.is_empty() {
        debug!("aplos not configured, provider disabled");
        return Ok(None);
    }

    let client_id = non_empty(&section.client_id).ok_or(ConfigError::Missing {
        provider: "aplos",
        var: vars::APLOS_CLIENT_ID,
        mode: "any auth mode",
    })?;
    let token_url = non_empty(&section.token_url);
    let base_url = non_empty(&section.base_url);

    let private_key = non_empty_secret(&section.private_key);
    let client_secret = non_empty_secret(&section.client_secret);

    let auth = match (private_key, client_secret) {
        (Some(key), secret) => {
            if secret.is_some() {
                warn!("both APLOS_PRIVATE_KEY and APLOS_SECRET set, using encrypted-token mode");
            }
            if token_url.is_none() && base_url.is_none() {
                return Err(ConfigError::MissingOneOf {
                    provider: "aplos",
                    what: "encrypted-token mode needs an auth base URL",
                    vars: "APLOS_TOKEN_URL or APLOS_BASE_URL",
                });
            }
            AplosAuth::PrivateKey(key)
        },
        (None, Some(secret)) => {
            let Some(url) = token_url.as_deref() else {
                return Err(ConfigError::Missing {
                    provider: "aplos",
                    var: vars::APLOS_TOKEN_URL,
                    mode: "client-credentials mode",
                });
            };
            check_endpoint(vars::APLOS_TOKEN_URL, url)?;
            AplosAuth::ClientSecret(secret)
        },
        (None, None) => {
            return Err(ConfigError::MissingOneOf {
                provider: "aplos",
                what: "no secret material configured",
                vars: "APLOS_PRIVATE_KEY or APLOS_SECRET",
            });
        },
    };

    let fetch_accounts = match section.fetch_accounts {
        Some(true) if base_url.is_none() => {
            return Err(ConfigError::Missing {
                provider: "aplos",
                var: vars::APLOS_BASE_URL,
                mode: "account fetch",
            });
        },
        Some(flag) => flag,
        None => base_url.is_some(),
    };

    debug!(
        mode = auth.mode().as_str(),
        fetch_accounts, "aplos credentials loaded"
    );

    Ok(Some(AplosCredentials {
        client_id,
        auth,
        token_url,
        base_url,
        fetch_accounts,
    }))
}

fn resolve_virtuous(
    section: &VirtuousSection,
) -> Result<Option<VirtuousCredentials>, ConfigError> {
    if section.is_empty() {
        debug!("virtuous not configured, provider disabled");
        return Ok(None);
    }

    let missing = |var| ConfigError::Missing {
        provider: "virtuous",
        var,
        mode: "password grant",
    };

    let username = non_empty(&section.username).ok_or_else(|| missing(vars::VIRTUOUS_USERNAME))?;
    let password =
        non_empty_secret(&section.password).ok_or_else(|| missing(vars::VIRTUOUS_PASSWORD))?;
    let token_url =
        non_empty(&section.token_url).ok_or_else(|| missing(vars::VIRTUOUS_TOKEN_URL))?;
    check_endpoint(vars::VIRTUOUS_TOKEN_URL, &token_url)?;

    debug!("virtuous credentials loaded");

    Ok(Some(VirtuousCredentials {
        username,
        password,
        token_url,
    }))
}

fn resolve_http(section: &HttpSection) -> HttpSettings {
    match section.timeout_secs {
        Some(0) => HttpSettings { timeout: None },
        Some(secs) => HttpSettings {
            timeout: Some(Duration::from_secs(secs)),
        },
        None => HttpSettings::default(),
    }
}
