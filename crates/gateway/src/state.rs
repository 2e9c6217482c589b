use std::sync::Arc;

use {
    steward_config::{HttpSettings, ResolvedConfig},
    steward_oauth::{AplosClient, VirtuousClient},
    tracing::debug,
};

/// Read-only state shared by every request. Holds provider clients only;
/// tokens are never stored here.
#[derive(Debug)]
pub struct GatewayState {
    pub version: String,
    pub aplos: Option<AplosClient>,
    pub virtuous: Option<VirtuousClient>,
}

impl GatewayState {
    pub fn new(aplos: Option<AplosClient>, virtuous: Option<VirtuousClient>) -> Arc<Self> {
        Arc::new(Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            aplos,
            virtuous,
        })
    }

    /// Build provider clients from validated config. Fails if the Aplos
    /// private key cannot be parsed.
    pub fn from_config(config: &ResolvedConfig) -> anyhow::Result<Arc<Self>> {
        let http = build_http_client(&config.http)?;
        let aplos = config
            .aplos
            .clone()
            .map(|creds| AplosClient::new(http.clone(), creds))
            .transpose()?;
        let virtuous = config
            .virtuous
            .clone()
            .map(|creds| VirtuousClient::new(http.clone(), creds));
        Ok(Self::new(aplos, virtuous))
    }

    /// One line per provider for the startup banner.
    pub fn provider_summary(&self) -> Vec<String> {
        let aplos = match &self.aplos {
            Some(client) => {
                let creds = client.credentials();
                let accounts = if creds.fetch_accounts {
                    " + accounts"
                } else {
                    ""
                };
                format!("aplos: {}{accounts}", creds.auth.mode().as_str())
            },
            None => "aplos: not configured".to_string(),
        };
        let virtuous = match &self.virtuous {
            Some(_) => "virtuous: password grant".to_string(),
            None => "virtuous: not configured".to_string(),
        };
        vec![aplos, virtuous]
    }
}

/// Shared outbound client. A timeout of `None` leaves reqwest's default
/// (no timeout).
pub fn build_http_client(settings: &HttpSettings) -> reqwest::Result<reqwest::Client> {
    let mut builder =
        reqwest::Client::builder().user_agent(concat!("steward/", env!("CARGO_PKG_VERSION")));
    if let Some(timeout) = settings.timeout {
        builder = builder.timeout(timeout);
    }
    debug!(timeout = ?settings.timeout, "building http client");
    builder.build()
}
