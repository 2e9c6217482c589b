//! Per-request orchestration: run each provider flow and fold the outcome
//! into a JSON report. A failing provider never affects the other one.

use {
    serde::Serialize,
    serde_json::Value,
    steward_oauth::{AccessToken, AccountListing, AplosClient, Provider, ProviderError},
    tracing::{info, warn},
};

use crate::state::GatewayState;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ProviderReport {
    Success {
        token_preview: String,
        /// Present (possibly `null`) only when accounts were fetched.
        #[serde(skip_serializing_if = "Option::is_none")]
        sample_account: Option<Option<Value>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        resource_count: Option<u64>,
    },
    Error {
        kind: &'static str,
        message: String,
    },
}

impl ProviderReport {
    pub fn success(token: &AccessToken, accounts: Option<AccountListing>) -> Self {
        let (sample_account, resource_count) = match accounts {
            Some(listing) => (Some(listing.sample_account), listing.resource_count),
            None => (None, None),
        };
        Self::Success {
            token_preview: token.preview(),
            sample_account,
            resource_count,
        }
    }

    pub fn from_error(err: &ProviderError) -> Self {
        Self::Error {
            kind: err.kind().as_str(),
            message: err.to_string(),
        }
    }

    pub fn not_configured(provider: Provider) -> Self {
        Self::Error {
            kind: "not_configured",
            message: format!("{provider} is not configured"),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GatewayReport {
    pub aplos: ProviderReport,
    pub virtuous: ProviderReport,
}

/// Aplos token, then accounts when enabled.
pub async fn run_aplos_flow(
    client: &AplosClient,
) -> Result<(AccessToken, Option<AccountListing>), ProviderError> {
    let token = client.acquire_token().await?;
    let accounts = if client.fetches_accounts() {
        Some(client.fetch_accounts(&token).await?)
    } else {
        None
    };
    Ok((token, accounts))
}

/// Run both provider flows, Aplos first, and collect the results.
pub async fn collect_report(state: &GatewayState) -> GatewayReport {
    let aplos = match &state.aplos {
        Some(client) => match run_aplos_flow(client).await {
            Ok((token, accounts)) => ProviderReport::success(&token, accounts),
            Err(e) => failed(Provider::Aplos, &e),
        },
        None => ProviderReport::not_configured(Provider::Aplos),
    };

    let virtuous = match &state.virtuous {
        Some(client) => match client.acquire_token().await {
            Ok(token) => ProviderReport::success(&token, None),
            Err(e) => failed(Provider::Virtuous, &e),
        },
        None => ProviderReport::not_configured(Provider::Virtuous),
    };

    info!(
        aplos = aplos.is_success(),
        virtuous = virtuous.is_success(),
        "provider report collected"
    );
    GatewayReport { aplos, virtuous }
}

fn failed(provider: Provider, err: &ProviderError) -> ProviderReport {
    warn!(%provider, kind = err.kind().as_str(), error = %err, "provider flow failed");
    ProviderReport::from_error(err)
}
