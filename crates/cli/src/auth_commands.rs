use {
    anyhow::{Result, anyhow},
    clap::Subcommand,
    steward_config::ResolvedConfig,
    steward_gateway::build_http_client,
    steward_oauth::{AplosClient, VirtuousClient},
};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Exchange Aplos credentials for an access token.
    Aplos,
    /// Exchange Virtuous username/password for an access token.
    Virtuous,
}

pub async fn handle_auth(action: AuthAction, config: &ResolvedConfig) -> Result<()> {
    match action {
        AuthAction::Aplos => {
            let client = aplos_client(config)?;
            println!("Requesting Aplos access token...");
            let token = client.acquire_token().await?;
            println!("Access token received: {}", token.preview());
        },
        AuthAction::Virtuous => {
            let creds = config
                .virtuous
                .clone()
                .ok_or_else(|| anyhow!("virtuous is not configured"))?;
            let client = VirtuousClient::new(build_http_client(&config.http)?, creds);
            println!("Requesting Virtuous access token...");
            let token = client.acquire_token().await?;
            println!("Access token received: {}", token.preview());
        },
    }
    Ok(())
}

pub async fn accounts(config: &ResolvedConfig) -> Result<()> {
    let client = aplos_client(config)?;
    let token = client.acquire_token().await?;
    let listing = client.fetch_accounts(&token).await?;

    match listing.resource_count {
        Some(count) => println!("{count} accounts"),
        None => println!("account count not reported"),
    }
    match listing.sample_account {
        Some(account) => println!("{}", serde_json::to_string_pretty(&account)?),
        None => println!("no accounts"),
    }
    Ok(())
}

pub fn check(config: &ResolvedConfig) -> Result<()> {
    // Parses the private key as a side effect.
    let state = steward_gateway::GatewayState::from_config(config)?;
    for line in state.provider_summary() {
        println!("{line}");
    }
    if state.aplos.is_none() && state.virtuous.is_none() {
        println!("warning: no providers configured");
    }
    Ok(())
}

fn aplos_client(config: &ResolvedConfig) -> Result<AplosClient> {
    let creds = config
        .aplos
        .clone()
        .ok_or_else(|| anyhow!("aplos is not configured"))?;
    Ok(AplosClient::new(build_http_client(&config.http)?, creds)?)
}
