use cachette::{
    config::AppConfig,
    secrets::{Issuer, Redeemer},
    vault::VaultClient,
    web,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging first
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cachette=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Cachette v{}", env!("CARGO_PKG_VERSION"));

    // Pick up .env before reading configuration
    dotenvy::dotenv().ok();

    let config = AppConfig::init()?;
    info!("Configuration loaded");

    // Refuse to start without the privileged minting credential
    if config.vault.master_token.is_empty() {
        error!("Vault master token not configured!");
        error!("Set vault.master_token in config/local.toml or the CACHETTE_VAULT__MASTER_TOKEN env var");
        return Err(anyhow::anyhow!("Vault master token not configured"));
    }

    let vault = VaultClient::new(&config.vault);

    // Probe the backing store; a down store is worth a warning, not a
    // refusal — requests will fail until it returns
    match vault.health().await {
        Ok(health) if health.sealed => {
            warn!(
                "Backing store at {} is sealed. Issuance and redemption will fail until it is unsealed.",
                config.vault.addr
            );
        }
        Ok(health) => {
            info!(
                "Backing store healthy: version={}, initialized={}",
                health.version, health.initialized
            );
        }
        Err(e) => {
            warn!(
                "Backing store not reachable: {}. \
                Issuance and redemption will fail until the store is available.",
                e
            );
        }
    }

    let issuer = Arc::new(Issuer::new(
        vault.clone(),
        config.vault.master_token.clone(),
        config,
    ));
    let redeemer = Arc::new(Redeemer::new(vault, config));

    let state = web::AppState {
        issuer,
        redeemer,
        public_url: config.web.public_url.clone(),
    };
    let app = web::create_router(state);

    let addr = format!("{}:{}", config.web.host, config.web.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Web server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
