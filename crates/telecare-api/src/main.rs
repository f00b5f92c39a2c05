//! Telecare API server.
//!
//! This binary runs the plugin HTTP surface against the in-memory host
//! backends. A real deployment embeds the crates into the host EMR and
//! supplies its own `DeviceStore`/`PresetStore`/`PermissionBackend`
//! implementations; the standalone server exists for development and
//! integration testing against field gateways.
//!
//! # Dev mode
//!
//! Build with `--features dev-mode` to use the embedded test signing key
//! instead of `ISSUER_PRIVATE_KEY_FILE`/`ISSUER_JWKS_FILE`.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(not(feature = "dev-mode"))]
use telecare_auth::{IssuerConfig, TokenIssuer};
use telecare_devices::{install_default_plugins, PluginContext};
use telecare_emr::{AllowAll, MemoryStore};
use telecare_registry::DeviceTypeRegistry;

use telecare_api::tasks::spawn_preset_cleanup;
use telecare_api::{create_router, ApiConfig, ApiState, HostBackends};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,telecare=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting telecare API server");

    let config = ApiConfig {
        listen_addr: std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into()),
        production: std::env::var("PRODUCTION").is_ok_and(|v| v == "true" || v == "1"),
        ..ApiConfig::default()
    };

    tracing::info!(
        listen_addr = %config.listen_addr,
        production = config.production,
        "Configuration loaded"
    );

    // Token issuer.
    #[cfg(feature = "dev-mode")]
    let issuer = {
        tracing::warn!("DEV MODE ENABLED - signing relay tokens with the embedded test key");
        Arc::new(telecare_auth::test_keys::issuer())
    };

    #[cfg(not(feature = "dev-mode"))]
    let issuer = {
        let key_path = std::env::var("ISSUER_PRIVATE_KEY_FILE")?;
        let jwks_path = std::env::var("ISSUER_JWKS_FILE")?;
        let private_key_pem = std::fs::read_to_string(key_path)?;
        let public_jwks = serde_json::from_str(&std::fs::read_to_string(jwks_path)?)?;

        Arc::new(TokenIssuer::new(IssuerConfig {
            private_key_pem,
            key_id: std::env::var("ISSUER_KEY_ID").ok(),
            issuer: std::env::var("ISSUER_IDENTITY")
                .unwrap_or_else(|_| "telecare-platform".into()),
            token_lifetime_secs: IssuerConfig::DEFAULT_LIFETIME_SECS,
            public_jwks,
        })?)
    };
    tracing::info!("Token issuer initialized");

    // Host backends. The standalone server runs on the in-memory store
    // with permissive authorization; embedded deployments supply the
    // host's implementations here.
    let store = Arc::new(MemoryStore::new());
    tracing::warn!("Using in-memory store - state does not survive restarts");
    let backends = HostBackends {
        devices: store.clone(),
        presets: store.clone(),
        reports: store.clone(),
        observations: store,
        permissions: Arc::new(AllowAll),
    };

    // Device-type registry: register plugins in dependency order, then
    // seal before serving. Failures here abort startup.
    let mut registry = DeviceTypeRegistry::new();
    let plugin_ctx = PluginContext {
        devices: backends.devices.clone(),
    };
    install_default_plugins(&mut registry, &plugin_ctx)?;
    registry.seal();
    tracing::info!(device_types = ?registry.tags(), "Device-type registry sealed");

    let state = Arc::new(ApiState::new(
        Arc::new(registry),
        &backends,
        issuer,
        config.clone(),
    ));

    // Daily orphaned-preset cleanup.
    let _cleanup = spawn_preset_cleanup(state.presets.clone());

    let app = create_router(state);
    tracing::info!(listen_addr = %config.listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
