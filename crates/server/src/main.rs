use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use debridge_core::{
    config::DebridBackend, create_authenticator, load_config, validate_config, Authenticator,
    Config, CredentialStore, DebridResolver, RealDebridClient, ResolverOptions,
    ScrapeCoordinator, StaticCredentialStore, StreamProvider, TorrentioProvider,
};
use debridge_server::{api::create_router, state::AppState};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("debridge v{}", VERSION);

    // Determine config path
    let config_path = std::env::var("DEBRIDGE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Auth method: {:?}", config.auth.method);

    // Create authenticator
    let authenticator: Arc<dyn Authenticator> = Arc::from(
        create_authenticator(&config.auth).context("Failed to create authenticator")?,
    );
    info!("Using authenticator: {}", authenticator.method_name());

    // Stream providers
    let providers = build_providers(&config)?;
    if providers.is_empty() {
        warn!("No stream providers enabled, scrapes will return no candidates");
    }
    let coordinator = ScrapeCoordinator::new(
        providers,
        Duration::from_secs(u64::from(config.scraper.provider_timeout_secs)),
    )
    .context("Failed to create scrape coordinator")?;
    info!(providers = ?coordinator.provider_names(), "Scrape coordinator ready");

    // Debrid backend
    let (resolver, credentials) = build_debrid(&config)?;

    let state = Arc::new(AppState::new(
        config.clone(),
        authenticator,
        coordinator,
        resolver,
        credentials,
    ));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

fn build_providers(config: &Config) -> Result<Vec<Arc<dyn StreamProvider>>> {
    let mut providers: Vec<Arc<dyn StreamProvider>> = Vec::new();

    let torrentio = &config.scraper.torrentio;
    if torrentio.enabled {
        info!("Initializing Torrentio provider at {}", torrentio.url);
        let provider = TorrentioProvider::new(torrentio.clone())
            .context("Failed to create Torrentio provider")?;
        providers.push(Arc::new(provider));
    } else {
        info!("Torrentio provider disabled in config");
    }

    Ok(providers)
}

fn build_debrid(
    config: &Config,
) -> Result<(Option<DebridResolver>, Arc<dyn CredentialStore>)> {
    let Some(debrid) = &config.debrid else {
        info!("Debrid backend not configured");
        return Ok((None, Arc::new(StaticCredentialStore::default())));
    };

    let client = match debrid.backend {
        DebridBackend::RealDebrid => {
            info!("Initializing Real-Debrid client at {}", debrid.url);
            Arc::new(RealDebridClient::new(debrid).context("Failed to create Real-Debrid client")?)
        }
    };

    let resolver = DebridResolver::new(
        client,
        ResolverOptions {
            select_all_files: debrid.select_all_files,
        },
    );
    info!(backend = resolver.backend_name(), "Debrid resolver ready");
    let credentials = StaticCredentialStore::from_config(debrid);

    Ok((Some(resolver), Arc::new(credentials)))
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
