use std::sync::Arc;

use debridge_core::{
    Authenticator, Config, CredentialStore, DebridResolver, SanitizedConfig, ScrapeCoordinator,
};

/// Shared application state
pub struct AppState {
    config: Config,
    authenticator: Arc<dyn Authenticator>,
    coordinator: ScrapeCoordinator,
    resolver: Option<DebridResolver>,
    credentials: Arc<dyn CredentialStore>,
}

impl AppState {
    pub fn new(
        config: Config,
        authenticator: Arc<dyn Authenticator>,
        coordinator: ScrapeCoordinator,
        resolver: Option<DebridResolver>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            config,
            authenticator,
            coordinator,
            resolver,
            credentials,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn authenticator(&self) -> &dyn Authenticator {
        self.authenticator.as_ref()
    }

    pub fn coordinator(&self) -> &ScrapeCoordinator {
        &self.coordinator
    }

    /// Debrid resolver, `None` when no `[debrid]` section is configured.
    pub fn resolver(&self) -> Option<&DebridResolver> {
        self.resolver.as_ref()
    }

    pub fn credentials(&self) -> &dyn CredentialStore {
        self.credentials.as_ref()
    }
}
