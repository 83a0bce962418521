pub mod auth;
pub mod config;
pub mod debrid;
pub mod metrics;
pub mod scraper;
pub mod testing;

pub use auth::{
    create_authenticator, ApiKeyAuthenticator, AuthError, AuthRequest, Authenticator,
    CredentialStore, Identity, NoneAuthenticator, StaticCredentialStore,
};
pub use config::{
    load_config, load_config_from_str, validate_config, AuthMethod, Config, ConfigError,
    SanitizedConfig,
};
pub use debrid::{
    DebridAccount, DebridClient, DebridClientError, DebridError, DebridResolver,
    RealDebridClient, ResolutionOutcome, ResolveRequest, ResolverOptions, UnrestrictedLink,
};
pub use scraper::{
    CoordinatorError, MediaType, ProviderError, ProviderStatus, Quality, ScrapeCoordinator, ScrapeRequest,
    ScrapeResult, StreamCandidate, StreamProvider, TorrentioProvider,
};
