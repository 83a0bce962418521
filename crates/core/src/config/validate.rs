use super::{types::Config, AuthMethod, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - API key auth has a non-empty key
/// - Provider deadline is not 0
/// - Enabled providers have a URL
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.auth.method == AuthMethod::ApiKey
        && config.auth.api_key.as_ref().is_none_or(|k| k.is_empty())
    {
        return Err(ConfigError::ValidationError(
            "auth.api_key must be set when auth.method = \"api_key\"".to_string(),
        ));
    }

    if config.scraper.provider_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "scraper.provider_timeout_secs cannot be 0".to_string(),
        ));
    }

    let torrentio = &config.scraper.torrentio;
    if torrentio.enabled && torrentio.url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "scraper.torrentio.url cannot be empty when enabled".to_string(),
        ));
    }

    if let Some(debrid) = &config.debrid {
        if debrid.url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "debrid.url cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}
