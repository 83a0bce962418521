use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::IpAddr;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub auth: AuthConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub debrid: Option<DebridConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// Authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub method: AuthMethod,
    /// API key (required when method = "api_key")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    None,
    ApiKey,
}

/// Scrape coordinator configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScraperConfig {
    /// Deadline applied to each provider call; a provider that exceeds it
    /// contributes no candidates.
    #[serde(default = "default_provider_timeout")]
    pub provider_timeout_secs: u32,
    /// Torrentio provider (enabled by default)
    #[serde(default)]
    pub torrentio: TorrentioConfig,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            provider_timeout_secs: default_provider_timeout(),
            torrentio: TorrentioConfig::default(),
        }
    }
}

fn default_provider_timeout() -> u32 {
    15
}

/// Torrentio stream index configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TorrentioConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Base URL (e.g., "https://torrentio.strem.fun")
    #[serde(default = "default_torrentio_url")]
    pub url: String,
    /// Options path segment (sorting and quality filters). Empty disables it.
    #[serde(default = "default_torrentio_options")]
    pub options: String,
    /// HTTP request timeout in seconds (default: 15)
    #[serde(default = "default_torrentio_timeout")]
    pub timeout_secs: u32,
    /// User-Agent header; the public instance rejects unknown clients.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for TorrentioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: default_torrentio_url(),
            options: default_torrentio_options(),
            timeout_secs: default_torrentio_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_torrentio_url() -> String {
    "https://torrentio.strem.fun".to_string()
}

fn default_torrentio_options() -> String {
    "sort=size|qualityfilter=other,scr,cam,unknown".to_string()
}

fn default_torrentio_timeout() -> u32 {
    15
}

/// Browser-like User-Agent; some public endpoints reject unknown clients.
pub fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}

/// Debrid service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DebridConfig {
    /// Debrid backend type
    pub backend: DebridBackend,
    /// REST API base URL
    #[serde(default = "default_debrid_url")]
    pub url: String,
    /// Request timeout in seconds (default: 20)
    #[serde(default = "default_debrid_timeout")]
    pub timeout_secs: u32,
    /// Select every file instead of only the resolved one when the service
    /// waits for a file selection.
    #[serde(default)]
    pub select_all_files: bool,
    /// Token used for callers without a dedicated entry in `user_tokens`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    /// Per-user tokens (user id -> token)
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub user_tokens: HashMap<String, String>,
}

/// Available debrid backends
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DebridBackend {
    RealDebrid,
}

fn default_debrid_url() -> String {
    "https://api.real-debrid.com/rest/1.0".to_string()
}

fn default_debrid_timeout() -> u32 {
    20
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub auth: SanitizedAuthConfig,
    pub server: ServerConfig,
    pub scraper: ScraperConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debrid: Option<SanitizedDebridConfig>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAuthConfig {
    pub method: String,
    pub api_key_configured: bool,
}

/// Sanitized debrid config (tokens hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedDebridConfig {
    pub backend: String,
    pub url: String,
    pub timeout_secs: u32,
    pub select_all_files: bool,
    pub api_token_configured: bool,
    pub user_tokens_configured: usize,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            auth: SanitizedAuthConfig {
                method: match config.auth.method {
                    AuthMethod::None => "none".to_string(),
                    AuthMethod::ApiKey => "api_key".to_string(),
                },
                api_key_configured: config
                    .auth
                    .api_key
                    .as_ref()
                    .is_some_and(|k| !k.is_empty()),
            },
            server: config.server.clone(),
            scraper: config.scraper.clone(),
            debrid: config.debrid.as_ref().map(|d| SanitizedDebridConfig {
                backend: match d.backend {
                    DebridBackend::RealDebrid => "real_debrid".to_string(),
                },
                url: d.url.clone(),
                timeout_secs: d.timeout_secs,
                select_all_files: d.select_all_files,
                api_token_configured: d.api_token.as_ref().is_some_and(|t| !t.is_empty()),
                user_tokens_configured: d.user_tokens.len(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_config() {
        let toml = r#"
[auth]
method = "none"

[server]
host = "127.0.0.1"
port = 9000
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.auth.method, AuthMethod::None);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host.to_string(), "127.0.0.1");
        assert!(config.debrid.is_none());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let toml = r#"
[auth]
method = "none"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.scraper.provider_timeout_secs, 15);
        assert!(config.scraper.torrentio.enabled);
        assert_eq!(config.scraper.torrentio.url, "https://torrentio.strem.fun");
        assert!(config.scraper.torrentio.options.contains("qualityfilter"));
    }

    #[test]
    fn test_deserialize_missing_auth_fails() {
        let toml = r#"
[server]
port = 8080
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_debrid_config() {
        let toml = r#"
[auth]
method = "api_key"
api_key = "secret"

[debrid]
backend = "real_debrid"
api_token = "rd-token"

[debrid.user_tokens]
alice = "alice-token"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let debrid = config.debrid.as_ref().unwrap();
        assert_eq!(debrid.backend, DebridBackend::RealDebrid);
        assert_eq!(debrid.url, "https://api.real-debrid.com/rest/1.0");
        assert_eq!(debrid.timeout_secs, 20);
        assert!(!debrid.select_all_files);
        assert_eq!(debrid.api_token.as_deref(), Some("rd-token"));
        assert_eq!(debrid.user_tokens.get("alice").unwrap(), "alice-token");
    }

    #[test]
    fn test_deserialize_disabled_torrentio() {
        let toml = r#"
[auth]
method = "none"

[scraper]
provider_timeout_secs = 5

[scraper.torrentio]
enabled = false
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.scraper.provider_timeout_secs, 5);
        assert!(!config.scraper.torrentio.enabled);
        assert_eq!(config.scraper.torrentio.timeout_secs, 15);
    }

    #[test]
    fn test_sanitized_config_hides_secrets() {
        let mut user_tokens = HashMap::new();
        user_tokens.insert("bob".to_string(), "bob-secret".to_string());

        let config = Config {
            auth: AuthConfig {
                method: AuthMethod::ApiKey,
                api_key: Some("api-secret".to_string()),
            },
            server: ServerConfig::default(),
            scraper: ScraperConfig::default(),
            debrid: Some(DebridConfig {
                backend: DebridBackend::RealDebrid,
                url: default_debrid_url(),
                timeout_secs: 20,
                select_all_files: true,
                api_token: Some("rd-secret".to_string()),
                user_tokens,
            }),
        };

        let sanitized = SanitizedConfig::from(&config);
        assert_eq!(sanitized.auth.method, "api_key");
        assert!(sanitized.auth.api_key_configured);

        let debrid = sanitized.debrid.as_ref().unwrap();
        assert_eq!(debrid.backend, "real_debrid");
        assert!(debrid.api_token_configured);
        assert_eq!(debrid.user_tokens_configured, 1);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("api-secret"));
        assert!(!json.contains("rd-secret"));
        assert!(!json.contains("bob-secret"));
    }
}
