//! Debrid credential lookup.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::config::DebridConfig;

/// Resolves the debrid service token that belongs to a caller.
///
/// Account storage lives outside this crate; implementations adapt whatever
/// holds the tokens.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Token for `user_id`, or `None` when the caller has not configured one.
    async fn debrid_token(&self, user_id: &str) -> Option<String>;
}

/// Credential store backed by the `[debrid]` config section.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialStore {
    default_token: Option<String>,
    user_tokens: HashMap<String, String>,
}

impl StaticCredentialStore {
    pub fn new(default_token: Option<String>, user_tokens: HashMap<String, String>) -> Self {
        Self {
            default_token: default_token.filter(|t| !t.is_empty()),
            user_tokens: user_tokens
                .into_iter()
                .filter(|(_, t)| !t.is_empty())
                .collect(),
        }
    }

    pub fn from_config(config: &DebridConfig) -> Self {
        Self::new(config.api_token.clone(), config.user_tokens.clone())
    }
}

#[async_trait]
impl CredentialStore for StaticCredentialStore {
    async fn debrid_token(&self, user_id: &str) -> Option<String> {
        self.user_tokens
            .get(user_id)
            .or(self.default_token.as_ref())
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_user_token_takes_precedence() {
        let mut users = HashMap::new();
        users.insert("alice".to_string(), "alice-token".to_string());
        let store = StaticCredentialStore::new(Some("shared".to_string()), users);

        assert_eq!(store.debrid_token("alice").await.as_deref(), Some("alice-token"));
        assert_eq!(store.debrid_token("bob").await.as_deref(), Some("shared"));
    }

    #[test]
    fn test_no_token_configured() {
        let store = StaticCredentialStore::default();
        assert!(tokio_test::block_on(store.debrid_token("anonymous")).is_none());
    }

    #[tokio::test]
    async fn test_empty_tokens_are_ignored() {
        let mut users = HashMap::new();
        users.insert("alice".to_string(), String::new());
        let store = StaticCredentialStore::new(Some(String::new()), users);

        assert!(store.debrid_token("alice").await.is_none());
        assert!(store.debrid_token("bob").await.is_none());
    }
}
