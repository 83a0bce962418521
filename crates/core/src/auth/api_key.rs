//! API key authentication.

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use super::{AuthError, AuthRequest, Authenticator, Identity};

/// Authenticator that validates requests against a configured API key.
///
/// Accepts the key in either `Authorization: Bearer <key>` or
/// `X-API-Key: <key>`.
pub struct ApiKeyAuthenticator {
    expected_digest: [u8; 32],
}

impl ApiKeyAuthenticator {
    pub fn new(api_key: String) -> Self {
        Self {
            expected_digest: Sha256::digest(api_key.as_bytes()).into(),
        }
    }

    fn extract_key(request: &AuthRequest) -> Option<&str> {
        if let Some(auth_header) = request.headers.get("authorization") {
            let mut parts = auth_header.splitn(2, ' ');
            if let (Some(scheme), Some(key)) = (parts.next(), parts.next()) {
                if scheme.eq_ignore_ascii_case("bearer") {
                    return Some(key.trim());
                }
            }
        }

        request.headers.get("x-api-key").map(|k| k.trim())
    }
}

#[async_trait]
impl Authenticator for ApiKeyAuthenticator {
    async fn authenticate(&self, request: &AuthRequest) -> Result<Identity, AuthError> {
        let provided = Self::extract_key(request).ok_or(AuthError::NotAuthenticated)?;

        // Comparing fixed-size digests keeps the check independent of key length.
        let provided_digest: [u8; 32] = Sha256::digest(provided.as_bytes()).into();
        let diff = provided_digest
            .iter()
            .zip(self.expected_digest.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b));

        if diff == 0 {
            Ok(Identity {
                user_id: "api_key_user".to_string(),
                method: "api_key".to_string(),
            })
        } else {
            Err(AuthError::InvalidCredentials("Invalid API key".to_string()))
        }
    }

    fn method_name(&self) -> &'static str {
        "api_key"
    }
}
