//! Configuration Types
//!
//! Application credentials and token cache capacity settings.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default identity provider instance. The tenant id is appended to form the authority.
pub const DEFAULT_INSTANCE: &str = "https://login.microsoftonline.com/";

/// Token endpoint path relative to the tenant authority.
pub const DEFAULT_TOKEN_PATH: &str = "oauth2/v2.0/token";

/// Default HTTP timeout for token requests.
pub const DEFAULT_TIMEOUT_MS: u64 = 30000;

/// Default lead time before expiry at which a cached token is no longer handed out.
pub const DEFAULT_REFRESH_BUFFER_SECS: u64 = 300;

/// Default number of token sets the cache is sized for.
pub const DEFAULT_MAX_ENTRIES: u64 = 100_000;

/// Default estimated size of one serialized token set, in bytes.
pub const DEFAULT_AVERAGE_ENTRY_SIZE: u64 = 2_500;

/// Confidential client application configuration.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Identity provider instance, e.g. `https://login.microsoftonline.com/`.
    pub instance: String,
    /// Tenant used when the caller does not name one.
    pub default_tenant_id: Option<String>,
    /// Client credentials.
    pub credentials: ClientCredentials,
    /// Scopes to request. Entries may themselves be comma separated.
    pub scopes: Vec<String>,
    /// HTTP timeout.
    pub timeout: Duration,
    /// Cached tokens expiring within this window are not reused.
    pub refresh_buffer: Duration,
}

impl AppConfig {
    /// Authority URL for a tenant (`{instance}{tenant_id}`).
    pub fn authority(&self, tenant_id: &str) -> String {
        if self.instance.ends_with('/') {
            format!("{}{}", self.instance, tenant_id)
        } else {
            format!("{}/{}", self.instance, tenant_id)
        }
    }

    /// Token endpoint for a tenant.
    pub fn token_endpoint(&self, tenant_id: &str) -> String {
        format!("{}/{}", self.authority(tenant_id), DEFAULT_TOKEN_PATH)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            instance: DEFAULT_INSTANCE.to_string(),
            default_tenant_id: None,
            credentials: ClientCredentials::default(),
            scopes: Vec::new(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            refresh_buffer: Duration::from_secs(DEFAULT_REFRESH_BUFFER_SECS),
        }
    }
}

/// Client credentials for the confidential client.
#[derive(Clone)]
pub struct ClientCredentials {
    /// Application (client) identifier.
    pub client_id: String,
    /// Client secret.
    pub client_secret: SecretString,
    /// How the secret is presented to the token endpoint.
    pub auth_method: ClientAuthMethod,
}

impl Default for ClientCredentials {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: SecretString::new(String::new()),
            auth_method: ClientAuthMethod::default(),
        }
    }
}

impl std::fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("auth_method", &self.auth_method)
            .finish()
    }
}

/// Client authentication method.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthMethod {
    /// client_id and client_secret in request body.
    #[default]
    ClientSecretPost,
    /// HTTP Basic Authentication header.
    ClientSecretBasic,
}

/// How a cache entry's weight is computed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeighingStrategy {
    /// Every entry is charged `average_entry_size` bytes.
    #[default]
    FixedEstimate,
    /// Every entry is charged its serialized length in bytes.
    SerializedSize,
}

/// Token cache capacity configuration.
///
/// The weight bound is `max_entries * average_entry_size`. With the
/// defaults (100k entries at ~2.5 KB) the cache stays around 250 MB.
/// Sizes are estimates; actual heap usage also depends on key length
/// and allocator overhead.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenCacheConfig {
    /// Number of average-sized entries the cache is sized for.
    pub max_entries: u64,
    /// Estimated serialized size of one entry, in bytes.
    pub average_entry_size: u64,
    /// Weighing strategy.
    pub weighing: WeighingStrategy,
}

impl TokenCacheConfig {
    /// Total weight bound in bytes.
    pub fn max_weight(&self) -> u64 {
        self.max_entries.saturating_mul(self.average_entry_size)
    }
}

impl Default for TokenCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            average_entry_size: DEFAULT_AVERAGE_ENTRY_SIZE,
            weighing: WeighingStrategy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authority_and_token_endpoint() {
        let config = AppConfig::default();
        assert_eq!(
            config.authority("contoso.onmicrosoft.com"),
            "https://login.microsoftonline.com/contoso.onmicrosoft.com"
        );
        assert_eq!(
            config.token_endpoint("tenant-a"),
            "https://login.microsoftonline.com/tenant-a/oauth2/v2.0/token"
        );

        let config = AppConfig {
            instance: "http://127.0.0.1:8080".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.token_endpoint("t1"),
            "http://127.0.0.1:8080/t1/oauth2/v2.0/token"
        );
    }

    #[test]
    fn test_default_cache_budget() {
        let config = TokenCacheConfig::default();
        assert_eq!(config.max_weight(), 250_000_000);
        assert!(config.max_weight() < 500 * 1024 * 1024);
    }

    #[test]
    fn test_cache_config_deserialize_partial() {
        let config: TokenCacheConfig =
            serde_json::from_str(r#"{"max_entries": 10, "weighing": "serialized_size"}"#).unwrap();
        assert_eq!(config.max_entries, 10);
        assert_eq!(config.average_entry_size, DEFAULT_AVERAGE_ENTRY_SIZE);
        assert_eq!(config.weighing, WeighingStrategy::SerializedSize);
    }

    #[test]
    fn test_credentials_debug_redacts_secret() {
        let credentials = ClientCredentials {
            client_id: "app".to_string(),
            client_secret: SecretString::new("s3cr3t".to_string()),
            auth_method: ClientAuthMethod::ClientSecretPost,
        };
        let debug = format!("{:?}", credentials);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("s3cr3t"));
    }
}
