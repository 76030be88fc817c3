//! Configuration Builders
//!
//! Fluent builders for the confidential client and the token cache.

use secrecy::SecretString;
use std::time::Duration;
use url::Url;

use crate::error::{ConfigurationError, OAuth2Error};
use crate::token::normalize_scopes;
use crate::types::{
    AppConfig, ClientAuthMethod, ClientCredentials, TokenCacheConfig, WeighingStrategy,
    DEFAULT_INSTANCE, DEFAULT_REFRESH_BUFFER_SECS, DEFAULT_TIMEOUT_MS,
};

/// Confidential client configuration builder.
#[derive(Default)]
pub struct AppConfigBuilder {
    instance: Option<String>,
    tenant_id: Option<String>,
    client_id: Option<String>,
    client_secret: Option<SecretString>,
    auth_method: Option<ClientAuthMethod>,
    scopes: Vec<String>,
    timeout: Option<Duration>,
    refresh_buffer: Option<Duration>,
}

impl AppConfigBuilder {
    /// Create new configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set identity provider instance (defaults to `https://login.microsoftonline.com/`).
    pub fn instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    /// Set the tenant used when no tenant is given per call.
    pub fn tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    /// Set client ID.
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Set client secret.
    pub fn client_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.client_secret = Some(SecretString::new(client_secret.into()));
        self
    }

    /// Set client authentication method.
    pub fn auth_method(mut self, method: ClientAuthMethod) -> Self {
        self.auth_method = Some(method);
        self
    }

    /// Add scopes; a single string may list several separated by commas.
    pub fn scopes(mut self, scopes: impl Into<String>) -> Self {
        self.scopes.push(scopes.into());
        self
    }

    /// Set request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set how long before expiry a cached token stops being reused.
    pub fn refresh_buffer(mut self, buffer: Duration) -> Self {
        self.refresh_buffer = Some(buffer);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> Result<AppConfig, OAuth2Error> {
        let client_id = required(self.client_id, "client_id")?;
        let client_secret = self
            .client_secret
            .ok_or_else(|| missing("client_secret"))?;

        let instance = self
            .instance
            .unwrap_or_else(|| DEFAULT_INSTANCE.to_string());
        match Url::parse(&instance) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => {
                return Err(OAuth2Error::Configuration(
                    ConfigurationError::InvalidEndpoint { url: instance },
                ))
            }
        }

        let scopes = normalize_scopes(&self.scopes);
        if scopes.is_empty() {
            return Err(missing("scopes"));
        }

        let default_tenant_id = match self.tenant_id {
            Some(tenant) if tenant.trim().is_empty() => return Err(missing("tenant_id")),
            other => other,
        };

        Ok(AppConfig {
            instance,
            default_tenant_id,
            credentials: ClientCredentials {
                client_id,
                client_secret,
                auth_method: self.auth_method.unwrap_or_default(),
            },
            scopes,
            timeout: self
                .timeout
                .unwrap_or(Duration::from_millis(DEFAULT_TIMEOUT_MS)),
            refresh_buffer: self
                .refresh_buffer
                .unwrap_or(Duration::from_secs(DEFAULT_REFRESH_BUFFER_SECS)),
        })
    }
}

fn missing(field: &str) -> OAuth2Error {
    OAuth2Error::Configuration(ConfigurationError::MissingField {
        field: field.to_string(),
    })
}

fn required(value: Option<String>, field: &str) -> Result<String, OAuth2Error> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(missing(field)),
    }
}

/// Create a new confidential client configuration builder.
pub fn app_config() -> AppConfigBuilder {
    AppConfigBuilder::new()
}

/// Token cache configuration builder.
#[derive(Default)]
pub struct TokenCacheConfigBuilder {
    config: TokenCacheConfig,
}

impl TokenCacheConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of average-sized entries to size the cache for.
    pub fn max_entries(mut self, max_entries: u64) -> Self {
        self.config.max_entries = max_entries;
        self
    }

    /// Estimated serialized size of one entry, in bytes.
    pub fn average_entry_size(mut self, bytes: u64) -> Self {
        self.config.average_entry_size = bytes;
        self
    }

    pub fn weighing(mut self, strategy: WeighingStrategy) -> Self {
        self.config.weighing = strategy;
        self
    }

    pub fn build(self) -> Result<TokenCacheConfig, OAuth2Error> {
        if self.config.max_entries == 0 {
            return Err(OAuth2Error::Configuration(ConfigurationError::InvalidConfig {
                message: "max_entries must be greater than zero".to_string(),
            }));
        }
        if self.config.average_entry_size == 0 {
            return Err(OAuth2Error::Configuration(ConfigurationError::InvalidConfig {
                message: "average_entry_size must be greater than zero".to_string(),
            }));
        }
        Ok(self.config)
    }
}

/// Create a new token cache configuration builder.
pub fn token_cache_config() -> TokenCacheConfigBuilder {
    TokenCacheConfigBuilder::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_success() {
        let config = app_config()
            .client_id("app-id")
            .client_secret("secret")
            .tenant_id("contoso")
            .scopes("https://graph.microsoft.com/.default")
            .build()
            .unwrap();

        assert_eq!(config.credentials.client_id, "app-id");
        assert_eq!(config.instance, DEFAULT_INSTANCE);
        assert_eq!(config.default_tenant_id.as_deref(), Some("contoso"));
        assert_eq!(config.scopes, vec!["https://graph.microsoft.com/.default"]);
        assert_eq!(config.credentials.auth_method, ClientAuthMethod::ClientSecretPost);
    }

    #[test]
    fn test_builder_splits_comma_separated_scopes() {
        let config = app_config()
            .client_id("app-id")
            .client_secret("secret")
            .scopes("User.Read.All, Group.Read.All,ChannelMessage.Send")
            .build()
            .unwrap();

        assert_eq!(
            config.scopes,
            vec!["User.Read.All", "Group.Read.All", "ChannelMessage.Send"]
        );
    }

    #[test]
    fn test_builder_missing_fields() {
        let error = app_config()
            .client_secret("secret")
            .scopes("s")
            .build()
            .unwrap_err();
        assert!(error.to_string().contains("client_id"));

        let error = app_config().client_id("app").scopes("s").build().unwrap_err();
        assert!(error.to_string().contains("client_secret"));

        let error = app_config()
            .client_id("app")
            .client_secret("secret")
            .scopes(" , ")
            .build()
            .unwrap_err();
        assert!(error.to_string().contains("scopes"));
    }

    #[test]
    fn test_builder_rejects_invalid_instance() {
        let result = app_config()
            .client_id("app")
            .client_secret("secret")
            .scopes("s")
            .instance("login.microsoftonline.com")
            .build();

        assert!(matches!(
            result,
            Err(OAuth2Error::Configuration(ConfigurationError::InvalidEndpoint { .. }))
        ));
    }

    #[test]
    fn test_cache_config_builder() {
        let config = token_cache_config()
            .max_entries(3)
            .average_entry_size(1)
            .build()
            .unwrap();
        assert_eq!(config.max_weight(), 3);
        assert_eq!(config.weighing, WeighingStrategy::FixedEstimate);

        assert!(token_cache_config().max_entries(0).build().is_err());
    }
}
