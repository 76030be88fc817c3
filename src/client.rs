//! Confidential Client
//!
//! Acquires app-only tokens per tenant, consulting the token cache before
//! and after every call to the identity provider.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::cache::{CacheKey, TokenCache, TokenCacheStorage};
use crate::core::ReqwestHttpTransport;
use crate::error::{ConfigurationError, OAuth2Error};
use crate::flows::{ClientCredentialsFlow, ClientCredentialsFlowImpl, ClientCredentialsRequest};
use crate::token::AppTokenSet;
use crate::types::{
    AccessToken, AppConfig, AuthenticationResult, CachedToken, TokenCacheConfig, TokenSource,
};

/// Confidential client for the client credentials grant across many tenants.
///
/// One token set per tenant lives in the shared cache under
/// [`CacheKey::for_app`]. Concurrent misses for the same tenant each
/// fetch a token; the last store wins.
pub struct ConfidentialClient<
    F: ClientCredentialsFlow = ClientCredentialsFlowImpl<ReqwestHttpTransport>,
    C: TokenCacheStorage = TokenCache,
> {
    config: AppConfig,
    flow: Arc<F>,
    cache: Arc<C>,
}

impl ConfidentialClient<ClientCredentialsFlowImpl<ReqwestHttpTransport>, TokenCache> {
    /// Create a client with the reqwest transport and a cache sized by `cache_config`.
    pub fn new(config: AppConfig, cache_config: &TokenCacheConfig) -> Result<Self, OAuth2Error> {
        Self::with_cache(config, Arc::new(TokenCache::new(cache_config)))
    }

    /// Create a client sharing an existing cache.
    pub fn with_cache(config: AppConfig, cache: Arc<TokenCache>) -> Result<Self, OAuth2Error> {
        let transport = Arc::new(ReqwestHttpTransport::with_options(
            config.timeout,
            crate::core::DEFAULT_MAX_RESPONSE_SIZE,
        )?);
        let flow = Arc::new(ClientCredentialsFlowImpl::new(config.clone(), transport));

        Ok(Self { config, flow, cache })
    }
}

impl<F: ClientCredentialsFlow, C: TokenCacheStorage> ConfidentialClient<F, C> {
    /// Create a client with custom implementations.
    pub fn with_components(config: AppConfig, flow: Arc<F>, cache: Arc<C>) -> Self {
        Self { config, flow, cache }
    }

    /// Get the configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get the token cache.
    pub fn cache(&self) -> &Arc<C> {
        &self.cache
    }

    /// Cache key of this application's token set in `tenant_id`.
    pub fn cache_key(&self, tenant_id: &str) -> CacheKey {
        CacheKey::for_app(&self.config.credentials.client_id, tenant_id)
    }

    /// Acquire a token for the configured default tenant.
    pub async fn acquire_token_for_default_tenant(
        &self,
    ) -> Result<AuthenticationResult, OAuth2Error> {
        let tenant_id = self.config.default_tenant_id.clone().ok_or_else(|| {
            OAuth2Error::Configuration(ConfigurationError::MissingField {
                field: "tenant_id".to_string(),
            })
        })?;
        self.acquire_token(&tenant_id).await
    }

    /// Acquire a token for `tenant_id`, serving it from the cache when a
    /// token for the configured scopes is still valid beyond the refresh buffer.
    pub async fn acquire_token(
        &self,
        tenant_id: &str,
    ) -> Result<AuthenticationResult, OAuth2Error> {
        let key = self.cache_key(tenant_id);
        let scopes = &self.config.scopes;

        let mut token_set = match self.cache.load(&key) {
            Some(entry) => match AppTokenSet::from_entry(&entry) {
                Ok(set) => set,
                Err(e) => {
                    warn!(cache_key = %key, error = %e, "Discarding unreadable token set");
                    AppTokenSet::new()
                }
            },
            None => AppTokenSet::new(),
        };

        let buffer = chrono::Duration::from_std(self.config.refresh_buffer)
            .unwrap_or_else(|_| chrono::Duration::zero());
        if let Some(cached) = token_set.find(scopes, buffer) {
            debug!(cache_key = %key, "Token served from cache");
            return Ok(AuthenticationResult {
                access_token: AccessToken::from(cached),
                tenant_id: tenant_id.to_string(),
                source: TokenSource::Cache,
            });
        }

        debug!(cache_key = %key, "Token cache miss, requesting token");
        let response = self
            .flow
            .request_token(ClientCredentialsRequest {
                tenant_id: tenant_id.to_string(),
                scopes: scopes.clone(),
                ..Default::default()
            })
            .await?;

        let issued = CachedToken::from_response(&response, scopes);
        let access_token = AccessToken::from(&issued);

        token_set.prune_expired();
        token_set.insert(scopes, issued);
        self.cache.store(key, token_set.to_entry()?);

        Ok(AuthenticationResult {
            access_token,
            tenant_id: tenant_id.to_string(),
            source: TokenSource::IdentityProvider,
        })
    }

    /// Forget the cached token set for `tenant_id`.
    pub fn remove_tenant(&self, tenant_id: &str) -> bool {
        self.cache.invalidate(&self.cache_key(tenant_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::app_config;
    use crate::cache::{CacheEntry, MockTokenCacheStorage};
    use crate::error::ProviderError;
    use crate::flows::MockClientCredentialsFlow;
    use crate::types::TokenResponse;
    use std::collections::HashMap;
    use std::time::Duration;

    fn config() -> AppConfig {
        app_config()
            .client_id("app-id")
            .client_secret("secret")
            .tenant_id("contoso")
            .scopes("https://graph.microsoft.com/.default")
            .build()
            .unwrap()
    }

    fn client(
        cache: Arc<TokenCache>,
    ) -> (
        ConfidentialClient<MockClientCredentialsFlow, TokenCache>,
        Arc<MockClientCredentialsFlow>,
    ) {
        let flow = Arc::new(MockClientCredentialsFlow::new());
        let client = ConfidentialClient::with_components(config(), flow.clone(), cache);
        (client, flow)
    }

    #[tokio::test]
    async fn test_second_acquisition_hits_cache() {
        let (client, flow) = client(Arc::new(TokenCache::bounded_by_entries(10)));

        let first = client.acquire_token("contoso").await.unwrap();
        let second = client.acquire_token("contoso").await.unwrap();

        assert_eq!(first.source, TokenSource::IdentityProvider);
        assert_eq!(second.source, TokenSource::Cache);
        assert_eq!(first.access_token.secret(), second.access_token.secret());
        assert_eq!(flow.get_request_history().len(), 1);
    }

    #[tokio::test]
    async fn test_each_tenant_gets_own_entry() {
        let cache = Arc::new(TokenCache::bounded_by_entries(10));
        let (client, flow) = client(cache.clone());

        let a = client.acquire_token("tenant-a").await.unwrap();
        let b = client.acquire_token("tenant-b").await.unwrap();

        assert_ne!(a.access_token.secret(), b.access_token.secret());
        assert_eq!(flow.get_request_history().len(), 2);
        assert_eq!(flow.get_request_history()[1].tenant_id, "tenant-b");
        assert!(cache.contains("app-id_tenant-a_AppTokenCache"));
        assert!(cache.contains("app-id_tenant-b_AppTokenCache"));
    }

    #[tokio::test]
    async fn test_evicted_tenant_is_refetched() {
        let cache = Arc::new(TokenCache::bounded_by_entries(1));
        let (client, flow) = client(cache);

        client.acquire_token("tenant-a").await.unwrap();
        client.acquire_token("tenant-b").await.unwrap();
        let again = client.acquire_token("tenant-a").await.unwrap();

        assert_eq!(again.source, TokenSource::IdentityProvider);
        assert_eq!(flow.get_request_history().len(), 3);
    }

    #[tokio::test]
    async fn test_token_inside_refresh_buffer_is_refetched() {
        let (client, flow) = client(Arc::new(TokenCache::bounded_by_entries(10)));
        flow.set_next_token_response(TokenResponse {
            access_token: "about-to-expire".to_string(),
            token_type: "Bearer".to_string(),
            expires_in: Some(60),
            scope: None,
            extra: HashMap::new(),
        });

        client.acquire_token("contoso").await.unwrap();
        let second = client.acquire_token("contoso").await.unwrap();

        assert_eq!(second.source, TokenSource::IdentityProvider);
        assert_ne!(second.access_token.secret(), "about-to-expire");
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_replaced() {
        let storage = Arc::new(MockTokenCacheStorage::new());
        storage.add_entry(
            CacheKey::for_app("app-id", "contoso"),
            CacheEntry::from("{truncated"),
        );
        let flow = Arc::new(MockClientCredentialsFlow::new());
        let client = ConfidentialClient::with_components(config(), flow, storage.clone());

        let result = client.acquire_token_for_default_tenant().await.unwrap();
        assert_eq!(result.source, TokenSource::IdentityProvider);

        let stores = storage.get_store_history();
        assert_eq!(stores.len(), 1);
        assert!(AppTokenSet::from_entry(&stores[0].1).is_ok());
    }

    #[tokio::test]
    async fn test_provider_error_leaves_cache_untouched() {
        let storage = Arc::new(MockTokenCacheStorage::new());
        let flow = Arc::new(MockClientCredentialsFlow::new());
        flow.set_next_error(OAuth2Error::Provider(ProviderError::InvalidClient {
            error_description: None,
        }));
        let client = ConfidentialClient::with_components(config(), flow, storage.clone());

        assert!(client.acquire_token("contoso").await.is_err());
        assert_eq!(storage.get_load_history().len(), 1);
        assert!(storage.get_store_history().is_empty());
    }

    #[tokio::test]
    async fn test_missing_default_tenant() {
        let mut config = config();
        config.default_tenant_id = None;
        let client = ConfidentialClient::with_components(
            config,
            Arc::new(MockClientCredentialsFlow::new()),
            Arc::new(TokenCache::bounded_by_entries(1)),
        );

        let error = client.acquire_token_for_default_tenant().await.unwrap_err();
        assert_eq!(error.error_code(), "OAUTH2_CONFIG");
    }

    #[tokio::test]
    async fn test_remove_tenant() {
        let (client, flow) = client(Arc::new(TokenCache::bounded_by_entries(10)));
        client.acquire_token("contoso").await.unwrap();

        assert!(client.remove_tenant("contoso"));
        assert!(!client.remove_tenant("contoso"));

        client.acquire_token("contoso").await.unwrap();
        assert_eq!(flow.get_request_history().len(), 2);
    }

    #[tokio::test]
    async fn test_zero_refresh_buffer_reuses_short_lived_token() {
        let mut config = config();
        config.refresh_buffer = Duration::ZERO;
        let flow = Arc::new(MockClientCredentialsFlow::new());
        flow.set_next_token_response(TokenResponse {
            access_token: "short".to_string(),
            token_type: "Bearer".to_string(),
            expires_in: Some(60),
            scope: None,
            extra: HashMap::new(),
        });
        let client = ConfidentialClient::with_components(
            config,
            flow.clone(),
            Arc::new(TokenCache::bounded_by_entries(1)),
        );

        client.acquire_token("contoso").await.unwrap();
        let second = client.acquire_token("contoso").await.unwrap();
        assert_eq!(second.access_token.secret(), "short");
        assert_eq!(flow.get_request_history().len(), 1);
    }

    #[tokio::test]
    async fn test_unbounded_lifetime_is_cached() {
        let flow = Arc::new(MockClientCredentialsFlow::new());
        flow.set_next_token_response(TokenResponse {
            access_token: "long".to_string(),
            token_type: "Bearer".to_string(),
            expires_in: Some(u64::MAX),
            scope: None,
            extra: HashMap::new(),
        });
        let client = ConfidentialClient::with_components(
            config(),
            flow.clone(),
            Arc::new(TokenCache::bounded_by_entries(1)),
        );

        let first = client.acquire_token("contoso").await.unwrap();
        let second = client.acquire_token("contoso").await.unwrap();

        assert_eq!(first.source, TokenSource::IdentityProvider);
        assert_eq!(second.source, TokenSource::Cache);
        assert_eq!(second.access_token.secret(), "long");
        assert_eq!(flow.get_request_history().len(), 1);
    }
}
