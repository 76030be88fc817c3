//! OAuth2 Token Cache
//!
//! App-only (client credentials) token acquisition for multi-tenant
//! services, backed by an in-memory token cache bounded by weight with
//! least-recently-used eviction.
//!
//! # Features
//!
//! - Client Credentials Flow (RFC 6749 Section 4.4) per tenant authority
//! - One cache entry per (application, tenant), keyed `{client_id}_{tenant_id}_AppTokenCache`
//! - Weight-bounded LRU eviction, fixed-estimate or exact-size weighing
//! - Safe for concurrent use without caller-side locking
//!
//! # Example
//!
//! ```rust,ignore
//! use oauth2_token_cache::{app_config, token_cache_config, ConfidentialClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = app_config()
//!         .client_id("my-client-id")
//!         .client_secret("my-client-secret")
//!         .tenant_id("contoso.onmicrosoft.com")
//!         .scopes("https://graph.microsoft.com/.default")
//!         .build()?;
//!
//!     // 100k tenants at ~2.5 KB each
//!     let cache_config = token_cache_config()
//!         .max_entries(100_000)
//!         .average_entry_size(2_500)
//!         .build()?;
//!
//!     let client = ConfidentialClient::new(config, &cache_config)?;
//!
//!     let result = client.acquire_token_for_default_tenant().await?;
//!     println!("Authorization: {}", result.access_token.authorization_header());
//!
//!     // Served from the cache this time.
//!     let again = client.acquire_token_for_default_tenant().await?;
//!     assert_eq!(again.source, oauth2_token_cache::TokenSource::Cache);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `cache`: the bounded token cache and the storage trait
//! - `token`: serialized token sets and scope handling
//! - `flows`: client credentials grant
//! - `core`: HTTP transport
//! - `types`: configuration and token types
//! - `builders`: fluent configuration builders
//! - `error`: error hierarchy
//! - `client`: confidential client combining cache and flow

pub mod builders;
pub mod cache;
pub mod client;
pub mod core;
pub mod error;
pub mod flows;
pub mod token;
pub mod types;

pub use client::ConfidentialClient;

pub use builders::{app_config, token_cache_config, AppConfigBuilder, TokenCacheConfigBuilder};

pub use error::{
    create_error_from_response, map_token_error, parse_error_response, ConfigurationError,
    NetworkError, OAuth2Error, OAuth2ErrorResponse, OAuth2Result, ProtocolError, ProviderError,
    TokenError,
};

pub use cache::{
    create_mock_token_cache_storage, weigher_for, CacheEntry, CacheKey, CacheStats,
    FixedWeigher, MockTokenCacheStorage, SerializedSizeWeigher, TokenCache, TokenCacheStorage,
    Weigher,
};

pub use token::{normalize_scopes, AppTokenSet};

pub use types::{
    AccessToken, AppConfig, AuthenticationResult, CachedToken, ClientAuthMethod,
    ClientCredentials, TokenCacheConfig, TokenResponse, TokenSource, WeighingStrategy,
};

pub use crate::core::{
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, MockHttpTransport, ReqwestHttpTransport,
};

pub use flows::{
    create_mock_client_credentials_flow, ClientCredentialsFlow, ClientCredentialsFlowImpl,
    ClientCredentialsRequest, MockClientCredentialsFlow,
};
