//! Cache keys.

use std::borrow::Borrow;
use std::fmt;

const APP_TOKEN_CACHE_SUFFIX: &str = "_AppTokenCache";

/// Key of one application's token set for one tenant.
///
/// Rendered as `{client_id}_{tenant_id}_AppTokenCache`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Key for the app-only token set of `client_id` in `tenant_id`.
    pub fn for_app(client_id: &str, tenant_id: &str) -> Self {
        Self(format!("{}_{}{}", client_id, tenant_id, APP_TOKEN_CACHE_SUFFIX))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for CacheKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<CacheKey> for String {
    fn from(key: CacheKey) -> Self {
        key.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_format() {
        let key = CacheKey::for_app("6731de76-14a6-49ae-97bc-6eba6914391e", "contoso");
        assert_eq!(
            key.as_str(),
            "6731de76-14a6-49ae-97bc-6eba6914391e_contoso_AppTokenCache"
        );
        assert_eq!(key.to_string(), key.as_str());
    }

    #[test]
    fn test_keys_differ_per_tenant() {
        assert_ne!(
            CacheKey::for_app("app", "tenant-a"),
            CacheKey::for_app("app", "tenant-b")
        );
        assert_eq!(
            CacheKey::for_app("app", "tenant-a"),
            CacheKey::for_app("app", "tenant-a")
        );
    }
}
