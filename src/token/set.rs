//! App Token Set
//!
//! The contents of one cache entry: every access token an application
//! holds for one tenant, keyed by scope set and serialized as JSON.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::scopes::scope_key;
use crate::cache::CacheEntry;
use crate::error::{OAuth2Error, TokenError};
use crate::types::CachedToken;

/// Access tokens of one application in one tenant.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppTokenSet {
    #[serde(default)]
    tokens: BTreeMap<String, CachedToken>,
}

impl AppTokenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a cache entry.
    pub fn from_entry(entry: &CacheEntry) -> Result<Self, TokenError> {
        serde_json::from_slice(entry.as_bytes()).map_err(|e| TokenError::CorruptTokenSet {
            message: e.to_string(),
        })
    }

    /// Encode as a cache entry.
    pub fn to_entry(&self) -> Result<CacheEntry, OAuth2Error> {
        let bytes = serde_json::to_vec(self).map_err(|e| {
            OAuth2Error::Token(TokenError::SerializationFailed {
                message: e.to_string(),
            })
        })?;
        Ok(CacheEntry::from(bytes))
    }

    /// Token for exactly these scopes that stays valid for at least `buffer`.
    pub fn find(&self, scopes: &[String], buffer: Duration) -> Option<&CachedToken> {
        self.tokens
            .get(&scope_key(scopes))
            .filter(|token| !token.is_expiring_within(buffer))
    }

    /// Insert or replace the token for a scope set.
    pub fn insert(&mut self, scopes: &[String], token: CachedToken) {
        self.tokens.insert(scope_key(scopes), token);
    }

    /// Drop expired tokens, returning how many were removed.
    pub fn prune_expired(&mut self) -> usize {
        let before = self.tokens.len();
        self.tokens.retain(|_, token| !token.is_expired());
        before - self.tokens.len()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
