//! Token Types
//!
//! Token endpoint responses and the tokens handed back to callers.

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Token response from the identity provider.
#[derive(Clone, Debug, Deserialize)]
pub struct TokenResponse {
    /// Access token.
    pub access_token: String,
    /// Token type (usually "Bearer").
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Expires in seconds.
    #[serde(default)]
    pub expires_in: Option<u64>,
    /// Granted scopes, when the provider echoes them.
    #[serde(default)]
    pub scope: Option<String>,
    /// Additional fields (`ext_expires_in`, ...).
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// One access token as kept inside a serialized token set.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedToken {
    pub access_token: String,
    pub token_type: String,
    pub scopes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub cached_at: DateTime<Utc>,
}

impl CachedToken {
    /// Build from a token response. `requested_scopes` is used when the
    /// provider does not echo the granted scope.
    pub fn from_response(response: &TokenResponse, requested_scopes: &[String]) -> Self {
        let now = Utc::now();
        let expires_at = response.expires_in.map(|secs| expiry_after(now, secs));

        let scopes = match &response.scope {
            Some(s) if !s.trim().is_empty() => s.split_whitespace().map(String::from).collect(),
            _ => requested_scopes.to_vec(),
        };

        Self {
            access_token: response.access_token.clone(),
            token_type: response.token_type.clone(),
            scopes,
            expires_at,
            cached_at: now,
        }
    }

    /// Check if token is expired.
    pub fn is_expired(&self) -> bool {
        self.is_expiring_within(Duration::zero())
    }

    /// Check if token expires within `buffer` from now.
    pub fn is_expiring_within(&self, buffer: Duration) -> bool {
        match (self.expires_at, Utc::now().checked_add_signed(buffer)) {
            (Some(exp), Some(deadline)) => exp <= deadline,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }
}

/// 9999-12-31T23:59:59Z, the last instant RFC 3339 can encode.
const LATEST_EXPIRY_TIMESTAMP: i64 = 253_402_300_799;

fn latest_expiry() -> DateTime<Utc> {
    DateTime::from_timestamp(LATEST_EXPIRY_TIMESTAMP, 0).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// `now + secs`, saturating at [`latest_expiry`].
fn expiry_after(now: DateTime<Utc>, secs: u64) -> DateTime<Utc> {
    let latest = latest_expiry();
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .map_or(latest, |exp| exp.min(latest))
}

impl std::fmt::Debug for CachedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedToken")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("scopes", &self.scopes)
            .field("expires_at", &self.expires_at)
            .field("cached_at", &self.cached_at)
            .finish()
    }
}

/// Access token wrapper for safe handling.
#[derive(Clone)]
pub struct AccessToken {
    value: SecretString,
    /// Token type.
    pub token_type: String,
    /// Expiration time.
    pub expires_at: Option<DateTime<Utc>>,
    /// Associated scopes.
    pub scopes: Vec<String>,
}

impl AccessToken {
    /// Create new access token.
    pub fn new(
        value: String,
        token_type: String,
        expires_at: Option<DateTime<Utc>>,
        scopes: Vec<String>,
    ) -> Self {
        Self {
            value: SecretString::new(value),
            token_type,
            expires_at,
            scopes,
        }
    }

    /// Get token value (for Authorization header).
    pub fn secret(&self) -> &str {
        self.value.expose_secret()
    }

    /// Get time until expiration.
    pub fn expires_in(&self) -> Option<std::time::Duration> {
        self.expires_at.and_then(|exp| (exp - Utc::now()).to_std().ok())
    }

    /// Format as Authorization header value.
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.value.expose_secret())
    }
}

impl From<&CachedToken> for AccessToken {
    fn from(cached: &CachedToken) -> Self {
        Self::new(
            cached.access_token.clone(),
            cached.token_type.clone(),
            cached.expires_at,
            cached.scopes.clone(),
        )
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .field("scopes", &self.scopes)
            .finish()
    }
}

/// Where an access token came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenSource {
    /// Served from the token cache.
    Cache,
    /// Freshly issued by the identity provider.
    IdentityProvider,
}

/// Result of a token acquisition.
#[derive(Clone, Debug)]
pub struct AuthenticationResult {
    pub access_token: AccessToken,
    pub tenant_id: String,
    pub source: TokenSource,
}
