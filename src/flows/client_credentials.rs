//! Client Credentials Flow
//!
//! RFC 6749 Section 4.4 - Client Credentials Grant against a tenant's token endpoint.

use async_trait::async_trait;
use base64::Engine;
use secrecy::ExposeSecret;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use crate::core::{HttpMethod, HttpRequest, HttpTransport};
use crate::error::{create_error_from_response, OAuth2Error, ProtocolError};
use crate::token::scope_param;
use crate::types::{AppConfig, ClientAuthMethod, TokenResponse};

/// Client Credentials Flow request parameters.
#[derive(Debug, Clone, Default)]
pub struct ClientCredentialsRequest {
    /// Tenant whose authority issues the token.
    pub tenant_id: String,
    /// Normalized scopes.
    pub scopes: Vec<String>,
    /// Additional form parameters.
    pub extra_params: HashMap<String, String>,
}

/// Client Credentials Flow interface.
#[async_trait]
pub trait ClientCredentialsFlow: Send + Sync {
    /// Request an app-only access token.
    async fn request_token(
        &self,
        request: ClientCredentialsRequest,
    ) -> Result<TokenResponse, OAuth2Error>;
}

/// Client Credentials Flow over an [`HttpTransport`].
pub struct ClientCredentialsFlowImpl<T: HttpTransport> {
    config: AppConfig,
    transport: Arc<T>,
}

impl<T: HttpTransport> ClientCredentialsFlowImpl<T> {
    /// Create new Client Credentials Flow.
    pub fn new(config: AppConfig, transport: Arc<T>) -> Self {
        Self { config, transport }
    }

    fn build_request_body(&self, request: &ClientCredentialsRequest) -> String {
        let credentials = &self.config.credentials;
        let mut params = vec![("grant_type", "client_credentials".to_string())];

        if !request.scopes.is_empty() {
            params.push(("scope", scope_param(&request.scopes)));
        }

        if credentials.auth_method == ClientAuthMethod::ClientSecretPost {
            params.push(("client_id", credentials.client_id.clone()));
            params.push((
                "client_secret",
                credentials.client_secret.expose_secret().to_string(),
            ));
        }

        for (key, value) in &request.extra_params {
            params.push((key.as_str(), value.clone()));
        }

        params
            .into_iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(&v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    fn build_request_headers(&self) -> HashMap<String, String> {
        let credentials = &self.config.credentials;
        let mut headers = HashMap::new();
        headers.insert(
            "content-type".to_string(),
            "application/x-www-form-urlencoded".to_string(),
        );
        headers.insert("accept".to_string(), "application/json".to_string());

        if credentials.auth_method == ClientAuthMethod::ClientSecretBasic {
            let pair = format!(
                "{}:{}",
                urlencoding::encode(&credentials.client_id),
                urlencoding::encode(credentials.client_secret.expose_secret())
            );
            let encoded = base64::engine::general_purpose::STANDARD.encode(pair);
            headers.insert("authorization".to_string(), format!("Basic {}", encoded));
        }

        headers
    }
}

#[async_trait]
impl<T: HttpTransport> ClientCredentialsFlow for ClientCredentialsFlowImpl<T> {
    async fn request_token(
        &self,
        request: ClientCredentialsRequest,
    ) -> Result<TokenResponse, OAuth2Error> {
        let http_request = HttpRequest {
            method: HttpMethod::Post,
            url: self.config.token_endpoint(&request.tenant_id),
            headers: self.build_request_headers(),
            body: Some(self.build_request_body(&request)),
            timeout: Some(self.config.timeout),
        };

        let started = Instant::now();
        let response = self.transport.send(http_request).await?;
        debug!(
            tenant_id = %request.tenant_id,
            status = response.status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Token endpoint responded"
        );

        if response.status != 200 {
            return Err(create_error_from_response(response.status, &response.body));
        }

        serde_json::from_str(&response.body).map_err(|e| {
            OAuth2Error::Protocol(ProtocolError::InvalidJson {
                message: e.to_string(),
            })
        })
    }
}

/// Mock Client Credentials Flow for testing.
#[derive(Default)]
pub struct MockClientCredentialsFlow {
    request_history: parking_lot::Mutex<Vec<ClientCredentialsRequest>>,
    next_token_response: parking_lot::Mutex<Option<TokenResponse>>,
    next_error: parking_lot::Mutex<Option<OAuth2Error>>,
}

impl MockClientCredentialsFlow {
    /// Create new mock flow.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set next token response.
    pub fn set_next_token_response(&self, response: TokenResponse) -> &Self {
        *self.next_token_response.lock() = Some(response);
        self
    }

    /// Set next error.
    pub fn set_next_error(&self, error: OAuth2Error) -> &Self {
        *self.next_error.lock() = Some(error);
        self
    }

    /// Get request history.
    pub fn get_request_history(&self) -> Vec<ClientCredentialsRequest> {
        self.request_history.lock().clone()
    }
}

#[async_trait]
impl ClientCredentialsFlow for MockClientCredentialsFlow {
    async fn request_token(
        &self,
        request: ClientCredentialsRequest,
    ) -> Result<TokenResponse, OAuth2Error> {
        let sequence = {
            let mut history = self.request_history.lock();
            history.push(request.clone());
            history.len()
        };

        if let Some(error) = self.next_error.lock().take() {
            return Err(error);
        }

        if let Some(response) = self.next_token_response.lock().take() {
            return Ok(response);
        }

        Ok(TokenResponse {
            access_token: format!("mock-token-{}-{}", request.tenant_id, sequence),
            token_type: "Bearer".to_string(),
            expires_in: Some(3599),
            scope: None,
            extra: HashMap::new(),
        })
    }
}

/// Create mock Client Credentials Flow for testing.
pub fn create_mock_client_credentials_flow() -> MockClientCredentialsFlow {
    MockClientCredentialsFlow::new()
}
