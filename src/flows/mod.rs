//! Token Flows
//!
//! - **Client Credentials Flow** (RFC 6749 Section 4.4): app-only tokens per tenant

pub mod client_credentials;

pub use client_credentials::{
    create_mock_client_credentials_flow, ClientCredentialsFlow, ClientCredentialsFlowImpl,
    ClientCredentialsRequest, MockClientCredentialsFlow,
};
