//! Core Components
//!
//! HTTP plumbing shared by the token flows.

pub mod transport;

pub use transport::*;
