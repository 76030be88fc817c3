//! Token Sets
//!
//! What the confidential client writes into the token cache.
//!
//! - **Scopes**: normalization of configured scope strings
//! - **AppTokenSet**: serialized set of tokens for one (application, tenant) pair

pub mod scopes;
pub mod set;

pub use scopes::{normalize_scopes, scope_key, scope_param};
pub use set::AppTokenSet;
