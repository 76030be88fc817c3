//! Scope normalization.

/// Split configured scope strings into individual scopes.
///
/// Each input may hold several scopes separated by commas, with optional
/// whitespace after the comma (`"User.Read.All, Group.Read.All"`). Empty
/// pieces are dropped and order is preserved.
pub fn normalize_scopes<S: AsRef<str>>(scopes: &[S]) -> Vec<String> {
    scopes
        .iter()
        .flat_map(|s| s.as_ref().split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Space-separated scope parameter for the token request.
pub fn scope_param(scopes: &[String]) -> String {
    scopes.join(" ")
}

/// Order-insensitive key for a scope set.
pub fn scope_key(scopes: &[String]) -> String {
    let mut sorted: Vec<&str> = scopes.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted.dedup();
    sorted.join(" ")
}
