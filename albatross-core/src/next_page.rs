//! Next-page propagation across the login round trip

/// Query parameter and hidden form field carrying the return destination
pub const NEXT_FIELD: &str = "next";

/// Destination used when no (usable) next-page was supplied
pub const DEFAULT_NEXT_PAGE: &str = "/";

/// Pick the post-login destination.
///
/// Only local absolute paths are honoured; anything that could send the
/// browser to another host falls back to the application root.
pub fn resolve_next_page(candidate: Option<&str>) -> String {
    match candidate.map(str::trim) {
        Some(next) if is_local_path(next) => next.to_string(),
        _ => DEFAULT_NEXT_PAGE.to_string(),
    }
}

/// Login URL with the originally requested path and query attached
pub fn login_redirect_target(login_url: &str, requested: &str) -> String {
    let separator = if login_url.contains('?') { '&' } else { '?' };
    format!(
        "{login_url}{separator}{NEXT_FIELD}={}",
        urlencoding::encode(requested)
    )
}

fn is_local_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.starts_with("//")
        && !path.starts_with("/\\")
        && !path.chars().any(char::is_control)
}
