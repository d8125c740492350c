use rioc::constants::{ROUTE_COMPONENT, ROUTE_HEALTH, ROUTE_META, ROUTE_METHODS_SEGMENT};

/// Normalizes a route prefix: empty stays empty, a trailing `/` is dropped.
///
/// Returns `None` when a non-empty prefix does not start with `/`.
pub fn normalize_route_prefix(prefix: &str) -> Option<String> {
    let trimmed = prefix.trim_end_matches('/');
    if trimmed.is_empty() {
        return Some(String::new());
    }
    trimmed.starts_with('/').then(|| trimmed.to_string())
}

/// Why `segment` cannot be used as one literal route segment, if it cannot.
///
/// Service ids and method names become path segments of invocation routes,
/// so they must be non-empty and free of `/`, braces and a leading `:` or `*`.
pub fn route_segment_problem(segment: &str) -> Option<&'static str> {
    if segment.is_empty() {
        Some("is empty")
    } else if segment.contains('/') {
        Some("contains `/`")
    } else if segment.contains(['{', '}']) {
        Some("contains `{` or `}`")
    } else if segment.starts_with([':', '*']) {
        Some("starts with `:` or `*`")
    } else {
        None
    }
}

pub fn meta_route(prefix: &str) -> String {
    format!("{prefix}{ROUTE_META}")
}

pub fn health_route(prefix: &str) -> String {
    format!("{prefix}{ROUTE_HEALTH}")
}

/// `{prefix}/component/{service_id}/methods/{method}`
pub fn invocation_route(prefix: &str, service_id: &str, method: &str) -> String {
    format!("{prefix}{ROUTE_COMPONENT}/{service_id}/{ROUTE_METHODS_SEGMENT}/{method}")
}
