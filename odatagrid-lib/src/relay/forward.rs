//! Request mapping rules for the relay.

/// Response headers that are never copied from upstream.
const HOP_BY_HOP: [&str; 3] = ["transfer-encoding", "content-encoding", "connection"];

/// Returns `true` for headers that must not be forwarded.
pub fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP.iter().any(|h| h.eq_ignore_ascii_case(name))
}

/// Maps a request path (with query) under `prefix` to the upstream URL.
///
/// `/odata/v4/People?$top=5` with prefix `/odata` and upstream
/// `https://services.odata.org` becomes
/// `https://services.odata.org/v4/People?$top=5`. Paths outside the prefix
/// yield `None`.
pub fn target_url(upstream: &str, prefix: &str, path_and_query: &str) -> Option<String> {
    let prefix = prefix.trim_end_matches('/');
    let rest = path_and_query.strip_prefix(prefix)?;
    if !rest.starts_with('/') {
        return None;
    }
    Some(format!("{}{}", upstream.trim_end_matches('/'), rest))
}

/// Result of checking a request's `Origin` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginCheck {
    /// No `Origin` header (curl, server-to-server).
    Absent,
    /// Origin is on the allow-list.
    Allowed(String),
    Rejected,
}

pub fn check_origin(origin: Option<&str>, allowed: &[String]) -> OriginCheck {
    match origin {
        None => OriginCheck::Absent,
        Some(origin) if allowed.iter().any(|a| a == origin) => OriginCheck::Allowed(origin.to_string()),
        Some(_) => OriginCheck::Rejected,
    }
}
