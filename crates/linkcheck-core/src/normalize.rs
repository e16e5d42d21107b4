//! Canonicalization of LinkedIn profile URLs.
//!
//! Normalization is fail-soft: anything that cannot be turned into a profile
//! URL is returned exactly as given, with a log line explaining why.

const HOST_MARKER: &str = "linkedin.com";
const PROFILE_SEGMENT: &str = "/in/";

/// Canonicalize a LinkedIn profile URL.
///
/// - strips the query string and fragment
/// - strips trailing slashes and whitespace left behind by the query
/// - prefixes `https://` when no scheme is present
/// - inserts the `/in/` profile segment after the host when it is missing
///
/// Inputs without the `linkedin.com` host marker, or that point at the bare
/// host, are returned unchanged. `normalize_profile_url` is idempotent.
#[must_use]
pub fn normalize_profile_url(raw: &str) -> String {
    let trimmed = raw.trim();

    let Some(marker_idx) = trimmed.find(HOST_MARKER) else {
        tracing::warn!(url = %raw, "not a LinkedIn URL; leaving unchanged");
        return raw.to_owned();
    };

    let without_query = trimmed
        .split(['?', '#'])
        .next()
        .unwrap_or(trimmed)
        .trim_end_matches(|c: char| c == '/' || c.is_whitespace());

    let host_end = marker_idx + HOST_MARKER.len();
    if without_query.len() < host_end {
        // The query or fragment started inside the host marker.
        tracing::warn!(url = %raw, "malformed LinkedIn URL; leaving unchanged");
        return raw.to_owned();
    }
    let (head, path) = without_query.split_at(host_end);

    if !path.is_empty() && !path.starts_with('/') {
        tracing::warn!(url = %raw, "host is not linkedin.com; leaving unchanged");
        return raw.to_owned();
    }

    let head = if head.contains("://") {
        head.to_owned()
    } else {
        format!("https://{head}")
    };

    if path.is_empty() || path == "/in" {
        tracing::error!(url = %raw, "LinkedIn URL has no profile path; leaving unchanged");
        return raw.to_owned();
    }

    if path.contains(PROFILE_SEGMENT) {
        return format!("{head}{path}");
    }

    format!("{head}/in{path}")
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
