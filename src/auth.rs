use axum::http::{header, HeaderMap};
use subtle::ConstantTimeEq;

/// Constant-time string comparison so token checks don't leak timing
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Check the `Authorization` header against the configured API key.
///
/// Accepts `token <key>` and `Bearer <key>`. An empty key never matches.
pub fn is_authorized(headers: &HeaderMap, expected: &str) -> bool {
    if expected.is_empty() {
        return false;
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| {
            v.strip_prefix("token ")
                .or_else(|| v.strip_prefix("Bearer "))
        })
        .is_some_and(|provided| constant_time_compare(provided.trim(), expected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(auth: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(auth).unwrap());
        headers
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("secret123", "secret123"));
        assert!(!constant_time_compare("secret123", "secret124"));
        assert!(!constant_time_compare("secret123", "secret12"));
        assert!(!constant_time_compare("", "secret"));
    }

    #[test]
    fn test_empty_api_key_rejects_everything() {
        assert!(!is_authorized(&HeaderMap::new(), ""));
        assert!(!is_authorized(&headers_with("token "), ""));
    }

    #[test]
    fn test_token_and_bearer_schemes() {
        assert!(is_authorized(&headers_with("token s3cret"), "s3cret"));
        assert!(is_authorized(&headers_with("Bearer s3cret"), "s3cret"));
    }

    #[test]
    fn test_rejects_missing_or_wrong_token() {
        assert!(!is_authorized(&HeaderMap::new(), "s3cret"));
        assert!(!is_authorized(&headers_with("token nope"), "s3cret"));
        assert!(!is_authorized(&headers_with("Basic s3cret"), "s3cret"));
    }
}
