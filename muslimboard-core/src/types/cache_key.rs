//! Cache key derivation.

use std::fmt;

use url::form_urlencoded;

/// How a request is turned into a cache key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CacheKeyMode {
    /// `path?query` exactly as received. Reordered parameters produce
    /// distinct keys.
    #[default]
    Literal,
    /// Query pairs are decoded, sorted by name then value, and re-encoded.
    Normalized,
}

impl std::str::FromStr for CacheKeyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "literal" => Ok(CacheKeyMode::Literal),
            "normalized" | "normalised" => Ok(CacheKeyMode::Normalized),
            other => Err(format!("unknown cache key mode '{}'", other)),
        }
    }
}

/// Deterministic fingerprint of a request, used to address a cache entry.
///
/// Derivation is pure: no hashing with process-local seeds, so keys survive
/// restarts and are shared across instances.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derives the key for a request path and raw query string.
    pub fn from_request(path: &str, query: Option<&str>, mode: CacheKeyMode) -> Self {
        let query = match (query, mode) {
            (None, _) => None,
            (Some(q), _) if q.is_empty() => None,
            (Some(q), CacheKeyMode::Literal) => Some(q.to_string()),
            (Some(q), CacheKeyMode::Normalized) => Some(normalize_query(q)),
        };

        match query {
            Some(q) => CacheKey(format!("{}?{}", path, q)),
            None => CacheKey(path.to_string()),
        }
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn normalize_query(query: &str) -> String {
    let mut pairs: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect();
    pairs.sort();

    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const PATH: &str = "/api/v1/shalat-schedule/by-coordinate";

    #[test]
    fn test_literal_key_keeps_query() {
        let key = CacheKey::from_request(PATH, Some("month=5&year=2024"), CacheKeyMode::Literal);
        assert_eq!(key.as_str(), "/api/v1/shalat-schedule/by-coordinate?month=5&year=2024");
    }

    #[test]
    fn test_literal_key_is_order_sensitive() {
        let a = CacheKey::from_request(PATH, Some("year=2024&month=5"), CacheKeyMode::Literal);
        let b = CacheKey::from_request(PATH, Some("month=5&year=2024"), CacheKeyMode::Literal);
        assert_ne!(a, b);
    }

    #[test]
    fn test_normalized_key_ignores_order() {
        let a = CacheKey::from_request(PATH, Some("year=2024&month=5"), CacheKeyMode::Normalized);
        let b = CacheKey::from_request(PATH, Some("month=5&year=2024"), CacheKeyMode::Normalized);
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_query_is_bare_path() {
        let a = CacheKey::from_request(PATH, Some(""), CacheKeyMode::Literal);
        let b = CacheKey::from_request(PATH, None, CacheKeyMode::Literal);
        assert_eq!(a.as_str(), PATH);
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_path_different_key() {
        let a = CacheKey::from_request("/a", Some("city=Bogor"), CacheKeyMode::Literal);
        let b = CacheKey::from_request("/b", Some("city=Bogor"), CacheKeyMode::Literal);
        assert_ne!(a, b);
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("literal".parse::<CacheKeyMode>().unwrap(), CacheKeyMode::Literal);
        assert_eq!("Normalized".parse::<CacheKeyMode>().unwrap(), CacheKeyMode::Normalized);
        assert!("sorted".parse::<CacheKeyMode>().is_err());
    }

    proptest! {
        #[test]
        fn prop_derivation_is_deterministic(query in "[a-z]{1,8}=[a-z0-9.%-]{0,8}(&[a-z]{1,8}=[a-z0-9.-]{0,8}){0,4}") {
            for mode in [CacheKeyMode::Literal, CacheKeyMode::Normalized] {
                let a = CacheKey::from_request(PATH, Some(&query), mode);
                let b = CacheKey::from_request(PATH, Some(&query), mode);
                prop_assert_eq!(a, b);
            }
        }

        #[test]
        fn prop_distinct_values_distinct_keys(a in "[0-9]{1,4}", b in "[0-9]{1,4}") {
            prop_assume!(a != b);
            for mode in [CacheKeyMode::Literal, CacheKeyMode::Normalized] {
                let ka = CacheKey::from_request(PATH, Some(&format!("month={}", a)), mode);
                let kb = CacheKey::from_request(PATH, Some(&format!("month={}", b)), mode);
                prop_assert_ne!(ka, kb);
            }
        }
    }
}
