//! Namespace mapping between compact `prefix:local` names and full IRIs.

use crate::error::EnvError;
use crate::types::Uri;
use std::collections::BTreeMap;

/// Prefix → namespace bindings.
///
/// Expansion never guesses: a compact name whose prefix is not bound is an
/// error, since it almost always means a typo in a model document or a
/// feature file.
#[derive(Debug, Clone, Default)]
pub struct NamespaceManager {
    bindings: BTreeMap<String, String>,
}

impl NamespaceManager {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a prefix, replacing any earlier binding of the same prefix.
    pub fn bind(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.bindings.insert(prefix.into(), namespace.into());
    }

    /// Returns the namespace bound to a prefix.
    pub fn namespace(&self, prefix: &str) -> Option<&str> {
        self.bindings.get(prefix).map(String::as_str)
    }

    /// Iterates over all (prefix, namespace) bindings.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings.iter().map(|(p, n)| (p.as_str(), n.as_str()))
    }

    /// Expands a compact name or bracketed IRI to a full URI.
    ///
    /// Accepts `prefix:local` with a bound prefix and `<https://...>`.
    pub fn expand_curie(&self, curie: &str) -> Result<Uri, EnvError> {
        let curie = curie.trim();

        if let Some(inner) = curie.strip_prefix('<').and_then(|s| s.strip_suffix('>')) {
            if inner.is_empty() || inner.contains(char::is_whitespace) {
                return Err(EnvError::InvalidCurie(curie.to_string()));
            }
            return Ok(Uri::new(inner));
        }

        let (prefix, local) = curie
            .split_once(':')
            .ok_or_else(|| EnvError::InvalidCurie(curie.to_string()))?;
        if local.contains(char::is_whitespace) || prefix.contains(char::is_whitespace) {
            return Err(EnvError::InvalidCurie(curie.to_string()));
        }

        let namespace = self.bindings.get(prefix).ok_or_else(|| EnvError::UnknownPrefix {
            prefix: prefix.to_string(),
            curie: curie.to_string(),
        })?;

        Ok(Uri::new(format!("{}{}", namespace, local)))
    }

    /// Compacts a URI using the longest matching namespace.
    ///
    /// Falls back to the bracketed form `<iri>` when no namespace matches.
    pub fn compact(&self, uri: &Uri) -> String {
        let best = self
            .bindings
            .iter()
            .filter(|(_, ns)| uri.as_str().starts_with(ns.as_str()) && uri.as_str().len() > ns.len())
            .max_by_key(|(_, ns)| ns.len());

        match best {
            Some((prefix, ns)) => format!("{}:{}", prefix, &uri.as_str()[ns.len()..]),
            None if uri.is_blank() => uri.to_string(),
            None => format!("<{}>", uri),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> NamespaceManager {
        let mut ns = NamespaceManager::new();
        ns.bind("ex", "https://example.org/");
        ns.bind("exm", "https://example.org/models/");
        ns
    }

    #[test]
    fn test_expand_known_prefix() {
        let ns = manager();
        let uri = ns.expand_curie("ex:cube1").unwrap();
        assert_eq!(uri.as_str(), "https://example.org/cube1");
    }

    #[test]
    fn test_expand_unknown_prefix_fails() {
        let ns = manager();
        let err = ns.expand_curie("nope:cube1").unwrap_err();
        assert!(matches!(err, EnvError::UnknownPrefix { ref prefix, .. } if prefix == "nope"));
    }

    #[test]
    fn test_expand_rejects_bare_names() {
        let ns = manager();
        assert!(matches!(ns.expand_curie("cube1"), Err(EnvError::InvalidCurie(_))));
        assert!(matches!(ns.expand_curie("ex:cube 1"), Err(EnvError::InvalidCurie(_))));
    }

    #[test]
    fn test_expand_bracketed_iri() {
        let ns = manager();
        let uri = ns.expand_curie("<https://other.org/x>").unwrap();
        assert_eq!(uri.as_str(), "https://other.org/x");
    }

    #[test]
    fn test_compact_prefers_longest_namespace() {
        let ns = manager();
        assert_eq!(ns.compact(&Uri::new("https://example.org/models/m1")), "exm:m1");
        assert_eq!(ns.compact(&Uri::new("https://example.org/cube1")), "ex:cube1");
        assert_eq!(ns.compact(&Uri::new("https://other.org/x")), "<https://other.org/x>");
    }
}
