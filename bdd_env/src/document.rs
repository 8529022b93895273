//! Format-aware parsing of model documents into triples.
//!
//! Parsing is delegated to the oxigraph parsers:
//! - **JSON-LD** through `oxjsonld`, with remote `@context` URLs fetched
//!   through a `DocumentResolver` (and so from the local mirror)
//! - **N-Triples** through `oxrdfio`
//!
//! Parsed terms are mapped onto the crate's own `Triple`, with blank nodes
//! relabelled from the graph-wide counter so that labels never collide
//! across documents.

use crate::error::EnvError;
use crate::resolver::DocumentResolver;
use crate::types::{Literal, Term, Triple, Uri};
use oxjsonld::{JsonLdParser, JsonLdRemoteDocument};
use oxrdf::vocab::xsd;
use oxrdf::{NamedOrBlankNode, Quad};
use oxrdfio::{RdfFormat, RdfParser};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::debug;

/// `rdf:type`
pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

/// Resolver used to fetch remote JSON-LD contexts while parsing.
pub type ContextLoader = Arc<dyn DocumentResolver + Send + Sync>;

/// Serialization format of a model document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DocumentFormat {
    #[serde(rename = "json-ld")]
    JsonLd,
    #[serde(rename = "nt")]
    NTriples,
}

impl DocumentFormat {
    /// Guesses the format from a file name or URL extension.
    pub fn guess(url: &str) -> Option<Self> {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        if path.ends_with(".json") || path.ends_with(".jsonld") {
            Some(DocumentFormat::JsonLd)
        } else if path.ends_with(".nt") {
            Some(DocumentFormat::NTriples)
        } else {
            None
        }
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentFormat::JsonLd => write!(f, "json-ld"),
            DocumentFormat::NTriples => write!(f, "nt"),
        }
    }
}

impl std::str::FromStr for DocumentFormat {
    type Err = EnvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json-ld" | "jsonld" => Ok(DocumentFormat::JsonLd),
            "nt" | "ntriples" | "n-triples" => Ok(DocumentFormat::NTriples),
            _ => Err(EnvError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Result of parsing one document.
#[derive(Debug, Default)]
pub struct ParsedDocument {
    /// Triples in document order
    pub triples: Vec<Triple>,

    /// Prefix bindings declared by the document's top-level context
    pub prefixes: Vec<(String, String)>,
}

/// Parses a document.
///
/// # Arguments
/// * `url` - Document identifier; used as base IRI when it is absolute
/// * `text` - Document content
/// * `format` - Serialization format
/// * `next_blank` - Blank-node counter, advanced for every fresh blank node
/// * `contexts` - Resolver for remote JSON-LD contexts; without one a
///   remote context is a parse error
pub fn parse(
    url: &str,
    text: &str,
    format: DocumentFormat,
    next_blank: &mut u64,
    contexts: Option<ContextLoader>,
) -> Result<ParsedDocument, EnvError> {
    let mut labels = BlankLabels {
        next_blank,
        labels: HashMap::new(),
    };
    let mut out = ParsedDocument::default();

    match format {
        DocumentFormat::JsonLd => {
            let value: Value =
                serde_json::from_str(text).map_err(|e| EnvError::parse(url, e.to_string()))?;
            out.prefixes = context_prefixes(&value, contexts.as_deref());

            let mut parser = JsonLdParser::new();
            if is_absolute(url) {
                parser = parser
                    .with_base_iri(url)
                    .map_err(|e| EnvError::parse(url, e.to_string()))?;
            }
            let mut reader = parser.for_reader(text.as_bytes());
            if let Some(resolver) = contexts {
                let resolver = AssertUnwindSafe(resolver);
                reader = reader.with_load_document_callback(move |context_url, _options| {
                    debug!("loading remote context '{}'", context_url);
                    let text = resolver.fetch(context_url)?;
                    Ok(JsonLdRemoteDocument {
                        document: text.into_bytes(),
                        document_url: context_url.to_string(),
                    })
                });
            }
            for quad in reader {
                let quad = quad.map_err(|e| EnvError::parse(url, e.to_string()))?;
                out.triples.push(labels.triple(url, quad)?);
            }
        }
        DocumentFormat::NTriples => {
            let parser = RdfParser::from_format(RdfFormat::NTriples);
            for quad in parser.for_reader(text.as_bytes()) {
                let quad = quad.map_err(|e| EnvError::parse(url, e.to_string()))?;
                out.triples.push(labels.triple(url, quad)?);
            }
        }
    }
    Ok(out)
}

fn is_absolute(url: &str) -> bool {
    url.contains("://") || url.starts_with("urn:")
}

/// Maps parser blank-node ids onto graph-wide labels.
struct BlankLabels<'a> {
    next_blank: &'a mut u64,
    labels: HashMap<String, Uri>,
}

impl BlankLabels<'_> {
    fn blank(&mut self, id: &str) -> Uri {
        if let Some(uri) = self.labels.get(id) {
            return uri.clone();
        }
        let uri = Uri::blank(format!("b{}", *self.next_blank));
        *self.next_blank += 1;
        self.labels.insert(id.to_string(), uri.clone());
        uri
    }

    fn triple(&mut self, url: &str, quad: Quad) -> Result<Triple, EnvError> {
        let subject = match quad.subject {
            NamedOrBlankNode::NamedNode(node) => Uri::new(node.as_str()),
            NamedOrBlankNode::BlankNode(node) => self.blank(node.as_str()),
        };
        let object = match quad.object {
            oxrdf::Term::NamedNode(node) => Term::Iri(Uri::new(node.as_str())),
            oxrdf::Term::BlankNode(node) => Term::Iri(self.blank(node.as_str())),
            oxrdf::Term::Literal(lit) => {
                let lang = lit.language().map(str::to_string);
                let datatype = if lang.is_some() || lit.datatype() == xsd::STRING {
                    None
                } else {
                    Some(Uri::new(lit.datatype().as_str()))
                };
                Term::Literal(Literal {
                    value: lit.value().to_string(),
                    datatype,
                    lang,
                })
            }
            #[allow(unreachable_patterns)]
            other => return Err(EnvError::parse(url, format!("unsupported object term {}", other))),
        };
        Ok(Triple::new(subject, Uri::new(quad.predicate.as_str()), object))
    }
}

/// Collects the prefix definitions of the top-level `@context`.
///
/// A term is a prefix when it maps to an absolute IRI ending in `/`, `#` or
/// `:`, or when its definition sets `"@prefix": true`. Remote contexts are
/// read through `contexts` when it is given.
fn context_prefixes(doc: &Value, contexts: Option<&(dyn DocumentResolver + Send + Sync)>) -> Vec<(String, String)> {
    let mut prefixes = Vec::new();
    let mut visited = HashSet::new();
    if let Some(ctx) = doc.get("@context") {
        collect_prefixes(ctx, contexts, &mut visited, &mut prefixes);
    }
    prefixes
}

fn collect_prefixes(
    ctx: &Value,
    contexts: Option<&(dyn DocumentResolver + Send + Sync)>,
    visited: &mut HashSet<String>,
    out: &mut Vec<(String, String)>,
) {
    match ctx {
        Value::Array(items) => {
            for item in items {
                collect_prefixes(item, contexts, visited, out);
            }
        }
        Value::String(url) => {
            let Some(resolver) = contexts else { return };
            if !is_absolute(url) || !visited.insert(url.clone()) {
                return;
            }
            let remote = resolver
                .fetch(url)
                .ok()
                .and_then(|text| serde_json::from_str::<Value>(&text).ok());
            match remote.as_ref().and_then(|doc| doc.get("@context")) {
                Some(inner) => collect_prefixes(inner, contexts, visited, out),
                None => debug!("no prefixes read from remote context '{}'", url),
            }
        }
        Value::Object(terms) => {
            for (term, def) in terms {
                if term.starts_with('@') || term.contains(':') {
                    continue;
                }
                let iri = match def {
                    Value::String(iri) if iri.ends_with(['/', '#', ':']) => iri,
                    Value::Object(def) if def.get("@prefix") == Some(&Value::Bool(true)) => {
                        match def.get("@id") {
                            Some(Value::String(iri)) => iri,
                            _ => continue,
                        }
                    }
                    _ => continue,
                };
                if is_absolute(iri) {
                    out.push((term.clone(), iri.clone()));
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::FileResolver;

    const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";

    fn parse_json(text: &str) -> ParsedDocument {
        let mut counter = 0;
        parse("mem://test", text, DocumentFormat::JsonLd, &mut counter, None).unwrap()
    }

    fn has(doc: &ParsedDocument, s: &str, p: &str, o: &str) -> bool {
        doc.triples
            .iter()
            .any(|t| t.subject.as_str() == s && t.predicate.as_str() == p && t.object.lexical() == o)
    }

    #[test]
    fn test_format_from_str_and_guess() {
        assert_eq!("json-ld".parse::<DocumentFormat>().unwrap(), DocumentFormat::JsonLd);
        assert_eq!("NT".parse::<DocumentFormat>().unwrap(), DocumentFormat::NTriples);
        assert!("turtle".parse::<DocumentFormat>().is_err());
        assert_eq!(DocumentFormat::guess("a/b/scene.json"), Some(DocumentFormat::JsonLd));
        assert_eq!(DocumentFormat::guess("a/b/scene.nt"), Some(DocumentFormat::NTriples));
        assert_eq!(DocumentFormat::guess("a/b/scene.ttl"), None);
    }

    #[test]
    fn test_jsonld_graph_with_coercion() {
        let doc = parse_json(
            r#"{
                "@context": {
                    "ex": "https://example.org/",
                    "objects": { "@id": "ex:has-object", "@type": "@id" },
                    "label": "ex:label"
                },
                "@graph": [
                    { "@id": "ex:scene", "@type": "ex:Scene", "objects": ["ex:cube1", "ex:cube2"], "label": "kitchen" }
                ]
            }"#,
        );

        assert!(has(&doc, "https://example.org/scene", RDF_TYPE, "https://example.org/Scene"));
        assert!(has(&doc, "https://example.org/scene", "https://example.org/has-object", "https://example.org/cube1"));
        assert!(has(&doc, "https://example.org/scene", "https://example.org/has-object", "https://example.org/cube2"));
        assert!(has(&doc, "https://example.org/scene", "https://example.org/label", "kitchen"));
        assert_eq!(doc.prefixes, vec![("ex".to_string(), "https://example.org/".to_string())]);
    }

    #[test]
    fn test_jsonld_node_context_terms_kept() {
        let doc = parse_json(
            r#"{
                "@context": { "ex": "https://example.org/" },
                "@graph": [
                    {
                        "@context": { "ws": { "@id": "ex:has-workspace", "@type": "@id" } },
                        "@id": "ex:scene",
                        "ws": ["ex:tableA", "ex:tableB"]
                    }
                ]
            }"#,
        );

        assert_eq!(doc.triples.len(), 2);
        assert!(has(&doc, "https://example.org/scene", "https://example.org/has-workspace", "https://example.org/tableB"));
    }

    #[test]
    fn test_jsonld_relative_ids_follow_rfc3986() {
        let doc = parse_json(
            r#"{
                "@context": { "@base": "https://e.org/models/scenes/", "ex": "https://example.org/" },
                "@id": "../agents/robot1",
                "ex:p": { "@id": "./table" }
            }"#,
        );

        assert!(has(&doc, "https://e.org/models/agents/robot1", "https://example.org/p", "https://e.org/models/scenes/table"));
    }

    #[test]
    fn test_jsonld_nested_node_is_blank() {
        let doc = parse_json(
            r#"{
                "@context": { "ex": "https://example.org/" },
                "@id": "ex:a",
                "ex:child": { "ex:value": 3 }
            }"#,
        );

        let child = doc
            .triples
            .iter()
            .find(|t| t.predicate.as_str() == "https://example.org/child")
            .and_then(|t| t.object.as_iri().cloned())
            .unwrap();
        assert!(child.is_blank());
        let value = doc
            .triples
            .iter()
            .find(|t| t.subject == child)
            .unwrap();
        match &value.object {
            Term::Literal(lit) => {
                assert_eq!(lit.value, "3");
                assert_eq!(lit.datatype.as_ref().map(Uri::as_str), Some(XSD_INTEGER));
            }
            other => panic!("expected literal, got {:?}", other),
        }
    }

    #[test]
    fn test_jsonld_undefined_terms_dropped() {
        let doc = parse_json(
            r#"{
                "@context": { "ex": "https://example.org/" },
                "@id": "ex:a",
                "unmapped": "x",
                "ex:mapped": "y"
            }"#,
        );
        assert_eq!(doc.triples.len(), 1);
        assert_eq!(doc.triples[0].object, Term::literal("y"));
    }

    #[test]
    fn test_jsonld_remote_context_needs_resolver() {
        let mut counter = 0;
        let err = parse(
            "mem://test",
            r#"{ "@context": "https://example.org/context.json", "@id": "https://example.org/a", "p": "x" }"#,
            DocumentFormat::JsonLd,
            &mut counter,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, EnvError::Parse { .. }));
    }

    #[test]
    fn test_jsonld_remote_context_from_mirror() {
        let dir = tempfile::tempdir().unwrap();
        let ctx_dir = dir.path().join("example.org").join("contexts");
        std::fs::create_dir_all(&ctx_dir).unwrap();
        std::fs::write(
            ctx_dir.join("bdd.json"),
            r#"{ "@context": {
                "ex": "https://example.org/",
                "has-agent": { "@id": "ex:has-agent", "@type": "@id" }
            } }"#,
        )
        .unwrap();

        let resolver: ContextLoader = Arc::new(FileResolver::new().with_mirror(dir.path()));
        let mut counter = 0;
        let doc = parse(
            "https://example.org/scenes/lab.json",
            r#"{
                "@context": "https://example.org/contexts/bdd.json",
                "@id": "ex:scene",
                "has-agent": "ex:robot1"
            }"#,
            DocumentFormat::JsonLd,
            &mut counter,
            Some(resolver),
        )
        .unwrap();

        assert!(has(&doc, "https://example.org/scene", "https://example.org/has-agent", "https://example.org/robot1"));
        assert_eq!(doc.prefixes, vec![("ex".to_string(), "https://example.org/".to_string())]);
    }

    #[test]
    fn test_ntriples() {
        let mut counter = 0;
        let text = r#"
# comment
<https://e.org/a> <https://e.org/p> <https://e.org/b> .
<https://e.org/a> <https://e.org/name> "say \"hi\""@en .
_:x <https://e.org/p> "5"^^<http://www.w3.org/2001/XMLSchema#integer> .
"#;
        let doc = parse("mem://nt", text, DocumentFormat::NTriples, &mut counter, None).unwrap();

        assert_eq!(doc.triples.len(), 3);
        assert!(has(&doc, "https://e.org/a", "https://e.org/p", "https://e.org/b"));
        assert!(has(&doc, "https://e.org/a", "https://e.org/name", "say \"hi\""));
        assert!(doc.triples[2].subject.is_blank());
        assert_eq!(counter, 1);
    }

    #[test]
    fn test_ntriples_unicode_escapes() {
        let mut counter = 0;
        let text = "<https://e.org/a> <https://e.org/p> \"caf\\u00E9 \\U0001F916\" .\n\
                    <https://e.org/caf\\u00E9> <https://e.org/p> \"x\" .\n";
        let doc = parse("mem://nt", text, DocumentFormat::NTriples, &mut counter, None).unwrap();

        assert_eq!(doc.triples[0].object, Term::literal("café 🤖"));
        assert_eq!(doc.triples[1].subject.as_str(), "https://e.org/café");
    }

    #[test]
    fn test_ntriples_missing_dot_fails() {
        let mut counter = 0;
        let text = "<https://e.org/a> <https://e.org/p> <https://e.org/b>";
        assert!(parse("mem://nt", text, DocumentFormat::NTriples, &mut counter, None).is_err());
    }
}
