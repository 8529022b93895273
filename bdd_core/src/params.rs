//! Step parameter parsing: participant references in free-form strings.

use crate::error::ModelError;
use bdd_env::{NamespaceManager, Uri};
use serde::Serialize;

/// How the alternatives of a participant parameter combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    /// A single participant
    Single,

    /// Any one of the listed participants (`a or b`)
    AnyOf,

    /// All of the listed participants (`a and b`)
    AllOf,
}

impl ParamKind {
    fn separator(&self) -> &'static str {
        match self {
            ParamKind::Single | ParamKind::AnyOf => "or",
            ParamKind::AllOf => "and",
        }
    }
}

/// Ordered, duplicate-free set of participant URIs parsed from a parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipantSet {
    kind: ParamKind,
    uris: Vec<Uri>,
}

impl ParticipantSet {
    pub fn kind(&self) -> ParamKind {
        self.kind
    }

    pub fn uris(&self) -> &[Uri] {
        &self.uris
    }

    pub fn len(&self) -> usize {
        self.uris.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uris.is_empty()
    }

    pub fn contains(&self, uri: &Uri) -> bool {
        self.uris.contains(uri)
    }

    /// Renders the set with compact names, e.g. `ex:robot1 or ex:robot2`.
    pub fn to_compact(&self, ns: &NamespaceManager) -> String {
        self.uris
            .iter()
            .map(|uri| ns.compact(uri))
            .collect::<Vec<_>>()
            .join(&format!(" {} ", self.kind.separator()))
    }
}

/// Parses a participant parameter into its alternatives.
///
/// Accepts one compact name, or names joined by `or` (any-of) or `and`
/// (all-of). Mixing separators, empty elements and names that don't
/// expand are hard errors; nothing is skipped.
pub fn parse_str_param(param_str: &str, ns: &NamespaceManager) -> Result<ParticipantSet, ModelError> {
    let tokens: Vec<&str> = param_str.split_whitespace().collect();
    if tokens.is_empty() {
        return Err(ModelError::invalid_param(param_str, "empty parameter"));
    }

    let mut kind = ParamKind::Single;
    let mut uris: Vec<Uri> = Vec::new();

    for (i, token) in tokens.iter().enumerate() {
        if i % 2 == 1 {
            let token_kind = match *token {
                "or" => ParamKind::AnyOf,
                "and" => ParamKind::AllOf,
                other => {
                    return Err(ModelError::invalid_param(
                        param_str,
                        format!("expected 'or'/'and' between elements, found '{}'", other),
                    ))
                }
            };
            if kind != ParamKind::Single && kind != token_kind {
                return Err(ModelError::invalid_param(param_str, "mixed 'or' and 'and' separators"));
            }
            kind = token_kind;
            continue;
        }

        let uri = ns
            .expand_curie(token)
            .map_err(|e| ModelError::invalid_param(param_str, e.to_string()))?;
        if !uris.contains(&uri) {
            uris.push(uri);
        }
    }

    if tokens.len() % 2 == 0 {
        return Err(ModelError::invalid_param(param_str, "dangling separator"));
    }
    if uris.len() == 1 {
        kind = ParamKind::Single;
    }

    Ok(ParticipantSet { kind, uris })
}
