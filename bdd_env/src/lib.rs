//! BDD Environment Abstraction Layer
//!
//! This crate provides the boundaries the scenario model resolver and the
//! behaviour driver are written against:
//!
//! - **Graph store**: triples parsed from model documents, keyed queries
//! - **Namespaces**: expansion of compact `prefix:local` names
//! - **Documents**: JSON-LD / N-Triples parsing, URL → local file resolution
//! - **Execution context**: clock, sleep and report sink for behaviour steps
//!
//! # Example
//!
//! ```ignore
//! use bdd_env::{DocumentFormat, FileResolver, GraphStore, MemoryGraph};
//!
//! let resolver = FileResolver::new().with_mirror("models/");
//! let mut graph = MemoryGraph::new();
//! graph.load(&resolver, "https://example.org/scenes/lab.scene.json", DocumentFormat::JsonLd)?;
//! let cube = graph.namespaces().expand_curie("ex:cube1")?;
//! ```

mod context;
pub mod document;
mod error;
mod graph;
mod namespace;
mod resolver;
mod types;
mod wall_clock;

pub use context::ExecContext;
pub use document::{ContextLoader, DocumentFormat, RDF_TYPE};
pub use error::EnvError;
pub use graph::{GraphStore, MemoryGraph};
pub use namespace::NamespaceManager;
pub use resolver::{DocumentResolver, FileResolver};
pub use types::{Literal, Term, Triple, Uri};
pub use wall_clock::WallClockContext;
