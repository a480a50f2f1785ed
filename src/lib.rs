//! Type Graph Schema Generator
//!
//! Converts a graph of marker-annotated type declarations into JSON Schema
//! documents.
//!
//! Packages carrying the `validation:schema` marker get a primary document
//! named after the package; every other type lands in a shared
//! `external.json` document under a package-qualified key. Types carrying
//! `validation:object` additionally get a filtered document named after the
//! type, holding only the fields that lead to taxonomy types.
//!
//! # Example
//!
//! ```
//! use typegraph_schema::{
//!     Field, FieldType, Generator, GeneratorOptions, Package, TypeGraph, TypeInfo,
//! };
//!
//! let graph = TypeGraph::new()
//!     .with_package(Package::new("example.com/api", "api").marker("validation:schema"))
//!     .with_type(
//!         TypeInfo::new("example.com/api", "Spec")
//!             .field(Field::new("Name", FieldType::scalar("string")).alias("name")),
//!     );
//!
//! let assembly = Generator::new(GeneratorOptions::default()).assemble(&graph);
//! let api = assembly.document("api.json").unwrap();
//! assert!(api.definitions.contains_key("Spec"));
//! ```
//!
//! # Documents
//!
//! | Source | Document | Definition key |
//! |--------|----------|----------------|
//! | package with `validation:schema` | `<package>.json` | `Type` |
//! | any other package | `external.json` | `pkg~1path~0Type` |
//! | type with `validation:object` | `<Type>.json` | `Type` |

mod assemble;
mod cache;
mod context;
mod convert;
mod error;
mod loader;
mod naming;
mod relevance;
mod types;
mod writer;

use std::path::Path;

pub use assemble::{assemble_documents, Assembly, Document, Generator};
pub use cache::SchemaCache;
pub use context::GenerationContext;
pub use convert::{ConvertScope, DefaultConverter, TypeConverter};
pub use error::{Diagnostic, GenerateError, LoadError, WriteError};
pub use loader::{is_url, load_graph, load_graph_auto, load_graph_str};
pub use naming::{qualified_name, ref_target_name, split_qualified_name};
pub use relevance::{collect_relevant, prune_fragment, strip_metadata, Relevance};
pub use types::{
    Field, FieldType, GeneratorOptions, Marker, Package, TypeGraph, TypeGraphManifest, TypeIdent,
    TypeInfo, DEFAULT_TAINT_SENTINEL, EXTERNAL_DOCUMENT_NAME,
};
pub use writer::{render_document, write_documents};

#[cfg(feature = "remote")]
pub use loader::load_graph_url;

/// Assemble all documents for `graph` and write them into `output_dir`.
///
/// Non-fatal diagnostics are returned alongside the assembly; only write
/// failures abort.
///
/// # Errors
///
/// Returns `WriteError` if the directory or a document cannot be written.
pub fn generate(
    graph: &TypeGraph,
    options: GeneratorOptions,
    output_dir: &Path,
) -> Result<Assembly, WriteError> {
    let assembly = Generator::new(options).assemble(graph);
    write_documents(output_dir, &assembly.documents)?;
    Ok(assembly)
}
