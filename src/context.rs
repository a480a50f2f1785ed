//! Per-run generation context: marker tables, naming and diagnostics.

use std::collections::{BTreeMap, BTreeSet};

use tracing::warn;

use crate::error::{Diagnostic, GenerateError};
use crate::naming::{definition_link, non_vendor_path, package_document_name, qualified_name};
use crate::types::{
    GeneratorOptions, Marker, MarkerScope, TypeGraph, TypeIdent, EXTERNAL_DOCUMENT_NAME,
    MARKER_NAMESPACE,
};

/// State owned by one generation run.
///
/// Holds the read-only graph, the marker tables extracted from it, and the
/// non-fatal diagnostics accumulated so far. Nothing survives between runs.
#[derive(Debug)]
pub struct GenerationContext<'g> {
    graph: &'g TypeGraph,
    options: GeneratorOptions,
    package_markers: BTreeMap<String, BTreeSet<Marker>>,
    type_markers: BTreeMap<TypeIdent, BTreeSet<Marker>>,
    diagnostics: Vec<Diagnostic>,
}

impl<'g> GenerationContext<'g> {
    pub fn new(graph: &'g TypeGraph, options: GeneratorOptions) -> Self {
        let mut ctx = Self {
            graph,
            options,
            package_markers: BTreeMap::new(),
            type_markers: BTreeMap::new(),
            diagnostics: Vec::new(),
        };

        for package in graph.packages() {
            let markers = ctx.load_markers(&package.path, &package.markers, MarkerScope::Package);
            ctx.package_markers.insert(package.path.clone(), markers);
        }
        for (ident, info) in graph.types() {
            let markers = ctx.load_markers(&ident.to_string(), &info.markers, MarkerScope::Type);
            ctx.type_markers.insert(ident.clone(), markers);
        }

        ctx
    }

    /// Parse raw markers for one entity.
    ///
    /// Markers outside our namespace are ignored. Any failure empties the
    /// whole set for that entity.
    fn load_markers(
        &mut self,
        subject: &str,
        raw: &[String],
        scope: MarkerScope,
    ) -> BTreeSet<Marker> {
        let mut markers = BTreeSet::new();
        for name in raw {
            let trimmed = name.trim_start_matches('+');
            if !trimmed.starts_with(MARKER_NAMESPACE) {
                continue;
            }
            let failure = match Marker::parse(trimmed) {
                Some(marker) if marker.scope() == scope => {
                    markers.insert(marker);
                    continue;
                }
                Some(_) => "marker is not allowed at this scope",
                None => "unknown marker",
            };
            self.record(
                subject,
                GenerateError::MarkerLoadFailure {
                    marker: name.clone(),
                    message: failure.to_string(),
                },
            );
            return BTreeSet::new();
        }
        markers
    }

    pub fn graph(&self) -> &'g TypeGraph {
        self.graph
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    pub fn has_package_marker(&self, package: &str, marker: Marker) -> bool {
        self.package_markers
            .get(package)
            .is_some_and(|markers| markers.contains(&marker))
    }

    pub fn has_type_marker(&self, ident: &TypeIdent, marker: Marker) -> bool {
        self.type_markers
            .get(ident)
            .is_some_and(|markers| markers.contains(&marker))
    }

    /// Home document of every type in `package`.
    pub fn document_name_for(&self, package: &str) -> String {
        if self.has_package_marker(package, Marker::Schema) {
            if let Some(pkg) = self.graph.package(package) {
                return package_document_name(&pkg.name);
            }
        }
        EXTERNAL_DOCUMENT_NAME.to_string()
    }

    /// Key of `ident` inside `document`.
    ///
    /// The external document collects types from many packages, so its keys
    /// are qualified with the package path.
    pub fn definition_key_for(&self, document: &str, ident: &TypeIdent) -> String {
        if document == EXTERNAL_DOCUMENT_NAME {
            return qualified_name(non_vendor_path(&ident.package), &ident.name);
        }
        ident.name.clone()
    }

    /// `$ref` value to use in a fragment of `from_package` pointing at `to`.
    pub fn resolve_reference(&self, from_package: &str, to: &TypeIdent) -> String {
        let from_document = self.document_name_for(from_package);
        let to_document = self.document_name_for(&to.package);
        let key = self.definition_key_for(&to_document, to);
        if from_document == to_document {
            definition_link(None, &key)
        } else {
            definition_link(Some(&to_document), &key)
        }
    }

    /// Record a non-fatal error against a package or type.
    pub fn record(&mut self, subject: &str, error: GenerateError) {
        let diagnostic = Diagnostic::new(subject, error);
        warn!(subject, code = diagnostic.code, "{}", diagnostic.message);
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
