//! Document assembly: partition fragments into named schema documents.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::cache::SchemaCache;
use crate::context::GenerationContext;
use crate::convert::{DefaultConverter, TypeConverter};
use crate::error::Diagnostic;
use crate::naming::{definition_link, object_document_name};
use crate::relevance::{collect_relevant, prune_fragment, strip_metadata};
use crate::types::{GeneratorOptions, Marker, TypeGraph, TypeIdent, TypeInfo};

/// A standalone JSON Schema document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub title: String,
    /// Top-level schema of a filtered document (its object-marked root).
    pub root: Option<Map<String, Value>>,
    pub definitions: BTreeMap<String, Value>,
}

impl Document {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            root: None,
            definitions: BTreeMap::new(),
        }
    }

    /// JSON form: `title`, then the root schema keys, then `definitions`.
    pub fn to_value(&self) -> Value {
        let mut document = Map::new();
        document.insert("title".to_string(), Value::String(self.title.clone()));
        if let Some(root) = &self.root {
            for (key, value) in root {
                if key != "title" && key != "definitions" {
                    document.insert(key.clone(), value.clone());
                }
            }
        }
        let definitions = self
            .definitions
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        document.insert("definitions".to_string(), Value::Object(definitions));
        Value::Object(document)
    }
}

/// Result of a generation run, before anything is written.
#[derive(Debug, Clone)]
pub struct Assembly {
    /// Documents by file name.
    pub documents: BTreeMap<String, Document>,
    /// Non-fatal errors collected during the run.
    pub diagnostics: Vec<Diagnostic>,
}

impl Assembly {
    pub fn document(&self, name: &str) -> Option<&Document> {
        self.documents.get(name)
    }
}

/// Drives one run: discovery, conversion, filtering and assembly.
pub struct Generator {
    options: GeneratorOptions,
    converter: Box<dyn TypeConverter>,
}

impl Generator {
    pub fn new(options: GeneratorOptions) -> Self {
        Self {
            options,
            converter: Box::new(DefaultConverter),
        }
    }

    /// Replace the type-to-schema converter.
    pub fn with_converter(mut self, converter: impl TypeConverter + 'static) -> Self {
        self.converter = Box::new(converter);
        self
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Build every document for `graph`.
    pub fn assemble(&self, graph: &TypeGraph) -> Assembly {
        let mut ctx = GenerationContext::new(graph, self.options.clone());
        let mut cache = SchemaCache::new();

        for (ident, _) in graph.types() {
            if ctx.has_type_marker(ident, Marker::Object)
                || ctx.has_package_marker(&ident.package, Marker::Schema)
            {
                cache.ensure_schema(&mut ctx, self.converter.as_ref(), ident);
            }
        }
        info!(
            types = cache.len(),
            conversions = cache.conversions(),
            "generated schema fragments"
        );

        let documents = assemble_documents(&ctx, &cache);
        Assembly {
            documents,
            diagnostics: ctx.into_diagnostics(),
        }
    }
}

/// Partition cached fragments into primary, external and filtered documents.
pub fn assemble_documents(
    ctx: &GenerationContext<'_>,
    cache: &SchemaCache,
) -> BTreeMap<String, Document> {
    let mut documents: BTreeMap<String, Document> = BTreeMap::new();

    for (ident, fragment) in cache.iter() {
        let name = ctx.document_name_for(&ident.package);
        let key = ctx.definition_key_for(&name, ident);
        documents
            .entry(name.clone())
            .or_insert_with(|| Document::new(&name))
            .definitions
            .insert(key, fragment.clone());
    }

    for (ident, _) in cache.iter() {
        if ctx.has_type_marker(ident, Marker::Object) {
            add_object_document(ctx, cache, ident, &mut documents);
        }
    }

    for (name, document) in &documents {
        debug!(document = %name, definitions = document.definitions.len(), "assembled document");
    }
    documents
}

/// Build the filtered document of one object-marked type.
///
/// Copied fragments carry links computed for their home document, so each
/// copy is relinked: types copied alongside it point into this document and
/// everything else points at its home document.
fn add_object_document(
    ctx: &GenerationContext<'_>,
    cache: &SchemaCache,
    root: &TypeIdent,
    documents: &mut BTreeMap<String, Document>,
) {
    let graph = ctx.graph();
    let (Some(info), Some(fragment)) = (graph.get(root), cache.get(root)) else {
        return;
    };
    let sentinel = &ctx.options().taint_sentinel;

    let relevance = collect_relevant(graph, sentinel, root);
    let relevant = relevance.names();
    let name = object_document_name(&root.name);

    let mut copied: BTreeSet<TypeIdent> = relevance
        .types
        .iter()
        .filter(|ident| cache.get(ident).is_some())
        .cloned()
        .collect();
    copied.insert(root.clone());

    let mut root_schema = prune_fragment(fragment, info, &relevant, graph, sentinel);
    strip_metadata(&mut root_schema, info);
    relink(&mut root_schema, &document_links(ctx, root, info, &name, &copied));

    let document = documents
        .entry(name.clone())
        .or_insert_with(|| Document::new(&name));
    if document.root.is_none() {
        if let Value::Object(schema) = &root_schema {
            document.root = Some(schema.clone());
        }
    }
    document
        .definitions
        .insert(ctx.definition_key_for(&name, root), root_schema);

    for descendant in &relevance.types {
        let (Some(info), Some(fragment)) = (graph.get(descendant), cache.get(descendant)) else {
            continue;
        };
        let mut pruned = prune_fragment(fragment, info, &relevant, graph, sentinel);
        relink(
            &mut pruned,
            &document_links(ctx, descendant, info, &name, &copied),
        );
        document
            .definitions
            .insert(ctx.definition_key_for(&name, descendant), pruned);
    }
}

/// Map every link a fragment of `owner` may hold to its form inside `document`.
fn document_links(
    ctx: &GenerationContext<'_>,
    owner: &TypeIdent,
    info: &TypeInfo,
    document: &str,
    copied: &BTreeSet<TypeIdent>,
) -> BTreeMap<String, String> {
    let mut links = BTreeMap::new();
    for field in &info.fields {
        let Some(target) = field.ty.referenced() else {
            continue;
        };
        if !ctx.graph().contains(target) {
            continue;
        }

        let link = if copied.contains(target) {
            definition_link(None, &ctx.definition_key_for(document, target))
        } else {
            let home = ctx.document_name_for(&target.package);
            let key = ctx.definition_key_for(&home, target);
            if home == document {
                definition_link(None, &key)
            } else {
                definition_link(Some(&home), &key)
            }
        };
        links.insert(ctx.resolve_reference(&owner.package, target), link);
    }
    links
}

/// Rewrite every `$ref` found in `links`, at any depth.
fn relink(schema: &mut Value, links: &BTreeMap<String, String>) {
    match schema {
        Value::Object(map) => {
            for (key, value) in map.iter_mut() {
                if key == "$ref" {
                    if let Some(link) = value.as_str().and_then(|r| links.get(r)).cloned() {
                        *value = Value::String(link);
                        continue;
                    }
                }
                relink(value, links);
            }
        }
        Value::Array(items) => {
            for item in items {
                relink(item, links);
            }
        }
        _ => {}
    }
}
