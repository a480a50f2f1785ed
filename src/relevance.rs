//! Taxonomy reachability and pruning for object-marked types.
//!
//! A field whose declared type contains the taint sentinel (by default
//! `taxonomy`) taints the type holding it. Taint propagates to every
//! ancestor on the path from an object-marked root, and those tainted
//! descendants are the only types kept in the root's filtered document.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::naming::ref_target_name;
use crate::types::{TypeGraph, TypeIdent, TypeInfo, METADATA_PROPERTY};

/// Outcome of [`collect_relevant`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relevance {
    /// Descendant types that lead to a taxonomy field.
    pub types: BTreeSet<TypeIdent>,
    /// Whether the visited type itself leads to a taxonomy field.
    pub tainted: bool,
}

impl Relevance {
    /// Local names of the relevant types, as used for pruning.
    pub fn names(&self) -> BTreeSet<String> {
        self.types.iter().map(|ident| ident.name.clone()).collect()
    }
}

/// Collect the descendants of `root` that must survive filtering.
///
/// Depth-first and memo-free. A type already on the current path
/// contributes nothing, so cyclic graphs terminate.
pub fn collect_relevant(graph: &TypeGraph, sentinel: &str, root: &TypeIdent) -> Relevance {
    let mut path = BTreeSet::new();
    collect_inner(graph, sentinel, root, &mut path)
}

fn collect_inner(
    graph: &TypeGraph,
    sentinel: &str,
    ident: &TypeIdent,
    path: &mut BTreeSet<TypeIdent>,
) -> Relevance {
    let mut relevance = Relevance::default();
    let Some(info) = graph.get(ident) else {
        return relevance;
    };
    if !path.insert(ident.clone()) {
        return relevance;
    }

    for field in &info.fields {
        if field.ty.declared_text().contains(sentinel) {
            relevance.tainted = true;
            continue;
        }

        // Only the named type is followed; containers are unwrapped.
        let Some(child) = field.ty.referenced() else {
            continue;
        };
        if !graph.contains(child) {
            continue;
        }

        let nested = collect_inner(graph, sentinel, child, path);
        if nested.tainted {
            relevance.types.insert(child.clone());
            relevance.types.extend(nested.types);
            relevance.tainted = true;
        }
    }

    path.remove(ident);
    relevance
}

/// Copy of `fragment` without the properties that lead nowhere relevant.
///
/// A property backed by a field of `info` is dropped when that field refers
/// to a known type missing from `relevant`. Taxonomy fields and scalar or
/// opaque fields are always kept. Properties without a backing field are
/// judged by their `$ref` (looking through array items and map values).
pub fn prune_fragment(
    fragment: &Value,
    info: &TypeInfo,
    relevant: &BTreeSet<String>,
    graph: &TypeGraph,
    sentinel: &str,
) -> Value {
    let mut pruned = fragment.clone();
    if let Some(schema) = pruned.as_object_mut() {
        let removed = removed_properties(schema, info, relevant, graph, sentinel);
        remove_properties(schema, &removed);
    }
    pruned
}

/// Names of the properties of `schema` that [`prune_fragment`] drops.
fn removed_properties(
    schema: &Map<String, Value>,
    info: &TypeInfo,
    relevant: &BTreeSet<String>,
    graph: &TypeGraph,
    sentinel: &str,
) -> Vec<String> {
    let mut removed = Vec::new();
    let mut backed = BTreeSet::new();
    for field in &info.fields {
        let Some(alias) = &field.alias else {
            continue;
        };
        backed.insert(alias.as_str());
        if field.ty.declared_text().contains(sentinel) {
            continue;
        }
        if let Some(target) = field.ty.referenced() {
            if graph.contains(target) && !relevant.contains(&target.name) {
                removed.push(alias.clone());
            }
        }
    }

    if let Some(Value::Object(properties)) = schema.get("properties") {
        for (name, property) in properties {
            if backed.contains(name.as_str()) {
                continue;
            }
            let Some(reference) = property_ref(property) else {
                continue;
            };
            let target = ref_target_name(reference);
            if !reference.contains(sentinel)
                && graph.has_type_named(target)
                && !relevant.contains(target)
            {
                removed.push(name.clone());
            }
        }
    }

    removed
}

/// Remove `metadata` and any `allOf` entry composing the metadata type in.
pub fn strip_metadata(fragment: &mut Value, info: &TypeInfo) {
    let Some(schema) = fragment.as_object_mut() else {
        return;
    };

    let metadata_type = info
        .fields
        .iter()
        .find(|field| field.alias.as_deref() == Some(METADATA_PROPERTY))
        .and_then(|field| field.ty.referenced())
        .map(|ident| ident.name.clone());

    remove_properties(schema, &[METADATA_PROPERTY.to_string()]);

    let Some(metadata_type) = metadata_type else {
        return;
    };
    if let Some(Value::Array(all_of)) = schema.get_mut("allOf") {
        all_of.retain(|entry| {
            entry
                .get("$ref")
                .and_then(Value::as_str)
                .map_or(true, |reference| ref_target_name(reference) != metadata_type)
        });
        if all_of.is_empty() {
            schema.remove("allOf");
        }
    }
}

/// The `$ref` of a property, looking through array and map containers.
fn property_ref(property: &Value) -> Option<&str> {
    if let Some(reference) = property.get("$ref").and_then(Value::as_str) {
        return Some(reference);
    }
    property
        .get("items")
        .and_then(property_ref)
        .or_else(|| property.get("additionalProperties").and_then(property_ref))
}

fn remove_properties(schema: &mut Map<String, Value>, names: &[String]) {
    if names.is_empty() {
        return;
    }
    if let Some(Value::Object(properties)) = schema.get_mut("properties") {
        for name in names {
            properties.remove(name);
        }
    }
    if let Some(Value::Array(required)) = schema.get_mut("required") {
        required.retain(|entry| {
            entry
                .as_str()
                .map_or(true, |name| !names.iter().any(|removed| removed == name))
        });
    }
}
