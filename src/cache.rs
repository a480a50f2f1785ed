//! Schema cache and the conversion driver that fills it.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::debug;

use crate::context::GenerationContext;
use crate::convert::{ConvertScope, TypeConverter};
use crate::error::GenerateError;
use crate::types::TypeIdent;

/// One schema fragment per type, converted at most once.
#[derive(Debug, Default)]
pub struct SchemaCache {
    fragments: BTreeMap<TypeIdent, Value>,
    conversions: usize,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure `root` and every type it references have a fragment.
    ///
    /// Uses an explicit worklist. A placeholder is installed before a type
    /// is converted, so a type that is reached again while (or after) it is
    /// being converted is never converted twice and cycles terminate.
    pub fn ensure_schema(
        &mut self,
        ctx: &mut GenerationContext<'_>,
        converter: &dyn TypeConverter,
        root: &TypeIdent,
    ) {
        let mut worklist = vec![root.clone()];

        while let Some(ident) = worklist.pop() {
            if self.fragments.contains_key(&ident) {
                continue;
            }

            let Some(info) = ctx.graph().get(&ident) else {
                let package = ident.package.clone();
                ctx.record(&package, GenerateError::UnknownType { ident });
                continue;
            };

            self.fragments.insert(ident.clone(), Value::Object(Map::new()));

            let mut scope = ConvertScope::new(ctx, &ident);
            let fragment = converter.convert(info, &mut scope);
            let pending = scope.into_pending();

            debug!(%ident, references = pending.len(), "converted type");
            self.conversions += 1;
            self.fragments.insert(ident, fragment);

            // Reverse so references are visited in field order.
            worklist.extend(pending.into_iter().rev());
        }
    }

    pub fn get(&self, ident: &TypeIdent) -> Option<&Value> {
        self.fragments.get(ident)
    }

    /// Fragments ordered by type identity.
    pub fn iter(&self) -> impl Iterator<Item = (&TypeIdent, &Value)> {
        self.fragments.iter()
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Number of conversions performed so far.
    pub fn conversions(&self) -> usize {
        self.conversions
    }
}
