//! Type-to-schema conversion.
//!
//! A [`TypeConverter`] turns one type's field list into a JSON Schema
//! fragment. Whenever a field refers to another known type, the converter
//! asks its [`ConvertScope`] for a link; the scope queues that type so the
//! cache converts it later.

use serde_json::{json, Map, Value};

use crate::context::GenerationContext;
use crate::error::GenerateError;
use crate::types::{FieldType, TypeIdent, TypeInfo};

/// Converts a single type declaration into a schema fragment.
pub trait TypeConverter {
    fn convert(&self, info: &TypeInfo, scope: &mut ConvertScope<'_, '_>) -> Value;
}

/// Conversion services available while converting one type.
pub struct ConvertScope<'c, 'g> {
    ctx: &'c mut GenerationContext<'g>,
    ident: &'c TypeIdent,
    pending: Vec<TypeIdent>,
}

impl<'c, 'g> ConvertScope<'c, 'g> {
    pub fn new(ctx: &'c mut GenerationContext<'g>, ident: &'c TypeIdent) -> Self {
        Self {
            ctx,
            ident,
            pending: Vec::new(),
        }
    }

    /// The type being converted.
    pub fn ident(&self) -> &TypeIdent {
        self.ident
    }

    pub fn allow_dangerous_types(&self) -> bool {
        self.ctx.options().allow_dangerous_types
    }

    /// `$ref` link to `to`, queueing it for conversion.
    ///
    /// Returns `None` and records `UnknownType` against the converting
    /// type's package when `to` is not in the graph.
    pub fn link_to(&mut self, to: &TypeIdent) -> Option<String> {
        if !self.ctx.graph().contains(to) {
            let package = self.ident.package.clone();
            self.ctx
                .record(&package, GenerateError::UnknownType { ident: to.clone() });
            return None;
        }
        self.pending.push(to.clone());
        Some(self.ctx.resolve_reference(&self.ident.package, to))
    }

    /// Record a non-fatal error against the converting type.
    pub fn report(&mut self, error: GenerateError) {
        let subject = self.ident.to_string();
        self.ctx.record(&subject, error);
    }

    pub fn into_pending(self) -> Vec<TypeIdent> {
        self.pending
    }
}

/// Stock converter for object types with scalar, array, map and reference fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultConverter;

impl TypeConverter for DefaultConverter {
    fn convert(&self, info: &TypeInfo, scope: &mut ConvertScope<'_, '_>) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        let mut all_of = Vec::new();

        for field in &info.fields {
            match &field.alias {
                Some(alias) => {
                    properties.insert(alias.clone(), self.field_schema(&field.ty, scope));
                    if !field.optional {
                        required.push(Value::String(alias.clone()));
                    }
                }
                None if field.inline => {
                    // Embedded base: compose it in rather than nesting it.
                    if let FieldType::Reference(base) = &field.ty {
                        if let Some(link) = scope.link_to(base) {
                            all_of.push(json!({ "$ref": link }));
                        }
                    }
                }
                // Not serialized.
                None => {}
            }
        }

        let mut schema = Map::new();
        schema.insert("type".to_string(), json!("object"));
        schema.insert("properties".to_string(), Value::Object(properties));
        if !required.is_empty() {
            schema.insert("required".to_string(), Value::Array(required));
        }
        if !all_of.is_empty() {
            schema.insert("allOf".to_string(), Value::Array(all_of));
        }
        Value::Object(schema)
    }
}

impl DefaultConverter {
    fn field_schema(&self, ty: &FieldType, scope: &mut ConvertScope<'_, '_>) -> Value {
        match ty {
            FieldType::Scalar { name } => scalar_schema(name, scope),
            FieldType::Array { items } => json!({
                "type": "array",
                "items": self.field_schema(items, scope),
            }),
            FieldType::Map { values } => json!({
                "type": "object",
                "additionalProperties": self.field_schema(values, scope),
            }),
            FieldType::Reference(target) => match scope.link_to(target) {
                Some(link) => json!({ "$ref": link }),
                None => json!({}),
            },
        }
    }
}

fn scalar_schema(name: &str, scope: &mut ConvertScope<'_, '_>) -> Value {
    match name {
        "string" => json!({ "type": "string" }),
        "bool" => json!({ "type": "boolean" }),
        "int" | "int64" | "uint64" => json!({ "type": "integer", "format": "int64" }),
        "int32" | "int16" | "int8" | "uint" | "uint32" | "uint16" | "uint8" => {
            json!({ "type": "integer", "format": "int32" })
        }
        "byte" => json!({ "type": "integer" }),
        "float32" | "float64" => {
            if scope.allow_dangerous_types() {
                json!({ "type": "number" })
            } else {
                scope.report(GenerateError::DangerousType {
                    scalar: name.to_string(),
                });
                json!({})
            }
        }
        "any" => json!({}),
        other => {
            scope.report(GenerateError::UnsupportedScalar {
                scalar: other.to_string(),
            });
            json!({})
        }
    }
}
