//! Core types for the type graph and its markers.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of the shared document holding types from unmarked packages.
pub const EXTERNAL_DOCUMENT_NAME: &str = "external.json";

/// Default substring that marks a field type as a taxonomy type.
pub const DEFAULT_TAINT_SENTINEL: &str = "taxonomy";

/// Property stripped from every object-marked root fragment.
pub const METADATA_PROPERTY: &str = "metadata";

/// Namespace shared by all markers this generator understands.
pub const MARKER_NAMESPACE: &str = "validation:";

/// Identity of a declared type: owning package path plus local name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypeIdent {
    pub package: String,
    pub name: String,
}

impl TypeIdent {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for TypeIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.package, self.name)
    }
}

/// Structured declared type of a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FieldType {
    Scalar { name: String },
    Array { items: Box<FieldType> },
    Map { values: Box<FieldType> },
    Reference(TypeIdent),
}

impl FieldType {
    pub fn scalar(name: impl Into<String>) -> Self {
        FieldType::Scalar { name: name.into() }
    }

    pub fn array(items: FieldType) -> Self {
        FieldType::Array {
            items: Box::new(items),
        }
    }

    pub fn map(values: FieldType) -> Self {
        FieldType::Map {
            values: Box::new(values),
        }
    }

    pub fn reference(package: impl Into<String>, name: impl Into<String>) -> Self {
        FieldType::Reference(TypeIdent::new(package, name))
    }

    /// The referenced type after unwrapping array and map containers.
    pub fn referenced(&self) -> Option<&TypeIdent> {
        match self {
            FieldType::Scalar { .. } => None,
            FieldType::Array { items } => items.referenced(),
            FieldType::Map { values } => values.referenced(),
            FieldType::Reference(ident) => Some(ident),
        }
    }

    /// Canonical "as written" rendering, used for the taint check.
    pub fn declared_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Scalar { name } => f.write_str(name),
            FieldType::Array { items } => write!(f, "[]{}", items),
            FieldType::Map { values } => write!(f, "map[string]{}", values),
            FieldType::Reference(ident) => write!(f, "{}", ident),
        }
    }
}

/// A single field of a declared type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: FieldType,
    /// Serialized property name. Fields without one are not serialized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default)]
    pub optional: bool,
    /// Embedded base whose fields are composed in through `allOf`.
    #[serde(default)]
    pub inline: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            alias: None,
            optional: false,
            inline: false,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn inline(mut self) -> Self {
        self.inline = true;
        self
    }
}

/// Declaration of a type in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeInfo {
    pub package: String,
    pub name: String,
    #[serde(default)]
    pub markers: Vec<String>,
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl TypeInfo {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
            markers: Vec::new(),
            fields: Vec::new(),
        }
    }

    pub fn ident(&self) -> TypeIdent {
        TypeIdent::new(&self.package, &self.name)
    }

    pub fn marker(mut self, marker: impl Into<String>) -> Self {
        self.markers.push(marker.into());
        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }
}

/// A package as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub path: String,
    pub name: String,
    #[serde(default)]
    pub markers: Vec<String>,
}

impl Package {
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            markers: Vec::new(),
        }
    }

    pub fn marker(mut self, marker: impl Into<String>) -> Self {
        self.markers.push(marker.into());
        self
    }
}

/// Serialized shape of a type graph manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeGraphManifest {
    #[serde(default)]
    pub packages: Vec<Package>,
    #[serde(default)]
    pub types: Vec<TypeInfo>,
}

/// Fully loaded, read-only type graph indexed by identity.
#[derive(Debug, Clone, Default)]
pub struct TypeGraph {
    packages: BTreeMap<String, Package>,
    types: BTreeMap<TypeIdent, TypeInfo>,
}

impl TypeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_package(mut self, package: Package) -> Self {
        self.packages.insert(package.path.clone(), package);
        self
    }

    pub fn with_type(mut self, info: TypeInfo) -> Self {
        self.types.insert(info.ident(), info);
        self
    }

    pub fn package(&self, path: &str) -> Option<&Package> {
        self.packages.get(path)
    }

    pub fn packages(&self) -> impl Iterator<Item = &Package> {
        self.packages.values()
    }

    pub fn get(&self, ident: &TypeIdent) -> Option<&TypeInfo> {
        self.types.get(ident)
    }

    pub fn contains(&self, ident: &TypeIdent) -> bool {
        self.types.contains_key(ident)
    }

    /// Whether any type in the graph has this local name.
    pub fn has_type_named(&self, name: &str) -> bool {
        self.types.keys().any(|ident| ident.name == name)
    }

    /// All types, ordered by identity.
    pub fn types(&self) -> impl Iterator<Item = (&TypeIdent, &TypeInfo)> {
        self.types.iter()
    }
}

impl From<TypeGraphManifest> for TypeGraph {
    fn from(manifest: TypeGraphManifest) -> Self {
        let mut graph = TypeGraph::new();
        for package in manifest.packages {
            graph = graph.with_package(package);
        }
        for info in manifest.types {
            graph = graph.with_type(info);
        }
        graph
    }
}

/// Markers consumed by the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Marker {
    /// Package scope: the package gets its own primary document.
    Schema,
    /// Type scope: the type also gets a filtered standalone document.
    Object,
}

/// Where a marker is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerScope {
    Package,
    Type,
}

impl Marker {
    /// Full marker name, including the namespace.
    pub fn name(&self) -> &'static str {
        match self {
            Marker::Schema => "validation:schema",
            Marker::Object => "validation:object",
        }
    }

    pub fn scope(&self) -> MarkerScope {
        match self {
            Marker::Schema => MarkerScope::Package,
            Marker::Object => MarkerScope::Type,
        }
    }

    /// Parse a marker name.
    ///
    /// Returns `None` for names this generator does not define.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim_start_matches('+') {
            "validation:schema" => Some(Marker::Schema),
            "validation:object" => Some(Marker::Object),
            _ => None,
        }
    }
}

/// Options for a generation run.
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    /// Allow `float32`/`float64` fields, which are otherwise rejected.
    pub allow_dangerous_types: bool,
    /// Substring of a declared field type that marks it as a taxonomy type.
    pub taint_sentinel: String,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            allow_dangerous_types: false,
            taint_sentinel: DEFAULT_TAINT_SENTINEL.to_string(),
        }
    }
}

impl GeneratorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_dangerous_types(mut self, allow: bool) -> Self {
        self.allow_dangerous_types = allow;
        self
    }

    pub fn taint_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.taint_sentinel = sentinel.into();
        self
    }
}
