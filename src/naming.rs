//! Document names, definition keys and `$ref` links.
//!
//! Definition keys in the external document are qualified with the package
//! path, escaped per JSON Pointer (RFC 6901): `/` becomes `~1`, and the
//! package path is joined to the type name with `~0`.

/// Prefix of every definition pointer.
pub const DEFINITIONS_POINTER: &str = "#/definitions/";

/// Build a JSON-Pointer-safe qualified name: `<pkg with / as ~1>~0<type>`.
///
/// An empty package path yields the bare type name.
pub fn qualified_name(package_path: &str, type_name: &str) -> String {
    if package_path.is_empty() {
        return type_name.to_string();
    }
    format!("{}~0{}", package_path.replace('/', "~1"), type_name)
}

/// Reverse of [`qualified_name`]: recover `(package path, type name)`.
pub fn split_qualified_name(key: &str) -> (String, String) {
    match key.rsplit_once("~0") {
        Some((package, name)) => (package.replace("~1", "/"), name.to_string()),
        None => (String::new(), key.to_string()),
    }
}

/// Strip everything up to and including the last `/vendor/` segment.
pub fn non_vendor_path(path: &str) -> &str {
    match path.rfind("/vendor/") {
        Some(idx) => &path[idx + "/vendor/".len()..],
        None => path.strip_prefix("vendor/").unwrap_or(path),
    }
}

/// Name of the primary document for a package.
pub fn package_document_name(package_name: &str) -> String {
    format!("{}.json", package_name)
}

/// Name of the filtered document for an object-marked type.
pub fn object_document_name(type_name: &str) -> String {
    format!("{}.json", type_name)
}

/// Link to a definition, prefixed by its document when it lives elsewhere.
pub fn definition_link(document: Option<&str>, key: &str) -> String {
    match document {
        Some(doc) => format!("{}{}{}", doc, DEFINITIONS_POINTER, key),
        None => format!("{}{}", DEFINITIONS_POINTER, key),
    }
}

/// Type name targeted by a `$ref`, taken from its trailing path segment.
///
/// Qualified keys resolve to their type-name part.
pub fn ref_target_name(reference: &str) -> &str {
    let segment = reference.rsplit('/').next().unwrap_or(reference);
    match segment.rsplit_once("~0") {
        Some((_, name)) => name,
        None => segment,
    }
}
