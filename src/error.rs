//! Error types for type graph loading, schema generation and output.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::types::TypeIdent;

/// Errors while loading a type graph manifest.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid type graph: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            LoadError::NetworkError { .. } => 3,
            LoadError::InvalidJson { .. } => 2,
        }
    }
}

/// Non-fatal problems found while generating schemas.
///
/// These never abort a run; they are collected as [`Diagnostic`]s.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error("unknown type {ident}")]
    UnknownType { ident: TypeIdent },

    #[error("cannot load marker \"{marker}\": {message}")]
    MarkerLoadFailure { marker: String, message: String },

    #[error("found {scalar}, the usage of which is highly discouraged (enable dangerous types to allow it)")]
    DangerousType { scalar: String },

    #[error("unsupported scalar type \"{scalar}\"")]
    UnsupportedScalar { scalar: String },
}

impl GenerateError {
    /// Stable short code for reports.
    pub fn code(&self) -> &'static str {
        match self {
            GenerateError::UnknownType { .. } => "E001",
            GenerateError::MarkerLoadFailure { .. } => "E002",
            GenerateError::DangerousType { .. } => "E003",
            GenerateError::UnsupportedScalar { .. } => "E004",
        }
    }

    /// Exit code when a run with this error is treated as failed (`--strict`).
    pub fn exit_code(&self) -> i32 {
        1
    }
}

/// A non-fatal error attached to the package or type it originated from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Package path or qualified type the error is recorded against.
    pub subject: String,
    pub code: &'static str,
    pub message: String,
    #[serde(skip)]
    pub error: GenerateError,
}

impl Diagnostic {
    pub fn new(subject: impl Into<String>, error: GenerateError) -> Self {
        Self {
            subject: subject.into(),
            code: error.code(),
            message: error.to_string(),
            error,
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: [{}] {}", self.subject, self.code, self.message)
    }
}

/// Fatal errors while writing documents.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("cannot create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot serialize document {name}: {source}")]
    Serialize {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

impl WriteError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            WriteError::CreateDir { .. } | WriteError::WriteFile { .. } => 3,
            WriteError::Serialize { .. } => 2,
        }
    }
}
