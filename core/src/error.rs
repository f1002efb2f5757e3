//! # Error Handling
//!
//! Provides the unified `AppError` enum returned by every schema operation.

use crate::schema::FieldType;
use derive_more::{Display, From};
use std::path::PathBuf;

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate.
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// A schema file could not be parsed as Rust source.
    #[from(ignore)]
    #[display("failed to parse {}: {message}", path.display())]
    Parse {
        /// The offending file.
        path: PathBuf,
        /// Parser diagnostics, joined.
        message: String,
    },

    /// The descriptor kind has no builder constructor.
    #[from(ignore)]
    #[display("unsupported type {_0}")]
    UnsupportedType(FieldType),

    /// One or more descriptor features have no source representation.
    ///
    /// Every feature found on a single descriptor is reported at once.
    #[from(ignore)]
    #[display("{}", join_unsupported(_0))]
    UnsupportedFeatures(Vec<&'static str>),

    /// A type with this name is already declared in the context.
    #[from(ignore)]
    #[display("type {_0:?} already exists")]
    TypeAlreadyExists(String),

    /// The requested type name is not a valid Rust identifier.
    #[from(ignore)]
    #[display("invalid type name {_0:?}")]
    InvalidTypeName(String),

    /// The type does not declare the requested method.
    #[from(ignore)]
    #[display("could not find method {method:?} for type {type_name:?}")]
    MethodNotFound {
        /// Method name (`fields` or `edges`).
        method: String,
        /// Owning type.
        type_name: String,
    },

    /// The method body is not a single `Vec::new()` / `vec![..]` return.
    #[from(ignore)]
    #[display("malformed method {method:?} for type {type_name:?}: {reason}")]
    MalformedMethod {
        /// Method name (`fields` or `edges`).
        method: String,
        /// Owning type.
        type_name: String,
        /// What was found instead.
        reason: String,
    },

    /// No field with the given name is listed by the type.
    #[from(ignore)]
    #[display("could not find field {field:?} in type {type_name:?}")]
    FieldNotFound {
        /// The missing field.
        field: String,
        /// Owning type.
        type_name: String,
    },

    /// No edge with the given name is listed by the type.
    #[from(ignore)]
    #[display("could not find edge {edge:?} in type {type_name:?}")]
    EdgeNotFound {
        /// The missing edge.
        edge: String,
        /// Owning type.
        type_name: String,
    },

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

fn join_unsupported(features: &[&'static str]) -> String {
    features
        .iter()
        .map(|f| format!("unsupported feature {}", f))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;
