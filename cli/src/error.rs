#![deny(missing_docs)]

//! # CLI Errors
//!
//! Error types for the CLI crate.

use derive_more::{Display, From};
use schemapatch_core::AppError;

/// Main error enum for CLI operations.
#[derive(Debug, Display, From)]
pub enum CliError {
    /// IO Error wrapper.
    #[display("IO Error: {}", _0)]
    Io(std::io::Error),

    /// Failure reported by the schema editor.
    #[display("{}", _0)]
    Schema(AppError),

    /// Malformed JSON input document.
    #[display("Invalid JSON input: {}", _0)]
    Json(serde_json::Error),

    /// Malformed YAML input document.
    #[display("Invalid YAML input: {}", _0)]
    Yaml(serde_yaml::Error),

    /// General failure message.
    #[display("Operation failed: {}", _0)]
    General(String),
}

/// Manual implementation of the standard Error trait.
///
/// We implement this manually (instead of `derive(Error)`) because the `General(String)`
/// variant contains a `String`, which does not implement `std::error::Error`, causing
/// auto-derived `source()` implementations to fail compilation.
impl std::error::Error for CliError {}

/// Result type alias.
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_errors_display_verbatim() {
        let err: CliError = AppError::TypeAlreadyExists("User".into()).into();
        assert_eq!(err.to_string(), r#"type "User" already exists"#);
    }
}
