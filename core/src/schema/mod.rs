#![deny(missing_docs)]

//! # Schema Builder API
//!
//! The runtime side of a schema file. Schema types implement [`Schema`] and
//! describe their fields and edges with builder chains such as
//! `field::string("name").optional()` or `edge::to("pets", "Pet")`.
//!
//! - **field**: Field kinds, the `Field` builder and its `FieldDescriptor`.
//! - **edge**: The `Edge` builder and its `EdgeDescriptor`.
//! - **dialect**: Storage dialects used as schema-type override keys.

/// Storage dialect names.
pub mod dialect;

/// Edge builders and descriptors.
pub mod edge;

/// Field builders and descriptors.
pub mod field;

pub use dialect::Dialect;
pub use edge::{Edge, EdgeDescriptor};
pub use field::{Annotation, Field, FieldDescriptor, FieldType, Validator};

/// Implemented by every declared schema type.
///
/// The code editors in [`crate::mutate`] rewrite the bodies of these two
/// methods, so each must consist of a single `Vec::new()` or `vec![..]`.
pub trait Schema {
    /// Fields of the type.
    fn fields() -> Vec<Field> {
        Vec::new()
    }

    /// Edges of the type.
    fn edges() -> Vec<Edge> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct User;

    impl Schema for User {
        fn fields() -> Vec<Field> {
            vec![field::string("name"), field::int("age").optional()]
        }
    }

    #[test]
    fn test_schema_defaults_to_no_edges() {
        assert!(User::edges().is_empty());
        let names: Vec<_> = User::fields()
            .iter()
            .map(|f| f.descriptor().name.clone())
            .collect();
        assert_eq!(names, vec!["name", "age"]);
    }
}
