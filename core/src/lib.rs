#![deny(missing_docs)]

//! # Schemapatch Core
//!
//! Reads, edits and rewrites declarative Rust schema files in place.
//!
//! A schema package is loaded into a [`Context`]. Field and edge descriptors are
//! translated into builder chains such as `field::string("name").optional()`
//! and spliced into the `vec![..]` returned by each type's `fields`/`edges`
//! method. Code outside those return expressions is never touched.

/// Shared error types.
pub mod error;

/// Schema builder API and descriptors.
pub mod schema;

/// Descriptor to source translation.
pub mod translate;

/// Loaded schema packages and their type registry.
pub mod context;

/// Edits applied to a context.
pub mod mutate;

pub use context::{Context, ListElement, ListLiteral, ReturnExpr, ReturnShape, SchemaFile};
pub use error::{AppError, AppResult};
pub use mutate::{mutate, Mutator, UpsertSchema};
pub use schema::{
    dialect, edge, field, Annotation, Dialect, Edge, EdgeDescriptor, Field, FieldDescriptor,
    FieldType, Schema, Validator,
};
pub use translate::{edge_fragment, field_fragment, Fragment};
