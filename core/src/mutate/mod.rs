#![deny(missing_docs)]

//! # Schema Mutations
//!
//! Edits applied to a [`Context`].
//!
//! - **list**: Appending and removing single fields/edges (`Context::append_field` etc.).
//! - **upsert**: Rewriting a type's full field and edge lists.
//!
//! Mutators run in order through [`mutate`]; the first failure stops the run and
//! nothing already applied is rolled back.

use crate::context::Context;
use crate::error::AppResult;

mod list;

/// Full rewrite of a type's fields and edges.
pub mod upsert;

pub use upsert::UpsertSchema;

/// A change to a [`Context`].
pub trait Mutator {
    /// Applies the change.
    fn mutate(&self, ctx: &mut Context) -> AppResult<()>;
}

impl<F> Mutator for F
where
    F: Fn(&mut Context) -> AppResult<()>,
{
    fn mutate(&self, ctx: &mut Context) -> AppResult<()> {
        self(ctx)
    }
}

/// Applies `mutators` to `ctx` in order, stopping at the first error.
pub fn mutate(ctx: &mut Context, mutators: &[&dyn Mutator]) -> AppResult<()> {
    for mutator in mutators {
        mutator.mutate(ctx)?;
    }
    Ok(())
}
