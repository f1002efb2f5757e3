//! Rewrites a type so its `fields` and `edges` list exactly the requested entries.

use crate::context::Context;
use crate::error::AppResult;
use crate::mutate::Mutator;
use crate::schema::{EdgeDescriptor, FieldDescriptor};
use serde::Deserialize;
use tracing::debug;

/// Creates `name` if missing, then replaces its fields and edges.
///
/// Both lists are reset to `Vec::new()` before the new entries are appended, so
/// nothing from the previous lists survives. A failure midway leaves the
/// context partly rewritten.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpsertSchema {
    /// Type name.
    pub name: String,
    /// Desired fields, in order.
    pub fields: Vec<FieldDescriptor>,
    /// Desired edges, in order.
    pub edges: Vec<EdgeDescriptor>,
}

impl UpsertSchema {
    /// An upsert of `name` with no fields or edges.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Adds a desired field.
    pub fn field(mut self, field: impl Into<FieldDescriptor>) -> Self {
        self.fields.push(field.into());
        self
    }

    /// Adds a desired edge.
    pub fn edge(mut self, edge: impl Into<EdgeDescriptor>) -> Self {
        self.edges.push(edge.into());
        self
    }
}

impl Mutator for UpsertSchema {
    fn mutate(&self, ctx: &mut Context) -> AppResult<()> {
        if !ctx.has_type(&self.name) {
            ctx.add_type(&self.name)?;
        }
        ctx.reset_fields(&self.name)?;
        ctx.reset_edges(&self.name)?;
        for field in &self.fields {
            ctx.append_field(&self.name, field)?;
        }
        for edge in &self.edges {
            ctx.append_edge(&self.name, edge)?;
        }
        debug!(
            type_name = %self.name,
            fields = self.fields.len(),
            edges = self.edges.len(),
            "upserted schema"
        );
        Ok(())
    }
}
