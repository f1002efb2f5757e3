//! # Edges
//!
//! Relationship builders. `to` declares an association owned by this type;
//! `from` declares the inverse side and usually names the owning edge with
//! `ref_name`.

use crate::schema::field::Annotation;
use serde::Deserialize;

/// Everything known about one edge.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EdgeDescriptor {
    /// Edge name.
    pub name: String,
    /// Name of the schema type on the other end.
    #[serde(alias = "type")]
    pub target: String,
    /// Declared with `from` instead of `to`.
    pub inverse: bool,
    /// Name of the edge this inverse edge refers back to.
    #[serde(alias = "ref")]
    pub ref_name: Option<String>,
    /// At most one neighbour.
    pub unique: bool,
    /// Must be set on creation.
    pub required: bool,
    /// Cannot change after creation.
    pub immutable: bool,
    /// Field holding the foreign key.
    pub field: Option<String>,
    /// Struct tag of the generated edge field.
    #[serde(alias = "tag")]
    pub struct_tag: Option<String>,
    /// Edge comment.
    pub comment: Option<String>,
    /// Attached annotations.
    pub annotations: Vec<Annotation>,
}

/// Chainable edge builder.
#[derive(Debug, Clone)]
pub struct Edge {
    desc: EdgeDescriptor,
}

/// An association from this type to `target`.
pub fn to(name: impl Into<String>, target: impl Into<String>) -> Edge {
    Edge {
        desc: EdgeDescriptor {
            name: name.into(),
            target: target.into(),
            ..Default::default()
        },
    }
}

/// The inverse side of an association declared on `target`.
pub fn from(name: impl Into<String>, target: impl Into<String>) -> Edge {
    let mut edge = to(name, target);
    edge.desc.inverse = true;
    edge
}

impl Edge {
    /// The descriptor built so far.
    pub fn descriptor(&self) -> &EdgeDescriptor {
        &self.desc
    }

    /// Consumes the builder.
    pub fn into_descriptor(self) -> EdgeDescriptor {
        self.desc
    }

    /// Names the edge on `target` this inverse edge mirrors.
    pub fn ref_name(mut self, name: impl Into<String>) -> Self {
        self.desc.ref_name = Some(name.into());
        self
    }

    /// Limits the edge to one neighbour.
    pub fn unique(mut self) -> Self {
        self.desc.unique = true;
        self
    }

    /// Requires the edge on creation.
    pub fn required(mut self) -> Self {
        self.desc.required = true;
        self
    }

    /// Forbids changing the edge after creation.
    pub fn immutable(mut self) -> Self {
        self.desc.immutable = true;
        self
    }

    /// Binds the edge to an explicit foreign-key field.
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.desc.field = Some(field.into());
        self
    }

    /// Sets the struct tag.
    pub fn struct_tag(mut self, tag: impl Into<String>) -> Self {
        self.desc.struct_tag = Some(tag.into());
        self
    }

    /// Sets the comment.
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.desc.comment = Some(comment.into());
        self
    }

    /// Attaches annotations.
    pub fn annotations(mut self, annotations: impl IntoIterator<Item = Annotation>) -> Self {
        self.desc.annotations.extend(annotations);
        self
    }
}

impl From<Edge> for EdgeDescriptor {
    fn from(edge: Edge) -> Self {
        edge.desc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_marks_inverse() {
        let d = from("owner", "User").ref_name("pets").unique().into_descriptor();
        assert!(d.inverse);
        assert!(d.unique);
        assert_eq!(d.target, "User");
        assert_eq!(d.ref_name.as_deref(), Some("pets"));
    }

    #[test]
    fn test_to_is_not_inverse() {
        let d = to("pets", "Pet").into_descriptor();
        assert!(!d.inverse);
        assert_eq!(d.ref_name, None);
    }
}
