//! # Fields
//!
//! Field kinds, the chainable `Field` builder and the `FieldDescriptor` it produces.

use crate::schema::dialect::canonical_name;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use std::borrow::Cow;
use std::fmt::{self, Display};
use std::sync::Arc;

/// The base type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// `bool`
    Bool,
    /// Timestamp.
    Time,
    /// Raw bytes.
    Bytes,
    /// Enumerated string values.
    Enum,
    /// UTF-8 text.
    #[default]
    String,
    /// Platform sized signed integer.
    Int,
    /// `i8`
    Int8,
    /// `i16`
    Int16,
    /// `i32`
    Int32,
    /// `i64`
    Int64,
    /// Platform sized unsigned integer.
    Uint,
    /// `u8`
    Uint8,
    /// `u16`
    Uint16,
    /// `u32`
    Uint32,
    /// `u64`
    Uint64,
    /// `f32`
    Float32,
    /// `f64`
    Float64,
    /// Arbitrary JSON document.
    Json,
    /// UUID.
    Uuid,
    /// Custom Rust type.
    Other,
}

impl FieldType {
    /// The lowercase name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Bool => "bool",
            FieldType::Time => "time",
            FieldType::Bytes => "bytes",
            FieldType::Enum => "enum",
            FieldType::String => "string",
            FieldType::Int => "int",
            FieldType::Int8 => "int8",
            FieldType::Int16 => "int16",
            FieldType::Int32 => "int32",
            FieldType::Int64 => "int64",
            FieldType::Uint => "uint",
            FieldType::Uint8 => "uint8",
            FieldType::Uint16 => "uint16",
            FieldType::Uint32 => "uint32",
            FieldType::Uint64 => "uint64",
            FieldType::Float32 => "float32",
            FieldType::Float64 => "float64",
            FieldType::Json => "json",
            FieldType::Uuid => "uuid",
            FieldType::Other => "other",
        }
    }
}

impl Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, opaque piece of metadata attached to a field or edge.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Annotation {
    /// Annotation name.
    pub name: String,
    /// Annotation payload.
    #[serde(default)]
    pub value: Value,
}

impl Annotation {
    /// Creates an annotation.
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

type CheckFn = dyn Fn(&Value) -> Result<(), String> + Send + Sync;

/// A named check run against candidate field values.
#[derive(Clone)]
pub struct Validator {
    name: Cow<'static, str>,
    check: Arc<CheckFn>,
}

impl Validator {
    /// Wraps a check closure.
    pub fn new<F>(name: impl Into<Cow<'static, str>>, check: F) -> Self
    where
        F: Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            check: Arc::new(check),
        }
    }

    /// The validator name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs the check.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        (self.check)(value)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Validator").field(&self.name).finish()
    }
}

fn text_len(value: &Value) -> Result<usize, String> {
    match value {
        Value::String(s) => Ok(s.chars().count()),
        Value::Array(items) => Ok(items.len()),
        other => Err(format!("expected a string, got {}", other)),
    }
}

/// Everything known about one field.
///
/// Produced by the [`Field`] builder, or deserialized from JSON/YAML.
/// Validators cannot be deserialized.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FieldDescriptor {
    /// Base type.
    pub kind: FieldType,
    /// Field name.
    pub name: String,
    /// Stored as a nullable column and exposed as `Option`.
    pub nillable: bool,
    /// Not required on creation.
    pub optional: bool,
    /// Unique across all rows.
    pub unique: bool,
    /// Omitted from logs and debug output.
    pub sensitive: bool,
    /// Cannot change after creation.
    pub immutable: bool,
    /// Column comment.
    pub comment: Option<String>,
    /// Struct tag of the generated entity field.
    #[serde(alias = "tag")]
    pub struct_tag: Option<String>,
    /// Column name override.
    pub storage_key: Option<String>,
    /// Column type per dialect, keyed by canonical dialect name.
    pub schema_type: IndexMap<String, String>,
    /// Enum values as `name => value`, in declaration order.
    pub enum_values: IndexMap<String, String>,
    /// Default value.
    pub default: Option<Value>,
    /// Attached annotations.
    pub annotations: Vec<Annotation>,
    /// Value checks.
    #[serde(skip)]
    pub validators: Vec<Validator>,
}

impl FieldDescriptor {
    /// Runs every validator against `value`, collecting all failures.
    pub fn validate_value(&self, value: &Value) -> Result<(), Vec<String>> {
        let failures: Vec<String> = self
            .validators
            .iter()
            .filter_map(|v| v.check(value).err().map(|e| format!("{}: {}", v.name(), e)))
            .collect();
        if failures.is_empty() {
            Ok(())
        } else {
            Err(failures)
        }
    }

    /// True when every enum entry maps a name to itself.
    pub fn has_plain_enum_values(&self) -> bool {
        self.enum_values.iter().all(|(k, v)| k == v)
    }
}

/// Chainable field builder.
#[derive(Debug, Clone)]
pub struct Field {
    desc: FieldDescriptor,
}

impl Field {
    /// Starts a field of the given kind.
    pub fn new(kind: FieldType, name: impl Into<String>) -> Self {
        Self {
            desc: FieldDescriptor {
                kind,
                name: name.into(),
                ..Default::default()
            },
        }
    }

    /// The descriptor built so far.
    pub fn descriptor(&self) -> &FieldDescriptor {
        &self.desc
    }

    /// Consumes the builder.
    pub fn into_descriptor(self) -> FieldDescriptor {
        self.desc
    }

    /// Marks the field nillable.
    pub fn nillable(mut self) -> Self {
        self.desc.nillable = true;
        self
    }

    /// Marks the field optional.
    pub fn optional(mut self) -> Self {
        self.desc.optional = true;
        self
    }

    /// Marks the field unique.
    pub fn unique(mut self) -> Self {
        self.desc.unique = true;
        self
    }

    /// Marks the field sensitive.
    pub fn sensitive(mut self) -> Self {
        self.desc.sensitive = true;
        self
    }

    /// Marks the field immutable.
    pub fn immutable(mut self) -> Self {
        self.desc.immutable = true;
        self
    }

    /// Sets the column comment.
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.desc.comment = Some(comment.into());
        self
    }

    /// Sets the struct tag.
    pub fn struct_tag(mut self, tag: impl Into<String>) -> Self {
        self.desc.struct_tag = Some(tag.into());
        self
    }

    /// Overrides the column name.
    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.desc.storage_key = Some(key.into());
        self
    }

    /// Overrides the column type per dialect.
    ///
    /// Dialect aliases such as `"sqlite"` are stored under their canonical name.
    pub fn schema_type<I, K, V>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (dialect, ty) in types {
            self.desc
                .schema_type
                .insert(canonical_name(dialect.as_ref()), ty.into());
        }
        self
    }

    /// Appends enum values whose name and value coincide.
    pub fn values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for v in values {
            let v = v.into();
            self.desc.enum_values.insert(v.clone(), v);
        }
        self
    }

    /// Appends `(name, value)` enum pairs.
    pub fn named_values<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in pairs {
            self.desc.enum_values.insert(k.into(), v.into());
        }
        self
    }

    /// Sets the default value.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.desc.default = Some(value.into());
        self
    }

    /// Attaches annotations.
    pub fn annotations(mut self, annotations: impl IntoIterator<Item = Annotation>) -> Self {
        self.desc.annotations.extend(annotations);
        self
    }

    /// Adds a custom validator.
    pub fn validate<F>(mut self, name: impl Into<Cow<'static, str>>, check: F) -> Self
    where
        F: Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.desc.validators.push(Validator::new(name, check));
        self
    }

    /// Rejects values longer than `max`.
    pub fn max_len(self, max: usize) -> Self {
        self.validate("max_len", move |v| {
            let len = text_len(v)?;
            if len > max {
                Err(format!("value is longer than {}", max))
            } else {
                Ok(())
            }
        })
    }

    /// Rejects values shorter than `min`.
    pub fn min_len(self, min: usize) -> Self {
        self.validate("min_len", move |v| {
            let len = text_len(v)?;
            if len < min {
                Err(format!("value is shorter than {}", min))
            } else {
                Ok(())
            }
        })
    }

    /// Rejects empty values.
    pub fn not_empty(self) -> Self {
        self.min_len(1)
    }
}

impl From<Field> for FieldDescriptor {
    fn from(field: Field) -> Self {
        field.desc
    }
}

macro_rules! constructors {
    ($($(#[$doc:meta])* $fn_name:ident => $kind:ident),* $(,)?) => {
        $(
            $(#[$doc])*
            pub fn $fn_name(name: impl Into<String>) -> Field {
                Field::new(FieldType::$kind, name)
            }
        )*
    };
}

constructors! {
    /// A `bool` field.
    bool => Bool,
    /// A timestamp field.
    time => Time,
    /// A bytes field.
    bytes => Bytes,
    /// An enum field.
    enumeration => Enum,
    /// A string field.
    string => String,
    /// An `int` field.
    int => Int,
    /// An `int8` field.
    int8 => Int8,
    /// An `int16` field.
    int16 => Int16,
    /// An `int32` field.
    int32 => Int32,
    /// An `int64` field.
    int64 => Int64,
    /// A `uint` field.
    uint => Uint,
    /// A `uint8` field.
    uint8 => Uint8,
    /// A `uint16` field.
    uint16 => Uint16,
    /// A `uint32` field.
    uint32 => Uint32,
    /// A `uint64` field.
    uint64 => Uint64,
    /// A `float32` field.
    float32 => Float32,
    /// A `float64` field.
    float64 => Float64,
    /// A JSON field.
    json => Json,
    /// A UUID field.
    uuid => Uuid,
    /// A field of a custom type.
    other => Other,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_sets_modifiers() {
        let d = string("email").optional().unique().storage_key("mail").into_descriptor();
        assert_eq!(d.kind, FieldType::String);
        assert_eq!(d.name, "email");
        assert!(d.optional && d.unique);
        assert!(!d.nillable);
        assert_eq!(d.storage_key.as_deref(), Some("mail"));
    }

    #[test]
    fn test_schema_type_keys_are_canonical() {
        let d = string("x")
            .schema_type([("sqlite", "VARCHAR"), ("postgresql", "text")])
            .into_descriptor();
        let keys: Vec<_> = d.schema_type.keys().cloned().collect();
        assert_eq!(keys, vec!["sqlite3", "postgres"]);
    }

    #[test]
    fn test_enum_values_plain_and_named() {
        let plain = enumeration("x").values(["a", "b"]).into_descriptor();
        assert!(plain.has_plain_enum_values());

        let named = enumeration("x").named_values([("a", "b")]).into_descriptor();
        assert!(!named.has_plain_enum_values());
        assert_eq!(named.enum_values.get("a").map(String::as_str), Some("b"));
    }

    #[test]
    fn test_validators_collect_failures() {
        let d = string("x").max_len(3).not_empty().into_descriptor();
        assert_eq!(d.validators.len(), 2);
        assert!(d.validate_value(&json!("abc")).is_ok());

        let errs = d.validate_value(&json!("")).unwrap_err();
        assert_eq!(errs, vec!["min_len: value is shorter than 1".to_string()]);

        let errs = d.validate_value(&json!(7)).unwrap_err();
        assert_eq!(errs.len(), 2);
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(FieldType::Json.to_string(), "json");
        assert_eq!(uint16("x").descriptor().kind, FieldType::Uint16);
    }
}
