use pretty_assertions::assert_eq;
use schemapatch_core::{
    edge, field, mutate, AppError, Context, Mutator, ReturnShape, UpsertSchema,
};
use std::fs;
use std::path::Path;

const SCHEMA: &str = r#"use schemapatch_core::schema::{edge, field, Edge, Field, Schema};

// Hand-written helpers stay exactly as they are.
fn helper() -> u32 {
    42
}

pub struct WithFields;

impl Schema for WithFields {
    fn fields() -> Vec<Field> {
        vec![
            field::string("existing"),
        ]
    }
}

pub struct WithNilFields;

impl Schema for WithNilFields {
    fn fields() -> Vec<Field> {
        Vec::new()
    }
}

pub struct WithoutFields;

pub struct WithModifiedField;

impl Schema for WithModifiedField {
    fn fields() -> Vec<Field> {
        return vec![field::string("name")];
    }
}

pub struct Malformed;

impl Schema for Malformed {
    fn fields() -> Vec<Field> {
        let mut v = Vec::new();
        v.push(field::string("x"));
        v
    }
}
"#;

const PET: &str = r#"use schemapatch_core::schema::{edge, field, Edge, Field, Schema};

pub struct Pet;

impl Schema for Pet {
    fn fields() -> Vec<Field> {
        vec![field::string("name")]
    }

    fn edges() -> Vec<Edge> {
        vec![edge::from("owner", "User").ref_name("pets").unique()]
    }
}
"#;

fn fixture() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a_schema.rs"), SCHEMA).unwrap();
    fs::write(dir.path().join("pet.rs"), PET).unwrap();
    fs::write(dir.path().join("notes.txt"), "not rust").unwrap();
    dir
}

fn method_text(ctx: &Context, type_name: &str, method: &str) -> String {
    ctx.lookup_method(type_name, method).unwrap().to_string()
}

#[test]
fn test_load_registers_types_in_file_order() {
    let dir = fixture();
    let ctx = Context::load(dir.path()).unwrap();
    assert_eq!(
        ctx.type_names().collect::<Vec<_>>(),
        vec!["WithFields", "WithNilFields", "WithoutFields", "WithModifiedField", "Malformed", "Pet"]
    );
    assert_eq!(ctx.files().len(), 2);
}

#[test]
fn test_append_field_to_existing_list() {
    let dir = fixture();
    let mut ctx = Context::load(dir.path()).unwrap();
    ctx.append_field("WithFields", field::string("newField").descriptor())
        .unwrap();
    assert_eq!(
        method_text(&ctx, "WithFields", "fields"),
        r#"fn fields() -> Vec<Field> {
        vec![
            field::string("existing"),
            field::string("newField"),
        ]
    }"#
    );
}

#[test]
fn test_append_field_to_nil() {
    let dir = fixture();
    let mut ctx = Context::load(dir.path()).unwrap();
    ctx.append_field("WithNilFields", field::string("newField").descriptor())
        .unwrap();
    assert_eq!(
        method_text(&ctx, "WithNilFields", "fields"),
        r#"fn fields() -> Vec<Field> {
        vec![field::string("newField")]
    }"#
    );

    ctx.append_field("WithNilFields", field::bool("active").optional().descriptor())
        .unwrap();
    assert_eq!(
        method_text(&ctx, "WithNilFields", "fields"),
        r#"fn fields() -> Vec<Field> {
        vec![field::string("newField"), field::bool("active").optional()]
    }"#
    );
}

#[test]
fn test_append_field_without_method() {
    let dir = fixture();
    let mut ctx = Context::load(dir.path()).unwrap();
    let err = ctx
        .append_field("WithoutFields", field::string("newField").descriptor())
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        r#"could not find method "fields" for type "WithoutFields""#
    );
}

#[test]
fn test_append_to_malformed_method() {
    let dir = fixture();
    let mut ctx = Context::load(dir.path()).unwrap();
    let err = ctx
        .append_field("Malformed", field::string("y").descriptor())
        .unwrap_err();
    assert!(matches!(err, AppError::MalformedMethod { ref type_name, .. } if type_name == "Malformed"));
    assert!(!ctx.is_dirty());
}

#[test]
fn test_remove_field() {
    let dir = fixture();
    let mut ctx = Context::load(dir.path()).unwrap();
    let err = ctx
        .remove_field("WithModifiedField", "non_existent")
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        r#"could not find field "non_existent" in type "WithModifiedField""#
    );

    ctx.remove_field("WithModifiedField", "name").unwrap();
    assert_eq!(
        method_text(&ctx, "WithModifiedField", "fields"),
        r#"fn fields() -> Vec<Field> {
        return vec![];
    }"#
    );
    assert!(matches!(
        ctx.fields_return("WithModifiedField").unwrap().shape(),
        ReturnShape::List(list) if list.is_empty()
    ));
}

#[test]
fn test_edits_touch_only_the_return_expression() {
    let dir = fixture();
    let mut ctx = Context::load(dir.path()).unwrap();
    ctx.append_field("WithFields", field::int("n").descriptor())
        .unwrap();

    let path = dir.path().join("a_schema.rs");
    let edited = ctx.source(&path).unwrap();
    let expected = SCHEMA.replace(
        "            field::string(\"existing\"),\n",
        "            field::string(\"existing\"),\n            field::int(\"n\"),\n",
    );
    assert_eq!(edited, expected);
    assert_eq!(ctx.source(dir.path().join("pet.rs")), Some(PET));
}

#[test]
fn test_add_type_on_existing_name_changes_nothing() {
    let dir = fixture();
    let mut ctx = Context::load(dir.path()).unwrap();
    let err = ctx.add_type("Pet").unwrap_err();
    assert_eq!(err.to_string(), r#"type "Pet" already exists"#);
    assert_eq!(ctx.source(dir.path().join("pet.rs")), Some(PET));
    assert!(!ctx.is_dirty());
}

#[test]
fn test_remove_inverse_edge_by_name() {
    let dir = fixture();
    let mut ctx = Context::load(dir.path()).unwrap();
    ctx.remove_edge("Pet", "owner").unwrap();
    assert_eq!(
        method_text(&ctx, "Pet", "edges"),
        "fn edges() -> Vec<Edge> {\n        vec![]\n    }"
    );
}

#[test]
fn test_upsert_and_save_round_trip() {
    let dir = fixture();
    let mut ctx = Context::load(dir.path()).unwrap();

    let user = UpsertSchema::new("User")
        .field(field::string("name").unique())
        .field(field::enumeration("role").values(["admin", "member"]))
        .edge(edge::to("pets", "Pet"));
    let pet = UpsertSchema::new("Pet").field(field::int("age"));
    mutate(&mut ctx, &[&user, &pet]).unwrap();

    assert_eq!(ctx.save().unwrap(), 2);
    assert!(!ctx.is_dirty());

    let reloaded = Context::load(dir.path()).unwrap();
    assert!(reloaded.has_type("User"));
    assert_eq!(
        method_text(&reloaded, "User", "fields"),
        r#"fn fields() -> Vec<Field> {
        vec![field::string("name").unique(), field::enumeration("role").values(["admin", "member"])]
    }"#
    );
    assert_eq!(
        method_text(&reloaded, "Pet", "fields"),
        "fn fields() -> Vec<Field> {\n        vec![field::int(\"age\")]\n    }"
    );
    assert_eq!(
        method_text(&reloaded, "Pet", "edges"),
        "fn edges() -> Vec<Edge> {\n        Vec::new()\n    }"
    );
}

#[test]
fn test_pipeline_stops_before_later_mutators() {
    let dir = fixture();
    let mut ctx = Context::load(dir.path()).unwrap();

    let first = UpsertSchema::new("Audit").field(field::time("at"));
    let broken = UpsertSchema::new("Broken").field(field::json("doc"));
    let last = UpsertSchema::new("Never");
    let err = mutate(&mut ctx, &[&first, &broken, &last]).unwrap_err();

    assert_eq!(err.to_string(), "unsupported type json");
    assert!(ctx.has_type("Audit"));
    assert!(ctx.has_type("Broken"));
    assert!(!ctx.has_type("Never"));
}

#[test]
fn test_load_surfaces_parse_errors() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("broken.rs"), "impl Schema for {").unwrap();
    let err = Context::load(dir.path()).unwrap_err();
    match err {
        AppError::Parse { path, .. } => assert_eq!(path, dir.path().join("broken.rs")),
        other => panic!("expected a parse error, got {other}"),
    }
}

#[test]
fn test_load_missing_directory() {
    let err = Context::load(Path::new("/definitely/not/here")).unwrap_err();
    assert!(matches!(err, AppError::Io(_)));
}

#[test]
fn test_upsert_from_yaml_document() {
    let docs: Vec<UpsertSchema> = serde_yaml::from_str(
        r#"
- name: Card
  fields:
    - kind: string
      name: number
      sensitive: true
      schema_type:
        postgresql: varchar(16)
    - kind: enum
      name: brand
      enum_values:
        visa: VISA
        amex: AMEX
  edges:
    - name: owner
      type: User
      inverse: true
      ref: cards
"#,
    )
    .unwrap();

    let mut ctx = Context::from_sources("schema", [("schema/card.rs", "")]).unwrap();
    let mutators: Vec<&dyn Mutator> = docs.iter().map(|d| d as &dyn Mutator).collect();
    mutate(&mut ctx, &mutators).unwrap();

    let src = ctx.type_source("Card").unwrap();
    assert!(src.contains(
        r#"vec![field::string("number").sensitive().schema_type([("postgres", "varchar(16)")]), field::enumeration("brand").named_values([("visa", "VISA"), ("amex", "AMEX")])]"#
    ));
    assert!(src.contains(r#"vec![edge::from("owner", "User").ref_name("cards")]"#));
}

#[test]
fn test_load_skips_directories_named_like_sources() {
    let dir = fixture();
    fs::create_dir(dir.path().join("nested.rs")).unwrap();
    let ctx = Context::load(dir.path()).unwrap();
    assert_eq!(ctx.files().len(), 2);
}

#[cfg(unix)]
#[test]
fn test_load_surfaces_unreadable_entries() {
    let dir = fixture();
    std::os::unix::fs::symlink(dir.path().join("missing.rs"), dir.path().join("dangling.rs"))
        .unwrap();
    let err = Context::load(dir.path()).unwrap_err();
    assert!(matches!(err, AppError::Io(ref e) if e.kind() == std::io::ErrorKind::NotFound));
}
