#![deny(missing_docs)]

//! # Descriptor Translation
//!
//! Turns field and edge descriptors back into the builder chains that produce them,
//! e.g. `field::string("x").optional()`.
//!
//! The chain is assembled as text and parsed inside a wrapper function so the
//! result is a real `ast::Expr` node. Modifiers are emitted in a fixed order,
//! independent of the order in which they were set. Features with no source
//! form (annotations, defaults, validators) are all reported together as one
//! `UnsupportedFeatures` error.

use crate::error::{AppError, AppResult};
use crate::schema::dialect::canonical_name;
use crate::schema::{EdgeDescriptor, FieldDescriptor, FieldType};
use ra_ap_edition::Edition;
use ra_ap_syntax::{ast, AstNode, SourceFile};
use std::fmt::{self, Display};

/// A builder-chain expression equivalent to one descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    expr: ast::Expr,
}

impl Fragment {
    /// The parsed expression node.
    pub fn expr(&self) -> &ast::Expr {
        &self.expr
    }

    /// Source text of the chain.
    pub fn text(&self) -> String {
        self.expr.syntax().to_string()
    }
}

impl Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr.syntax())
    }
}

/// Maps a field kind to its constructor in the `field` module.
///
/// `None` means the kind cannot be written back as source.
pub fn field_constructor(kind: FieldType) -> Option<&'static str> {
    match kind {
        FieldType::Bool => Some("bool"),
        FieldType::Time => Some("time"),
        FieldType::Bytes => Some("bytes"),
        FieldType::Enum => Some("enumeration"),
        FieldType::String => Some("string"),
        FieldType::Int => Some("int"),
        FieldType::Int8 => Some("int8"),
        FieldType::Int16 => Some("int16"),
        FieldType::Int32 => Some("int32"),
        FieldType::Int64 => Some("int64"),
        FieldType::Uint => Some("uint"),
        FieldType::Uint8 => Some("uint8"),
        FieldType::Uint16 => Some("uint16"),
        FieldType::Uint32 => Some("uint32"),
        FieldType::Uint64 => Some("uint64"),
        FieldType::Float32 => Some("float32"),
        FieldType::Float64 => Some("float64"),
        FieldType::Json | FieldType::Uuid | FieldType::Other => None,
    }
}

/// Translates a field descriptor into its builder chain.
pub fn field_fragment(desc: &FieldDescriptor) -> AppResult<Fragment> {
    let ctor = field_constructor(desc.kind).ok_or(AppError::UnsupportedType(desc.kind))?;
    let mut call = BuilderCall::new(&format!("field::{}", ctor), &[str_lit(&desc.name)]);

    if desc.nillable {
        call.method("nillable", &[]);
    }
    if desc.optional {
        call.method("optional", &[]);
    }
    if desc.unique {
        call.method("unique", &[]);
    }
    if desc.sensitive {
        call.method("sensitive", &[]);
    }
    if desc.immutable {
        call.method("immutable", &[]);
    }
    if let Some(comment) = &desc.comment {
        call.method("comment", &[str_lit(comment)]);
    }
    if let Some(tag) = &desc.struct_tag {
        call.method("struct_tag", &[str_lit(tag)]);
    }
    if let Some(key) = &desc.storage_key {
        call.method("storage_key", &[str_lit(key)]);
    }
    if !desc.schema_type.is_empty() {
        let pairs: Vec<String> = desc
            .schema_type
            .iter()
            .map(|(dialect, ty)| pair_lit(&canonical_name(dialect), ty))
            .collect();
        call.method("schema_type", &[array_lit(&pairs)]);
    }
    if !desc.enum_values.is_empty() {
        if desc.has_plain_enum_values() {
            let values: Vec<String> = desc.enum_values.keys().map(|v| str_lit(v)).collect();
            call.method("values", &[array_lit(&values)]);
        } else {
            let pairs: Vec<String> = desc
                .enum_values
                .iter()
                .map(|(name, value)| pair_lit(name, value))
                .collect();
            call.method("named_values", &[array_lit(&pairs)]);
        }
    }

    let mut unsupported = Vec::new();
    if !desc.annotations.is_empty() {
        unsupported.push("Descriptor.Annotations");
    }
    if desc.default.is_some() {
        unsupported.push("Descriptor.Default");
    }
    if !desc.validators.is_empty() {
        unsupported.push("Descriptor.Validators");
    }
    if !unsupported.is_empty() {
        return Err(AppError::UnsupportedFeatures(unsupported));
    }

    call.finish()
}

/// Translates an edge descriptor into its builder chain.
pub fn edge_fragment(desc: &EdgeDescriptor) -> AppResult<Fragment> {
    let ctor = if desc.inverse { "edge::from" } else { "edge::to" };
    let mut call = BuilderCall::new(ctor, &[str_lit(&desc.name), str_lit(&desc.target)]);

    if desc.inverse {
        if let Some(ref_name) = &desc.ref_name {
            call.method("ref_name", &[str_lit(ref_name)]);
        }
    }
    if desc.unique {
        call.method("unique", &[]);
    }
    if desc.required {
        call.method("required", &[]);
    }
    if desc.immutable {
        call.method("immutable", &[]);
    }
    if let Some(field) = &desc.field {
        call.method("field", &[str_lit(field)]);
    }
    if let Some(tag) = &desc.struct_tag {
        call.method("struct_tag", &[str_lit(tag)]);
    }
    if let Some(comment) = &desc.comment {
        call.method("comment", &[str_lit(comment)]);
    }

    if !desc.annotations.is_empty() {
        return Err(AppError::UnsupportedFeatures(vec!["Descriptor.Annotations"]));
    }

    call.finish()
}

/// Accumulates a call chain as source text.
struct BuilderCall {
    code: String,
}

impl BuilderCall {
    fn new(path: &str, args: &[String]) -> Self {
        Self {
            code: format!("{}({})", path, args.join(", ")),
        }
    }

    fn method(&mut self, name: &str, args: &[String]) {
        self.code.push('.');
        self.code.push_str(name);
        self.code.push('(');
        self.code.push_str(&args.join(", "));
        self.code.push(')');
    }

    fn finish(self) -> AppResult<Fragment> {
        parse_expr(&self.code).map(|expr| Fragment { expr })
    }
}

/// Parses a standalone expression by wrapping it in a function body.
pub(crate) fn parse_expr(code: &str) -> AppResult<ast::Expr> {
    let wrapper_code = format!("fn __fragment() {{\n    {}\n}}", code);
    let parse = SourceFile::parse(&wrapper_code, Edition::Edition2021);

    if !parse.errors().is_empty() {
        let errs: Vec<String> = parse.errors().into_iter().map(|e| e.to_string()).collect();
        return Err(AppError::General(format!(
            "Failed to parse expression `{}`: {}",
            code,
            errs.join(", ")
        )));
    }

    parse
        .tree()
        .syntax()
        .descendants()
        .find_map(ast::BlockExpr::cast)
        .and_then(|block| block.stmt_list())
        .and_then(|list| list.tail_expr())
        .ok_or_else(|| {
            AppError::General(format!(
                "Internal generation error: no expression in `{}`",
                code
            ))
        })
}

/// Quotes `s` as a Rust string literal that reads back as exactly `s`.
pub fn str_lit(s: &str) -> String {
    format!("{:?}", s)
}

fn pair_lit(a: &str, b: &str) -> String {
    format!("({}, {})", str_lit(a), str_lit(b))
}

fn array_lit(items: &[String]) -> String {
    format!("[{}]", items.join(", "))
}

/// Reads the value of a Rust string literal token (plain or raw).
///
/// Returns `None` for anything that is not a well-formed string literal.
pub fn unquote(lit: &str) -> Option<String> {
    if let Some(raw) = lit.strip_prefix('r') {
        let hashes = raw.len() - raw.trim_start_matches('#').len();
        let fence = "#".repeat(hashes);
        let body = raw
            .strip_prefix(&fence)?
            .strip_prefix('"')?
            .strip_suffix(&fence)?
            .strip_suffix('"')?;
        return Some(body.to_string());
    }

    let body = lit.strip_prefix('"')?.strip_suffix('"')?;
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            '0' => out.push('\0'),
            '\\' => out.push('\\'),
            '"' => out.push('"'),
            '\'' => out.push('\''),
            'x' => {
                let hex: String = chars.by_ref().take(2).collect();
                out.push(char::from(u8::from_str_radix(&hex, 16).ok()?));
            }
            'u' => {
                if chars.next()? != '{' {
                    return None;
                }
                let hex: String = chars.by_ref().take_while(|c| *c != '}').collect();
                out.push(char::from_u32(u32::from_str_radix(&hex, 16).ok()?)?);
            }
            '\n' => {
                // Line continuation: skip leading whitespace on the next line.
                while chars.peek().is_some_and(|c| c.is_whitespace()) {
                    chars.next();
                }
            }
            _ => return None,
        }
    }
    Some(out)
}
