#![deny(missing_docs)]

//! # Schema Context
//!
//! Holds the source of every file in one schema package and a registry of the
//! schema types declared in them.
//!
//! Files are kept as text and re-parsed with the lossless rust-analyzer syntax tree
//! whenever a node must be located. Edits are text splices at node ranges, so
//! everything outside the edited range is kept byte for byte. The registry only
//! caches file indices, which stay valid across edits.
//!
//! A `Context` has no internal locking; share it across threads only behind an
//! external lock.

use crate::error::{AppError, AppResult};
use indexmap::IndexMap;
use ra_ap_edition::Edition;
use ra_ap_syntax::ast::{self, HasModuleItem, HasName};
use ra_ap_syntax::SourceFile;
use regex::Regex;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info};

pub(crate) mod lookup;

pub use lookup::{ListElement, ListLiteral, ReturnExpr, ReturnShape};

/// Name of the method listing a type's fields.
pub const FIELDS_METHOD: &str = "fields";

/// Name of the method listing a type's edges.
pub const EDGES_METHOD: &str = "edges";

/// File created by `add_type` when the package has no files yet.
pub const DEFAULT_FILE_NAME: &str = "schema.rs";

const NEW_FILE_HEADER: &str = "use schemapatch_core::schema::{edge, field, Edge, Field, Schema};\n";

/// One source file of the schema package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaFile {
    path: PathBuf,
    source: String,
    dirty: bool,
}

impl SchemaFile {
    /// Path of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current source text, including any edits.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// True when the text differs from what was loaded.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn parse(&self) -> SourceFile {
        SourceFile::parse(&self.source, Edition::Edition2021).tree()
    }
}

/// A declared schema type and where its methods live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TypeEntry {
    /// File declaring the struct.
    pub(crate) file: usize,
    /// File holding `fn fields`, if any.
    pub(crate) fields: Option<usize>,
    /// File holding `fn edges`, if any.
    pub(crate) edges: Option<usize>,
}

impl TypeEntry {
    pub(crate) fn method_file(&self, method: &str) -> Option<usize> {
        match method {
            FIELDS_METHOD => self.fields,
            EDGES_METHOD => self.edges,
            _ => None,
        }
    }
}

/// The in-memory state of one mutation session.
#[derive(Debug, Clone)]
pub struct Context {
    dir: PathBuf,
    files: Vec<SchemaFile>,
    types: IndexMap<String, TypeEntry>,
}

impl Context {
    /// Loads every `.rs` file directly inside `dir`.
    pub fn load(dir: impl AsRef<Path>) -> AppResult<Self> {
        let dir = dir.as_ref();
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "rs") && fs::metadata(&path)?.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        let mut sources = Vec::with_capacity(paths.len());
        for path in paths {
            let source = fs::read_to_string(&path)?;
            sources.push((path, source));
        }

        let ctx = Self::from_sources(dir, sources)?;
        info!(
            dir = %dir.display(),
            files = ctx.files.len(),
            types = ctx.types.len(),
            "loaded schema package"
        );
        Ok(ctx)
    }

    /// Builds a context from in-memory sources, in the given order.
    pub fn from_sources<P, S>(
        dir: impl Into<PathBuf>,
        sources: impl IntoIterator<Item = (P, S)>,
    ) -> AppResult<Self>
    where
        P: Into<PathBuf>,
        S: Into<String>,
    {
        let mut ctx = Self {
            dir: dir.into(),
            files: Vec::new(),
            types: IndexMap::new(),
        };
        for (path, source) in sources {
            let file = SchemaFile {
                path: path.into(),
                source: source.into(),
                dirty: false,
            };
            check_syntax(&file)?;
            ctx.files.push(file);
        }
        ctx.build_registry()?;
        Ok(ctx)
    }

    fn build_registry(&mut self) -> AppResult<()> {
        for (idx, file) in self.files.iter().enumerate() {
            let tree = file.parse();
            for strukt in tree.items().filter_map(|item| match item {
                ast::Item::Struct(s) => Some(s),
                _ => None,
            }) {
                let Some(name) = strukt.name() else { continue };
                let name = name.text().to_string();
                if self.types.contains_key(&name) {
                    return Err(AppError::TypeAlreadyExists(name));
                }
                self.types.insert(
                    name,
                    TypeEntry {
                        file: idx,
                        fields: None,
                        edges: None,
                    },
                );
            }
        }

        for (idx, file) in self.files.iter().enumerate() {
            let tree = file.parse();
            for imp in lookup::top_level_impls(&tree) {
                let Some(entry) = lookup::impl_self_name(&imp).and_then(|n| self.types.get_mut(&n))
                else {
                    continue;
                };
                for func in lookup::impl_fns(&imp) {
                    match func.name().map(|n| n.text().to_string()).as_deref() {
                        Some(FIELDS_METHOD) if entry.fields.is_none() => entry.fields = Some(idx),
                        Some(EDGES_METHOD) if entry.edges.is_none() => entry.edges = Some(idx),
                        _ => {}
                    }
                }
            }
        }
        Ok(())
    }

    /// Directory the package was loaded from.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// All files, in load order.
    pub fn files(&self) -> &[SchemaFile] {
        &self.files
    }

    /// Current text of the file at `path`.
    pub fn source(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.files
            .iter()
            .find(|f| f.path == path.as_ref())
            .map(|f| f.source.as_str())
    }

    /// Current text of the file declaring `type_name`.
    pub fn type_source(&self, type_name: &str) -> Option<&str> {
        self.types
            .get(type_name)
            .map(|e| self.files[e.file].source.as_str())
    }

    /// True if any file was edited.
    pub fn is_dirty(&self) -> bool {
        self.files.iter().any(|f| f.dirty)
    }

    /// `(path, text)` of every file, for printing.
    pub fn render(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.files.iter().map(|f| (f.path.as_path(), f.source.as_str()))
    }

    /// Writes every edited file back to disk and returns how many were written.
    pub fn save(&mut self) -> AppResult<usize> {
        let mut written = 0;
        for file in self.files.iter_mut().filter(|f| f.dirty) {
            fs::write(&file.path, &file.source)?;
            file.dirty = false;
            written += 1;
        }
        info!(written, "saved schema package");
        Ok(written)
    }

    /// Names of all registered types, in declaration order.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// True iff `name` is a registered type.
    pub fn has_type(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Declares a new schema type whose `fields` and `edges` return `Vec::new()`.
    ///
    /// The declaration is appended to the first file of the package, or to a new
    /// `schema.rs` when the package has no files.
    pub fn add_type(&mut self, name: &str) -> AppResult<()> {
        if !is_type_name(name) {
            return Err(AppError::InvalidTypeName(name.to_string()));
        }
        if self.has_type(name) {
            return Err(AppError::TypeAlreadyExists(name.to_string()));
        }

        if self.files.is_empty() {
            self.files.push(SchemaFile {
                path: self.dir.join(DEFAULT_FILE_NAME),
                source: NEW_FILE_HEADER.to_string(),
                dirty: true,
            });
        }

        let idx = 0;
        let file = &mut self.files[idx];
        if !file.source.is_empty() && !file.source.ends_with('\n') {
            file.source.push('\n');
        }
        file.source.push('\n');
        file.source.push_str(&type_decl(name));
        file.dirty = true;

        self.types.insert(
            name.to_string(),
            TypeEntry {
                file: idx,
                fields: Some(idx),
                edges: Some(idx),
            },
        );
        debug!(type_name = name, file = %self.files[idx].path.display(), "added type");
        Ok(())
    }

    /// Finds `fn <method>` in an `impl` block for `type_name`.
    pub fn lookup_method(&self, type_name: &str, method: &str) -> AppResult<ast::Fn> {
        self.locate_method(type_name, method).map(|(_, func)| func)
    }

    pub(crate) fn locate_method(&self, type_name: &str, method: &str) -> AppResult<(usize, ast::Fn)> {
        let not_found = || AppError::MethodNotFound {
            method: method.to_string(),
            type_name: type_name.to_string(),
        };
        let idx = self
            .types
            .get(type_name)
            .and_then(|e| e.method_file(method))
            .ok_or_else(not_found)?;
        lookup::find_method(&self.files[idx].parse(), type_name, method)
            .map(|func| (idx, func))
            .ok_or_else(not_found)
    }

    /// The return expression of `fn fields` for `type_name`.
    pub fn fields_return(&self, type_name: &str) -> AppResult<ReturnExpr> {
        self.return_expr(type_name, FIELDS_METHOD)
    }

    /// The return expression of `fn edges` for `type_name`.
    pub fn edges_return(&self, type_name: &str) -> AppResult<ReturnExpr> {
        self.return_expr(type_name, EDGES_METHOD)
    }

    pub(crate) fn return_expr(&self, type_name: &str, method: &str) -> AppResult<ReturnExpr> {
        let (file, func) = self.locate_method(type_name, method)?;
        lookup::return_expr(file, &func).map_err(|reason| AppError::MalformedMethod {
            method: method.to_string(),
            type_name: type_name.to_string(),
            reason,
        })
    }

    pub(crate) fn file_source(&self, file: usize) -> &str {
        &self.files[file].source
    }

    /// Replaces `range` of file `file` with `text`.
    pub(crate) fn splice(&mut self, file: usize, range: Range<usize>, text: &str) {
        let file = &mut self.files[file];
        file.source.replace_range(range, text);
        file.dirty = true;
    }
}

fn check_syntax(file: &SchemaFile) -> AppResult<()> {
    let parse = SourceFile::parse(&file.source, Edition::Edition2021);
    if parse.errors().is_empty() {
        return Ok(());
    }
    let errs: Vec<String> = parse.errors().into_iter().map(|e| e.to_string()).collect();
    Err(AppError::Parse {
        path: file.path.clone(),
        message: errs.join(", "),
    })
}

/// Strict and reserved keywords of the 2021 edition, plus `_`.
const KEYWORDS: &[&str] = &[
    "_", "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true",
    "type", "unsafe", "use", "where", "while", "abstract", "become", "box", "do", "final",
    "macro", "override", "priv", "try", "typeof", "unsized", "virtual", "yield",
];

fn is_type_name(name: &str) -> bool {
    static IDENT_RE: OnceLock<Regex> = OnceLock::new();
    let ident_re = IDENT_RE
        .get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Invalid regex"));
    ident_re.is_match(name) && !KEYWORDS.contains(&name)
}

fn type_decl(name: &str) -> String {
    format!(
        "/// {name} holds the schema definition for the {name} entity.\n\
         pub struct {name};\n\
         \n\
         impl Schema for {name} {{\n\
         \x20   fn fields() -> Vec<Field> {{\n\
         \x20       Vec::new()\n\
         \x20   }}\n\
         \n\
         \x20   fn edges() -> Vec<Edge> {{\n\
         \x20       Vec::new()\n\
         \x20   }}\n\
         }}\n"
    )
}
