use crate::context::lookup::chain_name;
use crate::context::{Context, ReturnExpr, ReturnShape, EDGES_METHOD, FIELDS_METHOD};
use crate::error::{AppError, AppResult};
use crate::schema::{EdgeDescriptor, FieldDescriptor};
use crate::translate::{edge_fragment, field_fragment, parse_expr, Fragment};
use tracing::debug;

/// Which of the two schema methods an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ListKind {
    Fields,
    Edges,
}

impl ListKind {
    fn method(self) -> &'static str {
        match self {
            ListKind::Fields => FIELDS_METHOD,
            ListKind::Edges => EDGES_METHOD,
        }
    }

    fn not_found(self, name: &str, type_name: &str) -> AppError {
        match self {
            ListKind::Fields => AppError::FieldNotFound {
                field: name.to_string(),
                type_name: type_name.to_string(),
            },
            ListKind::Edges => AppError::EdgeNotFound {
                edge: name.to_string(),
                type_name: type_name.to_string(),
            },
        }
    }
}

impl Context {
    /// Appends a field to the `vec![..]` returned by `fn fields` of `type_name`.
    ///
    /// A `Vec::new()` body becomes a one-element `vec![..]`. Existing elements are
    /// kept exactly as written. Names are not deduplicated.
    pub fn append_field(&mut self, type_name: &str, desc: &FieldDescriptor) -> AppResult<()> {
        let fragment = field_fragment(desc)?;
        self.append(ListKind::Fields, type_name, &fragment)
    }

    /// Appends an edge to the `vec![..]` returned by `fn edges` of `type_name`.
    pub fn append_edge(&mut self, type_name: &str, desc: &EdgeDescriptor) -> AppResult<()> {
        let fragment = edge_fragment(desc)?;
        self.append(ListKind::Edges, type_name, &fragment)
    }

    /// Removes the field named `name` from `fn fields` of `type_name`.
    ///
    /// Removing the last field leaves an explicit `vec![]`.
    pub fn remove_field(&mut self, type_name: &str, name: &str) -> AppResult<()> {
        self.remove(ListKind::Fields, type_name, name)
    }

    /// Removes the edge named `name` from `fn edges` of `type_name`.
    pub fn remove_edge(&mut self, type_name: &str, name: &str) -> AppResult<()> {
        self.remove(ListKind::Edges, type_name, name)
    }

    /// Replaces the body of `fn fields` with `Vec::new()`.
    pub fn reset_fields(&mut self, type_name: &str) -> AppResult<()> {
        self.reset(ListKind::Fields, type_name)
    }

    /// Replaces the body of `fn edges` with `Vec::new()`.
    pub fn reset_edges(&mut self, type_name: &str) -> AppResult<()> {
        self.reset(ListKind::Edges, type_name)
    }

    fn reset(&mut self, kind: ListKind, type_name: &str) -> AppResult<()> {
        let ret = self.return_expr(type_name, kind.method())?;
        self.splice(ret.file(), ret.range(), "Vec::new()");
        debug!(type_name, method = kind.method(), "reset list");
        Ok(())
    }

    fn append(&mut self, kind: ListKind, type_name: &str, fragment: &Fragment) -> AppResult<()> {
        let ret = self.return_expr(type_name, kind.method())?;
        let (range, patch) = append_patch(self.file_source(ret.file()), &ret, fragment);
        self.splice(ret.file(), range, &patch);
        debug!(type_name, method = kind.method(), element = %fragment, "appended element");
        Ok(())
    }

    fn remove(&mut self, kind: ListKind, type_name: &str, name: &str) -> AppResult<()> {
        let ret = self.return_expr(type_name, kind.method())?;
        let ReturnShape::List(list) = ret.shape() else {
            return Err(kind.not_found(name, type_name));
        };
        let source = self.file_source(ret.file());

        let idx = list
            .elements
            .iter()
            .position(|el| {
                parse_expr(&source[el.range.clone()])
                    .ok()
                    .and_then(|expr| chain_name(&expr))
                    .is_some_and(|n| n == name)
            })
            .ok_or_else(|| kind.not_found(name, type_name))?;

        let elements = &list.elements;
        let target = &elements[idx];
        let range = if elements.len() == 1 {
            list.inner.clone()
        } else if let Some(next) = elements.get(idx + 1) {
            target.range.start..next.range.start
        } else {
            let prev = &elements[idx - 1];
            match (&target.comma, &prev.comma) {
                (Some(comma), Some(prev_comma)) => prev_comma.end..comma.end,
                _ => prev.range.end..target.range.end,
            }
        };

        self.splice(ret.file(), range, "");
        debug!(type_name, method = kind.method(), name, "removed element");
        Ok(())
    }
}

/// Computes where and what to insert so `fragment` becomes the last element.
fn append_patch(
    source: &str,
    ret: &ReturnExpr,
    fragment: &Fragment,
) -> (std::ops::Range<usize>, String) {
    let list = match ret.shape() {
        ReturnShape::Nil => return (ret.range(), format!("vec![{}]", fragment)),
        ReturnShape::List(list) => list,
    };
    let Some(last) = list.elements.last() else {
        return (list.inner.clone(), fragment.to_string());
    };

    let multiline = source[list.inner.clone()].contains('\n');
    if multiline {
        // A trailing comment stays on the line of the element it follows.
        let indent = detect_indent(source, last.range.start).unwrap_or("    ");
        let (anchor, sep) = match &last.comma {
            Some(comma) => (comma.end, ""),
            None => (last.range.end, ","),
        };
        let line_end = source[anchor..list.inner.end]
            .find('\n')
            .map_or(list.inner.end, |i| anchor + i);
        let tail = source[anchor..line_end].trim_end();
        let patch = format!("{}{}\n{}{},", sep, tail, indent, fragment);
        return (anchor..line_end, patch);
    }

    let (pos, patch) = match &last.comma {
        Some(comma) => (comma.end, format!(" {},", fragment)),
        None => (last.range.end, format!(", {}", fragment)),
    };
    (pos..pos, patch)
}

/// Indentation of the line `offset` starts on, if only whitespace precedes it.
fn detect_indent(source: &str, offset: usize) -> Option<&str> {
    let line_start = source[..offset].rfind('\n')? + 1;
    let indent = &source[line_start..offset];
    indent.chars().all(char::is_whitespace).then_some(indent)
}
