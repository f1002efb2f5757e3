//! Locating schema methods and reading the shape of their return expression.

use ra_ap_syntax::ast::{self, HasModuleItem, HasName};
use ra_ap_syntax::{AstNode, NodeOrToken, SourceFile, SyntaxKind, TextRange};
use std::ops::Range;

/// The expression a `fields`/`edges` method returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnExpr {
    pub(crate) file: usize,
    pub(crate) range: Range<usize>,
    pub(crate) shape: ReturnShape,
}

impl ReturnExpr {
    /// Byte range of the expression in its file.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Index of the file holding the expression.
    pub fn file(&self) -> usize {
        self.file
    }

    /// `Vec::new()` or a `vec![..]` literal.
    pub fn shape(&self) -> &ReturnShape {
        &self.shape
    }
}

/// The two accepted return shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnShape {
    /// `Vec::new()`: nothing was ever listed.
    Nil,
    /// A `vec![..]` literal, possibly empty.
    List(ListLiteral),
}

/// The contents of a `vec![..]` literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListLiteral {
    /// Range between the opening and closing delimiters.
    pub inner: Range<usize>,
    /// Elements in source order.
    pub elements: Vec<ListElement>,
}

impl ListLiteral {
    /// Number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// True for `vec![]`.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// One comma-separated element of a `vec![..]` literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListElement {
    /// Range of the element, without surrounding whitespace.
    pub range: Range<usize>,
    /// Range of the comma following the element, if any.
    pub comma: Option<Range<usize>>,
}

fn to_range(range: TextRange) -> Range<usize> {
    usize::from(range.start())..usize::from(range.end())
}

/// The last path segment of an impl's self type, e.g. `User` for `impl Schema for crate::User`.
pub(crate) fn impl_self_name(imp: &ast::Impl) -> Option<String> {
    let text = imp.self_ty()?.syntax().text().to_string();
    let last = text.rsplit("::").next()?.trim();
    Some(last.to_string())
}

pub(crate) fn impl_fns(imp: &ast::Impl) -> impl Iterator<Item = ast::Fn> {
    imp.assoc_item_list()
        .into_iter()
        .flat_map(|list| list.assoc_items())
        .filter_map(|item| match item {
            ast::AssocItem::Fn(f) => Some(f),
            _ => None,
        })
}

/// Impl blocks declared at the top level of `file`.
pub(crate) fn top_level_impls(file: &SourceFile) -> impl Iterator<Item = ast::Impl> {
    file.items().filter_map(|item| match item {
        ast::Item::Impl(imp) => Some(imp),
        _ => None,
    })
}

/// Finds `fn <method>` in any top-level impl block for `type_name`.
pub(crate) fn find_method(file: &SourceFile, type_name: &str, method: &str) -> Option<ast::Fn> {
    top_level_impls(file)
        .filter(|imp| impl_self_name(imp).as_deref() == Some(type_name))
        .flat_map(|imp| impl_fns(&imp).collect::<Vec<_>>())
        .find(|f| f.name().is_some_and(|n| n.text() == method))
}

/// Reads the single returned expression of `func` and classifies it.
///
/// Errors carry a human readable reason for `MalformedMethod`.
pub(crate) fn return_expr(file: usize, func: &ast::Fn) -> Result<ReturnExpr, String> {
    let list = func
        .body()
        .and_then(|b| b.stmt_list())
        .ok_or_else(|| "method has no body".to_string())?;
    let statements: Vec<ast::Stmt> = list.statements().collect();

    let returned = match (statements.as_slice(), list.tail_expr()) {
        ([], Some(ast::Expr::ReturnExpr(ret))) => ret.expr(),
        ([], Some(expr)) => Some(expr),
        ([ast::Stmt::ExprStmt(stmt)], None) => match stmt.expr() {
            Some(ast::Expr::ReturnExpr(ret)) => ret.expr(),
            _ => return Err("expected a single return expression".into()),
        },
        _ => {
            return Err(format!(
                "expected a single return expression, found {} statements",
                statements.len() + usize::from(list.tail_expr().is_some())
            ))
        }
    };
    let expr = returned.ok_or_else(|| "method returns nothing".to_string())?;
    let range = to_range(expr.syntax().text_range());

    let compact: String = expr
        .syntax()
        .text()
        .to_string()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if compact == "Vec::new()" || (compact.starts_with("Vec::<") && compact.ends_with(">::new()")) {
        return Ok(ReturnExpr {
            file,
            range,
            shape: ReturnShape::Nil,
        });
    }

    if let ast::Expr::MacroExpr(mac) = &expr {
        let call = mac.macro_call();
        let is_vec = call
            .as_ref()
            .and_then(|c| c.path())
            .and_then(|p| p.segment())
            .and_then(|s| s.name_ref())
            .is_some_and(|n| n.text() == "vec");
        if let (true, Some(tt)) = (is_vec, call.and_then(|c| c.token_tree())) {
            return Ok(ReturnExpr {
                file,
                range,
                shape: ReturnShape::List(split_token_tree(&tt)?),
            });
        }
    }

    Err(format!(
        "expected `Vec::new()` or `vec![..]`, found `{}`",
        expr.syntax()
    ))
}

/// Splits the contents of a macro token tree at top-level commas.
///
/// Commas inside turbofish generics (`::<A, B>`) do not split. The repeat form
/// `vec![x; n]` is rejected.
fn split_token_tree(tt: &ast::TokenTree) -> Result<ListLiteral, String> {
    let children: Vec<_> = tt.syntax().children_with_tokens().collect();
    let inner = match (children.first(), children.last()) {
        (Some(open), Some(close)) if children.len() >= 2 => {
            usize::from(open.text_range().end())..usize::from(close.text_range().start())
        }
        _ => {
            let end = usize::from(tt.syntax().text_range().end());
            end..end
        }
    };

    let mut elements = Vec::new();
    let mut current: Option<Range<usize>> = None;
    let mut generics = 0usize;
    let mut after_path_sep = false;
    let body = children.iter().skip(1).take(children.len().saturating_sub(2));
    for child in body {
        let range = to_range(child.text_range());
        let kind = child.kind();
        if matches!(kind, SyntaxKind::WHITESPACE | SyntaxKind::COMMENT) {
            continue;
        }
        match kind {
            SyntaxKind::L_ANGLE if after_path_sep || generics > 0 => generics += 1,
            SyntaxKind::R_ANGLE if generics > 0 => generics -= 1,
            SyntaxKind::SEMICOLON if generics == 0 => {
                return Err("expected a list of elements, found the repeat form `vec![x; n]`".into())
            }
            _ => {}
        }
        after_path_sep = matches!(kind, SyntaxKind::COLON | SyntaxKind::COLON2);

        match child {
            NodeOrToken::Token(t) if t.kind() == SyntaxKind::COMMA && generics == 0 => {
                if let Some(el) = current.take() {
                    elements.push(ListElement {
                        range: el,
                        comma: Some(range),
                    });
                }
            }
            _ => {
                current = Some(match current {
                    Some(el) => el.start..range.end,
                    None => range,
                });
            }
        }
    }
    if let Some(el) = current {
        elements.push(ListElement {
            range: el,
            comma: None,
        });
    }

    Ok(ListLiteral { inner, elements })
}

/// Name passed to the base constructor of a builder chain.
///
/// `field::string("name").optional()` and `edge::from("owner", "User").ref_name("x")`
/// yield `name` and `owner`.
pub(crate) fn chain_name(expr: &ast::Expr) -> Option<String> {
    use ast::HasArgList;

    let mut current = expr.clone();
    loop {
        match current {
            ast::Expr::MethodCallExpr(call) => current = call.receiver()?,
            ast::Expr::CallExpr(call) => {
                let first = call.arg_list()?.args().next()?;
                let ast::Expr::Literal(lit) = first else {
                    return None;
                };
                return crate::translate::unquote(&lit.syntax().to_string());
            }
            _ => return None,
        }
    }
}
