//! Linearization of markup subtrees into flat pattern strings.
//!
//! A translated-markup component's children collapse into a single sentence
//! with `{{name}}` placeholders for interpolation holders and `<N>...</N>`
//! pseudo-tags for nested elements, where `N` is the 0-based position among
//! siblings. The pseudo-tags preserve structural position for later
//! re-insertion without storing the markup tree itself.

use std::sync::LazyLock;

use regex::Regex;
use swc_common::{Span, Spanned};
use swc_ecma_ast::{
    Expr, ExprOrSpread, JSXElementChild, JSXExpr, Lit, ObjectLit, Prop, PropName, PropOrSpread,
};

static LEADING_NEWLINE_WS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\r\n]+\s*").expect("static pattern compiles"));
static TRAILING_NEWLINE_WS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\r\n]+\s*$").expect("static pattern compiles"));
static INNER_NEWLINE_WS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\r\n]+\s*").expect("static pattern compiles"));

/// Trim newline-adjacent whitespace at the edges and collapse interior
/// newline-led whitespace runs to one space. Indentation that does not
/// follow a newline is kept as written.
fn clean_markup_text(value: &str) -> String {
    let value = LEADING_NEWLINE_WS.replace(value, "");
    let value = TRAILING_NEWLINE_WS.replace(&value, "");
    INNER_NEWLINE_WS.replace_all(&value, " ").into_owned()
}

/// Join a template literal's cooked quasis. Expressions between quasis are
/// the caller's problem; this only concatenates the literal parts.
pub fn template_text(tpl: &swc_ecma_ast::Tpl) -> String {
    tpl.quasis
        .iter()
        .filter_map(|quasi| quasi.cooked.as_ref().and_then(|c| c.as_str()))
        .collect()
}

/// The name of the first property of an interpolation holder object, when
/// the object is a statically analyzable placeholder shape.
fn placeholder_name(object: &ObjectLit) -> Option<String> {
    match object.props.first()? {
        PropOrSpread::Prop(prop) => match &**prop {
            Prop::KeyValue(kv) => prop_name(&kv.key),
            Prop::Shorthand(ident) => Some(ident.sym.to_string()),
            _ => None,
        },
        PropOrSpread::Spread(_) => None,
    }
}

pub(crate) fn prop_name(name: &PropName) -> Option<String> {
    match name {
        PropName::Ident(ident) => Some(ident.sym.to_string()),
        PropName::Str(s) => s.value.as_str().map(|v| v.to_string()),
        _ => None,
    }
}

/// Linearize a markup child list into a pattern string.
///
/// `on_unsupported` receives the span of every interpolation holder that is
/// not a statically analyzable shape; such holders contribute nothing. The
/// function has no other side effects and is deterministic for identical
/// input trees.
pub fn linearize_children(
    children: &[JSXElementChild],
    on_unsupported: &mut dyn FnMut(Span),
) -> String {
    let mut pattern = String::new();

    for (index, child) in children.iter().enumerate() {
        match child {
            JSXElementChild::JSXText(text) => {
                pattern.push_str(&clean_markup_text(&text.value));
            }
            JSXElementChild::JSXExprContainer(container) => {
                let JSXExpr::Expr(expr) = &container.expr else {
                    continue;
                };
                match &**expr {
                    // Numbers are not interpolated into patterns.
                    Expr::Lit(Lit::Num(_)) => {}
                    Expr::Lit(Lit::Str(s)) => {
                        if let Some(value) = s.value.as_str() {
                            pattern.push_str(value);
                        }
                    }
                    Expr::Tpl(tpl) => pattern.push_str(&template_text(tpl)),
                    Expr::Object(object) => match placeholder_name(object) {
                        Some(name) => {
                            pattern.push_str("{{");
                            pattern.push_str(&name);
                            pattern.push_str("}}");
                        }
                        None => on_unsupported(expr.span()),
                    },
                    other => on_unsupported(other.span()),
                }
            }
            JSXElementChild::JSXElement(element) => {
                pattern.push_str(&format!(
                    "<{index}>{}</{index}>",
                    linearize_children(&element.children, on_unsupported)
                ));
            }
            JSXElementChild::JSXFragment(fragment) => {
                pattern.push_str(&format!(
                    "<{index}>{}</{index}>",
                    linearize_children(&fragment.children, on_unsupported)
                ));
            }
            JSXElementChild::JSXSpreadChild(_) => {}
        }
    }

    pattern
}

/// Linearize a call's argument list into fallback default text. Only string
/// literal arguments contribute, cleaned the same way as markup text.
pub fn linearize_call_args(args: &[ExprOrSpread]) -> String {
    let mut pattern = String::new();
    for arg in args {
        if arg.spread.is_some() {
            continue;
        }
        if let Expr::Lit(Lit::Str(s)) = &*arg.expr
            && let Some(value) = s.value.as_str()
        {
            pattern.push_str(&clean_markup_text(value));
        }
    }
    pattern
}
