//! Raw-text extraction of translation function calls.
//!
//! Call sites cannot be located with the syntax tree alone: the scanner must
//! tolerate malformed snippets and arbitrary configured function name lists.
//! A regex built from the function names finds candidate calls and captures
//! one or two quoted string arguments. When the argument list continues past
//! the captured strings, a balanced-bracket scanner isolates the trailing
//! options object, which is then parsed as an expression on its own.

use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use swc_ecma_ast::{Expr, Lit, ObjectLit, Prop, PropOrSpread};

use crate::core::entry::{EntrySink, TranslationEntry};
use crate::core::key::KeyRegistry;
use crate::core::parsers::jsx::parse_expression;
use crate::core::pattern::{prop_name, template_text};
use crate::findings::{
    Diagnostics, KeyCollisionFinding, ParseFailureFinding, SourceLocation,
};

/// Option property names copied into entry metadata when statically known.
const SUPPORTED_OPTIONS: &[&str] = &[
    "defaultValue",
    "defaultValue_plural",
    "count",
    "context",
    "ns",
    "keySeparator",
    "nsSeparator",
];

static TEMPLATE_EXPR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{.*?\}").expect("static pattern compiles"));

/// Scans raw source text for translation function calls.
pub struct InvocationExtractor {
    /// `None` when the configured function list is empty.
    pattern: Option<Regex>,
}

impl InvocationExtractor {
    pub fn new(func_names: &[String]) -> Result<Self> {
        if func_names.is_empty() {
            return Ok(Self { pattern: None });
        }

        let funcs = func_names
            .iter()
            .map(|name| format!("(?:{})", regex::escape(name)))
            .collect::<Vec<_>>()
            .join("|");

        // A quoted or template string argument with surrounding whitespace.
        let string_group = concat!(
            r"[\r\n\s]*(",
            r"`(?:[^`\\]|\\.)*`",
            r#"|"(?:[^"\\]|\\.)*""#,
            r"|'(?:[^'\\]|\\.)*'",
            r")[\r\n\s]*",
        );

        let pattern = format!(
            r"(?ims)(?:(?:^\s*)|[^a-zA-Z0-9_])(?:{funcs})\({string_group}(?:,{string_group})?[,)]"
        );

        let pattern = Regex::new(&pattern)
            .with_context(|| format!("invalid function name list: {func_names:?}"))?;

        Ok(Self {
            pattern: Some(pattern),
        })
    }

    /// Scan `content` and emit one entry per successful match.
    ///
    /// The key derives from the first string argument (the native sentence,
    /// plus the parsed `context` option when present). Parse failures of an
    /// isolated options fragment are recorded and the scan continues with
    /// the options collected so far.
    pub fn extract(
        &self,
        content: &str,
        file_path: &str,
        registry: &mut KeyRegistry,
        diagnostics: &mut Diagnostics,
        sink: &mut dyn EntrySink,
    ) {
        let Some(pattern) = &self.pattern else {
            return;
        };

        for caps in pattern.captures_iter(content) {
            let Some(full) = caps.get(0) else { continue };
            let Some(first) = caps.get(1) else { continue };
            let Some(sentence) = fix_extracted_string(first.as_str()) else {
                continue;
            };
            if let Some(second) = caps.get(2)
                && fix_extracted_string(second.as_str()).is_none()
            {
                continue;
            }

            let mut entry = TranslationEntry::default();

            // A trailing comma means the argument list continues with an
            // options object.
            if full.as_str().ends_with(',') {
                let fragment = match_balanced(&content[full.end()..]);
                if !fragment.trim().is_empty() {
                    match parse_expression(&format!("({fragment})")) {
                        Ok(expr) => {
                            if let Expr::Paren(paren) = &*expr
                                && let Expr::Object(object) = &*paren.expr
                            {
                                apply_object_options(object, &mut entry);
                            }
                        }
                        Err(diag) => diagnostics.push(ParseFailureFinding {
                            location: SourceLocation::new(file_path, diag.line, diag.column),
                            snippet: Some(fragment.trim().to_string()),
                            detail: diag.message,
                        }),
                    }
                }
            }

            let context = entry.context.clone().filter(|c| !c.is_empty());
            let (key, collision) = registry.derive(&sentence, context.as_deref());
            if let Some(collision) = collision {
                diagnostics.push(KeyCollisionFinding {
                    file_path: Some(file_path.to_string()),
                    key: collision.key,
                    first_text: collision.first_text,
                    new_text: collision.new_text,
                });
            }

            entry.key = key;
            entry.default_value = sentence;
            sink.emit(entry);
        }
    }
}

/// Copy recognized properties of a flat options object literal into entry
/// metadata. Properties whose values are not statically analyzable are
/// recorded as empty strings rather than failing the whole call.
pub(crate) fn apply_object_options(object: &ObjectLit, entry: &mut TranslationEntry) {
    for prop in &object.props {
        let PropOrSpread::Prop(prop) = prop else { continue };
        let Prop::KeyValue(kv) = &**prop else { continue };
        let Some(name) = prop_name(&kv.key) else { continue };
        if !SUPPORTED_OPTIONS.contains(&name.as_str()) {
            continue;
        }
        match name.as_str() {
            "defaultValue" => entry.default_value = literal_text(&kv.value),
            "defaultValue_plural" => entry.default_value_plural = Some(literal_text(&kv.value)),
            "count" => entry.count = Some(literal_number(&kv.value)),
            "context" => entry.context = Some(literal_text(&kv.value)),
            "ns" => entry.namespace = Some(literal_text(&kv.value)),
            "keySeparator" => entry.key_separator = Some(literal_text(&kv.value)),
            "nsSeparator" => entry.ns_separator = Some(literal_text(&kv.value)),
            _ => {}
        }
    }
}

pub(crate) fn literal_text(expr: &Expr) -> String {
    match expr {
        Expr::Lit(Lit::Str(s)) => s.value.as_str().unwrap_or_default().to_string(),
        Expr::Lit(Lit::Num(n)) => format_number(n.value),
        Expr::Lit(Lit::Bool(b)) => b.value.to_string(),
        Expr::Tpl(tpl) => template_text(tpl),
        _ => String::new(),
    }
}

fn literal_number(expr: &Expr) -> f64 {
    match expr {
        Expr::Lit(Lit::Num(n)) => n.value,
        Expr::Lit(Lit::Str(s)) => s
            .value
            .as_str()
            .and_then(|v| v.parse().ok())
            .unwrap_or(0.0),
        _ => 0.0,
    }
}

pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Strip quotes and unescape a captured string argument.
///
/// Template strings with embedded expressions are rejected (they cannot be
/// analyzed statically), line continuations are removed, and escaped single
/// quotes are restored. Returns `None` for rejected or empty strings.
pub(crate) fn fix_extracted_string(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let first = trimmed.chars().next()?;
    if first == '`' && TEMPLATE_EXPR.is_match(trimmed) {
        return None;
    }

    let inner = if matches!(first, '\'' | '"' | '`') && trimmed.len() >= 2 {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };

    let unescaped = inner
        .replace("\\\r\n", "")
        .replace("\\\n", "")
        .replace("\\'", "'");

    if unescaped.is_empty() {
        None
    } else {
        Some(unescaped)
    }
}

/// Return the substring spanning from the first opening bracket to the point
/// where `[]{}()` nesting returns to zero. On a mismatched closer the prefix
/// scanned so far is returned and the downstream expression parse reports it.
pub(crate) fn match_balanced(input: &str) -> &str {
    const BRACKETS: &str = "[]{}()";
    let mut stack: Vec<usize> = Vec::new();
    let mut start: Option<usize> = None;

    for (i, c) in input.char_indices() {
        if let Some(s) = start
            && stack.is_empty()
        {
            return &input[s..i];
        }

        let Some(pos) = BRACKETS.find(c) else { continue };
        if pos % 2 == 0 {
            if start.is_none() {
                start = Some(i);
            }
            stack.push(pos + 1);
        } else if stack.pop() != Some(pos) {
            return match start {
                Some(s) => &input[s..i],
                None => &input[..i],
            };
        }
    }

    match start {
        Some(s) => &input[s..],
        None => input,
    }
}
