//! Syntax-tree extraction of translated-markup components and of translation
//! call results flowing through variables.
//!
//! A single AST pass maintains two stacks:
//!
//! - a stack of [`ScopeFrame`]s, pushed on entering the module, every block
//!   statement, and every function declaration. Each frame owns the pending
//!   bindings created inside it, so sibling scopes can never see each
//!   other's bindings and frames vanish when traversal leaves the scope.
//! - an ancestor stack of markup elements and named declarations, from which
//!   component stacks are built: the enclosing element names (with a
//!   `.className` suffix when one is statically known) up to and including
//!   the nearest named declaration, ordered outermost first.
//!
//! Translation calls like `const greeting = t("问候")` are not emitted where
//! they appear. The raw-text extractor already reports the call itself; here
//! the call becomes a pending binding against the declared name, and every
//! later reference to that name emits an entry whose component stack splices
//! the reference's markup ancestry in front of the call's.

use swc_common::SourceMap;
use swc_ecma_ast::{
    BlockStmt, CallExpr, Callee, ClassDecl, Expr, FnDecl, Ident, JSXAttrName, JSXAttrOrSpread,
    JSXAttrValue, JSXElement, JSXElementName, JSXExpr, Lit, MemberProp, Module, ObjectLit, Pat,
    Prop, PropOrSpread, VarDeclarator,
};
use swc_ecma_visit::{Visit, VisitWith};

use crate::core::entry::{EntrySink, TranslationEntry};
use crate::core::invocation::{apply_object_options, format_number, literal_text};
use crate::core::key::KeyRegistry;
use crate::core::pattern::{linearize_call_args, linearize_children, prop_name, template_text};
use crate::findings::{
    Diagnostics, KeyCollisionFinding, SourceLocation, UnsupportedExpressionFinding,
};
use crate::utils::collapse_whitespace;

/// A lexical scope during traversal, owning the bindings pending inside it.
#[derive(Debug, Default)]
struct ScopeFrame {
    pending: Vec<PendingBinding>,
}

/// A translation call result assigned to a name, waiting for references.
#[derive(Debug)]
struct PendingBinding {
    identifier: String,
    entry: TranslationEntry,
}

/// One step of markup or declaration ancestry.
#[derive(Debug)]
enum Ancestor {
    Element {
        name: String,
        class_name: Option<String>,
    },
    Declaration {
        name: String,
    },
}

/// A flattened markup attribute value.
#[derive(Debug)]
enum AttrValue {
    Text(String),
    Map(Vec<(String, String)>),
}

impl AttrValue {
    fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(text) => Some(text),
            AttrValue::Map(_) => None,
        }
    }
}

pub struct MarkupExtractor<'a> {
    file_path: &'a str,
    source_map: &'a SourceMap,
    /// Name of the translated-markup component, e.g. `Trans`.
    component: &'a str,
    /// Attribute carrying an explicit key, e.g. `i18nKey`.
    key_attr: &'a str,
    /// Attribute carrying explicit default text, e.g. `defaults`.
    defaults_attr: &'a str,
    func_list: &'a [String],
    registry: &'a mut KeyRegistry,
    diagnostics: &'a mut Diagnostics,
    sink: &'a mut dyn EntrySink,
    scopes: Vec<ScopeFrame>,
    ancestors: Vec<Ancestor>,
}

impl<'a> MarkupExtractor<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        file_path: &'a str,
        source_map: &'a SourceMap,
        component: &'a str,
        key_attr: &'a str,
        defaults_attr: &'a str,
        func_list: &'a [String],
        registry: &'a mut KeyRegistry,
        diagnostics: &'a mut Diagnostics,
        sink: &'a mut dyn EntrySink,
    ) -> Self {
        Self {
            file_path,
            source_map,
            component,
            key_attr,
            defaults_attr,
            func_list,
            registry,
            diagnostics,
            sink,
            scopes: Vec::new(),
            ancestors: Vec::new(),
        }
    }

    pub fn run(mut self, module: &Module) {
        self.visit_module(module);
    }

    // ============================================================
    // Component stacks
    // ============================================================

    /// Markup ancestry at the current traversal position, outermost first,
    /// ending the inward walk at the nearest named declaration.
    fn component_stack(&self) -> Vec<String> {
        let mut stack = Vec::new();
        for ancestor in self.ancestors.iter().rev() {
            match ancestor {
                Ancestor::Element { name, class_name } if name != self.component => {
                    stack.push(match class_name {
                        Some(class) => format!("{name}.{class}"),
                        None => name.clone(),
                    });
                }
                Ancestor::Element { .. } => {}
                Ancestor::Declaration { name } => {
                    stack.push(name.clone());
                    break;
                }
            }
        }
        stack.reverse();
        stack
    }

    fn nearest_declaration(&self) -> Option<String> {
        self.ancestors.iter().rev().find_map(|ancestor| match ancestor {
            Ancestor::Declaration { name } => Some(name.clone()),
            Ancestor::Element { .. } => None,
        })
    }

    // ============================================================
    // Emission
    // ============================================================

    /// Collapse the sentence, derive a key when none is set yet, and send
    /// the entry downstream.
    fn emit_entry(&mut self, mut entry: TranslationEntry) {
        entry.default_value = collapse_whitespace(&entry.default_value);
        if entry.key.is_empty() {
            let (key, collision) = self.registry.derive(&entry.default_value, None);
            if let Some(collision) = collision {
                self.diagnostics.push(KeyCollisionFinding {
                    file_path: Some(self.file_path.to_string()),
                    key: collision.key,
                    first_text: collision.first_text,
                    new_text: collision.new_text,
                });
            }
            entry.key = key;
        }
        self.sink.emit(entry);
    }

    // ============================================================
    // Translated-markup components
    // ============================================================

    fn handle_markup_component(&mut self, element: &JSXElement) {
        let attrs = flatten_attrs(&element.opening.attrs);

        let key = attrs
            .iter()
            .find(|(name, _)| name == self.key_attr)
            .and_then(|(_, value)| value.as_text())
            .map(|text| text.trim().to_string())
            .unwrap_or_default();

        let defaults = attrs
            .iter()
            .find(|(name, _)| name == self.defaults_attr)
            .and_then(|(_, value)| value.as_text())
            .filter(|text| !text.is_empty())
            .map(str::to_string);

        let default_value = match defaults {
            Some(text) => text,
            None => {
                let mut unsupported = Vec::new();
                let pattern =
                    linearize_children(&element.children, &mut |span| unsupported.push(span));
                for span in unsupported {
                    let loc = self.source_map.lookup_char_pos(span.lo);
                    self.diagnostics.push(UnsupportedExpressionFinding {
                        location: SourceLocation::new(
                            self.file_path,
                            loc.line,
                            loc.col_display + 1,
                        ),
                    });
                }
                pattern
            }
        };

        let mut entry = TranslationEntry {
            key,
            default_value,
            component_stack: self.component_stack(),
            ..Default::default()
        };

        // Options carried as a flat object attribute.
        if let Some((_, AttrValue::Map(options))) =
            attrs.iter().find(|(name, _)| name == "tOptions")
        {
            for (name, value) in options {
                match name.as_str() {
                    "context" => entry.context = Some(value.clone()),
                    "ns" => entry.namespace = Some(value.clone()),
                    "defaultValue_plural" => entry.default_value_plural = Some(value.clone()),
                    "count" => entry.count = Some(value.parse().unwrap_or(0.0)),
                    _ => {}
                }
            }
        }

        // A count attribute is never silently dropped: non-static values
        // coerce to zero so plural variants still register.
        if let Some((_, value)) = attrs.iter().find(|(name, _)| name == "count") {
            let count = value.as_text().and_then(|v| v.parse().ok()).unwrap_or(0.0);
            entry.count = Some(count);
        }

        if let Some(namespace) = attrs
            .iter()
            .find(|(name, _)| name == "ns")
            .and_then(|(_, value)| value.as_text())
        {
            entry.namespace = Some(namespace.to_string());
        }

        self.emit_entry(entry);
    }

    // ============================================================
    // Translation calls and identifier references
    // ============================================================

    fn callee_simple_name(callee: &Callee) -> Option<String> {
        let Callee::Expr(expr) = callee else {
            return None;
        };
        match &**expr {
            Expr::Ident(ident) => Some(ident.sym.to_string()),
            Expr::Member(member) => match &member.prop {
                MemberProp::Ident(prop) => Some(prop.sym.to_string()),
                _ => None,
            },
            _ => None,
        }
    }

    fn is_translation_call(&self, callee: &Callee) -> bool {
        Self::callee_simple_name(callee)
            .is_some_and(|name| self.func_list.iter().any(|f| f.as_str() == name))
    }

    fn record_pending_call(&mut self, node: &CallExpr) {
        let mut entry = TranslationEntry {
            default_value: linearize_call_args(&node.args),
            ..Default::default()
        };

        if let Some(second) = node.args.get(1)
            && let Expr::Object(object) = &*second.expr
        {
            apply_object_options(object, &mut entry);
        }

        entry.component_stack = self.component_stack();

        let Some(identifier) = self.nearest_declaration() else {
            // A call whose result is never named cannot be referenced
            // later; the raw-text extractor has already reported it.
            return;
        };
        if let Some(frame) = self.scopes.last_mut() {
            frame.pending.push(PendingBinding { identifier, entry });
        }
    }
}

impl Visit for MarkupExtractor<'_> {
    fn visit_module(&mut self, node: &Module) {
        self.scopes.push(ScopeFrame::default());
        node.visit_children_with(self);
        self.scopes.pop();
    }

    fn visit_block_stmt(&mut self, node: &BlockStmt) {
        self.scopes.push(ScopeFrame::default());
        node.visit_children_with(self);
        self.scopes.pop();
    }

    fn visit_fn_decl(&mut self, node: &FnDecl) {
        self.ancestors.push(Ancestor::Declaration {
            name: node.ident.sym.to_string(),
        });
        self.scopes.push(ScopeFrame::default());
        node.visit_children_with(self);
        self.scopes.pop();
        self.ancestors.pop();
    }

    fn visit_class_decl(&mut self, node: &ClassDecl) {
        self.ancestors.push(Ancestor::Declaration {
            name: node.ident.sym.to_string(),
        });
        node.visit_children_with(self);
        self.ancestors.pop();
    }

    fn visit_var_declarator(&mut self, node: &VarDeclarator) {
        node.name.visit_with(self);

        let Some(init) = &node.init else { return };
        match &node.name {
            Pat::Ident(binding) => {
                self.ancestors.push(Ancestor::Declaration {
                    name: binding.id.sym.to_string(),
                });
                init.visit_with(self);
                self.ancestors.pop();
            }
            _ => init.visit_with(self),
        }
    }

    fn visit_jsx_element(&mut self, node: &JSXElement) {
        let name = match &node.opening.name {
            JSXElementName::Ident(ident) => Some(ident.sym.to_string()),
            _ => None,
        };

        if name.as_deref() == Some(self.component) {
            self.handle_markup_component(node);
        }

        let pushed = match name {
            Some(name) => {
                let class_name = attr_string_value(&node.opening.attrs, "className");
                self.ancestors.push(Ancestor::Element { name, class_name });
                true
            }
            None => false,
        };

        // The element name is skipped on purpose: only attribute values and
        // children can hold translation calls or references.
        for attr in &node.opening.attrs {
            attr.visit_with(self);
        }
        for child in &node.children {
            child.visit_with(self);
        }

        if pushed {
            self.ancestors.pop();
        }
    }

    fn visit_call_expr(&mut self, node: &CallExpr) {
        if self.is_translation_call(&node.callee) {
            self.record_pending_call(node);
        }
        node.visit_children_with(self);
    }

    fn visit_ident(&mut self, node: &Ident) {
        let name = node.sym.as_str();

        // Nearest enclosing scope with a matching binding wins; the search
        // never continues outward past a match.
        let mut matched: Vec<TranslationEntry> = Vec::new();
        for frame in self.scopes.iter().rev() {
            let hits: Vec<TranslationEntry> = frame
                .pending
                .iter()
                .filter(|binding| binding.identifier == name)
                .map(|binding| binding.entry.clone())
                .collect();
            if !hits.is_empty() {
                matched = hits;
                break;
            }
        }

        if matched.is_empty() {
            return;
        }

        let usage_stack = self.component_stack();
        for mut entry in matched {
            let mut stack = usage_stack.clone();
            stack.append(&mut entry.component_stack);
            entry.component_stack = stack;
            self.emit_entry(entry);
        }
    }
}

// ============================================================
// Attribute flattening
// ============================================================

/// Flatten markup attributes to a name → value list. Literal values are
/// taken directly, identifier expressions contribute their name, flat
/// object literals become string maps with opaque members recorded as empty
/// strings, and a non-static `count` coerces to `"0"`.
fn flatten_attrs(attrs: &[JSXAttrOrSpread]) -> Vec<(String, AttrValue)> {
    let mut flat = Vec::new();

    for attr in attrs {
        let JSXAttrOrSpread::JSXAttr(attr) = attr else {
            continue;
        };
        let JSXAttrName::Ident(name) = &attr.name else {
            continue;
        };
        let name = name.sym.to_string();

        let value = match &attr.value {
            Some(JSXAttrValue::Str(s)) => s.value.as_str().map(|v| AttrValue::Text(v.to_string())),
            Some(JSXAttrValue::JSXExprContainer(container)) => match &container.expr {
                JSXExpr::Expr(expr) => match &**expr {
                    Expr::Ident(ident) => Some(AttrValue::Text(ident.sym.to_string())),
                    Expr::Lit(Lit::Str(s)) => {
                        s.value.as_str().map(|v| AttrValue::Text(v.to_string()))
                    }
                    Expr::Lit(Lit::Num(n)) => Some(AttrValue::Text(format_number(n.value))),
                    Expr::Lit(Lit::Bool(b)) => Some(AttrValue::Text(b.value.to_string())),
                    Expr::Tpl(tpl) => Some(AttrValue::Text(template_text(tpl))),
                    Expr::Object(object) => Some(AttrValue::Map(flatten_object(object))),
                    _ if name == "count" => Some(AttrValue::Text("0".to_string())),
                    _ => None,
                },
                JSXExpr::JSXEmptyExpr(_) => None,
            },
            _ => None,
        };

        if let Some(value) = value {
            flat.push((name, value));
        }
    }

    flat
}

fn flatten_object(object: &ObjectLit) -> Vec<(String, String)> {
    let mut flat = Vec::new();
    for prop in &object.props {
        let PropOrSpread::Prop(prop) = prop else { continue };
        let Prop::KeyValue(kv) = &**prop else { continue };
        let Some(name) = prop_name(&kv.key) else { continue };
        flat.push((name, literal_text(&kv.value)));
    }
    flat
}

fn attr_string_value(attrs: &[JSXAttrOrSpread], wanted: &str) -> Option<String> {
    attrs.iter().find_map(|attr| match attr {
        JSXAttrOrSpread::JSXAttr(attr) => match (&attr.name, &attr.value) {
            (JSXAttrName::Ident(name), Some(JSXAttrValue::Str(s))) if name.sym == wanted => {
                s.value.as_str().map(str::to_string)
            }
            _ => None,
        },
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use swc_common::SourceMap;

    use super::*;
    use crate::core::entry::ScanCollector;
    use crate::core::key::hash_key;
    use crate::core::parsers::jsx::parse_source;

    fn scan(source: &str) -> (ScanCollector, Diagnostics) {
        let parsed = parse_source(
            source.to_string(),
            "test.tsx",
            Arc::new(SourceMap::default()),
        )
        .expect("test source must parse");

        let func_list = vec!["t".to_string()];
        let mut registry = KeyRegistry::new();
        let mut diagnostics = Diagnostics::new();
        let mut collector = ScanCollector::new();

        MarkupExtractor::new(
            "test.tsx",
            &parsed.source_map,
            "Trans",
            "i18nKey",
            "defaults",
            &func_list,
            &mut registry,
            &mut diagnostics,
            &mut collector,
        )
        .run(&parsed.module);

        (collector, diagnostics)
    }

    #[test]
    fn markup_component_emits_entry() {
        let (collector, diagnostics) = scan(
            r#"
            function Farewell() {
                return (
                    <div className="footer">
                        <Trans>再见{{ name: user.name }}</Trans>
                    </div>
                );
            }
            "#,
        );

        assert!(diagnostics.is_empty());
        let key = hash_key("再见{{name}}");
        let entry = &collector.entries()[&key];
        assert_eq!(entry.default_value, "再见{{name}}");
        assert_eq!(entry.component_stack, vec!["Farewell", "div.footer"]);
    }

    #[test]
    fn explicit_key_attribute_wins() {
        let (collector, _) = scan(r#"const node = <Trans i18nKey=" custom_key ">文本</Trans>;"#);
        assert!(collector.contains_key("custom_key"));
    }

    #[test]
    fn count_attribute_registers_plural_variant() {
        let (collector, _) = scan(
            r#"const node = <Trans count={items.length}>苹果{{ count: items.length }}</Trans>;"#,
        );
        let key = hash_key("苹果{{count}}");
        assert_eq!(collector.entries()[&key].count, Some(0.0));
        assert!(collector.contains_key(&format!("{key}_plural")));
    }

    #[test]
    fn variable_reference_merges_component_stacks() {
        let (collector, diagnostics) = scan(
            r#"
            function Panel() {
                const greeting = t("问候");
                return <div className="box">{greeting}</div>;
            }
            "#,
        );

        assert!(diagnostics.is_empty());
        let key = hash_key("问候");
        let entry = &collector.entries()[&key];
        assert_eq!(entry.default_value, "问候");
        assert_eq!(entry.component_stack, vec!["Panel", "div.box", "greeting"]);
    }

    #[test]
    fn call_options_flow_into_reference_emission() {
        let (collector, _) = scan(
            r#"
            function Cart() {
                const label = t("苹果", { count: 2 });
                return <span>{label}</span>;
            }
            "#,
        );

        let key = hash_key("苹果");
        assert_eq!(collector.entries()[&key].count, Some(2.0));
        assert!(collector.contains_key(&format!("{key}_plural")));
    }

    #[test]
    fn sibling_scopes_are_isolated() {
        let (collector, _) = scan(
            r#"
            function A() {
                const msg = t("甲");
            }
            function B() {
                return <span>{msg}</span>;
            }
            "#,
        );
        // The binding died with A's scope, so the reference in B emits
        // nothing and the unreferenced call emits nothing here either.
        assert!(collector.is_empty());
    }

    #[test]
    fn nearest_scope_match_stops_outward_search() {
        let (collector, _) = scan(
            r#"
            function Outer() {
                const msg = t("外层");
                {
                    const msg = t("内层");
                    show(<b>{msg}</b>);
                }
            }
            "#,
        );

        // The reference inside <b> resolves against the inner binding only;
        // the outer entry was emitted at the shadowing declarator and so
        // never picked up the <b> ancestry.
        let inner = &collector.entries()[&hash_key("内层")];
        assert_eq!(inner.component_stack, vec!["Outer", "b", "msg"]);
        let outer = &collector.entries()[&hash_key("外层")];
        assert_eq!(outer.component_stack, vec!["Outer", "msg"]);
    }

    #[test]
    fn unsupported_interpolation_is_reported() {
        let (collector, diagnostics) = scan(r#"const node = <Trans>你好 {user.name}</Trans>;"#);
        assert_eq!(diagnostics.len(), 1);
        // The holder contributed nothing but the entry still emitted.
        assert!(collector.contains_key(&hash_key("你好 ")));
    }

    #[test]
    fn nested_markup_keeps_sibling_position() {
        let (collector, _) = scan(r#"const node = <Trans>前往<a>设置</a></Trans>;"#);
        assert!(collector.contains_key(&hash_key("前往<1>设置</1>")));
    }
}
