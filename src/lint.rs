//! Advisory linter for unmarked native-script text.
//!
//! Runs once per parsed file and produces findings only. Nothing here feeds
//! back into extraction; the findings are aggregated into markdown reports
//! and the `unmarked` statistic at the end of the run.
//!
//! Checked classes:
//! - native-script text in markup children outside the translated-markup
//!   component
//! - native-script string literals outside translation function calls
//! - native-script template literals outside translation function calls
//! - hard-coded domains matching the configured pattern
//! - string concatenation involving native-script literals

use regex::Regex;
use swc_common::SourceMap;
use swc_ecma_ast::{
    BinExpr, BinaryOp, CallExpr, Expr, JSXElement, JSXElementName, JSXText, Lit, Str, Tpl,
};
use swc_ecma_visit::{Visit, VisitWith};

use crate::findings::{LintFinding, LintKind, SourceLocation};
use crate::utils::contains_native_script;

pub struct Linter<'a> {
    file_path: &'a str,
    source_map: &'a SourceMap,
    component: &'a str,
    func_list: &'a [String],
    domain_pattern: &'a Regex,
    /// Depth of translated-markup components around the current node.
    marked_markup_depth: usize,
    /// Depth of translation calls around the current node.
    marked_call_depth: usize,
    findings: Vec<LintFinding>,
}

impl<'a> Linter<'a> {
    pub fn new(
        file_path: &'a str,
        source_map: &'a SourceMap,
        component: &'a str,
        func_list: &'a [String],
        domain_pattern: &'a Regex,
    ) -> Self {
        Self {
            file_path,
            source_map,
            component,
            func_list,
            domain_pattern,
            marked_markup_depth: 0,
            marked_call_depth: 0,
            findings: Vec::new(),
        }
    }

    pub fn run(mut self, module: &swc_ecma_ast::Module) -> Vec<LintFinding> {
        module.visit_children_with(&mut self);
        self.findings
    }

    fn in_marked_context(&self) -> bool {
        self.marked_markup_depth > 0 || self.marked_call_depth > 0
    }

    fn location_of(&self, pos: swc_common::BytePos) -> SourceLocation {
        let loc = self.source_map.lookup_char_pos(pos);
        SourceLocation::new(self.file_path, loc.line, loc.col_display + 1)
    }

    fn push(&mut self, kind: LintKind, text: &str, pos: swc_common::BytePos) {
        self.findings.push(LintFinding {
            location: self.location_of(pos),
            kind,
            text: text.to_string(),
        });
    }

    fn is_translation_callee(&self, call: &CallExpr) -> bool {
        use swc_ecma_ast::{Callee, MemberProp};

        let Callee::Expr(expr) = &call.callee else {
            return false;
        };
        let name = match &**expr {
            Expr::Ident(ident) => ident.sym.to_string(),
            Expr::Member(member) => match &member.prop {
                MemberProp::Ident(prop) => prop.sym.to_string(),
                _ => return false,
            },
            _ => return false,
        };
        self.func_list.iter().any(|f| f.as_str() == name)
    }
}

impl Visit for Linter<'_> {
    fn visit_jsx_element(&mut self, node: &JSXElement) {
        let is_marked = matches!(
            &node.opening.name,
            JSXElementName::Ident(ident) if ident.sym == self.component
        );

        if is_marked {
            self.marked_markup_depth += 1;
        }
        node.visit_children_with(self);
        if is_marked {
            self.marked_markup_depth -= 1;
        }
    }

    fn visit_call_expr(&mut self, node: &CallExpr) {
        let is_marked = self.is_translation_callee(node);
        if is_marked {
            self.marked_call_depth += 1;
        }
        node.visit_children_with(self);
        if is_marked {
            self.marked_call_depth -= 1;
        }
    }

    fn visit_jsx_text(&mut self, node: &JSXText) {
        let trimmed = node.value.trim();
        if !self.in_marked_context() && contains_native_script(trimmed) {
            self.push(LintKind::BareTextInMarkup, trimmed, node.span.lo);
        }
    }

    fn visit_str(&mut self, node: &Str) {
        let Some(value) = node.value.as_str() else {
            return;
        };
        if self.domain_pattern.is_match(value) {
            self.push(LintKind::HardCodedDomain, value, node.span.lo);
        }
        if !self.in_marked_context() && contains_native_script(value) {
            self.push(LintKind::BareTextInScript, value, node.span.lo);
        }
    }

    fn visit_tpl(&mut self, node: &Tpl) {
        for quasi in &node.quasis {
            let Some(cooked) = quasi.cooked.as_ref().and_then(|c| c.as_str()) else {
                continue;
            };
            if !self.in_marked_context() && contains_native_script(cooked) {
                self.push(LintKind::BareTextInTemplate, cooked, quasi.span.lo);
            }
        }
        node.visit_children_with(self);
    }

    fn visit_bin_expr(&mut self, node: &BinExpr) {
        if node.op == BinaryOp::Add {
            for side in [&node.left, &node.right] {
                if let Expr::Lit(Lit::Str(s)) = &**side
                    && let Some(value) = s.value.as_str()
                    && contains_native_script(value)
                {
                    self.push(LintKind::StringConcatenation, value, s.span.lo);
                }
            }
        }
        node.visit_children_with(self);
    }
}
