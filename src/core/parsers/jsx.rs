//! swc-based parsing of source files and expression fragments.
//!
//! Everything scanned is parsed with the TypeScript syntax with TSX enabled,
//! which accepts plain JS/JSX files as well. Each file gets its own
//! `SourceMap` wrapped in `Arc` so parsing can run on worker threads.

use std::sync::Arc;

use swc_common::{FileName, GLOBALS, Globals, SourceMap, Spanned};
use swc_ecma_ast::{Expr, Module};
use swc_ecma_parser::{Parser, StringInput, Syntax, TsSyntax};

/// A parse error with its position resolved to line and column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDiagnostic {
    /// 1-indexed line.
    pub line: usize,
    /// 1-indexed column.
    pub column: usize,
    pub message: String,
}

/// A successfully parsed source file.
pub struct ParsedSource {
    pub module: Module,
    pub source_map: Arc<SourceMap>,
}

impl std::fmt::Debug for ParsedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParsedSource").finish_non_exhaustive()
    }
}

fn tsx_syntax() -> Syntax {
    Syntax::Typescript(TsSyntax {
        tsx: true,
        ..Default::default()
    })
}

/// Parse a whole source file into a module.
pub fn parse_source(
    code: String,
    file_path: &str,
    source_map: Arc<SourceMap>,
) -> Result<ParsedSource, ParseDiagnostic> {
    GLOBALS.set(&Globals::new(), || {
        let source_file =
            source_map.new_source_file(FileName::Real(file_path.into()).into(), code);

        let mut parser = Parser::new(tsx_syntax(), StringInput::from(&*source_file), None);

        match parser.parse_module() {
            Ok(module) => Ok(ParsedSource {
                module,
                source_map: source_map.clone(),
            }),
            Err(err) => {
                let loc = source_map.lookup_char_pos(err.span().lo);
                Err(ParseDiagnostic {
                    line: loc.line,
                    column: loc.col_display + 1,
                    message: err.into_kind().msg().to_string(),
                })
            }
        }
    })
}

/// Parse an isolated expression fragment (an options object cut out of a
/// call's argument list). Positions in the diagnostic are relative to the
/// fragment, because the fragment was re-parsed out of context.
pub fn parse_expression(code: &str) -> Result<Box<Expr>, ParseDiagnostic> {
    GLOBALS.set(&Globals::new(), || {
        let source_map = Arc::new(SourceMap::default());
        let source_file = source_map.new_source_file(FileName::Anon.into(), code.to_string());

        let mut parser = Parser::new(tsx_syntax(), StringInput::from(&*source_file), None);

        parser.parse_expr().map_err(|err| {
            let loc = source_map.lookup_char_pos(err.span().lo);
            ParseDiagnostic {
                line: loc.line,
                column: loc.col_display + 1,
                message: err.into_kind().msg().to_string(),
            }
        })
    })
}
