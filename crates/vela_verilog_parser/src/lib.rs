//! Hand-written front end for a synthesizable Verilog subset.
//!
//! The entry point is [`parse_source`], which lexes and parses a source text
//! into a [`ParsedUnit`]: the AST, the symbol table filled while parsing, and
//! every diagnostic found along the way, with line and column resolved.
//!
//! # Architecture
//!
//! - **Lexer** ([`lexer`]): source text to tokens plus compiler directives.
//! - **Parser** ([`parser`]): recursive descent with Pratt expression parsing
//!   and statement-boundary recovery. A syntax error marks its module fatal.
//! - **Symbol table** ([`symbols`]): scope arena populated during parsing.
//! - **AST** ([`ast`]): node types with spans and serde support.
//! - **Fixer** ([`fixer`]): optional line-based repair pass run before lexing.

#![warn(missing_docs)]

/// AST node types.
pub mod ast;
/// Operator semantics and constant folding on bit vectors.
pub mod const_eval;
mod decl;
/// Diagnostic codes for lexing and parsing.
pub mod errors;
mod expr;
/// Line-based repair of common syntax slips.
pub mod fixer;
/// Lexical analyzer.
pub mod lexer;
/// Recursive descent parser with error recovery.
pub mod parser;
mod stmt;
/// Hierarchical symbol table.
pub mod symbols;
/// Token types.
pub mod token;

pub use ast::{Module, SourceUnit};
pub use fixer::{fix_source, FixKind, SyntaxFix};
pub use lexer::{Directive, LexOutput};
pub use parser::MAX_NESTING;
pub use symbols::{Symbol, SymbolKind, SymbolTable};
pub use token::{Token, TokenClass, TokenKind};

use vela_common::{Ident, Interner};
use vela_diagnostics::{resolve_positions, Diagnostic, DiagnosticSink, Severity};
use vela_source::{FileId, SourceDb, SourceFile, Span};

/// Everything produced by parsing one source text.
#[derive(Debug)]
pub struct ParsedUnit {
    /// Holds the parsed text, for rendering diagnostics.
    pub source_db: SourceDb,
    /// The parsed file within `source_db`.
    pub file: FileId,
    /// The syntax tree.
    pub ast: SourceUnit,
    /// Symbols declared while parsing.
    pub symbols: SymbolTable,
    /// Interner owning every name in `ast` and `symbols`.
    pub interner: Interner,
    /// Lexical, syntax and semantic diagnostics in detection order.
    pub diagnostics: Vec<Diagnostic>,
    /// Compiler directives in source order.
    pub directives: Vec<Directive>,
}

impl ParsedUnit {
    /// `true` if any diagnostic is fatal or any module is marked
    /// not-safe-for-code-generation.
    pub fn has_fatal(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Fatal)
            || self.ast.modules.iter().any(|m| m.fatal)
    }

    /// Finds a module by name.
    pub fn module(&self, name: &str) -> Option<&Module> {
        let ident = self.interner.get(name)?;
        self.ast.modules.iter().find(|m| m.name == ident)
    }

    /// Text of an interned name.
    pub fn name_of(&self, ident: Ident) -> &str {
        self.interner.resolve(ident)
    }

    /// The parsed source file.
    pub fn source_file(&self) -> Option<&SourceFile> {
        self.source_db.get_file(self.file)
    }
}

/// Parses `text` under the name `input.v`.
pub fn parse_source(text: &str) -> ParsedUnit {
    parse_named("input.v", text)
}

/// Parses `text`, using `name` in rendered diagnostics.
pub fn parse_named(name: &str, text: &str) -> ParsedUnit {
    let mut source_db = SourceDb::new();
    let file = source_db.add_source(name, text);
    let interner = Interner::new();
    let sink = DiagnosticSink::new();
    let (ast, symbols, directives) = match source_db.get_file(file) {
        Some(source) => parse_file(source, &interner, &sink),
        None => (
            SourceUnit {
                modules: Vec::new(),
                span: Span::DUMMY,
            },
            SymbolTable::new(),
            Vec::new(),
        ),
    };
    let mut diagnostics = sink.take_all();
    resolve_positions(&mut diagnostics, &source_db);
    ParsedUnit {
        source_db,
        file,
        ast,
        symbols,
        interner,
        diagnostics,
        directives,
    }
}

/// Lexes and parses one file, reporting into `sink`.
pub fn parse_file(
    file: &SourceFile,
    interner: &Interner,
    sink: &DiagnosticSink,
) -> (SourceUnit, SymbolTable, Vec<Directive>) {
    let LexOutput { tokens, directives } = lexer::lex(file, sink);
    log::debug!("lexed {} tokens from {}", tokens.len(), file.name);
    let mut parser = parser::Parser::new(tokens, file, interner, sink);
    let ast = parser.parse_source_unit();
    (ast, parser.into_symbols(), directives)
}
