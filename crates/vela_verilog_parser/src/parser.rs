//! Parser infrastructure and top-level rules.
//!
//! [`Parser`] owns the token stream and the symbol table being filled. It
//! provides the primitives (advance, eat, expect), diagnostic helpers and
//! recovery, plus the rules for source units, module headers and port lists.
//! Module items live in `decl.rs`, statements in `stmt.rs` and expressions in
//! `expr.rs`.
//!
//! Every syntax error is fatal for the module it occurs in: the module's
//! `fatal` flag is set and it must not reach code generation. Parsing still
//! continues after recovery so later errors are reported too.

use crate::ast::*;
use crate::const_eval::{eval_const, eval_const_u32};
use crate::errors::{SEM001, SEM002, SEM003, SEM006, SEM007, SYN001, SYN003, SYN004};
use crate::symbols::{ScopeKind, Symbol, SymbolKind, SymbolTable};
use crate::token::{Token, TokenKind};
use std::collections::HashSet;
use vela_common::{BitVec, Ident, Interner, MAX_WIDTH};
use vela_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink, Label};
use vela_source::{SourceFile, Span};

/// Per-module parse state, reset at each `module` keyword.
#[derive(Default)]
pub(crate) struct ModuleState {
    /// Header ports, completed as body direction declarations arrive.
    pub(crate) ports: Vec<PortDecl>,
    /// Names already reported as undeclared.
    pub(crate) reported_undeclared: HashSet<Ident>,
    /// A syntax error occurred in this module.
    pub(crate) fatal: bool,
}

/// Deepest combined nesting of expressions and statements the parser
/// descends into.
pub const MAX_NESTING: u32 = 256;

/// Recursive-descent parser with one token of lookahead.
pub struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    file: &'a SourceFile,
    pub(crate) interner: &'a Interner,
    sink: &'a DiagnosticSink,
    pub(crate) symbols: SymbolTable,
    pub(crate) module: ModuleState,
    last_error_pos: Option<usize>,
    depth: u32,
}

impl<'a> Parser<'a> {
    /// Creates a parser over tokens lexed from `file`.
    pub fn new(
        tokens: Vec<Token>,
        file: &'a SourceFile,
        interner: &'a Interner,
        sink: &'a DiagnosticSink,
    ) -> Self {
        Self {
            tokens,
            pos: 0,
            file,
            interner,
            sink,
            symbols: SymbolTable::new(),
            module: ModuleState::default(),
            last_error_pos: None,
            depth: 0,
        }
    }

    /// Consumes the parser, returning the populated symbol table.
    pub fn into_symbols(self) -> SymbolTable {
        self.symbols
    }

    // ========================================================================
    // Primitive operations
    // ========================================================================

    fn token(&self) -> Token {
        match self.tokens.get(self.pos).or_else(|| self.tokens.last()) {
            Some(t) => *t,
            None => Token {
                kind: TokenKind::Eof,
                span: Span::new(self.file.id, 0, 0),
                line: 1,
                column: 1,
            },
        }
    }

    /// Kind of the current token.
    pub(crate) fn current(&self) -> TokenKind {
        self.token().kind
    }

    /// Span of the current token.
    pub(crate) fn current_span(&self) -> Span {
        self.token().span
    }

    /// Source text of the current token.
    pub(crate) fn current_text(&self) -> &'a str {
        let span = self.current_span();
        self.file.snippet(span.start, span.end)
    }

    /// Kind of the token `offset` positions ahead.
    pub(crate) fn peek_kind(&self, offset: usize) -> TokenKind {
        self.tokens
            .get(self.pos + offset)
            .map_or(TokenKind::Eof, |t| t.kind)
    }

    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.current() == kind
    }

    pub(crate) fn at_eof(&self) -> bool {
        self.at(TokenKind::Eof)
    }

    /// Index of the current token; used to detect lack of progress.
    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    /// Span of the previous token.
    pub(crate) fn prev_span(&self) -> Span {
        match self.pos.checked_sub(1).and_then(|p| self.tokens.get(p)) {
            Some(t) => t.span,
            None => self.current_span(),
        }
    }

    pub(crate) fn advance(&mut self) {
        if !self.at_eof() {
            self.pos += 1;
        }
    }

    /// Consumes the current token if it is `kind`.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consumes `kind` or reports "expected `kind`".
    pub(crate) fn expect(&mut self, kind: TokenKind) -> bool {
        if self.eat(kind) {
            true
        } else {
            self.expected(kind.describe());
            false
        }
    }

    /// Consumes an identifier, interning it.
    pub(crate) fn expect_ident(&mut self) -> (Ident, Span) {
        let span = self.current_span();
        if self.at(TokenKind::Identifier) {
            let ident = self.interner.get_or_intern(self.current_text());
            self.advance();
            (ident, span)
        } else {
            self.expected("identifier");
            (self.interner.get_or_intern("<missing>"), span)
        }
    }

    // ========================================================================
    // Diagnostics and recovery
    // ========================================================================

    /// Reports a fatal syntax error at the current token. A second error at
    /// the same token is suppressed.
    pub(crate) fn syntax_error(&mut self, message: String) {
        self.module.fatal = true;
        if self.last_error_pos == Some(self.pos) {
            return;
        }
        self.last_error_pos = Some(self.pos);
        let span = self.current_span();
        self.sink.emit(Diagnostic::fatal(SYN001, message, span));
    }

    /// Reports "expected `what`, found `<current token>`".
    /// Error tokens were already reported by the lexer and only mark the
    /// module fatal.
    pub(crate) fn expected(&mut self, what: &str) {
        if self.at(TokenKind::Error) {
            self.module.fatal = true;
            return;
        }
        let found = match self.current() {
            TokenKind::Identifier | TokenKind::Number | TokenKind::BasedNumber => {
                format!("{} '{}'", self.current().describe(), self.current_text())
            }
            kind => kind.describe().to_string(),
        };
        self.syntax_error(format!("expected {what}, found {found}"));
    }

    /// Enters one level of nesting. Past [`MAX_NESTING`] this reports
    /// SYN004, skips to the end of the module and returns `false`; the
    /// caller must then return an error node without recursing.
    pub(crate) fn enter_nesting(&mut self) -> bool {
        if self.depth < MAX_NESTING {
            self.depth += 1;
            return true;
        }
        self.module.fatal = true;
        if self.last_error_pos != Some(self.pos) {
            let span = self.current_span();
            self.sink.emit(
                Diagnostic::fatal(
                    SYN004,
                    format!("nesting deeper than {MAX_NESTING} levels"),
                    span,
                )
                .with_help("split the expression with intermediate wires"),
            );
        }
        while !matches!(
            self.current(),
            TokenKind::Endmodule | TokenKind::Module | TokenKind::Eof
        ) {
            self.advance();
        }
        // Unwinding callers hit missing `)` and `;` here; stay quiet.
        self.last_error_pos = Some(self.pos);
        false
    }

    pub(crate) fn leave_nesting(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Reports a fatal syntax error at `span` rather than the current token.
    pub(crate) fn syntax_error_at(&mut self, message: String, span: Span) {
        self.module.fatal = true;
        self.sink.emit(Diagnostic::fatal(SYN001, message, span));
    }

    pub(crate) fn emit(&self, diag: Diagnostic) {
        self.sink.emit(diag);
    }

    pub(crate) fn semantic_error(&self, code: DiagnosticCode, message: String, span: Span) {
        self.sink.emit(Diagnostic::error(code, message, span));
    }

    /// Text of an interned name.
    pub(crate) fn name(&self, ident: Ident) -> &'a str {
        self.interner.resolve(ident)
    }

    /// Reports a reference to `name` if nothing visible declares it. Each
    /// name is reported once per module.
    pub(crate) fn check_declared(&mut self, name: Ident, span: Span) {
        if self.symbols.lookup(name).is_some() || !self.module.reported_undeclared.insert(name) {
            return;
        }
        let message = format!("undeclared identifier '{}'", self.name(name));
        self.sink.emit(
            Diagnostic::error(SEM001, message, span)
                .with_label(Label::primary(span, "not found in this scope")),
        );
    }

    /// Declares `symbol` in the current scope, reporting a duplicate at the
    /// new declaration.
    pub(crate) fn declare(&mut self, symbol: Symbol) {
        let (name, span) = (symbol.name, symbol.span);
        if let Err(dup) = self.symbols.declare(symbol) {
            self.report_duplicate(name, span, dup.previous);
        }
    }

    pub(crate) fn report_duplicate(&self, name: Ident, span: Span, previous: Span) {
        let (line, _) = self.file.line_col(previous.start);
        let message = format!(
            "duplicate declaration of '{}' (previous declaration at line {line})",
            self.name(name)
        );
        self.sink.emit(
            Diagnostic::error(SEM002, message, span)
                .with_label(Label::primary(span, "redeclared here"))
                .with_label(Label::secondary(previous, "first declared here")),
        );
    }

    /// Consumes the `;` ending a statement, recovering if it is missing.
    pub(crate) fn end_statement(&mut self) {
        if !self.expect(TokenKind::Semicolon) {
            self.recover_statement();
        }
    }

    /// Consumes the `;` ending a module item, recovering if it is missing.
    pub(crate) fn end_item(&mut self) {
        if !self.expect(TokenKind::Semicolon) {
            self.recover_item();
        }
    }

    /// Skips to the end of the current statement: through the next `;`, or up
    /// to a keyword that closes an enclosing construct.
    pub(crate) fn recover_statement(&mut self) {
        loop {
            match self.current() {
                TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                TokenKind::Eof
                | TokenKind::Module
                | TokenKind::Endmodule
                | TokenKind::End
                | TokenKind::Endcase => return,
                _ => self.advance(),
            }
        }
    }

    /// Skips to the end of the current module item: through the next `;`,
    /// or up to a token that starts another item.
    pub(crate) fn recover_item(&mut self) {
        loop {
            match self.current() {
                TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                TokenKind::Eof
                | TokenKind::Module
                | TokenKind::Endmodule
                | TokenKind::Input
                | TokenKind::Output
                | TokenKind::Inout
                | TokenKind::Wire
                | TokenKind::Reg
                | TokenKind::Integer
                | TokenKind::Parameter
                | TokenKind::Localparam
                | TokenKind::Assign
                | TokenKind::Always
                | TokenKind::Initial => return,
                _ => self.advance(),
            }
        }
    }

    // ========================================================================
    // Constant evaluation
    // ========================================================================

    fn param_value(&self, name: Ident) -> Option<BitVec> {
        self.symbols
            .lookup(name)
            .filter(|s| s.kind == SymbolKind::Parameter)
            .and_then(|s| s.value.clone())
    }

    /// Folds `expr` using the values of visible parameters.
    pub(crate) fn const_value(&self, expr: &Expr) -> Option<BitVec> {
        eval_const(expr, &|n| self.param_value(n))
    }

    /// Folds `expr` to a small non-negative integer.
    pub(crate) fn const_u32(&self, expr: &Expr) -> Option<u32> {
        eval_const_u32(expr, &|n| self.param_value(n))
    }

    /// Bit width of `[msb:lsb]`. Non-constant bounds and ranges wider than
    /// [`MAX_WIDTH`] are reported and give width 1.
    pub(crate) fn range_width(&self, range: &Range) -> u32 {
        match (self.const_u32(&range.msb), self.const_u32(&range.lsb)) {
            (Some(msb), Some(lsb)) if msb.abs_diff(lsb) < MAX_WIDTH => msb.abs_diff(lsb) + 1,
            (Some(msb), Some(lsb)) => {
                self.semantic_error(
                    SEM007,
                    format!(
                        "range [{msb}:{lsb}] is {} bits wide; the limit is {MAX_WIDTH}",
                        u64::from(msb.abs_diff(lsb)) + 1
                    ),
                    range.span,
                );
                1
            }
            _ => {
                self.semantic_error(
                    SEM003,
                    "range bounds must be constant expressions".into(),
                    range.span,
                );
                1
            }
        }
    }

    /// Parses `[msb:lsb]`.
    pub(crate) fn parse_range(&mut self) -> Range {
        let start = self.current_span();
        self.expect(TokenKind::LeftBracket);
        let msb = self.parse_expr();
        self.expect(TokenKind::Colon);
        let lsb = self.parse_expr();
        self.expect(TokenKind::RightBracket);
        Range {
            msb,
            lsb,
            span: start.merge(self.prev_span()),
        }
    }

    /// Parses an optional range, returning it with its width.
    pub(crate) fn parse_opt_range(&mut self) -> (Option<Range>, u32) {
        if self.at(TokenKind::LeftBracket) {
            let range = self.parse_range();
            let width = self.range_width(&range);
            (Some(range), width)
        } else {
            (None, 1)
        }
    }

    // ========================================================================
    // Top level
    // ========================================================================

    /// Parses every module in the token stream.
    pub fn parse_source_unit(&mut self) -> SourceUnit {
        let start = self.current_span();
        let mut modules = Vec::new();
        while !self.at_eof() {
            if self.at(TokenKind::Module) {
                modules.push(self.parse_module());
            } else {
                self.expected("'module'");
                while !self.at_eof() && !self.at(TokenKind::Module) {
                    self.advance();
                }
            }
        }
        if modules.is_empty() {
            self.emit(Diagnostic::fatal(
                SYN003,
                "no module declaration found",
                self.current_span(),
            ));
        }
        log::debug!("parsed {} module(s) from {}", modules.len(), self.file.name);
        SourceUnit {
            modules,
            span: start.merge(self.prev_span()),
        }
    }

    fn parse_module(&mut self) -> Module {
        let start = self.current_span();
        self.module = ModuleState::default();
        self.expect(TokenKind::Module);
        let (name, name_span) = self.expect_ident();
        self.declare(Symbol::new(name, SymbolKind::Module, 1, name_span));
        self.symbols.enter_scope(ScopeKind::Module, Some(name));

        let params = if self.at(TokenKind::Hash) {
            self.parse_header_params()
        } else {
            Vec::new()
        };
        if self.at(TokenKind::LeftParen) {
            self.parse_port_list();
        }
        if !self.expect(TokenKind::Semicolon) {
            self.recover_item();
        }

        let mut items = Vec::new();
        while !self.at_eof() && !self.at(TokenKind::Endmodule) && !self.at(TokenKind::Module) {
            let before = self.position();
            self.parse_module_item(&mut items);
            if self.position() == before {
                self.advance();
            }
        }

        for port in &self.module.ports {
            if port.direction.is_none() {
                self.semantic_error(
                    SEM006,
                    format!("port '{}' has no direction declaration", self.name(port.name)),
                    port.span,
                );
            }
        }

        self.expect(TokenKind::Endmodule);
        if self.symbols.exit_scope().is_err() {
            log::warn!("scope stack unbalanced after module '{}'", self.name(name));
        }
        let state = std::mem::take(&mut self.module);
        log::trace!(
            "module '{}': {} ports, {} items, fatal={}",
            self.name(name),
            state.ports.len(),
            items.len(),
            state.fatal
        );
        Module {
            name,
            name_span,
            params,
            ports: state.ports,
            items,
            fatal: state.fatal,
            span: start.merge(self.prev_span()),
        }
    }

    /// Parses `#(parameter A = 1, parameter B = 2)`.
    fn parse_header_params(&mut self) -> Vec<VarDecl> {
        self.expect(TokenKind::Hash);
        self.expect(TokenKind::LeftParen);
        let mut params = Vec::new();
        while !self.at(TokenKind::RightParen) && !self.at_eof() {
            let before = self.position();
            let kind = if self.eat(TokenKind::Localparam) {
                VarKind::Localparam
            } else {
                self.eat(TokenKind::Parameter);
                VarKind::Parameter
            };
            self.eat(TokenKind::Integer);
            self.eat(TokenKind::Signed);
            params.push(self.parse_param_body(kind));
            if !self.eat(TokenKind::Comma) || self.position() == before {
                break;
            }
        }
        self.expect(TokenKind::RightParen);
        params
    }

    /// Parses `(a, b, c)` or `(input clk, output reg [3:0] q)`.
    fn parse_port_list(&mut self) {
        self.expect(TokenKind::LeftParen);
        if self.eat(TokenKind::RightParen) {
            return;
        }
        if self.current().is_direction() {
            self.parse_ansi_ports();
        } else {
            loop {
                let (name, span) = self.expect_ident();
                self.declare(Symbol::new(name, SymbolKind::Port, 1, span));
                self.module.ports.push(PortDecl {
                    name,
                    direction: None,
                    is_reg: false,
                    range: None,
                    width: 1,
                    span,
                });
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        if !self.expect(TokenKind::RightParen) {
            while !self.at_eof() && !self.at(TokenKind::RightParen) && !self.at(TokenKind::Semicolon)
            {
                self.advance();
            }
            self.eat(TokenKind::RightParen);
        }
    }

    /// ANSI ports. A bare name after a comma inherits the previous port's
    /// direction, type and range.
    fn parse_ansi_ports(&mut self) {
        let mut direction = Direction::Input;
        let mut is_reg = false;
        let mut range: Option<Range> = None;
        let mut width = 1;
        loop {
            let start = self.current_span();
            let explicit = match self.current() {
                TokenKind::Input => Some(Direction::Input),
                TokenKind::Output => Some(Direction::Output),
                TokenKind::Inout => Some(Direction::Inout),
                _ => None,
            };
            if let Some(dir) = explicit {
                self.advance();
                direction = dir;
                is_reg = false;
                self.eat(TokenKind::Wire);
                if self.eat(TokenKind::Reg) {
                    is_reg = true;
                }
                self.eat(TokenKind::Signed);
                (range, width) = self.parse_opt_range();
            }
            let (name, name_span) = self.expect_ident();
            self.declare(
                Symbol::new(name, SymbolKind::Port, width, name_span)
                    .with_direction(Some(direction))
                    .with_reg(is_reg),
            );
            self.module.ports.push(PortDecl {
                name,
                direction: Some(direction),
                is_reg,
                range: range.clone(),
                width,
                span: start.merge(self.prev_span()),
            });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
    }
}
