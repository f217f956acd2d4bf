//! Module item parsing: declarations, continuous assignments and instances.

use crate::ast::*;
use crate::const_eval::INTEGER_WIDTH;
use crate::errors::{SEM003, SEM004, SEM005, SYN002};
use crate::parser::Parser;
use crate::symbols::{Symbol, SymbolKind};
use crate::token::TokenKind;
use vela_common::Ident;
use vela_diagnostics::Diagnostic;
use vela_source::Span;

impl Parser<'_> {
    /// Parses one module item, appending what it declares to `items`.
    pub(crate) fn parse_module_item(&mut self, items: &mut Vec<ModuleItem>) {
        match self.current() {
            TokenKind::Input | TokenKind::Output | TokenKind::Inout => self.parse_port_decl(items),
            TokenKind::Wire | TokenKind::Reg | TokenKind::Integer => self.parse_net_decl(items),
            TokenKind::Parameter | TokenKind::Localparam => self.parse_param_decl(items),
            TokenKind::Assign => self.parse_continuous_assign(items),
            TokenKind::Always => items.push(ModuleItem::Always(self.parse_always())),
            TokenKind::Initial => items.push(ModuleItem::Initial(self.parse_initial())),
            TokenKind::Identifier
                if self.peek_kind(1) == TokenKind::Hash
                    || (self.peek_kind(1) == TokenKind::Identifier
                        && self.peek_kind(2) == TokenKind::LeftParen) =>
            {
                items.push(ModuleItem::Instance(self.parse_instance()));
            }
            TokenKind::Identifier => {
                // `function`, `task`, `genvar` and friends lex as plain names.
                let start = self.current_span();
                self.emit(Diagnostic::warning(
                    SYN002,
                    format!("unsupported module item '{}' skipped", self.current_text()),
                    start,
                ));
                self.advance();
                self.recover_item();
                items.push(ModuleItem::Error(start.merge(self.prev_span())));
            }
            TokenKind::Semicolon => self.advance(),
            _ => {
                let start = self.current_span();
                self.expected("module item");
                self.advance();
                self.recover_item();
                items.push(ModuleItem::Error(start));
            }
        }
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    /// `input [reg] [range] a, b;` in a module body.
    fn parse_port_decl(&mut self, items: &mut Vec<ModuleItem>) {
        let direction = match self.current() {
            TokenKind::Input => Direction::Input,
            TokenKind::Output => Direction::Output,
            _ => Direction::Inout,
        };
        self.advance();
        self.eat(TokenKind::Wire);
        let is_reg = self.eat(TokenKind::Reg);
        self.eat(TokenKind::Signed);
        let (range, width) = self.parse_opt_range();
        loop {
            let (name, span) = self.expect_ident();
            let port = PortDecl {
                name,
                direction: Some(direction),
                is_reg,
                range: range.clone(),
                width,
                span,
            };
            self.complete_port(&port);
            items.push(ModuleItem::PortDecl(port));
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.end_item();
    }

    /// Fills in the direction of a header port, or reports why it cannot.
    fn complete_port(&mut self, decl: &PortDecl) {
        let previous = match self.symbols.lookup_local_mut(decl.name) {
            Some(sym) if sym.kind == SymbolKind::Port && sym.direction.is_none() => {
                sym.direction = decl.direction;
                sym.width = sym.width.max(decl.width);
                sym.is_reg |= decl.is_reg;
                let (width, is_reg) = (sym.width, sym.is_reg);
                if let Some(port) = self.module.ports.iter_mut().find(|p| p.name == decl.name) {
                    port.direction = decl.direction;
                    port.range = decl.range.clone();
                    port.width = width;
                    port.is_reg = is_reg;
                }
                return;
            }
            Some(sym) => Some(sym.span),
            None => None,
        };
        match previous {
            Some(previous) => self.report_duplicate(decl.name, decl.span, previous),
            None => {
                self.semantic_error(
                    SEM005,
                    format!(
                        "'{}' is declared as a port but is not in the module's port list",
                        self.name(decl.name)
                    ),
                    decl.span,
                );
                self.declare(
                    Symbol::new(decl.name, SymbolKind::Port, decl.width, decl.span)
                        .with_direction(decl.direction)
                        .with_reg(decl.is_reg),
                );
            }
        }
    }

    /// `wire`, `reg` and `integer` declarations.
    fn parse_net_decl(&mut self, items: &mut Vec<ModuleItem>) {
        let kind = match self.current() {
            TokenKind::Wire => VarKind::Wire,
            TokenKind::Reg => VarKind::Reg,
            _ => VarKind::Integer,
        };
        self.advance();
        self.eat(TokenKind::Signed);
        let (range, width) = if kind == VarKind::Integer {
            (None, INTEGER_WIDTH)
        } else {
            self.parse_opt_range()
        };
        loop {
            let (name, span) = self.expect_ident();
            if self.at(TokenKind::LeftBracket) {
                let dims = self.parse_range();
                self.emit(Diagnostic::warning(
                    SYN002,
                    "memory arrays are not supported; only a single element is modelled",
                    dims.span,
                ));
            }
            let init = if self.eat(TokenKind::Equals) {
                Some(self.parse_expr())
            } else {
                None
            };
            self.declare_net(kind, name, span, width);
            items.push(ModuleItem::VarDecl(VarDecl {
                kind,
                name,
                range: range.clone(),
                width,
                init,
                span: span.merge(self.prev_span()),
            }));
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.end_item();
    }

    /// Declares a net, treating `reg q;` after `output q;` as a completion.
    fn declare_net(&mut self, kind: VarKind, name: Ident, span: Span, width: u32) {
        let previous = match self.symbols.lookup_local_mut(name) {
            Some(sym) if sym.kind == SymbolKind::Port => match kind {
                VarKind::Wire if !sym.is_reg => return,
                VarKind::Reg
                    if !sym.is_reg
                        && !matches!(sym.direction, Some(Direction::Input | Direction::Inout)) =>
                {
                    sym.is_reg = true;
                    sym.width = sym.width.max(width);
                    let width = sym.width;
                    if let Some(port) = self.module.ports.iter_mut().find(|p| p.name == name) {
                        port.is_reg = true;
                        port.width = width;
                    }
                    return;
                }
                _ => Some(sym.span),
            },
            Some(sym) => Some(sym.span),
            None => None,
        };
        match previous {
            Some(previous) => self.report_duplicate(name, span, previous),
            None => {
                let sym_kind = if kind == VarKind::Wire {
                    SymbolKind::Wire
                } else {
                    SymbolKind::Reg
                };
                self.declare(Symbol::new(name, sym_kind, width, span));
            }
        }
    }

    /// `parameter A = 1, B = 2;` and `localparam`.
    fn parse_param_decl(&mut self, items: &mut Vec<ModuleItem>) {
        let kind = if self.eat(TokenKind::Localparam) {
            VarKind::Localparam
        } else {
            self.advance();
            VarKind::Parameter
        };
        self.eat(TokenKind::Integer);
        self.eat(TokenKind::Signed);
        loop {
            let decl = self.parse_param_body(kind);
            items.push(ModuleItem::VarDecl(decl));
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.end_item();
    }

    /// `[range] NAME = value`, shared by header and body parameters.
    pub(crate) fn parse_param_body(&mut self, kind: VarKind) -> VarDecl {
        let (range, range_width) = self.parse_opt_range();
        let (name, span) = self.expect_ident();
        let init = if self.expect(TokenKind::Equals) {
            Some(self.parse_expr())
        } else {
            None
        };
        let value = init.as_ref().and_then(|e| self.const_value(e));
        if let (Some(init), None) = (&init, &value) {
            self.semantic_error(
                SEM003,
                format!(
                    "value of parameter '{}' is not a constant expression",
                    self.name(name)
                ),
                init.span(),
            );
        }
        let width = match (&range, &value) {
            (Some(_), _) => range_width,
            (None, Some(v)) => v.width(),
            (None, None) => INTEGER_WIDTH,
        };
        let value = value.map(|v| v.resize(width));
        self.declare(Symbol::new(name, SymbolKind::Parameter, width, span).with_value(value));
        VarDecl {
            kind,
            name,
            range,
            width,
            init,
            span: span.merge(self.prev_span()),
        }
    }

    // ========================================================================
    // Continuous assignment
    // ========================================================================

    /// `assign a = x, b = y;`
    fn parse_continuous_assign(&mut self, items: &mut Vec<ModuleItem>) {
        let start = self.current_span();
        self.advance();
        loop {
            let target = self.parse_lvalue();
            let value = if self.expect(TokenKind::Equals) {
                self.parse_expr()
            } else {
                Expr::Error(self.current_span())
            };
            items.push(ModuleItem::ContinuousAssign(ContinuousAssign {
                target,
                value,
                span: start.merge(self.prev_span()),
            }));
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.end_item();
    }

    // ========================================================================
    // Instances
    // ========================================================================

    /// `counter #(8) dut (.clk(clk), .q(q));`
    fn parse_instance(&mut self) -> ModuleInstance {
        let start = self.current_span();
        let (module_name, _) = self.expect_ident();

        let override_start = self.current_span();
        let mut param_overrides = Vec::new();
        if self.eat(TokenKind::Hash) {
            self.expect(TokenKind::LeftParen);
            while !self.at(TokenKind::RightParen) && !self.at_eof() {
                let before = self.position();
                if self.eat(TokenKind::Dot) {
                    self.expect_ident();
                    self.expect(TokenKind::LeftParen);
                    if !self.at(TokenKind::RightParen) {
                        param_overrides.push(self.parse_expr());
                    }
                    self.expect(TokenKind::RightParen);
                } else {
                    param_overrides.push(self.parse_expr());
                }
                if !self.eat(TokenKind::Comma) || self.position() == before {
                    break;
                }
            }
            self.expect(TokenKind::RightParen);
        }
        let override_span = override_start.merge(self.prev_span());

        let (instance_name, _) = self.expect_ident();
        if !param_overrides.is_empty() {
            self.emit(
                Diagnostic::warning(
                    SEM004,
                    format!(
                        "parameter overrides on instance '{}' are ignored",
                        self.name(instance_name)
                    ),
                    override_span,
                )
                .with_note("the instantiated module is analyzed with its default parameters"),
            );
        }

        let connections = if self.expect(TokenKind::LeftParen) {
            self.parse_connections()
        } else {
            Vec::new()
        };
        self.end_item();
        ModuleInstance {
            module_name,
            instance_name,
            param_overrides,
            connections,
            span: start.merge(self.prev_span()),
        }
    }

    /// Connection list after the opening paren, through the closing paren.
    fn parse_connections(&mut self) -> Vec<PortConnection> {
        let mut connections = Vec::new();
        if self.eat(TokenKind::RightParen) {
            return connections;
        }
        loop {
            let start = self.current_span();
            let before = self.position();
            if self.eat(TokenKind::Dot) {
                let (port, _) = self.expect_ident();
                let mut expr = None;
                if self.expect(TokenKind::LeftParen) {
                    if !self.at(TokenKind::RightParen) {
                        expr = Some(self.parse_expr());
                    }
                    self.expect(TokenKind::RightParen);
                }
                connections.push(PortConnection {
                    port: Some(port),
                    expr,
                    span: start.merge(self.prev_span()),
                });
            } else {
                let expr = self.parse_expr();
                connections.push(PortConnection {
                    port: None,
                    span: expr.span(),
                    expr: Some(expr),
                });
            }
            if !self.eat(TokenKind::Comma) || self.position() == before {
                break;
            }
        }
        self.expect(TokenKind::RightParen);
        connections
    }
}
