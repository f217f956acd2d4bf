//! Procedural blocks and statements.

use crate::ast::*;
use crate::parser::Parser;
use crate::symbols::ScopeKind;
use crate::token::TokenKind;

impl Parser<'_> {
    /// `always [@(...)] stmt`
    pub(crate) fn parse_always(&mut self) -> AlwaysBlock {
        let start = self.current_span();
        self.expect(TokenKind::Always);
        let sensitivity = if self.at(TokenKind::At) {
            Some(self.parse_sensitivity())
        } else {
            None
        };
        let body = self.parse_statement();
        AlwaysBlock {
            sensitivity,
            body,
            span: start.merge(self.prev_span()),
        }
    }

    /// `initial stmt`
    pub(crate) fn parse_initial(&mut self) -> InitialBlock {
        let start = self.current_span();
        self.expect(TokenKind::Initial);
        let body = self.parse_statement();
        InitialBlock {
            body,
            span: start.merge(self.prev_span()),
        }
    }

    /// `@*`, `@(*)`, `@name`, or `@(posedge clk or negedge rst_n, en)`.
    pub(crate) fn parse_sensitivity(&mut self) -> SensitivityList {
        let start = self.current_span();
        self.expect(TokenKind::At);
        let mut star = false;
        let mut items = Vec::new();
        if self.eat(TokenKind::Star) {
            star = true;
        } else if self.at(TokenKind::Identifier) {
            let signal = self.parse_name_expr();
            items.push(SensitivityItem {
                edge: None,
                span: signal.span(),
                signal,
            });
        } else if self.expect(TokenKind::LeftParen) {
            if self.eat(TokenKind::Star) {
                star = true;
            } else {
                loop {
                    let item_start = self.current_span();
                    let before = self.position();
                    let edge = if self.eat(TokenKind::Posedge) {
                        Some(Edge::Posedge)
                    } else if self.eat(TokenKind::Negedge) {
                        Some(Edge::Negedge)
                    } else {
                        None
                    };
                    let signal = self.parse_expr();
                    items.push(SensitivityItem {
                        edge,
                        signal,
                        span: item_start.merge(self.prev_span()),
                    });
                    let more = self.eat(TokenKind::Or) || self.eat(TokenKind::Comma);
                    if !more || self.position() == before {
                        break;
                    }
                }
            }
            self.expect(TokenKind::RightParen);
        }
        SensitivityList {
            star,
            items,
            span: start.merge(self.prev_span()),
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    /// Parses one procedural statement.
    pub(crate) fn parse_statement(&mut self) -> Statement {
        if !self.enter_nesting() {
            return Statement::Error(self.current_span());
        }
        let stmt = self.parse_statement_kind();
        self.leave_nesting();
        stmt
    }

    fn parse_statement_kind(&mut self) -> Statement {
        let start = self.current_span();
        match self.current() {
            TokenKind::Begin => self.parse_block(),
            TokenKind::If => self.parse_if(),
            TokenKind::Case | TokenKind::Casez | TokenKind::Casex => self.parse_case(),
            TokenKind::Hash => {
                self.advance();
                let delay = self.parse_delay_value();
                let body = self.parse_statement();
                Statement::Delay(DelayStmt {
                    delay,
                    body: Box::new(body),
                    span: start.merge(self.prev_span()),
                })
            }
            TokenKind::At => {
                let sensitivity = self.parse_sensitivity();
                let body = self.parse_statement();
                Statement::EventControl(EventStmt {
                    sensitivity,
                    body: Box::new(body),
                    span: start.merge(self.prev_span()),
                })
            }
            TokenKind::Forever => {
                self.advance();
                let body = self.parse_statement();
                Statement::Forever(ForeverStmt {
                    body: Box::new(body),
                    span: start.merge(self.prev_span()),
                })
            }
            TokenKind::SystemName => self.parse_system_task(),
            TokenKind::Semicolon => {
                self.advance();
                Statement::Null(start)
            }
            TokenKind::Identifier | TokenKind::LeftBrace => self.parse_procedural_assign(),
            _ => {
                let before = self.position();
                self.expected("statement");
                self.recover_statement();
                if self.position() == before {
                    Statement::Error(start)
                } else {
                    Statement::Error(start.merge(self.prev_span()))
                }
            }
        }
    }

    /// `begin [: label] stmts end`
    fn parse_block(&mut self) -> Statement {
        let start = self.current_span();
        self.expect(TokenKind::Begin);
        let label = if self.eat(TokenKind::Colon) {
            Some(self.expect_ident().0)
        } else {
            None
        };
        self.symbols.enter_scope(ScopeKind::Block, label);
        let mut stmts = Vec::new();
        while !matches!(
            self.current(),
            TokenKind::End | TokenKind::Endmodule | TokenKind::Module | TokenKind::Eof
        ) {
            let before = self.position();
            stmts.push(self.parse_statement());
            if self.position() == before {
                self.advance();
            }
        }
        self.expect(TokenKind::End);
        if self.symbols.exit_scope().is_err() {
            log::warn!("block scope closed at the root scope");
        }
        Statement::Block(Block {
            label,
            stmts,
            span: start.merge(self.prev_span()),
        })
    }

    /// `if (cond) stmt [else stmt]`
    fn parse_if(&mut self) -> Statement {
        let start = self.current_span();
        self.expect(TokenKind::If);
        self.expect(TokenKind::LeftParen);
        let cond = self.parse_expr();
        self.expect(TokenKind::RightParen);
        let then_branch = Box::new(self.parse_statement());
        let else_branch = if self.eat(TokenKind::Else) {
            Some(Box::new(self.parse_statement()))
        } else {
            None
        };
        Statement::If(IfStmt {
            cond,
            then_branch,
            else_branch,
            span: start.merge(self.prev_span()),
        })
    }

    /// `case (expr) label, label: stmt ... default: stmt endcase`
    fn parse_case(&mut self) -> Statement {
        let start = self.current_span();
        let kind = match self.current() {
            TokenKind::Casez => CaseKind::Casez,
            TokenKind::Casex => CaseKind::Casex,
            _ => CaseKind::Case,
        };
        self.advance();
        self.expect(TokenKind::LeftParen);
        let expr = self.parse_expr();
        self.expect(TokenKind::RightParen);

        let mut arms = Vec::new();
        let mut default: Option<Box<Statement>> = None;
        while !matches!(
            self.current(),
            TokenKind::Endcase
                | TokenKind::End
                | TokenKind::Endmodule
                | TokenKind::Module
                | TokenKind::Eof
        ) {
            let arm_start = self.current_span();
            let before = self.position();
            if self.eat(TokenKind::Default) {
                self.eat(TokenKind::Colon);
                let body = self.parse_statement();
                if default.is_some() {
                    self.syntax_error_at("multiple 'default' arms in case statement".into(), arm_start);
                } else {
                    default = Some(Box::new(body));
                }
            } else {
                let mut labels = Vec::new();
                loop {
                    labels.push(self.parse_expr());
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
                if self.expect(TokenKind::Colon) {
                    let body = self.parse_statement();
                    arms.push(CaseArm {
                        labels,
                        body,
                        span: arm_start.merge(self.prev_span()),
                    });
                } else {
                    self.recover_statement();
                }
            }
            if self.position() == before {
                self.advance();
            }
        }
        self.expect(TokenKind::Endcase);
        Statement::Case(CaseStmt {
            kind,
            expr,
            arms,
            default,
            span: start.merge(self.prev_span()),
        })
    }

    /// `$display(...);`, `$finish;`
    fn parse_system_task(&mut self) -> Statement {
        let start = self.current_span();
        let name = self.interner.get_or_intern(self.current_text());
        self.advance();
        let args = if self.at(TokenKind::LeftParen) {
            self.parse_call_args()
        } else {
            Vec::new()
        };
        self.end_statement();
        Statement::SystemTask(SystemTaskCall {
            name,
            args,
            span: start.merge(self.prev_span()),
        })
    }

    /// `target = value;` or `target <= value;`
    fn parse_procedural_assign(&mut self) -> Statement {
        let start = self.current_span();
        let target = self.parse_lvalue();
        let blocking = if self.eat(TokenKind::Equals) {
            true
        } else if self.eat(TokenKind::LessEquals) {
            false
        } else {
            self.expected("'=' or '<='");
            self.recover_statement();
            return Statement::Error(start.merge(self.prev_span()));
        };
        let value = self.parse_expr();
        self.end_statement();
        Statement::Assign(ProceduralAssign {
            target,
            value,
            blocking,
            span: start.merge(self.prev_span()),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::parse_source;
    use vela_diagnostics::Severity;

    fn first_always(unit: &crate::ParsedUnit) -> &AlwaysBlock {
        unit.ast.modules[0]
            .items
            .iter()
            .find_map(|i| match i {
                ModuleItem::Always(a) => Some(a),
                _ => None,
            })
            .expect("always block")
    }

    const COUNTER: &str = "module counter(input clk, input reset, output reg [3:0] count);
  always @(posedge clk or posedge reset) begin
    if (reset)
      count <= 4'b0000;
    else
      count <= count + 1;
  end
endmodule
";

    #[test]
    fn sequential_always_block() {
        let unit = parse_source(COUNTER);
        assert!(unit.diagnostics.is_empty(), "{:?}", unit.diagnostics);
        let always = first_always(&unit);
        let sens = always.sensitivity.as_ref().unwrap();
        assert!(!sens.star);
        assert_eq!(sens.items.len(), 2);
        assert!(sens.items.iter().all(|i| i.edge == Some(Edge::Posedge)));
        let Statement::Block(block) = &always.body else {
            panic!("expected block");
        };
        let Statement::If(stmt) = &block.stmts[0] else {
            panic!("expected if");
        };
        assert!(stmt.else_branch.is_some());
        let Statement::Assign(assign) = stmt.then_branch.as_ref() else {
            panic!("expected assignment");
        };
        assert!(!assign.blocking);
    }

    #[test]
    fn star_sensitivity_forms() {
        for text in [
            "module m(input a, output reg y); always @* y = a; endmodule",
            "module m(input a, output reg y); always @(*) y = a; endmodule",
        ] {
            let unit = parse_source(text);
            assert!(unit.diagnostics.is_empty());
            assert!(first_always(&unit).sensitivity.as_ref().unwrap().star);
        }
    }

    #[test]
    fn comma_separated_level_sensitivity() {
        let unit = parse_source(
            "module m(input a, input b, output reg y); always @(a, b) y = a & b; endmodule",
        );
        let sens = first_always(&unit).sensitivity.as_ref().unwrap();
        assert_eq!(sens.items.len(), 2);
        assert!(!sens.is_edge_triggered());
    }

    #[test]
    fn case_with_multi_label_arm_and_default() {
        let unit = parse_source(
            "module mux(input [1:0] s, input a, input b, output reg y);
               always @(*) begin
                 case (s)
                   2'b00, 2'b11: y = a;
                   2'b01: y = b;
                   default: y = 1'b0;
                 endcase
               end
             endmodule",
        );
        assert!(unit.diagnostics.is_empty(), "{:?}", unit.diagnostics);
        let Statement::Block(block) = &first_always(&unit).body else {
            panic!("expected block");
        };
        let Statement::Case(case) = &block.stmts[0] else {
            panic!("expected case");
        };
        assert_eq!(case.kind, CaseKind::Case);
        assert_eq!(case.arms.len(), 2);
        assert_eq!(case.arms[0].labels.len(), 2);
        assert!(case.default.is_some());
    }

    #[test]
    fn testbench_initial_block() {
        let unit = parse_source(
            "module tb;
               reg clk;
               initial begin : stim
                 clk = 0;
                 forever #5 clk = ~clk;
               end
               initial begin
                 #100 $finish;
               end
               initial $monitor(\"t=%0t clk=%b\", $time, clk);
             endmodule",
        );
        assert!(unit.diagnostics.is_empty(), "{:?}", unit.diagnostics);
        let initials: Vec<_> = unit.ast.modules[0]
            .items
            .iter()
            .filter_map(|i| match i {
                ModuleItem::Initial(b) => Some(&b.body),
                _ => None,
            })
            .collect();
        assert_eq!(initials.len(), 3);
        let Statement::Block(stim) = initials[0] else {
            panic!("expected block");
        };
        assert_eq!(unit.name_of(stim.label.unwrap()), "stim");
        let Statement::Forever(f) = &stim.stmts[1] else {
            panic!("expected forever");
        };
        assert!(matches!(f.body.as_ref(), Statement::Delay(_)));
        let Statement::SystemTask(monitor) = initials[2] else {
            panic!("expected system task");
        };
        assert_eq!(unit.name_of(monitor.name), "$monitor");
        assert_eq!(monitor.args.len(), 3);
    }

    #[test]
    fn event_control_and_null_statements() {
        let unit = parse_source(
            "module tb; reg clk; reg d; initial begin @(posedge clk); d = 1; #5; end endmodule",
        );
        assert!(unit.diagnostics.is_empty(), "{:?}", unit.diagnostics);
    }

    #[test]
    fn missing_semicolon_in_block_recovers() {
        let unit = parse_source(
            "module m(input a, output reg y, output reg z);
               always @(*) begin
                 y = a
                 z = a;
               end
               assign = 1;
             endmodule",
        );
        let fatal: Vec<_> = unit
            .diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Fatal)
            .map(|d| (d.line, d.message.as_str()))
            .collect();
        assert_eq!(
            fatal,
            [
                (4, "expected ';', found identifier 'z'"),
                (6, "expected assignment target, found '='"),
            ]
        );
        assert!(unit.ast.modules[0].fatal);
    }

    #[test]
    fn stray_end_is_reported() {
        let unit = parse_source("module m; initial begin end end endmodule");
        assert!(unit.has_fatal());
        assert!(unit.ast.modules[0].fatal);
    }

    #[test]
    fn runaway_block_nesting_is_cut_off() {
        let depth = 1000;
        let text = format!(
            "module m; reg a; initial {}a = 1;{} endmodule",
            "begin ".repeat(depth),
            " end".repeat(depth)
        );
        let unit = parse_source(&text);
        let codes: Vec<String> = unit.diagnostics.iter().map(|d| d.code.to_string()).collect();
        assert_eq!(codes, ["SYN004"]);
        assert!(unit.ast.modules[0].fatal);
    }
}
