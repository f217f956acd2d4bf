//! Lexical analyzer.
//!
//! Turns source text into [`Token`]s. Whitespace and comments are skipped;
//! compiler directives (`` `timescale ``, `` `define ``, ...) are collected
//! as [`Directive`]s rather than tokens. A malformed lexeme is reported as a
//! lexical diagnostic and becomes a single [`TokenKind::Error`] token, after
//! which scanning resumes, so one bad character never hides later tokens.

use crate::errors::{LEX001, LEX002, LEX003, LEX004, LEX005};
use crate::token::{lookup_keyword, Token, TokenKind};
use serde::{Deserialize, Serialize};
use vela_common::{BitVec, MAX_WIDTH};
use vela_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink};
use vela_source::{SourceFile, Span};

/// A backtick compiler directive, kept for later phases.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directive {
    /// Directive name without the backtick, e.g. `"timescale"`.
    pub name: String,
    /// Rest of the line, trimmed and without a trailing `//` comment.
    pub argument: String,
    /// Span of the whole directive line.
    pub span: Span,
}

/// Everything the lexer produces for one source text.
#[derive(Clone, Debug, Default)]
pub struct LexOutput {
    /// Tokens in source order, always ending with [`TokenKind::Eof`].
    pub tokens: Vec<Token>,
    /// Directives in source order.
    pub directives: Vec<Directive>,
}

/// Lexes a source file.
pub fn lex(file: &SourceFile, sink: &DiagnosticSink) -> LexOutput {
    let mut lexer = Lexer {
        source: file.content.as_bytes(),
        text: &file.content,
        pos: 0,
        file,
        sink,
        directives: Vec::new(),
    };
    let tokens = lexer.lex_all();
    log::debug!(
        "lexed {} tokens and {} directives from {}",
        tokens.len(),
        lexer.directives.len(),
        file.name
    );
    LexOutput {
        tokens,
        directives: lexer.directives,
    }
}

struct Lexer<'a> {
    source: &'a [u8],
    text: &'a str,
    pos: usize,
    file: &'a SourceFile,
    sink: &'a DiagnosticSink,
    directives: Vec<Directive>,
}

impl Lexer<'_> {
    fn lex_all(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia();
            if self.at_end() {
                tokens.push(self.token(TokenKind::Eof, self.pos));
                return tokens;
            }
            tokens.push(self.next_token());
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn peek(&self) -> u8 {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> u8 {
        self.source.get(self.pos + offset).copied().unwrap_or(0)
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(self.file.id, start as u32, self.pos as u32)
    }

    fn token(&self, kind: TokenKind, start: usize) -> Token {
        let (line, column) = self.file.line_col(start as u32);
        Token {
            kind,
            span: self.span_from(start),
            line,
            column,
        }
    }

    fn error(&self, code: DiagnosticCode, msg: String, span: Span) {
        self.sink.emit(Diagnostic::error(code, msg, span));
    }

    fn error_token(&self, code: DiagnosticCode, msg: String, start: usize) -> Token {
        self.error(code, msg, self.span_from(start));
        self.token(TokenKind::Error, start)
    }

    fn eat_while(&mut self, pred: impl Fn(u8) -> bool) {
        while !self.at_end() && pred(self.source[self.pos]) {
            self.pos += 1;
        }
    }

    fn skip_trivia(&mut self) {
        loop {
            self.eat_while(|b| b.is_ascii_whitespace());
            match (self.peek(), self.peek_at(1)) {
                (b'/', b'/') => self.eat_while(|b| b != b'\n'),
                (b'/', b'*') => self.skip_block_comment(),
                (b'`', _) => self.lex_directive(),
                _ => return,
            }
        }
    }

    fn skip_block_comment(&mut self) {
        let start = self.pos;
        self.pos += 2;
        loop {
            if self.at_end() {
                self.error(
                    LEX004,
                    "unterminated block comment".into(),
                    self.span_from(start),
                );
                return;
            }
            if self.peek() == b'*' && self.peek_at(1) == b'/' {
                self.pos += 2;
                return;
            }
            self.pos += 1;
        }
    }

    fn lex_directive(&mut self) {
        let start = self.pos;
        self.pos += 1;
        let name_start = self.pos;
        self.eat_while(is_ident_char);
        let name = self.text[name_start..self.pos].to_string();
        self.eat_while(|b| b != b'\n');
        if name.is_empty() {
            self.error(
                LEX001,
                "'`' must be followed by a directive name".into(),
                self.span_from(start),
            );
            return;
        }
        let rest = &self.text[name_start + name.len()..self.pos];
        let argument = rest.split("//").next().unwrap_or_default().trim().to_string();
        log::trace!("directive `{name} {argument}");
        self.directives.push(Directive {
            name,
            argument,
            span: self.span_from(start),
        });
    }

    fn next_token(&mut self) -> Token {
        let start = self.pos;
        let b = self.peek();
        if is_ident_start(b) {
            self.eat_while(is_ident_char);
            let kind = lookup_keyword(&self.text[start..self.pos]).unwrap_or(TokenKind::Identifier);
            return self.token(kind, start);
        }
        if b == b'$' {
            return self.lex_system_name(start);
        }
        if b.is_ascii_digit() {
            return self.lex_number(start);
        }
        if b == b'\'' && is_base_start(self.peek_at(1), self.peek_at(2)) {
            return self.lex_based_tail(start, None);
        }
        if b == b'"' {
            return self.lex_string(start);
        }
        self.lex_operator(start)
    }

    fn lex_system_name(&mut self, start: usize) -> Token {
        self.pos += 1;
        if !is_ident_start(self.peek()) {
            return self.error_token(LEX005, "expected a name after '$'".into(), start);
        }
        self.eat_while(is_ident_char);
        self.token(TokenKind::SystemName, start)
    }

    fn lex_number(&mut self, start: usize) -> Token {
        self.eat_while(|b| b.is_ascii_digit() || b == b'_');
        if self.peek() == b'\'' && is_base_start(self.peek_at(1), self.peek_at(2)) {
            let size_text: String = self.text[start..self.pos]
                .chars()
                .filter(|c| *c != '_')
                .collect();
            return self.lex_based_tail(start, Some(size_text));
        }
        self.token(TokenKind::Number, start)
    }

    /// Lexes `'[s]<base><digits>` with `self.pos` at the tick.
    fn lex_based_tail(&mut self, start: usize, size_text: Option<String>) -> Token {
        self.pos += 1;
        if matches!(self.peek(), b's' | b'S') {
            self.pos += 1;
        }
        let base = self.peek() as char;
        self.pos += 1;
        self.eat_while(|b| b.is_ascii_whitespace() && b != b'\n');
        let digits_start = self.pos;
        self.eat_while(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'?');
        let digits = &self.text[digits_start..self.pos];
        let lexeme = &self.text[start..self.pos];

        let width = match size_text.as_deref().map(str::parse::<u32>) {
            None => None,
            Some(Ok(w)) if (1..=MAX_WIDTH).contains(&w) => Some(w),
            Some(_) => {
                return self.error_token(
                    LEX003,
                    format!("invalid size in literal '{lexeme}'"),
                    start,
                );
            }
        };
        if digits.is_empty() {
            return self.error_token(
                LEX003,
                format!("literal '{lexeme}' has no digits"),
                start,
            );
        }
        if BitVec::parse_based(width, base, digits).is_none() {
            return self.error_token(
                LEX003,
                format!("invalid digit for base '{base}' in literal '{lexeme}'"),
                start,
            );
        }
        self.token(TokenKind::BasedNumber, start)
    }

    fn lex_string(&mut self, start: usize) -> Token {
        self.pos += 1;
        loop {
            if self.at_end() || self.peek() == b'\n' {
                return self.error_token(LEX002, "unterminated string literal".into(), start);
            }
            match self.peek() {
                b'\\' => self.pos = (self.pos + 2).min(self.source.len()),
                b'"' => {
                    self.pos += 1;
                    return self.token(TokenKind::StringLiteral, start);
                }
                _ => self.pos += 1,
            }
        }
    }

    fn lex_operator(&mut self, start: usize) -> Token {
        use TokenKind::*;
        let b = self.peek();
        let (kind, len) = match (b, self.peek_at(1), self.peek_at(2)) {
            (b'=', b'=', b'=') => (TripleEquals, 3),
            (b'!', b'=', b'=') => (BangDoubleEquals, 3),
            (b'<', b'<', b'<') => (ArithShiftLeft, 3),
            (b'>', b'>', b'>') => (ArithShiftRight, 3),
            (b'=', b'=', _) => (DoubleEquals, 2),
            (b'!', b'=', _) => (BangEquals, 2),
            (b'<', b'=', _) => (LessEquals, 2),
            (b'>', b'=', _) => (GreaterEquals, 2),
            (b'<', b'<', _) => (ShiftLeft, 2),
            (b'>', b'>', _) => (ShiftRight, 2),
            (b'&', b'&', _) => (DoubleAmpersand, 2),
            (b'|', b'|', _) => (DoublePipe, 2),
            (b'*', b'*', _) => (DoubleStar, 2),
            (b'~', b'^', _) | (b'^', b'~', _) => (TildeCaret, 2),
            (b'~', b'&', _) => (TildeAmpersand, 2),
            (b'~', b'|', _) => (TildePipe, 2),
            (b'(', ..) => (LeftParen, 1),
            (b')', ..) => (RightParen, 1),
            (b'[', ..) => (LeftBracket, 1),
            (b']', ..) => (RightBracket, 1),
            (b'{', ..) => (LeftBrace, 1),
            (b'}', ..) => (RightBrace, 1),
            (b';', ..) => (Semicolon, 1),
            (b',', ..) => (Comma, 1),
            (b'.', ..) => (Dot, 1),
            (b':', ..) => (Colon, 1),
            (b'#', ..) => (Hash, 1),
            (b'@', ..) => (At, 1),
            (b'?', ..) => (Question, 1),
            (b'=', ..) => (Equals, 1),
            (b'<', ..) => (LessThan, 1),
            (b'>', ..) => (GreaterThan, 1),
            (b'+', ..) => (Plus, 1),
            (b'-', ..) => (Minus, 1),
            (b'*', ..) => (Star, 1),
            (b'/', ..) => (Slash, 1),
            (b'%', ..) => (Percent, 1),
            (b'&', ..) => (Ampersand, 1),
            (b'|', ..) => (Pipe, 1),
            (b'^', ..) => (Caret, 1),
            (b'~', ..) => (Tilde, 1),
            (b'!', ..) => (Bang, 1),
            _ => {
                let ch = self.text[self.pos..].chars().next().unwrap_or('\0');
                self.pos += ch.len_utf8().max(1);
                return self.error_token(
                    LEX001,
                    format!("illegal character {ch:?}"),
                    start,
                );
            }
        };
        self.pos += len;
        self.token(kind, start)
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// `'b`, `'sh`, ... : the two bytes after a tick start a based literal.
fn is_base_start(first: u8, second: u8) -> bool {
    let is_base = |b: u8| matches!(b.to_ascii_lowercase(), b'b' | b'o' | b'd' | b'h');
    is_base(first) || (matches!(first, b's' | b'S') && is_base(second))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vela_diagnostics::DiagnosticKind;
    use vela_source::FileId;

    fn lex_text(text: &str) -> (LexOutput, Vec<Diagnostic>) {
        let file = SourceFile::new(FileId::from_raw(0), "t.v", text);
        let sink = DiagnosticSink::new();
        let out = lex(&file, &sink);
        (out, sink.take_all())
    }

    fn kinds(text: &str) -> Vec<TokenKind> {
        let (out, diags) = lex_text(text);
        assert!(diags.is_empty(), "unexpected diagnostics: {diags:?}");
        out.tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn module_header() {
        use TokenKind::*;
        assert_eq!(
            kinds("module counter(input clk);"),
            vec![Module, Identifier, LeftParen, Input, Identifier, RightParen, Semicolon, Eof]
        );
    }

    #[test]
    fn literals() {
        use TokenKind::*;
        assert_eq!(
            kinds("4'b1010 8'hFF 3'o7 10'd5 42 'b1 4'sb10 8'h_ff"),
            vec![
                BasedNumber,
                BasedNumber,
                BasedNumber,
                BasedNumber,
                Number,
                BasedNumber,
                BasedNumber,
                BasedNumber,
                Eof
            ]
        );
    }

    #[test]
    fn operators_longest_match() {
        use TokenKind::*;
        assert_eq!(
            kinds("<= << <<< === !== == != && || ~^ ^~ ~& ~| ** >>>"),
            vec![
                LessEquals,
                ShiftLeft,
                ArithShiftLeft,
                TripleEquals,
                BangDoubleEquals,
                DoubleEquals,
                BangEquals,
                DoubleAmpersand,
                DoublePipe,
                TildeCaret,
                TildeCaret,
                TildeAmpersand,
                TildePipe,
                DoubleStar,
                ArithShiftRight,
                Eof
            ]
        );
    }

    #[test]
    fn system_names_and_strings() {
        use TokenKind::*;
        assert_eq!(
            kinds("$monitor(\"t=%0d\", $time); $finish;"),
            vec![
                SystemName,
                LeftParen,
                StringLiteral,
                Comma,
                SystemName,
                RightParen,
                Semicolon,
                SystemName,
                Semicolon,
                Eof
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        use TokenKind::*;
        assert_eq!(
            kinds("wire a; // trailing\n/* block\n comment */ reg b;"),
            vec![Wire, Identifier, Semicolon, Reg, Identifier, Semicolon, Eof]
        );
    }

    #[test]
    fn positions_are_one_based() {
        let (out, _) = lex_text("module m;\n  reg a;\n");
        let reg = out.tokens[3];
        assert_eq!(reg.kind, TokenKind::Reg);
        assert_eq!((reg.line, reg.column), (2, 3));
        let a = out.tokens[4];
        assert_eq!((a.line, a.column), (2, 7));
    }

    #[test]
    fn directives_are_collected() {
        let (out, diags) = lex_text("`timescale 1ns / 1ps // unit\nmodule tb; endmodule\n");
        assert!(diags.is_empty());
        assert_eq!(out.directives.len(), 1);
        assert_eq!(out.directives[0].name, "timescale");
        assert_eq!(out.directives[0].argument, "1ns / 1ps");
        assert_eq!(out.tokens[0].kind, TokenKind::Module);
    }

    #[test]
    fn illegal_character_continues() {
        let (out, diags) = lex_text("wire £ a;");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind(), DiagnosticKind::Lexical);
        assert_eq!(diags[0].code, LEX001);
        let k: Vec<_> = out.tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            k,
            vec![
                TokenKind::Wire,
                TokenKind::Error,
                TokenKind::Identifier,
                TokenKind::Semicolon,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn unterminated_string() {
        let (out, diags) = lex_text("$display(\"oops);\nend");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, LEX002);
        assert!(out.tokens.iter().any(|t| t.kind == TokenKind::End));
    }

    #[test]
    fn malformed_literals() {
        let (_, diags) = lex_text("4'b102");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, LEX003);
        let (_, diags) = lex_text("8'h;");
        assert_eq!(diags[0].code, LEX003);
        let (_, diags) = lex_text("0'b1");
        assert_eq!(diags[0].code, LEX003);
        let (_, diags) = lex_text("4000000000'b1");
        assert_eq!(diags[0].code, LEX003);
    }

    #[test]
    fn unterminated_block_comment() {
        let (out, diags) = lex_text("wire a; /* never closed");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, LEX004);
        assert_eq!(out.tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
    }
}
