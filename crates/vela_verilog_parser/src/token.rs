//! Token kinds produced by the lexer.
//!
//! [`TokenKind`] has one variant per keyword, operator and delimiter.
//! [`TokenClass`] groups them into the coarse categories reported to
//! callers (keyword, identifier, number, operator, delimiter, string,
//! system call).

use serde::{Deserialize, Serialize};
use vela_source::Span;

/// Fine-grained token kind.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum TokenKind {
    // === Keywords ===
    /// `module`
    Module,
    /// `endmodule`
    Endmodule,
    /// `input`
    Input,
    /// `output`
    Output,
    /// `inout`
    Inout,
    /// `wire`
    Wire,
    /// `reg`
    Reg,
    /// `integer`
    Integer,
    /// `parameter`
    Parameter,
    /// `localparam`
    Localparam,
    /// `signed`
    Signed,
    /// `assign`
    Assign,
    /// `always`
    Always,
    /// `initial`
    Initial,
    /// `begin`
    Begin,
    /// `end`
    End,
    /// `if`
    If,
    /// `else`
    Else,
    /// `case`
    Case,
    /// `casez`
    Casez,
    /// `casex`
    Casex,
    /// `endcase`
    Endcase,
    /// `default`
    Default,
    /// `posedge`
    Posedge,
    /// `negedge`
    Negedge,
    /// `or` in sensitivity lists
    Or,
    /// `forever`
    Forever,

    // === Literals and names ===
    /// Plain decimal integer, e.g. `42`
    Number,
    /// Sized or unsized based literal, e.g. `4'b1010`, `'hff`
    BasedNumber,
    /// `"text"`
    StringLiteral,
    /// Ordinary identifier
    Identifier,
    /// `$display`, `$finish`, `$time`, ...
    SystemName,

    // === Delimiters ===
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `;`
    Semicolon,
    /// `,`
    Comma,
    /// `.`
    Dot,
    /// `:`
    Colon,
    /// `#`
    Hash,
    /// `@`
    At,

    // === Operators ===
    /// `=`
    Equals,
    /// `==`
    DoubleEquals,
    /// `!=`
    BangEquals,
    /// `===`
    TripleEquals,
    /// `!==`
    BangDoubleEquals,
    /// `<`
    LessThan,
    /// `<=`
    LessEquals,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterEquals,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `**`
    DoubleStar,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `&`
    Ampersand,
    /// `&&`
    DoubleAmpersand,
    /// `|`
    Pipe,
    /// `||`
    DoublePipe,
    /// `^`
    Caret,
    /// `~^` or `^~`
    TildeCaret,
    /// `~`
    Tilde,
    /// `~&`
    TildeAmpersand,
    /// `~|`
    TildePipe,
    /// `!`
    Bang,
    /// `<<`
    ShiftLeft,
    /// `>>`
    ShiftRight,
    /// `<<<`
    ArithShiftLeft,
    /// `>>>`
    ArithShiftRight,
    /// `?`
    Question,

    /// End of input.
    Eof,
    /// A lexeme the lexer rejected; a diagnostic has already been emitted.
    Error,
}

/// Coarse token category.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum TokenClass {
    /// Reserved word.
    Keyword,
    /// User name.
    Identifier,
    /// Numeric literal.
    Number,
    /// Arithmetic, bitwise, logical, relational or shift operator.
    Operator,
    /// Punctuation: `()[]{};,.:#@`.
    Delimiter,
    /// String literal.
    String,
    /// `$name`.
    SystemCall,
    /// End of input or a rejected lexeme.
    Other,
}

impl TokenKind {
    /// The coarse category of this kind.
    pub fn class(self) -> TokenClass {
        use TokenKind::*;
        match self {
            Module | Endmodule | Input | Output | Inout | Wire | Reg | Integer | Parameter
            | Localparam | Signed | Assign | Always | Initial | Begin | End | If | Else | Case
            | Casez | Casex | Endcase | Default | Posedge | Negedge | Or | Forever => {
                TokenClass::Keyword
            }
            Number | BasedNumber => TokenClass::Number,
            StringLiteral => TokenClass::String,
            Identifier => TokenClass::Identifier,
            SystemName => TokenClass::SystemCall,
            LeftParen | RightParen | LeftBracket | RightBracket | LeftBrace | RightBrace
            | Semicolon | Comma | Dot | Colon | Hash | At => TokenClass::Delimiter,
            Eof | Error => TokenClass::Other,
            _ => TokenClass::Operator,
        }
    }

    /// Returns `true` for `input`, `output` and `inout`.
    pub fn is_direction(self) -> bool {
        matches!(self, TokenKind::Input | TokenKind::Output | TokenKind::Inout)
    }

    /// Short description for "expected X, found Y" messages.
    pub fn describe(self) -> &'static str {
        use TokenKind::*;
        match self {
            Module => "'module'",
            Endmodule => "'endmodule'",
            Input => "'input'",
            Output => "'output'",
            Inout => "'inout'",
            Wire => "'wire'",
            Reg => "'reg'",
            Integer => "'integer'",
            Parameter => "'parameter'",
            Localparam => "'localparam'",
            Signed => "'signed'",
            Assign => "'assign'",
            Always => "'always'",
            Initial => "'initial'",
            Begin => "'begin'",
            End => "'end'",
            If => "'if'",
            Else => "'else'",
            Case => "'case'",
            Casez => "'casez'",
            Casex => "'casex'",
            Endcase => "'endcase'",
            Default => "'default'",
            Posedge => "'posedge'",
            Negedge => "'negedge'",
            Or => "'or'",
            Forever => "'forever'",
            Number | BasedNumber => "number",
            StringLiteral => "string",
            Identifier => "identifier",
            SystemName => "system task",
            LeftParen => "'('",
            RightParen => "')'",
            LeftBracket => "'['",
            RightBracket => "']'",
            LeftBrace => "'{'",
            RightBrace => "'}'",
            Semicolon => "';'",
            Comma => "','",
            Dot => "'.'",
            Colon => "':'",
            Hash => "'#'",
            At => "'@'",
            Equals => "'='",
            DoubleEquals => "'=='",
            BangEquals => "'!='",
            TripleEquals => "'==='",
            BangDoubleEquals => "'!=='",
            LessThan => "'<'",
            LessEquals => "'<='",
            GreaterThan => "'>'",
            GreaterEquals => "'>='",
            Plus => "'+'",
            Minus => "'-'",
            Star => "'*'",
            DoubleStar => "'**'",
            Slash => "'/'",
            Percent => "'%'",
            Ampersand => "'&'",
            DoubleAmpersand => "'&&'",
            Pipe => "'|'",
            DoublePipe => "'||'",
            Caret => "'^'",
            TildeCaret => "'~^'",
            Tilde => "'~'",
            TildeAmpersand => "'~&'",
            TildePipe => "'~|'",
            Bang => "'!'",
            ShiftLeft => "'<<'",
            ShiftRight => "'>>'",
            ArithShiftLeft => "'<<<'",
            ArithShiftRight => "'>>>'",
            Question => "'?'",
            Eof => "end of input",
            Error => "invalid token",
        }
    }
}

/// Maps a keyword's text to its kind.
pub fn lookup_keyword(text: &str) -> Option<TokenKind> {
    let kind = match text {
        "module" => TokenKind::Module,
        "endmodule" => TokenKind::Endmodule,
        "input" => TokenKind::Input,
        "output" => TokenKind::Output,
        "inout" => TokenKind::Inout,
        "wire" => TokenKind::Wire,
        "reg" => TokenKind::Reg,
        "integer" => TokenKind::Integer,
        "parameter" => TokenKind::Parameter,
        "localparam" => TokenKind::Localparam,
        "signed" => TokenKind::Signed,
        "assign" => TokenKind::Assign,
        "always" => TokenKind::Always,
        "initial" => TokenKind::Initial,
        "begin" => TokenKind::Begin,
        "end" => TokenKind::End,
        "if" => TokenKind::If,
        "else" => TokenKind::Else,
        "case" => TokenKind::Case,
        "casez" => TokenKind::Casez,
        "casex" => TokenKind::Casex,
        "endcase" => TokenKind::Endcase,
        "default" => TokenKind::Default,
        "posedge" => TokenKind::Posedge,
        "negedge" => TokenKind::Negedge,
        "or" => TokenKind::Or,
        "forever" => TokenKind::Forever,
        _ => return None,
    };
    Some(kind)
}

/// A lexed token.
///
/// The lexeme itself is not stored; slice the source with `span`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Token {
    /// Kind of token.
    pub kind: TokenKind,
    /// Bytes covered by the lexeme.
    pub span: Span,
    /// 1-based line of the first byte.
    pub line: u32,
    /// 1-based column of the first byte.
    pub column: u32,
}

impl Token {
    /// The coarse category of this token.
    pub fn class(&self) -> TokenClass {
        self.kind.class()
    }
}
