//! Line-based repair of common syntax slips.
//!
//! [`fix_source`] runs before lexing when auto-fix is enabled. Each rule
//! looks at one line at a time and records what it changed, so the caller
//! can report the rewrite next to the diagnostics of the repaired text.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// What a fix repaired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FixKind {
    /// A statement or declaration lacked its `;`.
    MissingSemicolon,
    /// An expression closed fewer parentheses than it opened.
    MissingParenthesis,
    /// Two port names were separated by whitespace only.
    MissingComma,
    /// A module header listed ports without parentheses.
    ModuleHeader,
}

impl fmt::Display for FixKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FixKind::MissingSemicolon => "missing_semicolon",
            FixKind::MissingParenthesis => "missing_parentheses",
            FixKind::MissingComma => "missing_comma",
            FixKind::ModuleHeader => "module_syntax",
        })
    }
}

/// One rewritten line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxFix {
    /// 1-based line number.
    pub line: u32,
    /// The line before the fix, trimmed.
    pub original: String,
    /// The line after the fix, trimmed.
    pub fixed: String,
    /// What was repaired.
    pub kind: FixKind,
    /// Human-readable description.
    pub description: String,
}

fn cached(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| Regex::new(pattern).ok()).as_ref()
}

fn declaration_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached(
        &RE,
        r"^(input|output|inout|wire|reg|integer|parameter|localparam)\b[^;]*$",
    )
}

fn two_ports_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached(&RE, r"^(input|output|inout)\s+(\w+)\s+(\w+)\s*;$")
}

fn module_header_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached(&RE, r"^module\s+(\w+)\s+([^();#]+);$")
}

fn starts_with_word(code: &str, word: &str) -> bool {
    code.strip_prefix(word)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(|c: char| c.is_whitespace()))
}

/// A source line split into indentation, code and trailing `//` comment.
struct Line<'a> {
    indent: &'a str,
    code: String,
    comment: &'a str,
}

impl<'a> Line<'a> {
    fn split(text: &'a str) -> Self {
        let body = text.trim_start();
        let indent = &text[..text.len() - body.len()];
        let (code, comment) = match body.find("//") {
            Some(i) => (&body[..i], &body[i..]),
            None => (body, ""),
        };
        Self {
            indent,
            code: code.trim_end().to_string(),
            comment,
        }
    }

    fn join(&self) -> String {
        if self.comment.is_empty() {
            format!("{}{}", self.indent, self.code)
        } else {
            format!("{}{} {}", self.indent, self.code, self.comment)
        }
    }
}

struct Fixer {
    fixes: Vec<SyntaxFix>,
    /// Open-paren depth of a module header spanning several lines.
    header_depth: i64,
}

impl Fixer {
    fn record(&mut self, line: u32, before: &str, after: &str, kind: FixKind, description: String) {
        self.fixes.push(SyntaxFix {
            line,
            original: before.trim().to_string(),
            fixed: after.trim().to_string(),
            kind,
            description,
        });
    }

    fn fix_line(&mut self, number: u32, text: &str) -> String {
        let mut line = Line::split(text);
        if line.code.is_empty() {
            return text.to_string();
        }
        let in_header = self.header_depth > 0;
        self.track_header(&line.code);

        let before = line.join();
        if let Some(code) = self.fix_parentheses(&line.code) {
            let missing = code.len() - line.code.len();
            line.code = code;
            self.record(
                number,
                &before,
                &line.join(),
                FixKind::MissingParenthesis,
                format!("added {missing} missing closing parenthesis"),
            );
        }

        let before = line.join();
        if starts_with_word(&line.code, "assign") && !line.code.ends_with(';') {
            line.code.push(';');
            self.record(
                number,
                &before,
                &line.join(),
                FixKind::MissingSemicolon,
                "added missing semicolon after assign statement".into(),
            );
        } else if !in_header
            && !line.code.ends_with(',')
            && !line.code.ends_with('(')
            && declaration_re().is_some_and(|re| re.is_match(&line.code))
        {
            line.code.push(';');
            self.record(
                number,
                &before,
                &line.join(),
                FixKind::MissingSemicolon,
                "added missing semicolon after declaration".into(),
            );
        }

        let before = line.join();
        if let Some(caps) = two_ports_re().and_then(|re| re.captures(&line.code)) {
            let (first, second) = (&caps[2], &caps[3]);
            if !matches!(first, "wire" | "reg" | "signed") {
                let code = line
                    .code
                    .replacen(&format!("{first} {second}"), &format!("{first}, {second}"), 1);
                line.code = code;
                self.record(
                    number,
                    &before,
                    &line.join(),
                    FixKind::MissingComma,
                    "added missing comma in port declaration".into(),
                );
            }
        }

        let before = line.join();
        if let Some(caps) = module_header_re().and_then(|re| re.captures(&line.code)) {
            let ports = caps[2].trim();
            if !ports.is_empty() {
                line.code = format!("module {}({ports});", &caps[1]);
                self.record(
                    number,
                    &before,
                    &line.join(),
                    FixKind::ModuleHeader,
                    "added parentheses around module port list".into(),
                );
            }
        }

        if self.fixes.last().is_some_and(|f| f.line == number) {
            line.join()
        } else {
            text.to_string()
        }
    }

    fn track_header(&mut self, code: &str) {
        let opens = code.matches('(').count() as i64;
        let closes = code.matches(')').count() as i64;
        if self.header_depth > 0 {
            self.header_depth = (self.header_depth + opens - closes).max(0);
        } else if starts_with_word(code, "module") {
            self.header_depth = (opens - closes).max(0);
        }
    }

    /// Appends missing `)` on assignment lines, before a trailing `;`.
    fn fix_parentheses(&self, code: &str) -> Option<String> {
        if !(starts_with_word(code, "assign") || code.contains('=')) {
            return None;
        }
        let opens = code.matches('(').count();
        let closes = code.matches(')').count();
        if opens <= closes {
            return None;
        }
        let parens = ")".repeat(opens - closes);
        Some(match code.strip_suffix(';') {
            Some(head) => format!("{}{parens};", head.trim_end()),
            None => format!("{code}{parens}"),
        })
    }
}

/// Repairs common slips line by line, returning the new text and the fixes
/// applied. Lines no rule matches are kept byte for byte.
pub fn fix_source(text: &str) -> (String, Vec<SyntaxFix>) {
    let mut fixer = Fixer {
        fixes: Vec::new(),
        header_depth: 0,
    };
    let fixed: Vec<String> = text
        .split('\n')
        .enumerate()
        .map(|(i, line)| fixer.fix_line(i as u32 + 1, line))
        .collect();
    if !fixer.fixes.is_empty() {
        log::debug!("syntax fixer applied {} fix(es)", fixer.fixes.len());
    }
    (fixed.join("\n"), fixer.fixes)
}

/// Multi-line summary of applied fixes.
pub fn fixes_summary(fixes: &[SyntaxFix]) -> String {
    if fixes.is_empty() {
        return "No automatic fixes were applied.".to_string();
    }
    let mut out = format!("Applied {} automatic fixes:", fixes.len());
    for fix in fixes {
        out.push_str(&format!(
            "\n- line {}: {}\n  before: {}\n  after:  {}",
            fix.line, fix.description, fix.original, fix.fixed
        ));
    }
    out
}
