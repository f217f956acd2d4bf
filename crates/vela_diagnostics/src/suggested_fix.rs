//! Machine-applicable edits attached to diagnostics.

use serde::{Deserialize, Serialize};
use vela_source::Span;

/// Replace the text under `span` with `new_text`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    /// Text to replace. An empty span inserts.
    pub span: Span,
    /// Replacement text.
    pub new_text: String,
}

/// One or more replacements that together fix a diagnostic.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedFix {
    /// What the fix does, e.g. "insert ';'".
    pub message: String,
    /// Edits, in any order; they must not overlap.
    pub replacements: Vec<Replacement>,
}

impl SuggestedFix {
    /// A fix that inserts `text` at the start of `at`.
    pub fn insert(message: impl Into<String>, at: Span, text: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            replacements: vec![Replacement {
                span: at.shrink_to_start(),
                new_text: text.into(),
            }],
        }
    }

    /// Applies the edits to `source`, which must be the text the spans
    /// point into. Edits with out-of-range spans are skipped.
    pub fn apply(&self, source: &str) -> String {
        let mut edits: Vec<&Replacement> = self.replacements.iter().collect();
        edits.sort_by_key(|r| std::cmp::Reverse(r.span.start));
        let mut out = source.to_string();
        for r in edits {
            let range = r.span.start as usize..r.span.end as usize;
            if out.get(range.clone()).is_some() {
                out.replace_range(range, &r.new_text);
            }
        }
        out
    }
}
