//! One registered source text with its line index.

use crate::file_id::FileId;
use vela_common::ContentHash;

/// A source text plus the byte offset of every line start.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Handle of this text in its database.
    pub id: FileId,
    /// Display name used in diagnostics.
    pub name: String,
    /// Full text.
    pub content: String,
    /// Hash of `content`.
    pub content_hash: ContentHash,
    line_starts: Vec<u32>,
}

impl SourceFile {
    /// Registers `content` under `name` and indexes its lines.
    pub fn new(id: FileId, name: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        let line_starts = std::iter::once(0)
            .chain(
                content
                    .bytes()
                    .enumerate()
                    .filter(|(_, b)| *b == b'\n')
                    .map(|(i, _)| i as u32 + 1),
            )
            .collect();
        Self {
            id,
            name: name.into(),
            content_hash: ContentHash::of_text(&content),
            content,
            line_starts,
        }
    }

    /// 1-based `(line, column)` of a byte offset. Offsets past the end clamp
    /// to the last position.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        let offset = offset.min(self.content.len() as u32);
        let idx = self
            .line_starts
            .partition_point(|start| *start <= offset)
            .saturating_sub(1);
        (idx as u32 + 1, offset - self.line_starts[idx] + 1)
    }

    /// Number of lines. An empty text has one empty line.
    pub fn line_count(&self) -> u32 {
        self.line_starts.len() as u32
    }

    /// Text of the 1-based `line` without its terminator.
    pub fn line_text(&self, line: u32) -> Option<&str> {
        let idx = (line as usize).checked_sub(1)?;
        let start = *self.line_starts.get(idx)? as usize;
        let end = self
            .line_starts
            .get(idx + 1)
            .map(|e| *e as usize)
            .unwrap_or(self.content.len());
        Some(self.content[start..end].trim_end_matches(['\n', '\r']))
    }

    /// The text between two byte offsets, or `""` if they are out of range.
    pub fn snippet(&self, start: u32, end: u32) -> &str {
        self.content
            .get(start as usize..end as usize)
            .unwrap_or_default()
    }
}
