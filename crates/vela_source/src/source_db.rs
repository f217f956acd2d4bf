//! Registry of source texts for one compilation or simulation call.

use crate::file_id::FileId;
use crate::location::Location;
use crate::source_file::SourceFile;
use crate::span::Span;

/// Owns every source text of a call and resolves spans against them.
#[derive(Debug, Clone, Default)]
pub struct SourceDb {
    files: Vec<SourceFile>,
}

impl SourceDb {
    /// Creates an empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an in-memory text and returns its handle.
    pub fn add_source(&mut self, name: impl Into<String>, content: impl Into<String>) -> FileId {
        let id = FileId::from_raw(self.files.len() as u32);
        self.files.push(SourceFile::new(id, name, content));
        id
    }

    /// Looks up a registered text.
    pub fn get_file(&self, id: FileId) -> Option<&SourceFile> {
        self.files.get(id.as_raw() as usize)
    }

    /// Resolves a span to line/column numbers, or `None` for dummy or
    /// foreign spans.
    pub fn resolve_span(&self, span: Span) -> Option<Location> {
        let file = self.get_file(span.file)?;
        let (line, column) = file.line_col(span.start);
        let (end_line, end_column) = file.line_col(span.end.max(span.start));
        Some(Location {
            name: file.name.clone(),
            line,
            column,
            end_line,
            end_column,
        })
    }

    /// The text under a span.
    pub fn snippet(&self, span: Span) -> &str {
        self.get_file(span.file)
            .map(|f| f.snippet(span.start, span.end))
            .unwrap_or_default()
    }

    /// Number of registered texts.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
