//! Source text ownership and position tracking.
//!
//! Every compilation or simulation call registers its input text in a
//! [`SourceDb`]. Tokens, AST nodes and diagnostics carry byte [`Span`]s into
//! that text, which the database resolves to 1-based [`Location`]s and
//! source lines for error reports.

#![warn(missing_docs)]

pub mod file_id;
pub mod location;
pub mod source_db;
pub mod source_file;
pub mod span;

pub use file_id::FileId;
pub use location::Location;
pub use source_db::SourceDb;
pub use source_file::SourceFile;
pub use span::Span;
