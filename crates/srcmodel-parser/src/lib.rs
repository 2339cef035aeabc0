//! Tree-sitter based source-model extraction for Python, Java, TypeScript,
//! JavaScript, Go, Rust, C# and PHP.
//!
//! [`parse`] reads one file, picks the language, builds a syntax tree with a
//! lazily loaded grammar ([`registry`]), rejects trees that are mostly errors
//! ([`recovery`]), extracts symbols, imports, inheritance edges and call
//! sites ([`extract`]), and qualifies references against the file's own
//! imports ([`resolve`]).

pub mod engine;
pub mod extract;
pub mod languages;
pub mod recovery;
pub mod registry;
pub mod resolve;
pub mod treesitter;

use std::path::Path;

use srcmodel_core::ParseResult;

pub use engine::SourceParser;
pub use languages::Language;
pub use registry::{Builder, get_builder};

/// Parse one file with default configuration.
pub fn parse(path: impl AsRef<Path>, language_override: Option<&str>) -> ParseResult {
    SourceParser::default().parse(path, language_override)
}

/// Parse many files in parallel with default configuration. Output order
/// matches `paths`.
pub fn parse_many<P>(paths: &[P]) -> Vec<ParseResult>
where
    P: AsRef<Path> + Sync,
{
    SourceParser::default().parse_many(paths)
}
