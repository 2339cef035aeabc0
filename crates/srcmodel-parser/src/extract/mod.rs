//! Per-language extractors.
//!
//! Every extractor has the same shape, [`ExtractFn`]: it walks one syntax
//! tree and returns symbols, imports, and inheritance/call references exactly
//! as written in source. Qualifying those references against the file's
//! imports is [`crate::resolve`]'s job.

pub mod docstring;
pub(crate) mod helpers;

mod csharp;
mod go;
mod java;
mod php;
mod python;
mod rust;
mod typescript;

use srcmodel_core::{Call, Import, Inheritance, Symbol};

use crate::languages::Language;

/// Raw per-file extraction output, before name resolution.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub symbols: Vec<Symbol>,
    pub imports: Vec<Import>,
    /// Parents are unqualified, as written (type arguments removed).
    pub inheritances: Vec<Inheritance>,
    /// Callees are unqualified, as written.
    pub calls: Vec<Call>,
    pub module_docstring: Option<String>,
    pub namespace: String,
}

/// The extractor contract shared by all languages.
pub type ExtractFn = fn(&tree_sitter::Tree, &str) -> Extraction;

/// Look up the extractor for a language.
pub fn extractor_for(language: Language) -> ExtractFn {
    match language {
        Language::Python => python::extract,
        Language::Java => java::extract,
        Language::TypeScript | Language::Tsx | Language::JavaScript => typescript::extract,
        Language::Go => go::extract,
        Language::Rust => rust::extract,
        Language::CSharp => csharp::extract,
        Language::Php => php::extract,
    }
}
