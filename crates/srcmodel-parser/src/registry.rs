//! Lazy, process-wide cache of per-language tree builders.
//!
//! A grammar is loaded the first time a file of that language is parsed and
//! reused for every later file. Each language has its own once-cell, so
//! concurrent first requests for one language block only on that language's
//! load, and a failed load is remembered rather than retried per file.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock, OnceLock};

use srcmodel_core::ParseError;

use crate::extract::{self, ExtractFn, Extraction};
use crate::languages::Language;
use crate::treesitter;

/// A loaded grammar paired with its extractor. Holds no per-parse state, so
/// one instance serves any number of threads.
pub struct Builder {
    language: Language,
    grammar: tree_sitter::Language,
    extract: ExtractFn,
}

impl Builder {
    fn load(language: Language) -> Result<Self, ParseError> {
        let grammar = language.ts_language();
        // Reject ABI-incompatible grammars once, at load time.
        let mut check = tree_sitter::Parser::new();
        check
            .set_language(&grammar)
            .map_err(|e| ParseError::GrammarUnavailable {
                language: language.name().to_string(),
                reason: e.to_string(),
            })?;
        tracing::debug!("loaded {} grammar", language);
        Ok(Self {
            language,
            grammar,
            extract: extract::extractor_for(language),
        })
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Build a fresh syntax tree for `source`.
    pub fn build_tree(&self, source: &str) -> Result<tree_sitter::Tree, ParseError> {
        treesitter::parse_source(&self.grammar, self.language.name(), source)
    }

    /// Run this language's extractor over a tree built from `source`.
    pub fn extract(&self, tree: &tree_sitter::Tree, source: &str) -> Extraction {
        (self.extract)(tree, source)
    }
}

impl std::fmt::Debug for Builder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builder")
            .field("language", &self.language)
            .finish_non_exhaustive()
    }
}

type Slot = OnceLock<Result<Arc<Builder>, ParseError>>;

static REGISTRY: LazyLock<HashMap<Language, Slot>> = LazyLock::new(|| {
    Language::ALL
        .into_iter()
        .map(|language| (language, OnceLock::new()))
        .collect()
});

/// The builder for `language`, loading its grammar on first use.
pub fn builder_for(language: Language) -> Result<Arc<Builder>, ParseError> {
    let Some(slot) = REGISTRY.get(&language) else {
        return Err(ParseError::UnsupportedLanguage(language.name().to_string()));
    };
    slot.get_or_init(|| Builder::load(language).map(Arc::new))
        .clone()
}

/// Look up a builder by language id or alias. Unknown ids, and languages
/// whose grammar failed to load, yield `None`.
pub fn get_builder(language_id: &str) -> Option<Arc<Builder>> {
    let language = Language::from_name(language_id)?;
    builder_for(language).ok()
}

/// Languages whose grammar has been loaded so far in this process.
pub fn loaded_languages() -> Vec<Language> {
    Language::ALL
        .into_iter()
        .filter(|language| {
            REGISTRY
                .get(language)
                .and_then(OnceLock::get)
                .is_some_and(Result::is_ok)
        })
        .collect()
}
