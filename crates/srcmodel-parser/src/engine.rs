//! Single-file and batch parse entry points.
//!
//! Every path through here ends in a [`ParseResult`]: failures are rendered
//! into `ParseResult::error` with empty entity lists, never returned as `Err`.

use std::path::Path;

use rayon::prelude::*;
use srcmodel_core::ParseError;
use srcmodel_core::ParseResult;
use srcmodel_core::config::SrcModelConfig;

use crate::extract::Extraction;
use crate::languages::Language;
use crate::{recovery, registry, resolve};

/// Parses files into [`ParseResult`]s under one configuration.
///
/// Holds no per-file state; one instance can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct SourceParser {
    config: SrcModelConfig,
}

impl SourceParser {
    pub fn new(config: SrcModelConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SrcModelConfig {
        &self.config
    }

    /// Language for `path`: the explicit override if given, else the
    /// configured extension table, else the built-in one.
    pub fn detect_language(
        &self,
        path: &Path,
        language_override: Option<&str>,
    ) -> Result<Language, ParseError> {
        if let Some(id) = language_override {
            return Language::from_name(id).ok_or_else(|| {
                tracing::warn!("unknown language override '{}' for {}", id, path.display());
                ParseError::UnsupportedLanguage(id.to_string())
            });
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        if let Some(id) = self.config.languages.extensions.get(&ext) {
            return Language::from_name(id)
                .ok_or_else(|| ParseError::UnsupportedLanguage(id.clone()));
        }
        Language::from_extension(&ext).ok_or_else(|| {
            ParseError::UnsupportedLanguage(if ext.is_empty() {
                format!("no extension on {}", path.display())
            } else {
                format!(".{ext}")
            })
        })
    }

    /// Read and parse one file.
    pub fn parse(&self, path: impl AsRef<Path>, language_override: Option<&str>) -> ParseResult {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let language = match self.detect_language(path, language_override) {
            Ok(language) => language,
            Err(e) => return ParseResult::failed(path_str, "", &e),
        };
        match self.read_source(path) {
            Ok(source) => self.parse_with(path_str, language, &source),
            Err(e) => {
                tracing::warn!("skipping {}: {}", path_str, e);
                ParseResult::failed(path_str, language.name(), &e)
            }
        }
    }

    /// Parse source text the caller already holds. `path` is only recorded.
    pub fn parse_source(&self, path: &str, source: &str, language_id: &str) -> ParseResult {
        let Some(language) = Language::from_name(language_id) else {
            let e = ParseError::UnsupportedLanguage(language_id.to_string());
            return ParseResult::failed(path, "", &e);
        };
        let limit = self.config.parser.max_file_bytes;
        if source.len() as u64 > limit {
            let e = ParseError::TooLarge {
                size: source.len() as u64,
                limit,
            };
            return ParseResult::failed(path, language.name(), &e);
        }
        let source = source.strip_prefix('\u{feff}').unwrap_or(source);
        self.parse_with(path.to_string(), language, source)
    }

    /// Parse many files in parallel. Output order matches `paths`.
    pub fn parse_many<P>(&self, paths: &[P]) -> Vec<ParseResult>
    where
        P: AsRef<Path> + Sync,
    {
        paths.par_iter().map(|p| self.parse(p, None)).collect()
    }

    fn read_source(&self, path: &Path) -> Result<String, ParseError> {
        let path_str = path.display().to_string();
        let meta = std::fs::metadata(path).map_err(|e| ParseError::unreadable(&path_str, e))?;
        if !meta.is_file() {
            return Err(ParseError::unreadable(path_str, "not a regular file"));
        }
        let limit = self.config.parser.max_file_bytes;
        if meta.len() > limit {
            return Err(ParseError::TooLarge {
                size: meta.len(),
                limit,
            });
        }
        let bytes = std::fs::read(path).map_err(|e| ParseError::unreadable(&path_str, e))?;
        let mut source = String::from_utf8(bytes).map_err(|e| ParseError::NotUtf8 {
            offset: e.utf8_error().valid_up_to(),
        })?;
        if source.starts_with('\u{feff}') {
            source.remove(0);
        }
        Ok(source)
    }

    fn parse_with(&self, path: String, language: Language, source: &str) -> ParseResult {
        match self.extract(language, source) {
            Ok(extraction) => {
                let mut result = ParseResult::new(path, language.name());
                result.symbols = extraction.symbols;
                result.imports = extraction.imports;
                result.inheritances = extraction.inheritances;
                result.calls = extraction.calls;
                result.module_docstring = extraction.module_docstring;
                result.namespace = extraction.namespace;
                result.file_lines = source.lines().count();
                tracing::debug!("parsed {} ({}): {}", result.path, language, result.stats());
                result
            }
            Err(e) => {
                tracing::warn!("rejected {}: {}", path, e);
                ParseResult::failed(path, language.name(), &e)
            }
        }
    }

    fn extract(&self, language: Language, source: &str) -> Result<Extraction, ParseError> {
        let builder = registry::builder_for(language)?;
        let tree = builder.build_tree(source)?;
        let ratio = self
            .config
            .parser
            .max_error_ratio
            .unwrap_or_else(|| language.default_error_ratio());
        let damage = recovery::assess(&tree, source, ratio)?;
        if !damage.is_clean() {
            tracing::debug!(
                "{} error nodes and {} missing nodes skipped",
                damage.error_nodes,
                damage.missing_nodes
            );
        }

        let mut extraction = builder.extract(&tree, source);
        resolve::resolve_extraction(language, &mut extraction);
        Ok(extraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_language_prefers_override_then_config() {
        let mut config = SrcModelConfig::default();
        config
            .languages
            .extensions
            .insert("pyw".into(), "python".into());
        let parser = SourceParser::new(config);

        let path = Path::new("tool.pyw");
        assert_eq!(parser.detect_language(path, None), Ok(Language::Python));
        assert_eq!(
            parser.detect_language(Path::new("a.txt"), Some("Java")),
            Ok(Language::Java)
        );
        assert_eq!(
            parser.detect_language(Path::new("Main.JAVA"), None),
            Ok(Language::Java)
        );
        assert!(matches!(
            parser.detect_language(Path::new("README"), None),
            Err(ParseError::UnsupportedLanguage(_))
        ));
        assert!(matches!(
            parser.detect_language(path, Some("cobol")),
            Err(ParseError::UnsupportedLanguage(id)) if id == "cobol"
        ));
    }

    #[test]
    fn test_parse_source_strips_bom_and_counts_lines() {
        let parser = SourceParser::default();
        let result = parser.parse_source("a.py", "\u{feff}def f():\n    pass\n", "python");
        assert!(result.is_ok());
        assert_eq!(result.file_lines, 2);
        assert_eq!(result.symbols[0].name, "f");
        assert_eq!(result.symbols[0].line_start, 1);
    }

    #[test]
    fn test_parse_source_enforces_size_limit() {
        let mut config = SrcModelConfig::default();
        config.parser.max_file_bytes = 8;
        let parser = SourceParser::new(config);
        let result = parser.parse_source("big.py", "x = 1\ny = 2\n", "python");
        assert!(!result.is_ok());
        assert!(result.symbols.is_empty());
        assert_eq!(result.language, "python");
    }
}
