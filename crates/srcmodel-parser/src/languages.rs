//! Language detection and tree-sitter grammar lookup.

use std::path::Path;

/// Every language the engine can extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Language {
    Python,
    Java,
    TypeScript,
    Tsx,
    JavaScript,
    Go,
    Rust,
    CSharp,
    Php,
}

impl Language {
    pub const ALL: [Self; 9] = [
        Self::Python,
        Self::Java,
        Self::TypeScript,
        Self::Tsx,
        Self::JavaScript,
        Self::Go,
        Self::Rust,
        Self::CSharp,
        Self::Php,
    ];

    /// Canonical identifier, as reported in `ParseResult::language`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::Java => "java",
            Self::TypeScript => "typescript",
            Self::Tsx => "tsx",
            Self::JavaScript => "javascript",
            Self::Go => "go",
            Self::Rust => "rust",
            Self::CSharp => "csharp",
            Self::Php => "php",
        }
    }

    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Python => &["py"],
            Self::TypeScript => &["ts"],
            Self::JavaScript => &["js", "jsx"],
            Self::Go => &["golang"],
            Self::Rust => &["rs"],
            Self::CSharp => &["c#", "cs"],
            Self::Java | Self::Tsx | Self::Php => &[],
        }
    }

    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Python => &["py", "pyi"],
            Self::Java => &["java"],
            Self::TypeScript => &["ts", "mts", "cts"],
            Self::Tsx => &["tsx"],
            Self::JavaScript => &["js", "jsx", "mjs", "cjs"],
            Self::Go => &["go"],
            Self::Rust => &["rs"],
            Self::CSharp => &["cs"],
            Self::Php => &["php"],
        }
    }

    /// Look up a language by canonical id or alias, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|lang| lang.name() == name || lang.aliases().contains(&name.as_str()))
    }

    /// Look up a language by file extension (without the dot), case-insensitively.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim_start_matches('.').to_lowercase();
        Self::ALL
            .into_iter()
            .find(|lang| lang.extensions().contains(&ext.as_str()))
    }

    /// Detect a language from a file path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// The tree-sitter grammar for this language.
    pub fn ts_language(self) -> tree_sitter::Language {
        match self {
            Self::Python => tree_sitter_python::LANGUAGE.into(),
            Self::Java => tree_sitter_java::LANGUAGE.into(),
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Self::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            Self::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Self::Go => tree_sitter_go::LANGUAGE.into(),
            Self::Rust => tree_sitter_rust::LANGUAGE.into(),
            Self::CSharp => tree_sitter_c_sharp::LANGUAGE.into(),
            Self::Php => tree_sitter_php::LANGUAGE_PHP.into(),
        }
    }

    /// Fraction of a file that may sit inside ERROR/MISSING nodes before the
    /// file is rejected as a whole.
    pub fn default_error_ratio(self) -> f64 {
        match self {
            // An indentation error swallows everything after it.
            Self::Python => 0.3,
            _ => 0.5,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
