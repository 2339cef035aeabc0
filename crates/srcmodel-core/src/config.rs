//! Configuration for parsing limits and language detection.
//!
//! Load order: `.srcmodel/config.toml` → environment variables → defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Language identifiers (canonical ids and their aliases) accepted in
/// `[languages.extensions]`.
pub const KNOWN_LANGUAGES: &[&str] = &[
    "python",
    "py",
    "java",
    "typescript",
    "ts",
    "tsx",
    "javascript",
    "js",
    "jsx",
    "go",
    "golang",
    "rust",
    "rs",
    "csharp",
    "c#",
    "cs",
    "php",
];

/// Top-level srcmodel configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SrcModelConfig {
    pub parser: ParserConfig,
    pub languages: LanguagesConfig,
}

/// Per-file parsing limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Files larger than this are reported as unreadable instead of parsed.
    pub max_file_bytes: u64,
    /// Fraction of the source that may sit inside ERROR/MISSING nodes before
    /// the whole file is rejected. Unset means each language's own default.
    pub max_error_ratio: Option<f64>,
}

/// Language detection overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguagesConfig {
    /// Extension (without the dot) -> language id. Consulted before the
    /// built-in extension table.
    ///
    /// Example:
    /// [languages.extensions]
    /// pyw = "python"
    pub extensions: BTreeMap<String, String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: 2 * 1024 * 1024,
            max_error_ratio: None,
        }
    }
}

/// Helper to parse an env var and apply it to a config field.
fn env_override<T: std::str::FromStr>(var: &str, target: &mut T) {
    if let Ok(v) = std::env::var(var)
        && let Ok(n) = v.parse()
    {
        *target = n;
    }
}

impl SrcModelConfig {
    /// Load config from `.srcmodel/config.toml` in the project root, with env var
    /// overrides. Falls back to defaults if no config file exists.
    pub fn load(project_root: &Path) -> Result<Self> {
        let config_path = project_root.join(".srcmodel").join("config.toml");

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("failed to read {}", config_path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("failed to parse {}", config_path.display()))?
        } else {
            Self::default()
        };

        env_override("SRCMODEL_MAX_FILE_BYTES", &mut config.parser.max_file_bytes);
        if let Ok(v) = std::env::var("SRCMODEL_MAX_ERROR_RATIO")
            && let Ok(ratio) = v.parse::<f64>()
        {
            config.parser.max_error_ratio = Some(ratio);
        }

        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Lowercase extension keys and language values, dropping any leading dot.
    pub fn normalize(&mut self) {
        let normalized = std::mem::take(&mut self.languages.extensions)
            .into_iter()
            .map(|(ext, lang)| {
                (
                    ext.trim_start_matches('.').to_lowercase(),
                    lang.trim().to_lowercase(),
                )
            })
            .collect();
        self.languages.extensions = normalized;
    }

    pub fn validate(&self) -> Result<()> {
        if self.parser.max_file_bytes == 0 {
            anyhow::bail!("max_file_bytes must be greater than zero");
        }
        if let Some(ratio) = self.parser.max_error_ratio
            && !(ratio > 0.0 && ratio <= 1.0)
        {
            anyhow::bail!("max_error_ratio ({ratio}) must be in the range (0, 1]");
        }
        for (ext, lang) in &self.languages.extensions {
            if !KNOWN_LANGUAGES.contains(&lang.as_str()) {
                anyhow::bail!("extension override .{ext} names unsupported language '{lang}'");
            }
        }
        Ok(())
    }
}
