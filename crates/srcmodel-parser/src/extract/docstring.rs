//! Reduce structured comments and docstrings to a summary.
//!
//! The summary is the first prose paragraph. Tag lines (`@param`, `:returns:`,
//! `Args:`, `# Examples`, `<param>`) end the paragraph. When a comment holds
//! nothing but tags, the first tag that carries a description is kept, then
//! the first body line under a section header, and failing that the first
//! non-empty line, so a non-empty comment never reduces to nothing.

use regex::Regex;
use std::sync::LazyLock;

static XML_SUMMARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<summary>(.*?)</summary>").unwrap());
static XML_SEE_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<(?:see|paramref|typeparamref)\s+(?:cref|name)="([^"]*)"\s*/>"#).unwrap());
static XML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"</?[A-Za-z][^>]*>").unwrap());

const SECTION_HEADERS: &[&str] = &[
    "Args:",
    "Arguments:",
    "Attributes:",
    "Example:",
    "Examples:",
    "Keyword Args:",
    "Keyword Arguments:",
    "Note:",
    "Notes:",
    "Parameters:",
    "Raises:",
    "Return:",
    "Returns:",
    "See Also:",
    "Todo:",
    "Warning:",
    "Warns:",
    "Yields:",
];

/// `/** ... */`, `/*! ... */` and plain block comments.
pub fn from_block_comment(text: &str) -> Option<String> {
    let body = text
        .trim()
        .trim_start_matches("/**")
        .trim_start_matches("/*!")
        .trim_start_matches("/*")
        .trim_end_matches("*/");
    let lines: Vec<String> = body
        .lines()
        .map(|line| {
            let line = line.trim_start();
            let line = line.strip_prefix('*').unwrap_or(line);
            line.strip_prefix(' ').unwrap_or(line).trim_end().to_string()
        })
        .collect();
    summarize(&lines)
}

/// Consecutive `///`, `//!` or `//` line comments, one entry per line.
pub fn from_line_comments<S: AsRef<str>>(lines: &[S]) -> Option<String> {
    summarize(&strip_line_markers(lines))
}

/// C# `///` XML documentation.
pub fn from_xml_doc<S: AsRef<str>>(lines: &[S]) -> Option<String> {
    let joined = strip_line_markers(lines).join("\n");
    let joined = XML_SEE_REF.replace_all(&joined, "$1");

    if let Some(summary) = XML_SUMMARY
        .captures(&joined)
        .and_then(|caps| caps.get(1))
    {
        let lines: Vec<String> = summary
            .as_str()
            .lines()
            .map(|l| XML_TAG.replace_all(l, "").trim().to_string())
            .collect();
        if let Some(text) = summarize(&lines) {
            return Some(text);
        }
    }

    let lines: Vec<String> = joined.lines().map(|l| l.trim().to_string()).collect();
    summarize(&lines).map(|text| XML_TAG.replace_all(&text, "").trim().to_string())
}

/// A Python string literal used as a docstring, quotes and prefix included.
pub fn from_python_string(literal: &str) -> Option<String> {
    let text = literal.trim_start_matches(|c: char| "rRuUbBfF".contains(c));
    let inner = ["\"\"\"", "'''", "\"", "'"].iter().find_map(|quote| {
        text.strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
    })?;
    summarize(&clean_indentation(inner))
}

/// Remove the common leading indentation from every line after the first.
fn clean_indentation(text: &str) -> Vec<String> {
    let mut lines = text.lines();
    let first = lines.next().unwrap_or_default().trim().to_string();
    let rest: Vec<&str> = lines.collect();
    let indent = rest
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    let mut out = vec![first];
    out.extend(rest.iter().map(|l| {
        l.get(indent..)
            .map_or_else(|| l.trim().to_string(), |s| s.trim_end().to_string())
    }));
    out
}

fn strip_line_markers<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    lines
        .iter()
        .flat_map(|chunk| chunk.as_ref().lines().map(str::to_string).collect::<Vec<_>>())
        .map(|line| {
            let line = line.trim_start();
            let line = line
                .strip_prefix("///")
                .or_else(|| line.strip_prefix("//!"))
                .or_else(|| line.strip_prefix("//"))
                .or_else(|| line.strip_prefix('#'))
                .unwrap_or(line);
            line.strip_prefix(' ').unwrap_or(line).trim_end().to_string()
        })
        .collect()
}

/// Reduce cleaned comment lines to their summary.
pub fn summarize<S: AsRef<str>>(lines: &[S]) -> Option<String> {
    let lines: Vec<&str> = lines.iter().map(|l| l.as_ref().trim()).collect();

    let mut paragraph: Vec<&str> = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if line.is_empty() {
            if paragraph.is_empty() {
                continue;
            }
            break;
        }
        if is_underline(line) {
            // numpydoc: the previous line was a section title
            paragraph.pop();
            break;
        }
        if is_tag_line(line) || lines.get(i + 1).is_some_and(|next| is_underline(next)) {
            break;
        }
        paragraph.push(line);
    }
    if !paragraph.is_empty() {
        return Some(paragraph.join("\n"));
    }

    let is_title = |i: usize| lines.get(i + 1).is_some_and(|next| is_underline(next));
    lines
        .iter()
        .find(|line| is_tag_line(line) && tag_has_description(line))
        .or_else(|| {
            // body text under a section header, e.g. `x: int` below `Args:`
            lines
                .iter()
                .enumerate()
                .find(|(i, line)| {
                    !line.is_empty() && !is_underline(line) && !is_tag_line(line) && !is_title(*i)
                })
                .map(|(_, line)| line)
        })
        .or_else(|| lines.iter().find(|line| !line.is_empty()))
        .map(|line| (*line).to_string())
}

fn is_underline(line: &str) -> bool {
    line.len() >= 3 && line.chars().all(|c| c == '-' || c == '=')
}

fn is_tag_line(line: &str) -> bool {
    if line.starts_with('@') || line.starts_with("# ") {
        return true;
    }
    if SECTION_HEADERS.contains(&line) {
        return true;
    }
    if let Some(rest) = line.strip_prefix(':') {
        return rest.split_whitespace().next().is_some_and(|word| {
            matches!(
                word.trim_end_matches(':'),
                "param" | "parameter" | "arg" | "argument" | "key" | "keyword" | "type"
                    | "raises" | "raise" | "except" | "exception" | "return" | "returns"
                    | "rtype" | "yield" | "yields" | "var" | "ivar" | "cvar" | "vartype"
                    | "meta"
            )
        });
    }
    let lower = line.to_ascii_lowercase();
    [
        "<param", "<returns", "<exception", "<remarks", "<example", "<typeparam",
        "<value", "<seealso", "<inheritdoc",
    ]
    .iter()
    .any(|tag| lower.starts_with(tag))
}

/// Whether a tag line carries prose beyond the tag and its subject.
fn tag_has_description(line: &str) -> bool {
    if line.starts_with('<') {
        return !XML_TAG.replace_all(line, "").trim().is_empty();
    }
    if let Some(rest) = line.strip_prefix(':') {
        // `:param name: text`
        return rest
            .split_once(':')
            .is_some_and(|(_, desc)| !desc.trim().is_empty());
    }
    if line.starts_with("# ") || SECTION_HEADERS.contains(&line) {
        return false;
    }
    let mut words = line.split_whitespace();
    let tag = words.next().unwrap_or_default();
    let takes_subject = matches!(
        tag,
        "@param" | "@arg" | "@argument" | "@throws" | "@exception" | "@typeparam" | "@property"
            | "@var"
    );
    if takes_subject {
        words.next();
    }
    words.next().is_some()
}
