//! Tree and text utilities shared by the language extractors.

use std::collections::{BTreeMap, HashSet};

use srcmodel_core::{Call, CallType, Inheritance, MODULE_SCOPE, Symbol, SymbolKind};
use tree_sitter::Node;

use super::Extraction;
use crate::treesitter::walk_preorder;

/// What kind of declaration a walker is currently inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Module,
    Type,
    Routine,
}

/// A routine (function, method, constructor or property body) that can
/// contain call sites.
#[derive(Debug, Clone)]
pub struct FunctionScope {
    pub name: String,
    pub start_byte: usize,
    pub end_byte: usize,
}

/// Find the innermost scope containing `byte`.
pub fn find_enclosing_scope(scopes: &[FunctionScope], byte: usize) -> Option<&str> {
    scopes
        .iter()
        .filter(|s| byte >= s.start_byte && byte < s.end_byte)
        .min_by_key(|s| s.end_byte - s.start_byte)
        .map(|s| s.name.as_str())
}

/// One call-like expression found by a language's call matcher.
#[derive(Debug, Clone)]
pub struct CallSite {
    pub callee: Option<String>,
    pub call_type: CallType,
    pub arguments: usize,
}

impl CallSite {
    pub fn new(callee: impl Into<String>, call_type: CallType, arguments: usize) -> Self {
        Self {
            callee: Some(callee.into()),
            call_type,
            arguments,
        }
    }

    pub fn dynamic(arguments: usize) -> Self {
        Self {
            callee: None,
            call_type: CallType::Dynamic,
            arguments,
        }
    }
}

/// Matches a node against a language's call shapes.
pub type CallMatcher = fn(&Collector<'_>, Node<'_>) -> Option<CallSite>;

/// Accumulates one file's entities while an extractor walks the tree.
pub struct Collector<'a> {
    pub source: &'a str,
    pub out: Extraction,
    /// Local names bound to whole modules/packages, used to tell
    /// `module.func()` apart from `object.method()`.
    pub module_aliases: HashSet<String>,
    scopes: Vec<FunctionScope>,
}

impl<'a> Collector<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            out: Extraction::default(),
            module_aliases: HashSet::new(),
            scopes: Vec::new(),
        }
    }

    pub fn text(&self, node: Node<'_>) -> &'a str {
        &self.source[node.byte_range()]
    }

    /// Record a symbol whose source span is `span`. Kinds that can hold call
    /// sites also become caller scopes.
    pub fn push(&mut self, span: Node<'_>, symbol: Symbol) {
        if symbol.kind.is_caller() {
            self.scopes.push(FunctionScope {
                name: symbol.name.clone(),
                start_byte: span.start_byte(),
                end_byte: span.end_byte(),
            });
        }
        self.out.symbols.push(symbol);
    }

    /// Record a raw `child → parent` reference. Type arguments are dropped.
    pub fn push_inheritance(&mut self, child: &str, parent: &str) {
        let parent = strip_type_arguments(parent);
        let parent = parent.trim();
        if parent.is_empty() || child.is_empty() {
            return;
        }
        self.out.inheritances.push(Inheritance {
            child: child.to_string(),
            parent: parent.to_string(),
        });
    }

    pub fn push_call(&mut self, node: Node<'_>, site: CallSite) {
        let caller = find_enclosing_scope(&self.scopes, node.start_byte())
            .unwrap_or(MODULE_SCOPE)
            .to_string();
        self.out.calls.push(Call {
            caller,
            callee: site.callee.filter(|c| !c.is_empty()),
            line_number: node.start_position().row + 1,
            call_type: site.call_type,
            arguments_count: site.arguments,
        });
    }

    /// Walk the whole tree in source order, recording every call `matcher`
    /// recognizes. ERROR subtrees are skipped.
    pub fn collect_calls(&mut self, root: Node<'_>, matcher: CallMatcher) {
        walk_preorder(root, |node, _| {
            if node.is_error() {
                return false;
            }
            if let Some(site) = matcher(self, node) {
                self.push_call(node, site);
            }
            true
        });
    }

    /// Signature text from `start` up to `end`, whitespace collapsed.
    pub fn header(&self, start: usize, end: usize) -> String {
        let end = end.max(start).min(self.source.len());
        collapse_whitespace(self.source.get(start..end).unwrap_or_default())
    }

    /// Row of the last line a node's text occupies. Some grammars include the
    /// trailing newline of line comments in the node.
    pub fn last_row(&self, node: Node<'_>) -> usize {
        let end = node.end_position();
        if end.column == 0 && end.row > node.start_position().row {
            end.row - 1
        } else {
            end.row
        }
    }

    /// Contiguous comments directly above `node` that satisfy `is_doc`, in
    /// source order. Siblings whose kind is in `skip` (attributes) are stepped
    /// over.
    pub fn doc_comments_before<'t>(
        &self,
        node: Node<'t>,
        is_doc: fn(&str) -> bool,
        skip: &[&str],
    ) -> Vec<Node<'t>> {
        let mut comments = Vec::new();
        let mut next_row = node.start_position().row;
        let mut sibling = node.prev_sibling();
        while let Some(s) = sibling {
            if skip.contains(&s.kind()) {
                next_row = s.start_position().row;
            } else if s.kind().contains("comment") && is_doc(self.text(s)) {
                if self.last_row(s) + 1 < next_row {
                    break;
                }
                next_row = s.start_position().row;
                comments.push(s);
            } else {
                break;
            }
            sibling = s.prev_sibling();
        }
        comments.reverse();
        comments
    }

    /// Doc comments at the very top of `root` that belong to the file rather
    /// than to its first declaration: followed by nothing, by a statement of
    /// a kind in `header_kinds`, or by a blank line.
    pub fn leading_doc_comments<'t>(
        &self,
        root: Node<'t>,
        is_doc: fn(&str) -> bool,
        preamble: &[&str],
        header_kinds: &[&str],
    ) -> Vec<Node<'t>> {
        let mut cursor = root.walk();
        let mut comments: Vec<Node<'t>> = Vec::new();
        let mut following = None;
        for child in root.children(&mut cursor) {
            if preamble.contains(&child.kind()) {
                continue;
            }
            if child.kind().contains("comment") {
                if !is_doc(self.text(child)) {
                    if comments.is_empty() {
                        continue;
                    }
                    following = Some(child);
                    break;
                }
                if let Some(prev) = comments.last()
                    && self.last_row(*prev) + 1 < child.start_position().row
                {
                    following = Some(child);
                    break;
                }
                comments.push(child);
                continue;
            }
            following = Some(child);
            break;
        }
        let Some(last) = comments.last() else {
            return comments;
        };
        match following {
            None => comments,
            Some(next)
                if header_kinds.contains(&next.kind())
                    || next.kind().contains("comment")
                    || next.start_position().row > self.last_row(*last) + 1 =>
            {
                comments
            }
            Some(_) => Vec::new(),
        }
    }
}

/// Build a symbol spanning `span`, with no docstring or annotations yet.
pub fn new_symbol(span: Node<'_>, name: String, kind: SymbolKind, signature: String) -> Symbol {
    Symbol {
        name,
        kind,
        signature,
        docstring: None,
        line_start: span.start_position().row + 1,
        line_end: span.end_position().row + 1,
        annotations: Vec::new(),
    }
}

/// Join an enclosing declaration path and a leaf name with dots.
pub fn qualify(scope: &[String], name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", scope.join("."), name)
    }
}

/// Extend an enclosing declaration path by one level.
pub fn nested(scope: &[String], name: &str) -> Vec<String> {
    let mut inner = scope.to_vec();
    inner.push(name.to_string());
    inner
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// End byte of the last child whose kind is in `kinds`, if such children lead
/// the node (decorators, attributes). Otherwise the node's own start.
pub fn start_after_leading(node: Node<'_>, kinds: &[&str]) -> usize {
    let mut start = node.start_byte();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if kinds.contains(&child.kind()) {
            start = child.end_byte();
        } else if !child.kind().contains("comment") {
            break;
        }
    }
    start
}

/// First direct child of `node` with kind `kind`.
pub fn child_of_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).find(|c| c.kind() == kind)
}

pub fn has_child_kind(node: Node<'_>, kind: &str) -> bool {
    child_of_kind(node, kind).is_some()
}

/// Number of arguments in an argument-list node.
pub fn count_arguments(arguments: Option<Node<'_>>) -> usize {
    arguments.map_or(0, |args| {
        let mut cursor = args.walk();
        args.named_children(&mut cursor)
            .filter(|c| !c.kind().contains("comment"))
            .count()
    })
}

/// Remove every bracketed type-argument list: `Box<T>` → `Box`,
/// `Generic[T]` → `Generic`.
pub fn strip_type_arguments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut depth = 0usize;
    for ch in text.chars() {
        match ch {
            '<' | '[' => depth += 1,
            '>' | ']' if depth > 0 => depth -= 1,
            _ if depth == 0 => out.push(ch),
            _ => {}
        }
    }
    out.trim().to_string()
}

/// Split `text` on `sep` where it is not nested in brackets or quotes.
/// Angle brackets count as nesting only when `angles` is set.
pub fn split_top_level(text: &str, sep: char, angles: bool) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;
    for (i, ch) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' | '`' => quote = Some(ch),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            '<' if angles => depth += 1,
            '>' if angles => depth -= 1,
            c if c == sep && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + ch.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Strip the quotes of a plain string literal.
pub fn unquote(text: &str) -> String {
    let text = text.trim();
    for q in ['"', '\'', '`'] {
        if text.len() >= 2
            && let Some(inner) = text.strip_prefix(q).and_then(|t| t.strip_suffix(q))
        {
            return inner.to_string();
        }
    }
    text.to_string()
}

/// `name = value` or `name: value`, but not `==`, `=>` or `::`.
fn named_argument(arg: &str) -> Option<(&str, &str)> {
    let ident_len = arg
        .char_indices()
        .take_while(|(i, c)| c.is_alphanumeric() || *c == '_' || (*c == '$' && *i == 0))
        .map(|(i, c)| i + c.len_utf8())
        .last()?;
    let name = &arg[..ident_len];
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    let rest = arg[ident_len..].trim_start();
    let value = if let Some(v) = rest.strip_prefix('=') {
        if v.starts_with('=') || v.starts_with('>') {
            return None;
        }
        v
    } else if let Some(v) = rest.strip_prefix(':') {
        if v.starts_with(':') {
            return None;
        }
        v
    } else {
        return None;
    };
    Some((name, value.trim()))
}

/// Parse an annotation/decorator argument list (parentheses optional).
///
/// Named arguments keep their name, positional ones are keyed `"0"`, `"1"`,
/// ... in order. When `single_key` is given and the list is exactly one
/// positional argument, that argument is keyed `single_key` instead.
pub fn parse_arguments(text: &str, single_key: Option<&str>) -> BTreeMap<String, String> {
    let text = text.trim();
    let inner = text
        .strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .unwrap_or(text);

    let mut arguments = BTreeMap::new();
    let mut positional = 0usize;
    let mut named = 0usize;
    for arg in split_top_level(inner, ',', false) {
        let arg = arg.trim();
        if arg.is_empty() {
            continue;
        }
        if let Some((name, value)) = named_argument(arg) {
            arguments.insert(name.to_string(), unquote(value));
            named += 1;
        } else {
            arguments.insert(positional.to_string(), unquote(arg));
            positional += 1;
        }
    }
    if let Some(key) = single_key
        && positional == 1
        && named == 0
        && let Some(value) = arguments.remove("0")
    {
        arguments.insert(key.to_string(), value);
    }
    arguments
}

/// Call type for `receiver.member(...)` given the receiver text.
pub fn member_call_type(receiver: &str, self_keywords: &[&str]) -> CallType {
    let receiver = receiver
        .trim_end_matches('?')
        .trim_end_matches("()")
        .trim_end_matches('!');
    let last = receiver
        .rsplit(['.', ':', '>', '\\'])
        .next()
        .unwrap_or(receiver)
        .trim_start_matches('$');
    if self_keywords.contains(&receiver) || self_keywords.contains(&last) {
        CallType::Method
    } else if last.starts_with(|c: char| c.is_uppercase()) {
        CallType::StaticMethod
    } else {
        CallType::Method
    }
}

/// Leading segment of a dotted receiver (`os.path` → `os`).
pub fn receiver_head(receiver: &str) -> &str {
    receiver.split(['.', ':']).next().unwrap_or(receiver)
}
