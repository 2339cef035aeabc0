//! File-local qualified name resolution.
//!
//! Each file's own imports are turned into an [`ImportMap`] from locally bound
//! names to the paths they were imported from. Raw references (inheritance
//! parents, call callees) are then rewritten by looking up their leading
//! segment. Nothing outside the file is consulted: the result answers "which
//! import introduced this name", not "what does the target actually declare".

use std::collections::{HashMap, HashSet};

use srcmodel_core::Import;

use crate::extract::Extraction;
use crate::languages::Language;

/// Names a language makes available without any import.
#[derive(Debug, Clone, Copy)]
pub enum Builtins {
    None,
    /// Every listed name lives directly under one root namespace.
    Prefixed {
        prefix: &'static str,
        names: &'static [&'static str],
    },
    /// Explicit `short name → qualified path` pairs.
    Table(&'static [(&'static str, &'static str)]),
}

/// Per-language resolution conventions.
#[derive(Debug, Clone, Copy)]
pub struct ResolutionRules {
    /// Receivers that denote runtime dispatch and are never rewritten.
    pub self_keywords: &'static [&'static str],
    /// Separators between a reference's head and the rest.
    pub separators: &'static [&'static str],
    /// Joins a from-style import's module and member.
    pub member_join: &'static str,
    pub builtins: Builtins,
}

const PYTHON_BUILTINS: &[&str] = &[
    "ArithmeticError",
    "AssertionError",
    "AttributeError",
    "BaseException",
    "ConnectionError",
    "DeprecationWarning",
    "Exception",
    "FileNotFoundError",
    "IOError",
    "ImportError",
    "IndexError",
    "KeyError",
    "KeyboardInterrupt",
    "LookupError",
    "NotImplementedError",
    "OSError",
    "PermissionError",
    "RuntimeError",
    "StopIteration",
    "SystemExit",
    "TimeoutError",
    "TypeError",
    "UnicodeDecodeError",
    "UserWarning",
    "ValueError",
    "Warning",
    "ZeroDivisionError",
    "abs",
    "all",
    "any",
    "bool",
    "bytearray",
    "bytes",
    "callable",
    "classmethod",
    "dict",
    "dir",
    "enumerate",
    "filter",
    "float",
    "format",
    "frozenset",
    "getattr",
    "hasattr",
    "hash",
    "id",
    "int",
    "isinstance",
    "issubclass",
    "iter",
    "len",
    "list",
    "map",
    "max",
    "min",
    "next",
    "object",
    "open",
    "print",
    "property",
    "range",
    "repr",
    "reversed",
    "round",
    "set",
    "setattr",
    "sorted",
    "staticmethod",
    "str",
    "sum",
    "tuple",
    "type",
    "vars",
    "zip",
];

const JAVA_LANG: &[&str] = &[
    "ArithmeticException",
    "ArrayIndexOutOfBoundsException",
    "AutoCloseable",
    "Boolean",
    "Byte",
    "CharSequence",
    "Character",
    "Class",
    "ClassCastException",
    "CloneNotSupportedException",
    "Cloneable",
    "Comparable",
    "Deprecated",
    "Double",
    "Enum",
    "Error",
    "Exception",
    "Float",
    "FunctionalInterface",
    "IllegalArgumentException",
    "IllegalStateException",
    "IndexOutOfBoundsException",
    "Integer",
    "InterruptedException",
    "Iterable",
    "Long",
    "Math",
    "NullPointerException",
    "Number",
    "NumberFormatException",
    "Object",
    "Override",
    "Record",
    "Runnable",
    "RuntimeException",
    "Short",
    "String",
    "StringBuffer",
    "StringBuilder",
    "SuppressWarnings",
    "System",
    "Thread",
    "Throwable",
    "UnsupportedOperationException",
    "Void",
];

const RUST_PRELUDE: &[(&str, &str)] = &[
    ("AsMut", "std::convert::AsMut"),
    ("AsRef", "std::convert::AsRef"),
    ("Box", "std::boxed::Box"),
    ("Clone", "std::clone::Clone"),
    ("Copy", "std::marker::Copy"),
    ("Default", "std::default::Default"),
    ("DoubleEndedIterator", "std::iter::DoubleEndedIterator"),
    ("Drop", "std::ops::Drop"),
    ("Eq", "std::cmp::Eq"),
    ("Err", "std::result::Result::Err"),
    ("ExactSizeIterator", "std::iter::ExactSizeIterator"),
    ("Extend", "std::iter::Extend"),
    ("Fn", "std::ops::Fn"),
    ("FnMut", "std::ops::FnMut"),
    ("FnOnce", "std::ops::FnOnce"),
    ("From", "std::convert::From"),
    ("Into", "std::convert::Into"),
    ("IntoIterator", "std::iter::IntoIterator"),
    ("Iterator", "std::iter::Iterator"),
    ("None", "std::option::Option::None"),
    ("Ok", "std::result::Result::Ok"),
    ("Option", "std::option::Option"),
    ("Ord", "std::cmp::Ord"),
    ("PartialEq", "std::cmp::PartialEq"),
    ("PartialOrd", "std::cmp::PartialOrd"),
    ("Result", "std::result::Result"),
    ("Send", "std::marker::Send"),
    ("Sized", "std::marker::Sized"),
    ("Some", "std::option::Option::Some"),
    ("String", "std::string::String"),
    ("Sync", "std::marker::Sync"),
    ("ToOwned", "std::borrow::ToOwned"),
    ("ToString", "std::string::ToString"),
    ("TryFrom", "std::convert::TryFrom"),
    ("TryInto", "std::convert::TryInto"),
    ("Unpin", "std::marker::Unpin"),
    ("Vec", "std::vec::Vec"),
    ("drop", "std::mem::drop"),
];

impl ResolutionRules {
    pub fn for_language(language: Language) -> Self {
        match language {
            Language::Python => Self {
                self_keywords: &["self", "cls", "super"],
                separators: &["."],
                member_join: ".",
                builtins: Builtins::Prefixed {
                    prefix: "builtins",
                    names: PYTHON_BUILTINS,
                },
            },
            Language::Java => Self {
                self_keywords: &["this", "super"],
                separators: &["."],
                member_join: ".",
                builtins: Builtins::Prefixed {
                    prefix: "java.lang",
                    names: JAVA_LANG,
                },
            },
            Language::TypeScript | Language::Tsx | Language::JavaScript => Self {
                self_keywords: &["this", "super"],
                separators: &["."],
                member_join: ".",
                builtins: Builtins::None,
            },
            Language::Go => Self {
                self_keywords: &[],
                separators: &["."],
                member_join: ".",
                builtins: Builtins::None,
            },
            Language::Rust => Self {
                self_keywords: &["self", "Self", "super", "crate"],
                separators: &["::", "."],
                member_join: "::",
                builtins: Builtins::Table(RUST_PRELUDE),
            },
            Language::CSharp => Self {
                self_keywords: &["this", "base"],
                separators: &["."],
                member_join: ".",
                builtins: Builtins::None,
            },
            Language::Php => Self {
                self_keywords: &["$this", "self", "static", "parent"],
                separators: &["\\", "::", "->"],
                member_join: "\\",
                builtins: Builtins::None,
            },
        }
    }

    fn builtin(&self, name: &str) -> Option<String> {
        match self.builtins {
            Builtins::None => None,
            Builtins::Prefixed { prefix, names } => names
                .contains(&name)
                .then(|| format!("{prefix}{}{name}", self.member_join)),
            Builtins::Table(table) => table
                .iter()
                .find(|(short, _)| *short == name)
                .map(|(_, full)| (*full).to_string()),
        }
    }
}

/// Guess the identifier a Go import path binds: the last path segment,
/// skipping a `vN` major-version suffix, cut at its first dot
/// (`gopkg.in/yaml.v3` → `yaml`).
pub fn go_package_name(path: &str) -> &str {
    let mut segments = path.trim_end_matches('/').rsplit('/');
    let last = segments.next().unwrap_or(path);
    let is_major_version =
        last.len() > 1 && last.starts_with('v') && last[1..].chars().all(|c| c.is_ascii_digit());
    let segment = if is_major_version {
        segments.next().unwrap_or(last)
    } else {
        last
    };
    segment.split('.').next().unwrap_or(segment)
}

/// Trailing segment of a module path, whatever its separator.
fn trailing_segment(module: &str) -> &str {
    module
        .rsplit(['.', '/', '\\', ':'])
        .find(|s| !s.is_empty())
        .unwrap_or(module)
}

/// Locally bound name → the path it was imported from.
#[derive(Debug, Clone, Default)]
pub struct ImportMap {
    bindings: HashMap<String, String>,
}

impl ImportMap {
    /// Build the map for one file. When two imports bind the same name, the
    /// later one wins.
    pub fn build(language: Language, imports: &[Import]) -> Self {
        let rules = ResolutionRules::for_language(language);
        let mut bindings = HashMap::new();
        for import in imports {
            if import.names.is_empty() {
                if let Some((key, target)) = module_binding(language, import) {
                    bindings.insert(key, target);
                }
                continue;
            }
            for name in &import.names {
                if name == "*" {
                    continue;
                }
                let key = import.alias.clone().unwrap_or_else(|| name.clone());
                let target = if import.module.is_empty() || import.module.ends_with('.') {
                    // `from . import x`
                    format!("{}{name}", import.module)
                } else {
                    format!("{}{}{name}", import.module, rules.member_join)
                };
                bindings.insert(key, target);
            }
        }
        Self { bindings }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.bindings.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// The `(local name, target)` a whole-module import binds, if any.
fn module_binding(language: Language, import: &Import) -> Option<(String, String)> {
    let module = import.module.as_str();
    if let Some(alias) = import.alias.as_deref() {
        if language == Language::Go && matches!(alias, "_" | ".") {
            return None;
        }
        return Some((alias.to_string(), module.to_string()));
    }
    match language {
        // `import a.b` binds `a`, which refers to package `a`
        Language::Python => {
            let head = module.split('.').next().unwrap_or(module);
            (!head.is_empty()).then(|| (head.to_string(), head.to_string()))
        }
        Language::TypeScript | Language::Tsx | Language::JavaScript | Language::CSharp => None,
        Language::Go => Some((go_package_name(module).to_string(), module.to_string())),
        Language::Java | Language::Rust | Language::Php => {
            let name = trailing_segment(module);
            (!name.is_empty()).then(|| (name.to_string(), module.to_string()))
        }
    }
}

/// Rewrites raw references for one file.
pub struct Resolver {
    rules: ResolutionRules,
    imports: ImportMap,
    /// Top-level names declared in the file; these shadow builtins.
    locals: HashSet<String>,
}

impl Resolver {
    pub fn new(language: Language, imports: &[Import]) -> Self {
        Self {
            rules: ResolutionRules::for_language(language),
            imports: ImportMap::build(language, imports),
            locals: HashSet::new(),
        }
    }

    #[must_use]
    pub fn with_locals<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.locals.extend(names.into_iter().map(Into::into));
        self
    }

    /// Split at the earliest separator: `(head, Some((separator, rest)))`.
    fn split<'r>(&self, reference: &'r str) -> (&'r str, Option<(&'static str, &'r str)>) {
        let earliest = self
            .rules
            .separators
            .iter()
            .filter_map(|sep| reference.find(sep).map(|pos| (pos, *sep)))
            .min_by_key(|(pos, sep)| (*pos, std::cmp::Reverse(sep.len())));
        match earliest {
            Some((pos, sep)) => (&reference[..pos], Some((sep, &reference[pos + sep.len()..]))),
            None => (reference, None),
        }
    }

    /// Qualify one raw reference. Self/instance receivers and names with no
    /// import or builtin binding come back unchanged.
    pub fn resolve(&self, reference: &str) -> String {
        let (head, tail) = self.split(reference);
        let keyword = head.trim_end_matches("()").trim_end_matches('?');
        if head.is_empty() || self.rules.self_keywords.contains(&keyword) {
            return reference.to_string();
        }

        let target = match self.imports.get(head) {
            Some(target) => target.to_string(),
            None if !self.locals.contains(head) => match self.rules.builtin(head) {
                Some(target) => target,
                None => return reference.to_string(),
            },
            None => return reference.to_string(),
        };
        match tail {
            Some((sep, rest)) => format!("{target}{sep}{rest}"),
            None => target,
        }
    }
}

/// Resolve `references` against one file's `imports`.
pub fn resolve(language: Language, imports: &[Import], references: &[String]) -> Vec<String> {
    let resolver = Resolver::new(language, imports);
    references.iter().map(|r| resolver.resolve(r)).collect()
}

/// Rewrite an extraction's inheritance parents and call callees in place.
pub fn resolve_extraction(language: Language, extraction: &mut Extraction) {
    let locals: Vec<&str> = extraction
        .symbols
        .iter()
        .filter(|s| s.parent_path().is_none())
        .map(|s| s.name.as_str())
        .collect();
    let resolver = Resolver::new(language, &extraction.imports).with_locals(locals);

    for edge in &mut extraction.inheritances {
        edge.parent = resolver.resolve(&edge.parent);
    }
    for call in &mut extraction.calls {
        if let Some(callee) = call.callee.as_mut() {
            *callee = resolver.resolve(callee);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_module_alias_and_member_import() {
        let imports = vec![
            Import::module("numpy", Some("np".into())),
            Import::member("os.path", "join", None),
            Import::member("collections", "OrderedDict", Some("OD".into())),
        ];
        let resolved = resolve(
            Language::Python,
            &imports,
            &refs(&["np.array", "join", "OD", "unknown.thing"]),
        );
        assert_eq!(
            resolved,
            refs(&["numpy.array", "os.path.join", "collections.OrderedDict", "unknown.thing"])
        );
    }

    #[test]
    fn test_self_keywords_never_rewritten() {
        let imports = vec![Import::module("selfmod", Some("self".into()))];
        let resolved = resolve(
            Language::Python,
            &imports,
            &refs(&["self.save", "super().__init__", "cls.create"]),
        );
        assert_eq!(resolved, refs(&["self.save", "super().__init__", "cls.create"]));
    }

    #[test]
    fn test_already_qualified_reference_is_unchanged() {
        let imports = vec![Import::member("java.util", "List", None)];
        let resolver = Resolver::new(Language::Java, &imports);
        let once = resolver.resolve("java.util.List");
        assert_eq!(once, "java.util.List");
        assert_eq!(resolver.resolve(&once), once);
        assert_eq!(resolver.resolve("List"), "java.util.List");
    }

    #[test]
    fn test_builtin_fallback_and_shadowing() {
        let resolver = Resolver::new(Language::Java, &[]);
        assert_eq!(resolver.resolve("RuntimeException"), "java.lang.RuntimeException");
        assert_eq!(resolver.resolve("Math.max"), "java.lang.Math.max");

        let shadowed = Resolver::new(Language::Python, &[]).with_locals(["ValueError"]);
        assert_eq!(shadowed.resolve("ValueError"), "ValueError");
        assert_eq!(shadowed.resolve("KeyError"), "builtins.KeyError");
    }

    #[test]
    fn test_import_beats_builtin() {
        let imports = vec![Import::member("myproject.errors", "Exception", None)];
        let resolver = Resolver::new(Language::Python, &imports);
        assert_eq!(resolver.resolve("Exception"), "myproject.errors.Exception");
    }

    #[test]
    fn test_rust_paths_keep_separator() {
        let imports = vec![
            Import::member("std::collections", "HashMap", None),
            Import::module("crate::model", None),
        ];
        let resolver = Resolver::new(Language::Rust, &imports);
        assert_eq!(
            resolver.resolve("HashMap::new"),
            "std::collections::HashMap::new"
        );
        assert_eq!(resolver.resolve("model::Symbol"), "crate::model::Symbol");
        assert_eq!(resolver.resolve("Vec::with_capacity"), "std::vec::Vec::with_capacity");
        assert_eq!(resolver.resolve("Self::new"), "Self::new");
        assert_eq!(resolver.resolve("self.items.push"), "self.items.push");
    }

    #[test]
    fn test_php_separators() {
        let imports = vec![Import::member("App\\Models", "User", None)];
        let resolver = Resolver::new(Language::Php, &imports);
        assert_eq!(resolver.resolve("User"), "App\\Models\\User");
        assert_eq!(resolver.resolve("User::find"), "App\\Models\\User::find");
        assert_eq!(resolver.resolve("$this->save"), "$this->save");
        assert_eq!(resolver.resolve("parent::__construct"), "parent::__construct");
    }

    #[test]
    fn test_go_bindings() {
        assert_eq!(go_package_name("fmt"), "fmt");
        assert_eq!(go_package_name("net/http"), "http");
        assert_eq!(go_package_name("gopkg.in/yaml.v3"), "yaml");
        assert_eq!(go_package_name("github.com/jackc/pgx/v5"), "pgx");

        let imports = vec![
            Import::module("net/http", None),
            Import::module("github.com/sirupsen/logrus", Some("log".into())),
            Import::module("github.com/lib/pq", Some("_".into())),
        ];
        let map = ImportMap::build(Language::Go, &imports);
        assert_eq!(map.get("http"), Some("net/http"));
        assert_eq!(map.get("log"), Some("github.com/sirupsen/logrus"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_whole_module_without_alias_binds_per_language() {
        let python = ImportMap::build(Language::Python, &[Import::module("os.path", None)]);
        assert_eq!(python.get("os"), Some("os"));

        let ts = ImportMap::build(Language::TypeScript, &[Import::module("./polyfills", None)]);
        assert!(ts.is_empty());

        let csharp = ImportMap::build(Language::CSharp, &[Import::module("System.Linq", None)]);
        assert!(csharp.is_empty());
    }

    #[test]
    fn test_relative_python_member_join() {
        let imports = vec![
            Import::member(".", "utils", None),
            Import::member("..models", "User", None),
        ];
        let map = ImportMap::build(Language::Python, &imports);
        assert_eq!(map.get("utils"), Some(".utils"));
        assert_eq!(map.get("User"), Some("..models.User"));
    }

    #[test]
    fn test_wildcard_binds_nothing_and_last_import_wins() {
        let imports = vec![
            Import::member("a", "*", None),
            Import::member("first", "Thing", None),
            Import::member("second", "Thing", None),
        ];
        let map = ImportMap::build(Language::Python, &imports);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("Thing"), Some("second.Thing"));
    }
}
