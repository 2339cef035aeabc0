//! Invariants that hold for every language.

use srcmodel_core::{MODULE_SCOPE, ParseResult, schema};
use srcmodel_parser::{Language, SourceParser};

const SAMPLES: &[(&str, &str)] = &[
    (
        "python",
        "import os\n\nclass A(Base):\n    def run(self):\n        os.getcwd()\n\n    @property\n    def size(self):\n        return len(self.items)\n\nsetup()\n",
    ),
    (
        "java",
        "import java.util.List;\n\nclass A extends Base {\n    void run() { helper(); }\n}\n",
    ),
    (
        "typescript",
        "import { x } from \"./x\";\n\nclass A extends Base {\n    run() { x(); }\n}\n",
    ),
    (
        "javascript",
        "const x = require(\"x\");\n\nfunction run() {\n  x.go();\n}\n",
    ),
    ("go", "package a\n\nimport \"fmt\"\n\nfunc Run() {\n\tfmt.Println()\n}\n"),
    ("rust", "use std::fmt;\n\nstruct A;\n\nimpl A {\n    fn run() { helper(); }\n}\n"),
    (
        "csharp",
        "using System;\n\nclass A : Base\n{\n    void Run() { Helper(); }\n    int Size { get { return Count(); } }\n}\n",
    ),
    (
        "php",
        "<?php\nuse App\\Base;\n\nclass A extends Base\n{\n    function run() { helper(); }\n}\n",
    ),
];

fn parse(language: &str, source: &str) -> ParseResult {
    SourceParser::default().parse_source("sample", source, language)
}

#[test]
fn test_empty_file_yields_empty_result() {
    for language in Language::ALL {
        let result = parse(language.name(), "");
        assert!(result.is_ok(), "{language}: {:?}", result.error);
        assert!(result.symbols.is_empty(), "{language}");
        assert!(result.imports.is_empty(), "{language}");
        assert!(result.inheritances.is_empty(), "{language}");
        assert!(result.calls.is_empty(), "{language}");
        assert_eq!(result.file_lines, 0);
    }
}

#[test]
fn test_every_sample_parses() {
    for (language, source) in SAMPLES {
        let result = parse(language, source);
        assert!(result.is_ok(), "{language}: {:?}", result.error);
        assert_eq!(result.language, *language);
        assert!(!result.symbols.is_empty(), "{language}");
        assert!(!result.imports.is_empty(), "{language}");
        assert!(!result.calls.is_empty(), "{language}");
    }
}

#[test]
fn test_line_ranges_are_within_the_file() {
    for (language, source) in SAMPLES {
        let result = parse(language, source);
        for symbol in &result.symbols {
            assert!(symbol.line_start >= 1, "{language}: {}", symbol.name);
            assert!(symbol.line_start <= symbol.line_end, "{language}: {}", symbol.name);
            assert!(symbol.line_end <= result.file_lines, "{language}: {}", symbol.name);
        }
        for call in &result.calls {
            assert!(call.line_number >= 1 && call.line_number <= result.file_lines);
        }
    }
}

#[test]
fn test_callers_are_call_scopes_or_module_scope() {
    for (language, source) in SAMPLES {
        let result = parse(language, source);
        for call in &result.calls {
            if call.caller == MODULE_SCOPE {
                continue;
            }
            let caller = result.symbol(&call.caller);
            assert!(
                caller.is_some_and(|s| s.kind.is_caller()),
                "{language}: unknown caller {}",
                call.caller
            );
        }
    }

    let python = parse("python", SAMPLES[0].1);
    let in_property: Vec<&str> = python
        .calls_from("A.size")
        .iter()
        .filter_map(|c| c.callee.as_deref())
        .collect();
    assert_eq!(in_property, vec!["builtins.len"]);
}

#[test]
fn test_dynamic_calls_have_no_callee() {
    for (language, source) in SAMPLES {
        let result = parse(language, source);
        for call in &result.calls {
            assert_eq!(
                call.callee.is_none(),
                call.call_type == srcmodel_core::CallType::Dynamic,
                "{language}: {call:?}"
            );
        }
    }
}

#[test]
fn test_inheritance_children_are_declared_types() {
    for (language, source) in SAMPLES {
        let result = parse(language, source);
        for edge in &result.inheritances {
            let child = result.symbol(&edge.child);
            assert!(
                child.is_some_and(|s| s.kind.is_type()),
                "{language}: {edge:?}"
            );
            assert!(!edge.parent.contains('<'), "{language}: {edge:?}");
        }
    }
}

#[test]
fn test_resolution_is_idempotent_through_json() {
    for (language, source) in SAMPLES {
        let result = parse(language, source);
        let json = schema::to_json(&result).unwrap();
        let back = schema::from_json(&json).unwrap();
        assert_eq!(back, result, "{language}");
    }
}

#[test]
fn test_parsing_is_deterministic() {
    for (language, source) in SAMPLES {
        assert_eq!(parse(language, source), parse(language, source), "{language}");
    }
}
