use srcmodel_core::Import;
use srcmodel_parser::SourceParser;
use srcmodel_parser::languages::Language;
use srcmodel_parser::resolve::{ImportMap, resolve};

fn parse_python(source: &str) -> srcmodel_core::ParseResult {
    SourceParser::default().parse_source("pkg/admin.py", source, "python")
}

#[test]
fn test_relative_imports() {
    let source = "\
from .models import User
from . import utils

class Admin(User):
    def run(self):
        utils.refresh()
";
    let result = parse_python(source);
    assert_eq!(result.parents_of("Admin"), vec![".models.User"]);
    assert_eq!(
        result.calls_from("Admin.run")[0].callee.as_deref(),
        Some(".utils.refresh")
    );
}

#[test]
fn test_dotted_module_import_binds_its_head() {
    let source = "\
import xml.etree.ElementTree

def load():
    xml.etree.ElementTree.parse(\"a.xml\")
";
    let result = parse_python(source);
    assert_eq!(
        result.calls_from("load")[0].callee.as_deref(),
        Some("xml.etree.ElementTree.parse")
    );
}

#[test]
fn test_later_import_wins() {
    let source = "\
import json
import simplejson as json

def dump(x):
    return json.dumps(x)
";
    let result = parse_python(source);
    assert_eq!(
        result.calls_from("dump")[0].callee.as_deref(),
        Some("simplejson.dumps")
    );
}

#[test]
fn test_unknown_names_pass_through() {
    let source = "\
class Widget(framework.Base):
    pass
";
    let result = parse_python(source);
    assert_eq!(result.parents_of("Widget"), vec!["framework.Base"]);
}

#[test]
fn test_resolve_function_per_language() {
    let imports = vec![Import::member("java.util", "List", None)];
    let refs = vec!["List".to_string(), "this.save".to_string(), "String".to_string()];
    assert_eq!(
        resolve(Language::Java, &imports, &refs),
        vec!["java.util.List", "this.save", "java.lang.String"]
    );

    let imports = vec![Import::module("github.com/pkg/errors", None)];
    let refs = vec!["errors.Wrap".to_string()];
    assert_eq!(
        resolve(Language::Go, &imports, &refs),
        vec!["github.com/pkg/errors.Wrap"]
    );
}

#[test]
fn test_import_map_skips_wildcards() {
    let imports = vec![
        Import::member("java.util", "*", None),
        Import::member("java.io", "File", None),
    ];
    let map = ImportMap::build(Language::Java, &imports);
    assert_eq!(map.len(), 1);
    assert_eq!(map.get("File"), Some("java.io.File"));
    assert_eq!(map.get("*"), None);
}
