use std::collections::BTreeMap;

use srcmodel_core::schema;
use srcmodel_core::{
    Annotation, Call, CallType, Import, Inheritance, ParseError, ParseResult, Symbol, SymbolKind,
};

fn sample_result() -> ParseResult {
    let mut arguments = BTreeMap::new();
    arguments.insert("value".to_string(), "/users".to_string());
    ParseResult {
        path: "src/UserService.java".to_string(),
        language: "java".to_string(),
        symbols: vec![
            Symbol {
                name: "UserService".to_string(),
                kind: SymbolKind::Class,
                signature: "public class UserService extends BaseService".to_string(),
                docstring: Some("用户服务。负责注册和登录。".to_string()),
                line_start: 3,
                line_end: 20,
                annotations: vec![Annotation {
                    name: "RequestMapping".to_string(),
                    arguments,
                }],
            },
            Symbol {
                name: "UserService.register".to_string(),
                kind: SymbolKind::Method,
                signature: "public void register(String name) throws IOException".to_string(),
                docstring: None,
                line_start: 8,
                line_end: 12,
                annotations: Vec::new(),
            },
        ],
        imports: vec![Import::member("com.example.base", "BaseService", None)],
        inheritances: vec![Inheritance {
            child: "UserService".to_string(),
            parent: "com.example.base.BaseService".to_string(),
        }],
        calls: vec![
            Call {
                caller: "UserService.register".to_string(),
                callee: Some("this.validate".to_string()),
                line_number: 9,
                call_type: CallType::Method,
                arguments_count: 1,
            },
            Call {
                caller: "UserService.register".to_string(),
                callee: None,
                line_number: 10,
                call_type: CallType::Dynamic,
                arguments_count: 0,
            },
        ],
        module_docstring: Some("Сервис пользователей".to_string()),
        namespace: "com.example.users".to_string(),
        error: None,
        file_lines: 20,
    }
}

#[test]
fn test_roundtrip_preserves_every_field() {
    let original = sample_result();
    let json = schema::to_json(&original).unwrap();
    let restored = schema::from_json(&json).unwrap();
    assert_eq!(original, restored);
}

#[test]
fn test_non_latin_text_is_written_unescaped() {
    let json = schema::to_json_compact(&sample_result()).unwrap();
    assert!(json.contains("用户服务。负责注册和登录。"));
    assert!(json.contains("Сервис пользователей"));
}

#[test]
fn test_unknown_callee_serializes_as_null() {
    let json = schema::to_json_compact(&sample_result()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert!(value["calls"][1]["callee"].is_null());
    assert_eq!(value["calls"][1]["call_type"], "dynamic");
    assert!(value.get("error").is_none());
}

#[test]
fn test_failed_result_roundtrip() {
    let err = ParseError::unreadable("missing.py", "No such file or directory");
    let failed = ParseResult::failed("missing.py", "python", &err);
    let json = schema::to_json(&failed).unwrap();
    let restored = schema::from_json(&json).unwrap();
    assert_eq!(failed, restored);
    assert!(restored.symbols.is_empty());
    assert!(restored.error.unwrap().contains("missing.py"));
}

#[test]
fn test_batch_roundtrip_keeps_order() {
    let mut second = sample_result();
    second.path = "src/Other.java".to_string();
    let batch = vec![sample_result(), second];
    let json = schema::batch_to_json(&batch, false).unwrap();
    let restored = schema::batch_from_json(&json).unwrap();
    assert_eq!(restored.len(), 2);
    assert_eq!(restored[0].path, "src/UserService.java");
    assert_eq!(restored[1].path, "src/Other.java");
}

#[test]
fn test_from_json_rejects_garbage() {
    assert!(schema::from_json("{not json").is_err());
}
