use srcmodel_core::{CallType, Import, ParseResult, SymbolKind};
use srcmodel_parser::SourceParser;

fn parse(source: &str) -> ParseResult {
    SourceParser::default().parse_source("server.go", source, "go")
}

const SERVER: &str = "\
// Package server implements the HTTP front end.
package server

import (
\t\"fmt\"
\tlog \"github.com/sirupsen/logrus\"
\t_ \"net/http/pprof\"
\t\"gopkg.in/yaml.v3\"
)

// Server handles requests.
type Server struct {
\tBase
\t*Logger
\tName, Addr string `json:\"name\"`
\tport       int
}

type Handler interface {
\tio.Reader
\tServe(req *Request) error
}

type ID = string

const MaxConns = 10

var (
\t_     = fmt.Sprintf
\tDebug = false
)

// NewServer builds a server.
func NewServer(name string) *Server {
\tfmt.Println(\"starting\")
\tlog.Info(\"x\")
\tyaml.Marshal(name)
\ts := &Server{Name: name}
\ts.Start()
\treturn s
}

func (s *Server) Start() error {
\treturn s.listen()
}

func (r *Repo[T]) Find() {}
";

#[test]
fn test_package_and_imports() {
    let result = parse(SERVER);
    assert!(result.is_ok());
    assert_eq!(result.namespace, "server");
    assert_eq!(
        result.module_docstring.as_deref(),
        Some("Package server implements the HTTP front end.")
    );
    assert_eq!(
        result.imports,
        vec![
            Import::module("fmt", None),
            Import::module("github.com/sirupsen/logrus", Some("log".into())),
            Import::module("net/http/pprof", Some("_".into())),
            Import::module("gopkg.in/yaml.v3", None),
        ]
    );
}

#[test]
fn test_types() {
    let result = parse(SERVER);

    let server = result.symbol("Server").unwrap();
    assert_eq!(server.kind, SymbolKind::Struct);
    assert_eq!(server.signature, "type Server struct");
    assert_eq!(server.docstring.as_deref(), Some("Server handles requests."));
    for field in ["Server.Name", "Server.Addr", "Server.port"] {
        assert_eq!(result.symbol(field).unwrap().kind, SymbolKind::Field);
    }
    assert_eq!(result.parents_of("Server"), vec!["Base", "Logger"]);

    assert_eq!(result.symbol("Handler").unwrap().kind, SymbolKind::Interface);
    assert_eq!(
        result.symbol("Handler.Serve").unwrap().kind,
        SymbolKind::Method
    );
    assert_eq!(result.parents_of("Handler"), vec!["io.Reader"]);

    assert_eq!(result.symbol("ID").unwrap().kind, SymbolKind::TypeAlias);
}

#[test]
fn test_package_level_values() {
    let result = parse(SERVER);
    assert_eq!(result.symbol("MaxConns").unwrap().kind, SymbolKind::Module);
    assert_eq!(result.symbol("Debug").unwrap().kind, SymbolKind::Module);
    assert!(result.symbol("_").is_none());
}

#[test]
fn test_functions_and_methods() {
    let result = parse(SERVER);
    let new_server = result.symbol("NewServer").unwrap();
    assert_eq!(new_server.kind, SymbolKind::Function);
    assert_eq!(new_server.signature, "func NewServer(name string) *Server");
    assert_eq!(
        new_server.docstring.as_deref(),
        Some("NewServer builds a server.")
    );

    assert_eq!(result.symbol("Server.Start").unwrap().kind, SymbolKind::Method);
    assert_eq!(result.symbol("Repo.Find").unwrap().kind, SymbolKind::Method);
}

#[test]
fn test_calls_resolve_package_names() {
    let result = parse(SERVER);
    let calls: Vec<(Option<&str>, CallType)> = result
        .calls_from("NewServer")
        .iter()
        .map(|c| (c.callee.as_deref(), c.call_type))
        .collect();
    assert_eq!(
        calls,
        vec![
            (Some("fmt.Println"), CallType::Function),
            (Some("github.com/sirupsen/logrus.Info"), CallType::Function),
            (Some("gopkg.in/yaml.v3.Marshal"), CallType::Function),
            (Some("s.Start"), CallType::Method),
        ]
    );

    let start = result.calls_from("Server.Start");
    assert_eq!(start[0].callee.as_deref(), Some("s.listen"));
    assert_eq!(start[0].call_type, CallType::Method);
}

#[test]
fn test_build_constraint_is_not_documentation() {
    let source = "\
//go:build linux

package sys
";
    let result = parse(source);
    assert_eq!(result.namespace, "sys");
    assert_eq!(result.module_docstring, None);
}
