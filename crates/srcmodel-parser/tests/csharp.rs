use srcmodel_core::{CallType, Import, ParseResult, SymbolKind};
use srcmodel_parser::SourceParser;

fn parse(source: &str) -> ParseResult {
    SourceParser::default().parse_source("OrderService.cs", source, "csharp")
}

const ORDER_SERVICE: &str = "\
using System;
using System.Collections.Generic;
using static System.Math;
using Json = Newtonsoft.Json;

namespace App.Services
{
    /// <summary>
    /// Manages orders.
    /// </summary>
    [Serializable]
    [Route(\"api/orders\")]
    public class OrderService : BaseService, IOrderService
    {
        private readonly int _count = 0, _limit;

        public string Name { get; set; }

        public OrderService(ILogger logger) : base(logger)
        {
            Init();
        }

        public void Process(Order order)
        {
            var items = new List<Order>();
            Console.WriteLine(\"x\");
            this.Save(order);
            _repo.Find(order.Id);
        }
    }

    public interface IOrderService
    {
        void Process(Order order);
    }

    public enum Status { Active, Closed }

    public record Point(int X, int Y);

    public struct Vec
    {
        public int X;
    }
}
";

#[test]
fn test_usings_and_namespace() {
    let result = parse(ORDER_SERVICE);
    assert!(result.is_ok());
    assert_eq!(result.namespace, "App.Services");
    assert_eq!(
        result.imports,
        vec![
            Import::module("System", None),
            Import::module("System.Collections.Generic", None),
            Import::member("System.Math", "*", None),
            Import::module("Newtonsoft.Json", Some("Json".into())),
        ]
    );
}

#[test]
fn test_class_with_xml_doc_and_attributes() {
    let result = parse(ORDER_SERVICE);
    let class = result.symbol("OrderService").unwrap();
    assert_eq!(class.kind, SymbolKind::Class);
    assert_eq!(class.docstring.as_deref(), Some("Manages orders."));
    assert_eq!(
        class.signature,
        "public class OrderService : BaseService, IOrderService"
    );

    let names: Vec<&str> = class.annotations.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["Serializable", "Route"]);
    assert_eq!(
        class.annotations[1].arguments.get("0").map(String::as_str),
        Some("api/orders")
    );
    assert_eq!(
        result.parents_of("OrderService"),
        vec!["BaseService", "IOrderService"]
    );
}

#[test]
fn test_members() {
    let result = parse(ORDER_SERVICE);
    let kind = |name: &str| result.symbol(name).map(|s| s.kind);

    assert_eq!(kind("OrderService._count"), Some(SymbolKind::Field));
    assert_eq!(
        result.symbol("OrderService._limit").unwrap().signature,
        "private readonly int _limit"
    );
    assert_eq!(kind("OrderService.Name"), Some(SymbolKind::Property));
    assert_eq!(
        result.symbol("OrderService.Name").unwrap().signature,
        "public string Name"
    );
    assert_eq!(kind("OrderService.OrderService"), Some(SymbolKind::Constructor));
    assert_eq!(
        result.symbol("OrderService.OrderService").unwrap().signature,
        "public OrderService(ILogger logger)"
    );
    assert_eq!(kind("OrderService.Process"), Some(SymbolKind::Method));
}

#[test]
fn test_other_type_kinds() {
    let result = parse(ORDER_SERVICE);
    let kind = |name: &str| result.symbol(name).map(|s| s.kind);

    assert_eq!(kind("IOrderService"), Some(SymbolKind::Interface));
    assert_eq!(kind("IOrderService.Process"), Some(SymbolKind::Method));
    assert_eq!(kind("Status"), Some(SymbolKind::Enum));
    assert_eq!(kind("Status.Active"), Some(SymbolKind::Field));
    assert_eq!(kind("Status.Closed"), Some(SymbolKind::Field));
    assert_eq!(kind("Point"), Some(SymbolKind::Struct));
    assert_eq!(kind("Point.X"), Some(SymbolKind::Property));
    assert_eq!(kind("Point.Y"), Some(SymbolKind::Property));
    assert_eq!(kind("Vec"), Some(SymbolKind::Struct));
    assert_eq!(kind("Vec.X"), Some(SymbolKind::Field));
}

#[test]
fn test_calls() {
    let result = parse(ORDER_SERVICE);

    let ctor: Vec<(Option<&str>, CallType)> = result
        .calls_from("OrderService.OrderService")
        .iter()
        .map(|c| (c.callee.as_deref(), c.call_type))
        .collect();
    assert_eq!(
        ctor,
        vec![
            (Some("base"), CallType::Constructor),
            (Some("Init"), CallType::Function),
        ]
    );

    let process: Vec<(Option<&str>, CallType)> = result
        .calls_from("OrderService.Process")
        .iter()
        .map(|c| (c.callee.as_deref(), c.call_type))
        .collect();
    assert_eq!(
        process,
        vec![
            (Some("List"), CallType::Constructor),
            (Some("Console.WriteLine"), CallType::StaticMethod),
            (Some("this.Save"), CallType::Method),
            (Some("_repo.Find"), CallType::Method),
        ]
    );
}

#[test]
fn test_aliased_using_resolves() {
    let source = "\
using Json = Newtonsoft.Json;

class A
{
    void Run()
    {
        Json.JsonConvert.SerializeObject(this);
    }
}
";
    let result = parse(source);
    let calls = result.calls_from("A.Run");
    assert_eq!(
        calls[0].callee.as_deref(),
        Some("Newtonsoft.Json.JsonConvert.SerializeObject")
    );
}
