use srcmodel_core::{CallType, Import, ParseResult, SymbolKind};
use srcmodel_parser::SourceParser;

fn parse(source: &str) -> ParseResult {
    SourceParser::default().parse_source("UserController.php", source, "php")
}

const CONTROLLER: &str = r"<?php
/**
 * HTTP controllers.
 */

namespace App\Http;

use App\Models\User;
use App\Support\{Str, Arr as A};
use function App\helper;

/**
 * Handles users.
 */
#[Route('/users')]
class UserController extends Controller implements Responsable, Countable
{
    use Loggable, Cacheable;

    const VERSION = '1.0';

    private ?User $user = null, $other;

    public function __construct(Repo $repo)
    {
        parent::__construct();
        $this->repo = $repo;
    }

    public function show(int $id): User
    {
        $user = User::find($id);
        $this->log($id);
        helper($id);
        return new User();
    }
}

interface Responsable {}

trait Loggable
{
    public function log($m) {}
}

enum Suit: string
{
    case Hearts = 'H';
}

function top_level() {}
";

#[test]
fn test_namespace_and_use_declarations() {
    let result = parse(CONTROLLER);
    assert!(result.is_ok());
    assert_eq!(result.namespace, r"App\Http");
    assert_eq!(result.module_docstring.as_deref(), Some("HTTP controllers."));
    assert_eq!(
        result.imports,
        vec![
            Import::member(r"App\Models", "User", None),
            Import::member(r"App\Support", "Str", None),
            Import::member(r"App\Support", "Arr", Some("A".into())),
            Import::member("App", "helper", None),
        ]
    );
}

#[test]
fn test_class_parents_include_traits() {
    let result = parse(CONTROLLER);
    let class = result.symbol("UserController").unwrap();
    assert_eq!(class.kind, SymbolKind::Class);
    assert_eq!(class.docstring.as_deref(), Some("Handles users."));
    assert_eq!(class.annotations[0].name, "Route");
    assert_eq!(
        class.annotations[0].arguments.get("0").map(String::as_str),
        Some("/users")
    );
    assert_eq!(
        result.parents_of("UserController"),
        vec!["Controller", "Responsable", "Countable", "Loggable", "Cacheable"]
    );
}

#[test]
fn test_members() {
    let result = parse(CONTROLLER);
    let kind = |name: &str| result.symbol(name).map(|s| s.kind);

    assert_eq!(kind("UserController.VERSION"), Some(SymbolKind::Field));
    assert_eq!(kind("UserController.__construct"), Some(SymbolKind::Constructor));
    assert_eq!(kind("UserController.show"), Some(SymbolKind::Method));
    assert_eq!(
        result.symbol("UserController.user").unwrap().signature,
        "private ?User $user"
    );
    assert_eq!(
        result.symbol("UserController.other").unwrap().signature,
        "private ?User $other"
    );

    assert_eq!(kind("Responsable"), Some(SymbolKind::Interface));
    assert_eq!(kind("Loggable"), Some(SymbolKind::Trait));
    assert_eq!(kind("Loggable.log"), Some(SymbolKind::Method));
    assert_eq!(kind("Suit"), Some(SymbolKind::Enum));
    assert_eq!(kind("Suit.Hearts"), Some(SymbolKind::Field));
    assert_eq!(kind("top_level"), Some(SymbolKind::Function));
}

#[test]
fn test_calls() {
    let result = parse(CONTROLLER);

    let ctor = result.calls_from("UserController.__construct");
    assert_eq!(ctor.len(), 1);
    assert_eq!(ctor[0].callee.as_deref(), Some("parent::__construct"));
    assert_eq!(ctor[0].call_type, CallType::Method);

    let show: Vec<(Option<&str>, CallType)> = result
        .calls_from("UserController.show")
        .iter()
        .map(|c| (c.callee.as_deref(), c.call_type))
        .collect();
    assert_eq!(
        show,
        vec![
            (Some(r"App\Models\User::find"), CallType::StaticMethod),
            (Some("$this->log"), CallType::Method),
            (Some(r"App\helper"), CallType::Function),
            (Some(r"App\Models\User"), CallType::Constructor),
        ]
    );
}

#[test]
fn test_variable_function_call_is_dynamic() {
    let source = "<?php\nfunction run($fn) {\n    $fn();\n}\n";
    let result = parse(source);
    let calls = result.calls_from("run");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].callee, None);
    assert_eq!(calls[0].call_type, CallType::Dynamic);
}
