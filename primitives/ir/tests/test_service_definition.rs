//! Unit tests for the service definition model

use wsbridge_ir::*;

fn library_definition() -> ServiceDefinition {
    let mut def = ServiceDefinition::new("Library", "urn:library");
    def.add_operation(
        Operation::new("FindBooks")
            .with_argument("author", "string")
            .with_argument("limit", "int")
            .with_header("authToken", "App\\Auth\\Token")
            .with_return("App\\Model\\Book[]"),
    )
    .expect("unique name");
    def.add_operation(Operation::new("Ping")).expect("unique name");
    def
}

#[test]
fn test_operations_keep_insertion_order() {
    let mut def = ServiceDefinition::new("Ordered", "urn:ordered");
    for name in ["Zeta", "Alpha", "Mu"] {
        def.add_operation(Operation::new(name)).expect("unique name");
    }

    let names: Vec<&str> = def.operations().map(|op| op.name.as_str()).collect();
    assert_eq!(names, vec!["Zeta", "Alpha", "Mu"]);
    assert!(def.operation("Alpha").is_some());
    assert!(def.operation("alpha").is_none());
}

#[test]
fn test_all_types_includes_arguments_headers_and_return() {
    let def = library_definition();
    let names: Vec<&str> = def.all_types().iter().map(|slot| slot.name.as_str()).collect();

    assert_eq!(names, vec!["author", "limit", "authToken", "return"]);
    assert!(!def.is_resolved());
}

#[test]
fn test_from_json_str() {
    let json = r#"{
        "name": "Calculator",
        "namespace": "urn:calc",
        "operations": [
            {
                "name": "Add",
                "arguments": [
                    { "name": "a", "native_type": "int" },
                    { "name": "b", "native_type": "int", "wire_type": "xsd:int" }
                ],
                "return": { "name": "return", "native_type": "int" }
            }
        ],
        "complex_types": {
            "App\\Money": [ { "name": "amount", "native_type": "float" } ]
        }
    }"#;

    let def = ServiceDefinition::from_json_str(json).expect("valid definition");
    assert_eq!(def.name(), "Calculator");
    assert_eq!(def.namespace(), "urn:calc");

    let add = def.operation("Add").expect("Add exists");
    assert_eq!(add.argument_names(), vec!["a", "b"]);
    assert_eq!(add.arguments[1].wire_type.as_deref(), Some("xsd:int"));
    assert_eq!(add.return_type.as_ref().and_then(|r| r.native_type()), Some("int"));

    let money = def.complex_type("App\\Money").expect("declared record");
    assert_eq!(money[0].name, "amount");
    assert!(!money[0].nillable);
}

#[test]
fn test_from_json_str_rejects_duplicate_operations() {
    let json = r#"{
        "name": "Dup",
        "namespace": "urn:dup",
        "operations": [ { "name": "Ping" }, { "name": "Ping" } ]
    }"#;

    let err = ServiceDefinition::from_json_str(json).expect_err("duplicate operation");
    assert!(err.to_string().contains("duplicate operation 'Ping'"));
}

#[test]
fn test_file_round_trip_keeps_resolved_types() {
    let mut def = library_definition();
    let token = QualifiedName::new("urn:library", "Token").expect("valid name");
    for slot in def.all_types_mut() {
        slot.xml_type = Some(token.clone());
    }

    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("nested").join("library.json");
    def.to_file(&path).expect("write definition");

    let loaded = ServiceDefinition::from_file(&path).expect("read definition");
    assert_eq!(loaded, def);
    assert!(loaded.is_resolved());
}
