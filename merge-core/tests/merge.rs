//! Integration coverage for the concrete three-way merge scenarios, built
//! directly against the AST and merge engine (the reader has its own
//! source-code-info-driven tests in `reader.rs`).

use schema_merge_core::ast::{Enum, EnumValue, Field, File, Label, Message, Oneof, Package, Syntax};
use schema_merge_core::merge::MergeSpec;
use schema_merge_core::printer::print_file;

fn message(name: &str) -> Message {
    Message {
        name: name.to_string(),
        ..Default::default()
    }
}

fn field(name: &str, number: i32, ty: &str) -> Field {
    Field {
        name: name.to_string(),
        number,
        label: Label::None,
        r#type: ty.to_string(),
        ..Default::default()
    }
}

fn file(package: &str, messages: Vec<Message>) -> File {
    File {
        syntax: Syntax {
            name: "proto3".to_string(),
            ..Default::default()
        },
        package: Package {
            name: package.to_string(),
            ..Default::default()
        },
        messages,
        ..Default::default()
    }
}

fn spec(base_paths: &[&str]) -> MergeSpec {
    let mut s = MergeSpec {
        base_package: "a".to_string(),
        merge_package: "b".to_string(),
        merged_package: "c".to_string(),
        ..Default::default()
    };
    for p in base_paths {
        s.base_paths.insert(p.to_string());
    }
    s
}

#[test]
fn type_reference_is_rewritten_to_merged_package() {
    let base = file(
        "a",
        vec![
            message("A"),
            Message {
                name: "B".to_string(),
                fields: vec![field("a", 1, ".a.A")],
                ..Default::default()
            },
        ],
    );
    let merge = file(
        "b",
        vec![
            message("A"),
            Message {
                name: "B".to_string(),
                fields: vec![field("a", 1, ".a.A")],
                ..Default::default()
            },
        ],
    );
    let merged = File::default();

    let spec = spec(&["a.A", "a.B"]);
    let out = spec.merge_file(&base, &merge, &merged);

    let b = out.messages.iter().find(|m| m.name == "B").unwrap();
    assert_eq!(b.fields[0].r#type, ".c.A");
}

#[test]
fn oneof_field_numbering_avoids_historical_numbers() {
    let base = Message {
        name: "M".to_string(),
        fields: vec![field("r", 3, "string")],
        oneofs: vec![Oneof {
            name: "o".to_string(),
            fields: vec![field("p", 1, "string"), field("q", 2, "int32")],
            ..Default::default()
        }],
        ..Default::default()
    };
    let merge = Message {
        name: "M".to_string(),
        fields: vec![field("r", 4, "string")],
        oneofs: vec![Oneof {
            name: "o".to_string(),
            fields: vec![
                field("p", 1, "string"),
                field("q", 2, "int32"),
                field("s", 3, "string"),
            ],
            ..Default::default()
        }],
        ..Default::default()
    };
    let merged = Message {
        name: "M".to_string(),
        fields: vec![field("r", 1, "string")],
        oneofs: vec![Oneof {
            name: "o".to_string(),
            fields: vec![field("p", 3, "string"), field("q", 9, "int32")],
            ..Default::default()
        }],
        ..Default::default()
    };

    let base_file = file("a", vec![base]);
    let merge_file_ast = file("b", vec![merge]);
    let merged_file = file("c", vec![merged]);

    let spec = spec(&["a.M"]);
    let out = spec.merge_file(&base_file, &merge_file_ast, &merged_file);

    let m = &out.messages[0];
    assert_eq!(m.fields[0].number, 1, "r keeps its historical number");

    let oneof = &m.oneofs[0];
    let by_name = |name: &str| oneof.fields.iter().find(|f| f.name == name).unwrap().number;
    assert_eq!(by_name("p"), 3);
    assert_eq!(by_name("q"), 9);
    assert_eq!(by_name("s"), 2, "smallest free number not in {{1,3,9}}");
}

#[test]
fn removed_enum_value_is_reserved_unless_already_named() {
    let base = Enum {
        name: "E".to_string(),
        ..Default::default()
    };
    let merge = Enum {
        name: "E".to_string(),
        ..Default::default()
    };
    let merged = Enum {
        name: "E".to_string(),
        values: vec![EnumValue {
            name: "OLD".to_string(),
            number: 5,
            ..Default::default()
        }],
        ..Default::default()
    };

    let mut base_file = file("a", vec![]);
    base_file.enums.push(base);
    let mut merge_file_ast = file("b", vec![]);
    merge_file_ast.enums.push(merge);
    let mut merged_file = file("c", vec![]);
    merged_file.enums.push(merged);

    let spec = spec(&["a.E"]);
    let out = spec.merge_file(&base_file, &merge_file_ast, &merged_file);

    let e = &out.enums[0];
    assert_eq!(e.reserved_ranges.len(), 1);
    assert_eq!(e.reserved_ranges[0].start, 5);
    assert_eq!(e.reserved_ranges[0].end, 5);
    assert_eq!(e.reserved_names[0].name, "OLD");
}

#[test]
fn round_trip_when_merge_equals_base_and_merged_is_empty() {
    let tree = file(
        "a",
        vec![Message {
            name: "M".to_string(),
            fields: vec![field("x", 1, "string")],
            ..Default::default()
        }],
    );
    let merged = File::default();

    let spec = spec(&["a.M"]);
    let out = spec.merge_file(&tree, &tree, &merged);
    let printed = print_file(&out);

    assert!(printed.contains("message M {"));
    assert!(printed.contains("string x = 1;"));
    assert!(!printed.contains("reserved"));
}

#[test]
fn idempotent_merge_preserves_live_numbers() {
    let base = file(
        "a",
        vec![Message {
            name: "M".to_string(),
            fields: vec![field("x", 1, "string")],
            ..Default::default()
        }],
    );
    let merge = file(
        "b",
        vec![Message {
            name: "M".to_string(),
            fields: vec![field("x", 1, "string"), field("y", 2, "int32")],
            ..Default::default()
        }],
    );
    let empty = File::default();

    let spec = spec(&["a.M"]);
    let first_pass = spec.merge_file(&base, &merge, &empty);
    let second_pass = spec.merge_file(&base, &merge, &first_pass);

    let live = |f: &File| -> Vec<(String, i32)> {
        f.messages[0]
            .fields
            .iter()
            .map(|field| (field.name.clone(), field.number))
            .collect()
    };
    assert_eq!(live(&first_pass), live(&second_pass));
}
