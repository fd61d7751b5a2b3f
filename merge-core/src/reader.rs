//! Lifts a `FileDescriptorProto` plus its `SourceCodeInfo` into a
//! comment-bearing [`crate::ast::File`].
//!
//! The source-code-info records form a flat sequence in protoc's own
//! declaration order, not sorted by path: a oneof's member fields are
//! interleaved with the oneof's own record at the point they appear in the
//! original text, ahead of any later plain field. This module walks the
//! records as given with a small cursor, dispatching on the leading path
//! element the way the protobuf compiler's own plugins do, and recursing
//! with the node's own path length (`nested`) as the depth at which to look
//! for that node's children. The oneof span-containment parser below
//! depends on this order being preserved; sorting by path would move every
//! oneof member field ahead of its oneof's own record (tag 2 sorts before
//! tag 8), which the dispatch in `parse_message` would then consume as a
//! plain field before `parse_oneof` ever ran.

use prost_types::{
    field_descriptor_proto, DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto,
    FieldDescriptorProto, FileDescriptorProto, OneofDescriptorProto,
};
use prost_types::source_code_info::Location;

use crate::ast::{
    Comments, Enum, EnumValue, Field, File, Label, Message, Oneof, ReservedName, ReservedRange,
};

/// A cursor over a slice of source-code-info locations in declaration order.
struct Cursor<'a> {
    locations: &'a [Location],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(locations: &'a [Location]) -> Self {
        Cursor { locations, pos: 0 }
    }

    fn peek(&self) -> Option<&'a Location> {
        self.locations.get(self.pos)
    }

    fn bump(&mut self) -> Option<&'a Location> {
        let loc = self.locations.get(self.pos);
        if loc.is_some() {
            self.pos += 1;
        }
        loc
    }

    /// Consumes every remaining location whose path starts with `prefix`.
    fn skip_subtree(&mut self, prefix: &[i32]) {
        while let Some(loc) = self.peek() {
            if loc.path.starts_with(prefix) {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    /// Consumes the node's own location, then any deeper records that
    /// belong to it (option overrides and the like), leaving the cursor on
    /// the next sibling or unrelated record.
    fn take_node(&mut self) -> Option<&'a Location> {
        let loc = self.bump()?;
        self.skip_subtree(&loc.path);
        Some(loc)
    }
}

fn same_parent(loc_path: &[i32], start_path: &[i32], nested: usize) -> bool {
    nested >= 2
        && loc_path.len() >= nested
        && loc_path[nested - 2] == start_path[nested - 2]
        && loc_path[nested - 1] == start_path[nested - 1]
}

/// Converts the descriptor's exclusive-end range into the AST's inclusive
/// convention.
fn to_inclusive_end(end: i32) -> i32 {
    end - 1
}

pub fn read_file(descriptor: &FileDescriptorProto) -> File {
    let locations: Vec<Location> = descriptor
        .source_code_info
        .as_ref()
        .map(|info| info.location.clone())
        .unwrap_or_default();

    let mut cursor = Cursor::new(&locations);
    let mut out = File::default();

    while let Some(loc) = cursor.peek() {
        if loc.path.is_empty() {
            cursor.bump();
            continue;
        }

        match loc.path[0] {
            2 => {
                let loc = cursor.bump().unwrap();
                out.package = crate::ast::Package {
                    comments: Comments::from_location(loc),
                    name: descriptor.package().to_string(),
                };
            }
            3 => {
                let index = loc.path[1] as usize;
                let loc = cursor.bump().unwrap();
                out.dependencies.push(crate::ast::Dependency {
                    comments: Comments::from_location(loc),
                    name: descriptor.dependency[index].clone(),
                });
            }
            4 => {
                let index = loc.path[1] as usize;
                out.messages
                    .push(parse_message(&mut cursor, &descriptor.message_type[index]));
            }
            5 => {
                let index = loc.path[1] as usize;
                out.enums
                    .push(parse_enum(&mut cursor, &descriptor.enum_type[index]));
            }
            6 | 7 => {
                // Services and extensions are an explicit non-goal.
                cursor.skip_subtree(&loc.path[..2.min(loc.path.len())]);
            }
            8 => {
                // Only the file-level output-language-package hint would be
                // recognised here; without an extension registry to decode
                // arbitrary custom options we cannot recover its value
                // generically, so the record (and any suboptions) is
                // skipped like any other unrecognised option.
                cursor.skip_subtree(&loc.path);
            }
            12 => {
                let loc = cursor.bump().unwrap();
                out.syntax = crate::ast::Syntax {
                    comments: Comments::from_location(loc),
                    name: descriptor.syntax().to_string(),
                };
            }
            _ => {
                cursor.bump();
            }
        }
    }

    out
}

fn parse_message(cursor: &mut Cursor<'_>, descriptor: &DescriptorProto) -> Message {
    let start = cursor.bump().expect("message location must exist");
    let nested = start.path.len();
    let mut out = Message {
        comments: Comments::from_location(start),
        name: descriptor.name().to_string(),
        ..Default::default()
    };

    while let Some(loc) = cursor.peek() {
        if !same_parent(&loc.path, &start.path, nested) {
            break;
        }
        if loc.path.len() <= nested {
            cursor.bump();
            continue;
        }

        match loc.path[nested] {
            1 => {
                cursor.bump();
            }
            2 => {
                let index = loc.path[nested + 1] as usize;
                out.fields.push(parse_field(cursor, &descriptor.field[index]));
            }
            3 => {
                let index = loc.path[nested + 1] as usize;
                out.messages
                    .push(parse_message(cursor, &descriptor.nested_type[index]));
            }
            4 => {
                let index = loc.path[nested + 1] as usize;
                out.enums.push(parse_enum(cursor, &descriptor.enum_type[index]));
            }
            5 | 6 | 7 => {
                cursor.skip_subtree(&loc.path[..nested + 1]);
            }
            8 => {
                let index = loc.path[nested + 1] as usize;
                out.oneofs.push(parse_oneof(
                    cursor,
                    descriptor,
                    &descriptor.oneof_decl[index],
                    nested,
                ));
            }
            9 => {
                let index = loc.path[nested + 1] as usize;
                out.reserved_ranges
                    .push(parse_message_reserved_range(cursor, &descriptor.reserved_range[index]));
            }
            10 => {
                if loc.path.len() == nested + 1 {
                    cursor.bump();
                    continue;
                }
                let index = loc.path[nested + 1] as usize;
                out.reserved_names
                    .push(parse_reserved_name(cursor, descriptor.reserved_name[index].clone()));
            }
            _ => {
                cursor.bump();
            }
        }
    }

    out
}

fn parse_field(cursor: &mut Cursor<'_>, field: &FieldDescriptorProto) -> Field {
    let loc = cursor.take_node().expect("field location must exist");

    let r#type = if !field.type_name().is_empty() {
        field.type_name().to_string()
    } else {
        lowercase_tail(field.r#type().as_str_name())
    };

    let label = if field.proto3_optional() {
        Label::Optional
    } else {
        match field.label() {
            field_descriptor_proto::Label::Optional => Label::None,
            field_descriptor_proto::Label::Repeated => Label::Repeated,
            field_descriptor_proto::Label::Required => Label::Required,
        }
    };

    Field {
        comments: Comments::from_location(loc),
        name: field.name().to_string(),
        number: field.number(),
        label,
        r#type,
    }
}

fn parse_enum(cursor: &mut Cursor<'_>, descriptor: &EnumDescriptorProto) -> Enum {
    let start = cursor.bump().expect("enum location must exist");
    let nested = start.path.len();
    let mut out = Enum {
        comments: Comments::from_location(start),
        name: descriptor.name().to_string(),
        ..Default::default()
    };

    while let Some(loc) = cursor.peek() {
        if !same_parent(&loc.path, &start.path, nested) {
            break;
        }
        if loc.path.len() <= nested {
            cursor.bump();
            continue;
        }

        match loc.path[nested] {
            1 => {
                cursor.bump();
            }
            2 => {
                let index = loc.path[nested + 1] as usize;
                out.values.push(parse_enum_value(cursor, &descriptor.value[index]));
            }
            3 => {
                cursor.skip_subtree(&loc.path[..nested + 1]);
            }
            4 => {
                let index = loc.path[nested + 1] as usize;
                out.reserved_ranges
                    .push(parse_enum_reserved_range(cursor, &descriptor.reserved_range[index]));
            }
            5 => {
                let index = loc.path[nested + 1] as usize;
                out.reserved_names
                    .push(parse_reserved_name(cursor, descriptor.reserved_name[index].clone()));
            }
            _ => {
                cursor.bump();
            }
        }
    }

    out
}

fn parse_enum_value(cursor: &mut Cursor<'_>, value: &EnumValueDescriptorProto) -> EnumValue {
    let loc = cursor.take_node().expect("enum value location must exist");
    EnumValue {
        comments: Comments::from_location(loc),
        name: value.name().to_string(),
        number: value.number(),
    }
}

fn parse_message_reserved_range(
    cursor: &mut Cursor<'_>,
    range: &prost_types::descriptor_proto::ReservedRange,
) -> ReservedRange {
    let loc = cursor.take_node().expect("reserved range location must exist");
    ReservedRange {
        comments: Comments::from_location(loc),
        start: range.start(),
        end: to_inclusive_end(range.end()),
    }
}

fn parse_enum_reserved_range(
    cursor: &mut Cursor<'_>,
    range: &prost_types::enum_descriptor_proto::EnumReservedRange,
) -> ReservedRange {
    let loc = cursor.take_node().expect("reserved range location must exist");
    ReservedRange {
        comments: Comments::from_location(loc),
        // Unlike DescriptorProto.ReservedRange, EnumReservedRange.end is
        // already inclusive on the wire, so no adjustment here.
        start: range.start(),
        end: range.end(),
    }
}

fn parse_reserved_name(cursor: &mut Cursor<'_>, name: String) -> ReservedName {
    let loc = cursor.bump().expect("reserved name location must exist");
    ReservedName {
        comments: Comments::from_location(loc),
        name,
    }
}

fn parse_oneof(
    cursor: &mut Cursor<'_>,
    message: &DescriptorProto,
    oneof: &OneofDescriptorProto,
    _parent_nested: usize,
) -> Oneof {
    let start = cursor.bump().expect("oneof location must exist");
    let nested = start.path.len();
    let mut out = Oneof {
        comments: Comments::from_location(start),
        name: oneof.name().to_string(),
        ..Default::default()
    };

    while let Some(loc) = cursor.peek() {
        if !same_parent(&loc.path, &start.path, nested) {
            break;
        }
        if loc.path.len() <= nested {
            cursor.bump();
            continue;
        }
        match loc.path[nested] {
            1 => {
                cursor.bump();
            }
            2 => {
                cursor.skip_subtree(&loc.path[..nested + 1]);
            }
            _ => {
                cursor.bump();
            }
        }
    }

    let (end_line, end_col) = match start.span.len() {
        4 => (start.span[2], start.span[3]),
        3 => (start.span[0], start.span[2]),
        _ => return out,
    };

    while let Some(loc) = cursor.peek() {
        let before_end = loc.span[0] < end_line || (loc.span[0] == end_line && loc.span[1] < end_col);
        if !before_end {
            break;
        }
        let field_index = loc.path[nested - 1] as usize;
        out.fields.push(parse_field(cursor, &message.field[field_index]));
    }

    out
}

fn lowercase_tail(name: &str) -> String {
    name.split('_').nth(1).unwrap_or(name).to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost_types::source_code_info::Location;
    use prost_types::{FileDescriptorProto, SourceCodeInfo};

    fn loc(path: Vec<i32>, span: Vec<i32>) -> Location {
        Location {
            path,
            span,
            leading_comments: None,
            trailing_comments: None,
            leading_detached_comments: vec![],
        }
    }

    #[test]
    fn reads_package_and_syntax_comments() {
        let mut file = FileDescriptorProto::default();
        file.package = Some("a".to_string());
        file.syntax = Some("proto3".to_string());
        file.source_code_info = Some(SourceCodeInfo {
            location: vec![
                Location {
                    leading_comments: Some(" pkg\n".to_string()),
                    ..loc(vec![2], vec![1, 0, 10])
                },
                Location {
                    leading_comments: Some(" syn\n".to_string()),
                    ..loc(vec![12], vec![0, 0, 10])
                },
            ],
        });

        let ast = read_file(&file);
        assert_eq!(ast.package.name, "a");
        assert_eq!(ast.package.comments.leading, " pkg\n");
        assert_eq!(ast.syntax.name, "proto3");
        assert_eq!(ast.syntax.comments.leading, " syn\n");
    }

    #[test]
    fn reads_message_with_field() {
        let mut field = FieldDescriptorProto::default();
        field.name = Some("x".to_string());
        field.number = Some(1);
        field.r#type = Some(field_descriptor_proto::Type::String as i32);

        let mut message = DescriptorProto::default();
        message.name = Some("M".to_string());
        message.field = vec![field];

        let mut file = FileDescriptorProto::default();
        file.message_type = vec![message];
        file.source_code_info = Some(SourceCodeInfo {
            location: vec![
                loc(vec![4, 0], vec![0, 0, 10]),
                loc(vec![4, 0, 2, 0], vec![1, 2, 10]),
            ],
        });

        let ast = read_file(&file);
        assert_eq!(ast.messages.len(), 1);
        assert_eq!(ast.messages[0].name, "M");
        assert_eq!(ast.messages[0].fields.len(), 1);
        assert_eq!(ast.messages[0].fields[0].name, "x");
        assert_eq!(ast.messages[0].fields[0].r#type, "string");
    }

    #[test]
    fn oneof_member_field_is_not_read_as_a_plain_field() {
        // message M { oneof o { string p = 1; } int32 x = 2; }
        let mut p = FieldDescriptorProto::default();
        p.name = Some("p".to_string());
        p.number = Some(1);
        p.r#type = Some(field_descriptor_proto::Type::String as i32);
        p.oneof_index = Some(0);

        let mut x = FieldDescriptorProto::default();
        x.name = Some("x".to_string());
        x.number = Some(2);
        x.r#type = Some(field_descriptor_proto::Type::Int32 as i32);

        let mut oneof = OneofDescriptorProto::default();
        oneof.name = Some("o".to_string());

        let mut message = DescriptorProto::default();
        message.name = Some("M".to_string());
        message.field = vec![p, x];
        message.oneof_decl = vec![oneof];

        let mut file = FileDescriptorProto::default();
        file.message_type = vec![message];
        file.source_code_info = Some(SourceCodeInfo {
            location: vec![
                loc(vec![4, 0], vec![0, 0, 6, 1]),
                // oneof decl precedes its member field in source order, the
                // way protoc actually emits it, not sorted by path.
                loc(vec![4, 0, 8, 0], vec![2, 2, 4, 3]),
                loc(vec![4, 0, 2, 0], vec![3, 4, 20]),
                loc(vec![4, 0, 2, 1], vec![5, 2, 20]),
            ],
        });

        let ast = read_file(&file);
        let message = &ast.messages[0];
        assert_eq!(message.fields.len(), 1, "only the plain field x");
        assert_eq!(message.fields[0].name, "x");
        assert_eq!(message.oneofs.len(), 1);
        assert_eq!(message.oneofs[0].fields.len(), 1, "only p belongs to o");
        assert_eq!(message.oneofs[0].fields[0].name, "p");
    }

    #[test]
    fn enum_reserved_range_end_is_kept_inclusive() {
        // enum E { reserved 5; }
        let mut range = prost_types::enum_descriptor_proto::EnumReservedRange::default();
        range.start = Some(5);
        range.end = Some(5);

        let mut e = EnumDescriptorProto::default();
        e.name = Some("E".to_string());
        e.reserved_range = vec![range];

        let mut file = FileDescriptorProto::default();
        file.enum_type = vec![e];
        file.source_code_info = Some(SourceCodeInfo {
            location: vec![
                loc(vec![5, 0], vec![0, 0, 10]),
                loc(vec![5, 0, 4, 0], vec![1, 2, 15]),
            ],
        });

        let ast = read_file(&file);
        let reserved = &ast.enums[0].reserved_ranges[0];
        assert_eq!(reserved.start, 5);
        assert_eq!(reserved.end, 5);
    }
}
