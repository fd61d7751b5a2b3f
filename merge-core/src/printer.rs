//! Serialises a merged [`crate::ast::File`] to canonical textual schema.
//!
//! Two-space indentation, one level per nesting; each node's comments are
//! emitted before its declaration (detached blocks, then leading, then the
//! declaration itself, then trailing on the same conceptual line).

use crate::ast::{
    Comments, Enum, EnumValue, Field, File, Message, Oneof, ReservedName, ReservedRange,
};

/// Accumulates output text with indentation tracking, mirroring the
/// indent-writer helper the original printer used.
struct Writer {
    buf: String,
    level: u32,
}

impl Writer {
    fn new() -> Writer {
        Writer {
            buf: String::new(),
            level: 0,
        }
    }

    fn indent(&mut self) {
        self.level += 1;
    }

    fn outdent(&mut self) {
        self.level -= 1;
    }

    fn write_indent(&mut self) {
        for _ in 0..self.level {
            self.buf.push_str("  ");
        }
    }

    fn write_line(&mut self, line: &str) {
        self.write_indent();
        self.buf.push_str(line);
        self.buf.push('\n');
    }

    fn write_comments(&mut self, comments: &Comments) {
        for block in &comments.leading_detached {
            for line in block.lines() {
                self.write_indent();
                self.buf.push_str("//");
                self.buf.push_str(line);
                self.buf.push('\n');
            }
            self.buf.push('\n');
        }
        for line in comments.leading.lines() {
            self.write_indent();
            self.buf.push_str("//");
            self.buf.push_str(line);
            self.buf.push('\n');
        }
    }

    fn write_trailing_comment(&mut self, comments: &Comments) {
        for line in comments.trailing.lines() {
            self.write_indent();
            self.buf.push_str("//");
            self.buf.push_str(line);
            self.buf.push('\n');
        }
    }
}

pub fn print_file(file: &File) -> String {
    let mut w = Writer::new();

    w.write_comments(&file.syntax.comments);
    w.write_line(&format!("syntax = \"{}\";", file.syntax.name));
    w.write_trailing_comment(&file.syntax.comments);

    w.write_comments(&file.package.comments);
    w.write_line(&format!("package {};", file.package.name));
    w.write_trailing_comment(&file.package.comments);

    for option in &file.options {
        w.write_comments(&option.comments);
        if option.value.is_empty() {
            w.write_line(&format!("option {};", option.name));
        } else {
            w.write_line(&format!("option {} = {};", option.name, option.value));
        }
        w.write_trailing_comment(&option.comments);
    }

    for dep in &file.dependencies {
        w.write_comments(&dep.comments);
        w.write_line(&format!("import \"{}\";", dep.name));
        w.write_trailing_comment(&dep.comments);
    }

    for e in &file.enums {
        write_enum(&mut w, e);
    }

    for m in &file.messages {
        write_message(&mut w, m);
    }

    w.buf
}

fn write_enum(w: &mut Writer, e: &Enum) {
    w.write_comments(&e.comments);
    w.write_line(&format!("enum {} {{", e.name));
    w.indent();

    for v in &e.values {
        write_enum_value(w, v);
    }
    for r in &e.reserved_ranges {
        write_reserved_range(w, r);
    }
    for n in &e.reserved_names {
        write_reserved_name(w, n);
    }

    w.outdent();
    w.write_line("}");
    w.write_trailing_comment(&e.comments);
}

fn write_enum_value(w: &mut Writer, v: &EnumValue) {
    w.write_comments(&v.comments);
    w.write_line(&format!("{} = {};", v.name, v.number));
    w.write_trailing_comment(&v.comments);
}

fn write_message(w: &mut Writer, m: &Message) {
    w.write_comments(&m.comments);
    w.write_line(&format!("message {} {{", m.name));
    w.indent();

    for nested in &m.messages {
        write_message(w, nested);
    }
    for nested in &m.enums {
        write_enum(w, nested);
    }
    for f in &m.fields {
        write_field(w, f);
    }
    for o in &m.oneofs {
        write_oneof(w, o);
    }
    for r in &m.reserved_ranges {
        write_reserved_range(w, r);
    }
    for n in &m.reserved_names {
        write_reserved_name(w, n);
    }

    w.outdent();
    w.write_line("}");
    w.write_trailing_comment(&m.comments);
}

fn write_field(w: &mut Writer, f: &Field) {
    w.write_comments(&f.comments);
    let label = f.label.as_str();
    let line = if label.is_empty() {
        format!("{} {} = {};", f.r#type, f.name, f.number)
    } else {
        format!("{} {} {} = {};", label, f.r#type, f.name, f.number)
    };
    w.write_line(&line);
    w.write_trailing_comment(&f.comments);
}

fn write_oneof(w: &mut Writer, o: &Oneof) {
    w.write_comments(&o.comments);
    w.write_line(&format!("oneof {} {{", o.name));
    w.indent();
    for f in &o.fields {
        write_field(w, f);
    }
    w.outdent();
    w.write_line("}");
    w.write_trailing_comment(&o.comments);
}

fn write_reserved_range(w: &mut Writer, r: &ReservedRange) {
    w.write_comments(&r.comments);
    w.write_line(&format!("reserved {} to {};", r.start, r.end));
    w.write_trailing_comment(&r.comments);
}

fn write_reserved_name(w: &mut Writer, n: &ReservedName) {
    w.write_comments(&n.comments);
    w.write_line(&format!("reserved \"{}\";", n.name));
    w.write_trailing_comment(&n.comments);
}
