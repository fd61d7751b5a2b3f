//! In-memory, comment-bearing tree for a single schema file.
//!
//! Nodes are produced by [`crate::reader`], consumed (read-only) by
//! [`crate::merge`], and serialised by [`crate::printer`]. The merge engine
//! never mutates an input node in place; every output node is freshly
//! allocated, so `Comments` and its owning structs derive `Clone` rather than
//! being reference-counted.

use prost_types::source_code_info::Location;

/// The three comment slots every node carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comments {
    /// Stand-alone comment blocks preceding the node, separated from it and
    /// from each other by at least one blank line.
    pub leading_detached: Vec<String>,

    /// A single comment block immediately above the node with no blank line.
    pub leading: String,

    /// A single comment block trailing the node on its own line.
    pub trailing: String,
}

impl Comments {
    pub(crate) fn from_location(location: &Location) -> Comments {
        Comments {
            leading_detached: location.leading_detached_comments.clone(),
            leading: location.leading_comments.clone().unwrap_or_default(),
            trailing: location.trailing_comments.clone().unwrap_or_default(),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.leading_detached.is_empty() && self.leading.is_empty() && self.trailing.is_empty()
    }

    /// Prepends a banner block ahead of any existing detached comments,
    /// used by the merge engine to mark where a base or merge section
    /// begins in the output.
    pub(crate) fn with_banner(mut self, banner: &str) -> Comments {
        self.leading_detached.insert(0, banner.to_string());
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct Syntax {
    pub comments: Comments,
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct Package {
    pub comments: Comments,
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct Dependency {
    pub comments: Comments,
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct FileOption {
    pub comments: Comments,
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default)]
pub struct File {
    pub syntax: Syntax,
    pub package: Package,
    pub options: Vec<FileOption>,
    pub dependencies: Vec<Dependency>,
    pub enums: Vec<Enum>,
    pub messages: Vec<Message>,
}

impl File {
    pub(crate) fn enums(&self) -> &[Enum] {
        &self.enums
    }

    pub(crate) fn messages(&self) -> &[Message] {
        &self.messages
    }
}

#[derive(Debug, Clone, Default)]
pub struct Enum {
    pub comments: Comments,
    pub name: String,
    pub values: Vec<EnumValue>,
    pub reserved_ranges: Vec<ReservedRange>,
    pub reserved_names: Vec<ReservedName>,
}

impl Enum {
    pub(crate) fn named(name: impl Into<String>) -> Enum {
        Enum {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EnumValue {
    pub comments: Comments,
    pub name: String,
    pub number: i32,
}

impl EnumValue {
    pub(crate) fn named(name: impl Into<String>) -> EnumValue {
        EnumValue {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// A field's label, mirroring the subset of `FieldDescriptorProto.Label`
/// that schema text distinguishes (`required` has no proto3 surface).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Label {
    #[default]
    None,
    Optional,
    Repeated,
    /// Proto2-only; schema text the engine emits is forced to proto3
    /// syntax, but a base or merge input tree may still carry it.
    Required,
}

impl Label {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Label::None => "",
            Label::Optional => "optional",
            Label::Repeated => "repeated",
            Label::Required => "required",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Message {
    pub comments: Comments,
    pub name: String,
    pub enums: Vec<Enum>,
    pub messages: Vec<Message>,
    pub fields: Vec<Field>,
    pub oneofs: Vec<Oneof>,
    pub reserved_ranges: Vec<ReservedRange>,
    pub reserved_names: Vec<ReservedName>,
}

impl Message {
    pub(crate) fn named(name: impl Into<String>) -> Message {
        Message {
            name: name.into(),
            ..Default::default()
        }
    }

    pub(crate) fn enums(&self) -> &[Enum] {
        &self.enums
    }

    pub(crate) fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub(crate) fn fields(&self) -> &[Field] {
        &self.fields
    }
}

#[derive(Debug, Clone, Default)]
pub struct Field {
    pub comments: Comments,
    pub name: String,
    pub number: i32,
    pub label: Label,
    pub r#type: String,
}

impl Field {
    pub(crate) fn named(name: impl Into<String>) -> Field {
        Field {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Oneof {
    pub comments: Comments,
    pub name: String,
    pub fields: Vec<Field>,
}

impl Oneof {
    pub(crate) fn named(name: impl Into<String>) -> Oneof {
        Oneof {
            name: name.into(),
            ..Default::default()
        }
    }

    pub(crate) fn fields(&self) -> &[Field] {
        &self.fields
    }
}

/// An inclusive `[start, end]` range of reserved numbers. The descriptor
/// wire form stores an exclusive end; the reader converts on the way in and
/// the printer converts back on the way out.
#[derive(Debug, Clone, Default)]
pub struct ReservedRange {
    pub comments: Comments,
    pub start: i32,
    pub end: i32,
}

#[derive(Debug, Clone, Default)]
pub struct ReservedName {
    pub comments: Comments,
    pub name: String,
}

impl ReservedName {
    pub(crate) fn named(name: impl Into<String>) -> ReservedName {
        ReservedName {
            name: name.into(),
            ..Default::default()
        }
    }
}
