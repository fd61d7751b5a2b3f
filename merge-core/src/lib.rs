//! Three-way merge engine for a protobuf-style schema IDL.
//!
//! A codebase that forks a published schema (*base*) and layers local edits
//! on top (*merge*) uses this crate to produce a new schema (*merged*)
//! whose field and enum numbers stay wire-compatible with any previously
//! published version of the merged schema (the *previous-merged* tree).
//!
//! The crate has no process boundary of its own: it consumes parsed
//! [`prost_types::FileDescriptorProto`] values and produces strings. The
//! `protoc-gen-schema-merge` binary owns the stdin/stdout codegen-plugin
//! envelope and is the only thing that calls into [`merge_triple`].

pub mod ast;
pub mod config;
pub mod error;
pub mod merge;
mod numberer;
pub mod printer;
pub mod reader;

use prost_types::FileDescriptorProto;

pub use config::{discover_triples, output_name, parse_parameter, Triple};
pub use error::ConfigError;
pub use merge::MergeSpec;

/// Runs the full per-triple pipeline: read the three descriptor trees into
/// ASTs, merge them, print the result. `merged` is `None` when no
/// previous-merged file exists for this suffix, in which case the engine
/// behaves as though it were an empty file (the Numberer starts from its
/// floor for every enum and message).
pub fn merge_triple(
    spec: &MergeSpec,
    base: &FileDescriptorProto,
    merge: &FileDescriptorProto,
    merged: Option<&FileDescriptorProto>,
) -> String {
    let base_ast = reader::read_file(base);
    let merge_ast = reader::read_file(merge);
    let merged_ast = match merged {
        Some(descriptor) => reader::read_file(descriptor),
        None => ast::File::default(),
    };

    let out = spec.merge_file(&base_ast, &merge_ast, &merged_ast);
    printer::print_file(&out)
}
