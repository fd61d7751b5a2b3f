//! `protoc-gen-schema-merge`: a protoc code-generator plugin that three-way
//! merges IDL schema files.
//!
//! Reads a [`CodeGeneratorRequest`] from stdin, groups the files it carries
//! into base/merge/previous-merged triples by stripping whichever of three
//! configured prefixes matches, merges each actionable triple, and writes a
//! [`CodeGeneratorResponse`] to stdout.

use std::io::{Read, Write};
use std::process::ExitCode;

use prost::Message;
use prost_types::compiler::code_generator_response::{Feature, File as ResponseFile};
use prost_types::compiler::{CodeGeneratorRequest, CodeGeneratorResponse};

use schema_merge_core::{discover_triples, merge_triple, output_name, parse_parameter};

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            log::error!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let mut buf = Vec::new();
    std::io::stdin()
        .read_to_end(&mut buf)
        .map_err(|error| format!("failed to read request from stdin: {error}"))?;

    let request = CodeGeneratorRequest::decode(&*buf)
        .map_err(|error| format!("failed to decode CodeGeneratorRequest: {error}"))?;

    let spec = parse_parameter(request.parameter())
        .map_err(|error| format!("invalid generator parameter: {error}"))?;

    let triples = discover_triples(
        &request.proto_file,
        &spec.base_prefix,
        &spec.merge_prefix,
        &spec.merged_prefix,
    );

    let mut response = CodeGeneratorResponse {
        supported_features: Some(Feature::Proto3Optional as u64),
        ..Default::default()
    };

    for triple in &triples {
        if !triple.is_actionable() {
            continue;
        }
        let base = triple.base.expect("is_actionable guarantees base is set");
        let merge = triple.merge.expect("is_actionable guarantees merge is set");

        log::debug!("merging triple with suffix {}", triple.suffix);
        let content = merge_triple(&spec, base, merge, triple.merged);

        response.file.push(ResponseFile {
            name: Some(output_name(merge.name(), &spec.merge_prefix, &spec.merged_prefix)),
            content: Some(content),
            ..Default::default()
        });
    }

    let mut out = Vec::new();
    response
        .encode(&mut out)
        .map_err(|error| format!("failed to encode CodeGeneratorResponse: {error}"))?;

    std::io::stdout()
        .write_all(&out)
        .map_err(|error| format!("failed to write response to stdout: {error}"))?;

    Ok(())
}
