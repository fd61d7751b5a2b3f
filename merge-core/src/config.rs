//! Parses the host's generator parameter string into a [`crate::merge::MergeSpec`],
//! and groups the descriptor files it hands over into base/merge/merged
//! triples.

use std::collections::HashMap;

use log::debug;
use prost_types::FileDescriptorProto;

use crate::error::ConfigError;
use crate::merge::MergeSpec;

/// Parses a comma-separated `key=value` parameter string into a
/// [`MergeSpec`]. Recognises `prefix=`, `package=` (each required exactly
/// three times, in base/merge/merged order) and `paths=` (zero or more).
pub fn parse_parameter(parameter: &str) -> Result<MergeSpec, ConfigError> {
    let mut prefixes = Vec::new();
    let mut packages = Vec::new();
    let mut base_paths = std::collections::HashSet::new();

    for token in parameter.split(',') {
        if token.is_empty() {
            continue;
        }

        let Some((key, value)) = token.split_once('=') else {
            return Err(ConfigError::UnknownKey(token.to_string()));
        };

        match key {
            "prefix" => prefixes.push(value.to_string()),
            "package" => packages.push(value.to_string()),
            "paths" => {
                base_paths.insert(value.to_string());
            }
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
    }

    if prefixes.len() != 3 {
        return Err(ConfigError::WrongPrefixCount(prefixes.len()));
    }
    if packages.len() != 3 {
        return Err(ConfigError::WrongPackageCount(packages.len()));
    }

    debug!(
        "parsed merge spec: packages={:?} prefixes={:?} paths={}",
        packages,
        prefixes,
        base_paths.len()
    );

    Ok(MergeSpec {
        base_paths,
        base_package: packages[0].clone(),
        merge_package: packages[1].clone(),
        merged_package: packages[2].clone(),
        base_prefix: prefixes[0].clone(),
        merge_prefix: prefixes[1].clone(),
        merged_prefix: prefixes[2].clone(),
    })
}

/// A file-name suffix and whichever of the three descriptor files were
/// found under that suffix once their respective prefix was stripped.
#[derive(Debug, Default)]
pub struct Triple<'a> {
    pub suffix: String,
    pub base: Option<&'a FileDescriptorProto>,
    pub merge: Option<&'a FileDescriptorProto>,
    pub merged: Option<&'a FileDescriptorProto>,
}

impl<'a> Triple<'a> {
    /// Only `(base, merge)` pairs trigger output; the previous-merged file
    /// may legitimately be absent.
    pub fn is_actionable(&self) -> bool {
        self.base.is_some() && self.merge.is_some()
    }
}

enum Slot {
    Base,
    Merge,
    Merged,
}

/// Groups descriptor files by suffix after stripping whichever of the
/// three prefixes matches first (base, then merge, then merged).
pub fn discover_triples<'a>(
    files: &'a [FileDescriptorProto],
    base_prefix: &str,
    merge_prefix: &str,
    merged_prefix: &str,
) -> Vec<Triple<'a>> {
    let mut order: Vec<String> = Vec::new();
    let mut by_suffix: HashMap<String, Triple<'a>> = HashMap::new();

    for file in files {
        let name = file.name();
        let (slot, suffix) = if let Some(s) = name.strip_prefix(base_prefix) {
            (Slot::Base, s)
        } else if let Some(s) = name.strip_prefix(merge_prefix) {
            (Slot::Merge, s)
        } else if let Some(s) = name.strip_prefix(merged_prefix) {
            (Slot::Merged, s)
        } else {
            continue;
        };

        let entry = by_suffix.entry(suffix.to_string()).or_insert_with(|| {
            order.push(suffix.to_string());
            Triple {
                suffix: suffix.to_string(),
                ..Default::default()
            }
        });

        match slot {
            Slot::Base => entry.base = Some(file),
            Slot::Merge => entry.merge = Some(file),
            Slot::Merged => entry.merged = Some(file),
        }
    }

    order
        .into_iter()
        .filter_map(|suffix| by_suffix.remove(&suffix))
        .collect()
}

/// The merge-side file name with `merge_prefix` rewritten to `merged_prefix`.
pub fn output_name(merge_name: &str, merge_prefix: &str, merged_prefix: &str) -> String {
    match merge_name.strip_prefix(merge_prefix) {
        Some(tail) => format!("{merged_prefix}{tail}"),
        None => merge_name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_parameter() {
        let spec = parse_parameter(
            "prefix=a/,prefix=b/,prefix=c/,package=a,package=b,package=c,paths=a.M",
        )
        .unwrap();
        assert_eq!(spec.base_package, "a");
        assert_eq!(spec.merge_package, "b");
        assert_eq!(spec.merged_package, "c");
        assert_eq!(spec.base_prefix, "a/");
        assert_eq!(spec.merge_prefix, "b/");
        assert_eq!(spec.merged_prefix, "c/");
        assert!(spec.base_paths.contains("a.M"));
    }

    #[test]
    fn rejects_unknown_key() {
        let err = parse_parameter("bogus=1").unwrap_err();
        assert_eq!(err, ConfigError::UnknownKey("bogus".to_string()));
    }

    #[test]
    fn rejects_wrong_prefix_count() {
        let err = parse_parameter("prefix=a/,package=a,package=b,package=c").unwrap_err();
        assert_eq!(err, ConfigError::WrongPrefixCount(1));
    }

    #[test]
    fn ignores_empty_tokens() {
        let spec = parse_parameter(
            ",,prefix=a/,prefix=b/,prefix=c/,package=a,package=b,package=c,",
        )
        .unwrap();
        assert_eq!(spec.base_package, "a");
    }

    #[test]
    fn output_name_rewrites_matching_prefix() {
        assert_eq!(output_name("b/x.proto", "b/", "c/"), "c/x.proto");
        assert_eq!(output_name("other/x.proto", "b/", "c/"), "other/x.proto");
    }
}
