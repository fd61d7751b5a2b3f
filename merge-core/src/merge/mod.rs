//! Three-way merge of base, merge and previous-merged schema trees into one
//! output tree.
//!
//! The engine is parameterised by a [`MergeSpec`] and is otherwise a pure
//! function of its three input trees: no component suspends, blocks, or
//! keeps state across file triples.

mod enums;
mod fields;
mod messages;
mod oneofs;

use std::collections::HashSet;

use crate::ast::{Comments, Dependency, File};

/// Parameters that drive a single file-triple merge: which base entities
/// participate, the three package names, and the file-path prefixes used
/// to rewrite dependency imports.
#[derive(Debug, Clone, Default)]
pub struct MergeSpec {
    pub base_paths: HashSet<String>,
    pub base_package: String,
    pub merge_package: String,
    pub merged_package: String,
    /// File-name prefix identifying a base-side input file. Not used by the
    /// merge engine itself (base entities are matched by `base_paths`, not
    /// by file name) but carried so the plugin entrypoint can group the
    /// request's proto files into triples alongside `merge_prefix` and
    /// `merged_prefix`.
    pub base_prefix: String,
    pub merge_prefix: String,
    pub merged_prefix: String,
}

/// Concatenates detached comments and prefers merge's leading/trailing
/// comments over base's when merge supplies a non-empty one. This rule
/// applies uniformly to every entity the engine merges.
pub(crate) fn merge_comments(base: &Comments, merge: &Comments) -> Comments {
    let mut leading_detached = base.leading_detached.clone();
    leading_detached.extend(merge.leading_detached.iter().cloned());

    Comments {
        leading_detached,
        leading: if merge.leading.is_empty() {
            base.leading.clone()
        } else {
            merge.leading.clone()
        },
        trailing: if merge.trailing.is_empty() {
            base.trailing.clone()
        } else {
            merge.trailing.clone()
        },
    }
}

pub(crate) fn banner(section: &str, side: &str) -> String {
    format!("////// {section} from {side} //////")
}

impl MergeSpec {
    pub fn merge_file(&self, base: &File, merge: &File, merged: &File) -> File {
        let mut out = File {
            syntax: crate::ast::Syntax {
                comments: merge_comments(&base.syntax.comments, &merge.syntax.comments),
                name: "proto3".to_string(),
            },
            package: crate::ast::Package {
                comments: merge_comments(&base.package.comments, &merge.package.comments),
                name: merge.package.name.replacen(&self.merge_package, &self.merged_package, 1),
            },
            options: self.merge_options(base, merge),
            dependencies: self.merge_dependencies(base, merge),
            enums: enums::merge_enums(self, &base.enums, &merge.enums, &merged.enums, &base.package.name),
            messages: messages::merge_messages(
                self,
                &base.messages,
                &merge.messages,
                &merged.messages,
                &base.package.name,
            ),
        };

        // Output ordering is entirely derived from base/merge insertion
        // order; nothing here iterates an unordered container.
        out.enums.shrink_to_fit();
        out.messages.shrink_to_fit();
        out
    }

    fn merge_options(&self, base: &File, merge: &File) -> Vec<crate::ast::FileOption> {
        let mut out = Vec::new();

        let merge_by_name: std::collections::HashMap<&str, &crate::ast::FileOption> =
            merge.options.iter().map(|o| (o.name.as_str(), o)).collect();
        let base_names: HashSet<&str> = base.options.iter().map(|o| o.name.as_str()).collect();

        for (i, based) in base.options.iter().enumerate() {
            let mut option = crate::ast::FileOption {
                comments: based.comments.clone(),
                name: based.name.clone(),
                value: String::new(),
            };
            if let Some(merge_opt) = merge_by_name.get(based.name.as_str()) {
                option.comments = merge_comments(&based.comments, &merge_opt.comments);
                option.value = merge_opt.value.clone();
            }
            if i == 0 {
                option.comments = option.comments.with_banner(&banner("Options", "base"));
            }
            out.push(option);
        }

        for (i, merge_opt) in merge
            .options
            .iter()
            .filter(|o| !base_names.contains(o.name.as_str()))
            .enumerate()
        {
            let mut option = merge_opt.clone();
            if i == 0 {
                option.comments = option.comments.with_banner(&banner("Options", "merge"));
            }
            out.push(option);
        }

        out
    }

    fn merge_dependencies(&self, base: &File, merge: &File) -> Vec<Dependency> {
        let mut out = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        let merge_by_name: std::collections::HashMap<&str, &Dependency> =
            merge.dependencies.iter().map(|d| (d.name.as_str(), d)).collect();

        for (i, based) in base.dependencies.iter().enumerate() {
            let mut dep = based.clone();
            if let Some(merge_dep) = merge_by_name.get(based.name.as_str()) {
                dep.comments = merge_comments(&based.comments, &merge_dep.comments);
            }
            if i == 0 {
                dep.comments = dep.comments.with_banner(&banner("Dependencies", "base"));
            }
            seen.insert(dep.name.clone());
            out.push(dep);
        }

        let mut first = true;
        for merge_dep in &merge.dependencies {
            if seen.contains(&merge_dep.name) {
                continue;
            }
            let mut dep = merge_dep.clone();
            if dep.name.starts_with(&self.merge_prefix) {
                dep.name = rewrite_dependency_name(&dep.name, self);
            }
            if first {
                first = false;
                dep.comments = dep.comments.with_banner(&banner("Dependencies", "merge"));
            }
            out.push(dep);
        }

        out
    }
}

fn rewrite_dependency_name(name: &str, spec: &MergeSpec) -> String {
    match name.strip_prefix(spec.merge_prefix.as_str()) {
        Some(tail) => {
            let tail = tail.replacen(spec.merge_package.as_str(), spec.merged_package.as_str(), 1);
            format!("{}{}", spec.merged_prefix, tail)
        }
        None => name.to_string(),
    }
}

/// Rewrites a field's type reference per the engine's type-reference
/// closure rule: a base-domain reference selected by `base_paths` is
/// rewritten to the merged package; a merge-domain reference is rewritten
/// to the merged package; anything else is preserved verbatim.
pub(crate) fn rewrite_type(spec: &MergeSpec, merge_type: &str, out_type: &str) -> String {
    let mut out = out_type.to_string();

    let stripped = out_type.trim_start_matches('.');
    if spec.base_paths.contains(stripped) {
        let base_prefix = format!(".{}", spec.base_package);
        if out.starts_with(&base_prefix) {
            out = out.replacen(&base_prefix, &format!(".{}", spec.merged_package), 1);
        }
    }

    let merge_prefix = format!(".{}", spec.merge_package);
    if merge_type.starts_with(&merge_prefix) {
        out = out.replacen(&merge_prefix, &format!(".{}", spec.merged_package), 1);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Comments;

    #[test]
    fn merge_comments_prefers_merge_when_present() {
        let base = Comments {
            leading_detached: vec!["b1".to_string()],
            leading: "base leading".to_string(),
            trailing: "base trailing".to_string(),
        };
        let merge = Comments {
            leading_detached: vec!["m1".to_string()],
            leading: String::new(),
            trailing: "merge trailing".to_string(),
        };
        let out = merge_comments(&base, &merge);
        assert_eq!(out.leading_detached, vec!["b1", "m1"]);
        assert_eq!(out.leading, "base leading");
        assert_eq!(out.trailing, "merge trailing");
    }

    #[test]
    fn dependency_rewrite_applies_prefix_and_package() {
        let spec = MergeSpec {
            merge_prefix: "b/".to_string(),
            merged_prefix: "c/".to_string(),
            merge_package: "b".to_string(),
            merged_package: "c".to_string(),
            ..Default::default()
        };
        assert_eq!(rewrite_dependency_name("b/sub/b.proto", &spec), "c/sub/c.proto");
        assert_eq!(rewrite_dependency_name("other/x.proto", &spec), "other/x.proto");
    }

    #[test]
    fn type_rewrite_closure() {
        let mut spec = MergeSpec {
            base_package: "a".to_string(),
            merge_package: "b".to_string(),
            merged_package: "c".to_string(),
            ..Default::default()
        };
        spec.base_paths.insert("a.A".to_string());

        assert_eq!(rewrite_type(&spec, ".b.A", ".a.A"), ".c.A");
        assert_eq!(rewrite_type(&spec, ".b.X", ".b.X"), ".c.X");
        assert_eq!(rewrite_type(&spec, ".other.X", ".other.X"), ".other.X");
    }
}
