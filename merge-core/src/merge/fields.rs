use std::collections::{HashMap, HashSet};

use crate::ast::Field;
use crate::numberer::Numberer;

use super::{banner, merge_comments, rewrite_type, MergeSpec};

/// Merges the plain (non-oneof) fields of a message, or the fields of a
/// single oneof group — both share this routine and a Numberer so that
/// numbers stay unique across the whole message.
pub(crate) fn merge_fields(
    spec: &MergeSpec,
    base: &[Field],
    merge: &[Field],
    numberer: &mut Numberer,
    reserved_names: &HashSet<String>,
) -> Vec<Field> {
    let merge_by_name: HashMap<&str, &Field> = merge.iter().map(|f| (f.name.as_str(), f)).collect();

    let mut out = Vec::new();
    let mut out_names: HashSet<String> = HashSet::new();

    let mut first = true;
    for base_f in base {
        if reserved_names.contains(&base_f.name) {
            continue;
        }

        let placeholder;
        let merge_f = match merge_by_name.get(base_f.name.as_str()) {
            Some(f) => *f,
            None => {
                placeholder = Field {
                    label: base_f.label,
                    r#type: base_f.r#type.clone(),
                    name: base_f.name.clone(),
                    ..Default::default()
                };
                &placeholder
            }
        };

        let mut out_f = merge_field(spec, base_f, merge_f, numberer);
        if first {
            first = false;
            out_f.comments = out_f.comments.with_banner(&banner("Fields", "base"));
        }
        out_names.insert(out_f.name.clone());
        out.push(out_f);
    }

    let mut first = true;
    for merge_f in merge {
        if out_names.contains(&merge_f.name) {
            continue;
        }

        let base_f = Field {
            label: merge_f.label,
            r#type: merge_f.r#type.clone(),
            name: merge_f.name.clone(),
            ..Default::default()
        };

        let mut out_f = merge_field(spec, &base_f, merge_f, numberer);
        if first {
            first = false;
            out_f.comments = out_f.comments.with_banner(&banner("Fields", "merge"));
        }
        out_names.insert(out_f.name.clone());
        out.push(out_f);
    }

    out
}

fn merge_field(spec: &MergeSpec, base: &Field, merge: &Field, numberer: &mut Numberer) -> Field {
    let mut out = Field {
        comments: merge_comments(&base.comments, &merge.comments),
        name: base.name.clone(),
        label: merge.label,
        r#type: merge.r#type.clone(),
        number: 0,
    };

    out.r#type = rewrite_type(spec, &merge.r#type, &out.r#type);
    out.number = numberer.number(&out.name);
    out
}
