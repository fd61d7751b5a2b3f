use std::collections::{HashMap, HashSet};

use crate::ast::Oneof;
use crate::numberer::Numberer;

use super::fields::merge_fields;
use super::{banner, merge_comments, MergeSpec};

pub(crate) fn merge_oneofs(
    spec: &MergeSpec,
    base: &[Oneof],
    merge: &[Oneof],
    numberer: &mut Numberer,
    reserved_names: &HashSet<String>,
) -> Vec<Oneof> {
    let merge_by_name: HashMap<&str, &Oneof> = merge.iter().map(|o| (o.name.as_str(), o)).collect();

    let mut out = Vec::new();
    let mut out_names: HashSet<String> = HashSet::new();

    let mut first = true;
    for base_o in base {
        let placeholder;
        let merge_o = match merge_by_name.get(base_o.name.as_str()) {
            Some(o) => *o,
            None => {
                placeholder = Oneof::named(base_o.name.clone());
                &placeholder
            }
        };

        let mut out_o = merge_oneof(spec, base_o, merge_o, numberer, reserved_names);
        if first {
            first = false;
            out_o.comments = out_o.comments.with_banner(&banner("Oneofs", "base"));
        }
        out_names.insert(out_o.name.clone());
        out.push(out_o);
    }

    let mut first = true;
    for merge_o in merge {
        if out_names.contains(&merge_o.name) {
            continue;
        }

        let base_o = Oneof::named(merge_o.name.clone());
        let mut out_o = merge_oneof(spec, &base_o, merge_o, numberer, reserved_names);
        if first {
            first = false;
            out_o.comments = out_o.comments.with_banner(&banner("Oneofs", "merge"));
        }
        out.push(out_o);
    }

    out
}

fn merge_oneof(
    spec: &MergeSpec,
    base: &Oneof,
    merge: &Oneof,
    numberer: &mut Numberer,
    reserved_names: &HashSet<String>,
) -> Oneof {
    Oneof {
        comments: merge_comments(&base.comments, &merge.comments),
        name: base.name.clone(),
        fields: merge_fields(spec, &base.fields, &merge.fields, numberer, reserved_names),
    }
}
