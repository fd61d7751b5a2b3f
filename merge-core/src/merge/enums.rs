use std::collections::{HashMap, HashSet};

use crate::ast::{Enum, EnumValue, ReservedName, ReservedRange};
use crate::numberer::Numberer;

use super::{banner, merge_comments, MergeSpec};

pub(crate) fn merge_enums(
    spec: &MergeSpec,
    base: &[Enum],
    merge: &[Enum],
    merged: &[Enum],
    path: &str,
) -> Vec<Enum> {
    let merge_by_name: HashMap<&str, &Enum> = merge.iter().map(|e| (e.name.as_str(), e)).collect();
    let merged_by_name: HashMap<&str, &Enum> = merged.iter().map(|e| (e.name.as_str(), e)).collect();

    let mut out = Vec::new();
    let mut out_names: HashSet<String> = HashSet::new();

    let mut first = true;
    for base_e in base {
        let full_path = format!("{path}.{}", base_e.name);
        if !spec.base_paths.contains(&full_path) {
            continue;
        }

        let placeholder_merge;
        let merge_e = match merge_by_name.get(base_e.name.as_str()) {
            Some(e) => *e,
            None => {
                placeholder_merge = Enum::named(base_e.name.clone());
                &placeholder_merge
            }
        };

        let placeholder_merged;
        let merged_e = match merged_by_name.get(base_e.name.as_str()) {
            Some(e) => *e,
            None => {
                placeholder_merged = Enum::named(base_e.name.clone());
                &placeholder_merged
            }
        };

        let mut out_e = merge_enum(spec, base_e, merge_e, merged_e);
        if first {
            first = false;
            out_e.comments = out_e.comments.with_banner(&banner("Enums", "base"));
        }
        out_names.insert(out_e.name.clone());
        out.push(out_e);
    }

    let mut first = true;
    for merge_e in merge {
        if out_names.contains(&merge_e.name) {
            continue;
        }

        let base_e = Enum::named(merge_e.name.clone());
        let placeholder_merged;
        let merged_e = match merged_by_name.get(merge_e.name.as_str()) {
            Some(e) => *e,
            None => {
                placeholder_merged = Enum::named(merge_e.name.clone());
                &placeholder_merged
            }
        };

        let mut out_e = merge_enum(spec, &base_e, merge_e, merged_e);
        if first {
            first = false;
            out_e.comments = out_e.comments.with_banner(&banner("Enums", "merge"));
        }
        out.push(out_e);
    }

    out
}

fn merge_enum(spec: &MergeSpec, base: &Enum, merge: &Enum, merged: &Enum) -> Enum {
    let mut out = Enum {
        comments: merge_comments(&base.comments, &merge.comments),
        name: base.name.clone(),
        ..Default::default()
    };

    let mut numberer = Numberer::new(0);
    for range in &merged.reserved_ranges {
        for n in range.start..=range.end {
            numberer.use_reserved(n);
        }
    }
    for v in &merged.values {
        numberer.use_number(&v.name, v.number);
    }

    let reserved_names: HashSet<&str> = merge.reserved_names.iter().map(|r| r.name.as_str()).collect();
    let merge_by_name: HashMap<&str, &EnumValue> =
        merge.values.iter().map(|v| (v.name.as_str(), v)).collect();

    let mut out_names: HashSet<String> = HashSet::new();

    let mut first = true;
    for base_v in &base.values {
        if reserved_names.contains(base_v.name.as_str()) {
            continue;
        }

        let placeholder;
        let merge_v = match merge_by_name.get(base_v.name.as_str()) {
            Some(v) => *v,
            None => {
                placeholder = EnumValue::named(base_v.name.clone());
                &placeholder
            }
        };

        let mut out_v = merge_enum_value(base_v, merge_v, &mut numberer);
        if first {
            first = false;
            out_v.comments = out_v.comments.with_banner(&banner("Values", "base"));
        }
        out_names.insert(out_v.name.clone());
        out.values.push(out_v);
    }

    let mut first = true;
    for merge_v in &merge.values {
        if out_names.contains(&merge_v.name) {
            continue;
        }

        let base_v = EnumValue::named(merge_v.name.clone());
        let mut out_v = merge_enum_value(&base_v, merge_v, &mut numberer);
        if first {
            first = false;
            out_v.comments = out_v.comments.with_banner(&banner("Values", "merge"));
        }
        out_names.insert(out_v.name.clone());
        out.values.push(out_v);
    }

    out.reserved_names.extend(merge.reserved_names.iter().cloned());

    for merged_v in &merged.values {
        if out_names.contains(&merged_v.name) {
            continue;
        }
        out.reserved_ranges.push(ReservedRange {
            comments: crate::ast::Comments {
                leading: format!("Reserved because the field {} was removed", merged_v.name),
                ..Default::default()
            },
            start: merged_v.number,
            end: merged_v.number,
        });
        if !reserved_names.contains(merged_v.name.as_str()) {
            out.reserved_names.push(ReservedName::named(merged_v.name.clone()));
        }
    }

    for name in &merged.reserved_names {
        if reserved_names.contains(name.name.as_str()) {
            continue;
        }
        out.reserved_names.push(name.clone());
    }
    out.reserved_ranges.extend(merged.reserved_ranges.iter().cloned());

    out
}

fn merge_enum_value(base: &EnumValue, merge: &EnumValue, numberer: &mut Numberer) -> EnumValue {
    let mut out = EnumValue {
        comments: merge_comments(&base.comments, &merge.comments),
        name: base.name.clone(),
        number: 0,
    };
    out.number = numberer.number(&out.name);
    out
}
