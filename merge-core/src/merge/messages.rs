use std::collections::{HashMap, HashSet};

use crate::ast::{Message, ReservedName, ReservedRange};
use crate::numberer::Numberer;

use super::enums::merge_enums;
use super::fields::merge_fields;
use super::oneofs::merge_oneofs;
use super::{banner, merge_comments, MergeSpec};

pub(crate) fn merge_messages(
    spec: &MergeSpec,
    base: &[Message],
    merge: &[Message],
    merged: &[Message],
    path: &str,
) -> Vec<Message> {
    let merge_by_name: HashMap<&str, &Message> = merge.iter().map(|m| (m.name.as_str(), m)).collect();
    let merged_by_name: HashMap<&str, &Message> = merged.iter().map(|m| (m.name.as_str(), m)).collect();

    let mut out = Vec::new();
    let mut out_names: HashSet<String> = HashSet::new();

    let mut first = true;
    for base_m in base {
        let full_path = format!("{path}.{}", base_m.name);
        if !spec.base_paths.contains(&full_path) {
            continue;
        }

        let placeholder_merge;
        let merge_m = match merge_by_name.get(base_m.name.as_str()) {
            Some(m) => *m,
            None => {
                placeholder_merge = Message::named(base_m.name.clone());
                &placeholder_merge
            }
        };

        let placeholder_merged;
        let merged_m = match merged_by_name.get(base_m.name.as_str()) {
            Some(m) => *m,
            None => {
                placeholder_merged = Message::named(base_m.name.clone());
                &placeholder_merged
            }
        };

        let mut out_m = merge_message(spec, base_m, merge_m, merged_m, &full_path);
        if first {
            first = false;
            out_m.comments = out_m.comments.with_banner(&banner("Messages", "base"));
        }
        out_names.insert(out_m.name.clone());
        out.push(out_m);
    }

    let mut first = true;
    for merge_m in merge {
        if out_names.contains(&merge_m.name) {
            continue;
        }
        let full_path = format!("{path}.{}", merge_m.name);

        let base_m = Message::named(merge_m.name.clone());
        let placeholder_merged;
        let merged_m = match merged_by_name.get(merge_m.name.as_str()) {
            Some(m) => *m,
            None => {
                placeholder_merged = Message::named(merge_m.name.clone());
                &placeholder_merged
            }
        };

        let mut out_m = merge_message(spec, &base_m, merge_m, merged_m, &full_path);
        if first {
            first = false;
            out_m.comments = out_m.comments.with_banner(&banner("Messages", "merge"));
        }
        out.push(out_m);
    }

    out
}

fn merge_message(spec: &MergeSpec, base: &Message, merge: &Message, merged: &Message, path: &str) -> Message {
    let mut out = Message {
        name: base.name.clone(),
        comments: merge_comments(&base.comments, &merge.comments),
        ..Default::default()
    };

    out.enums = merge_enums(spec, &base.enums, &merge.enums, &merged.enums, path);
    out.messages = merge_messages(spec, &base.messages, &merge.messages, &merged.messages, path);

    let mut numberer = Numberer::new(1);
    for range in &merged.reserved_ranges {
        for n in range.start..=range.end {
            numberer.use_reserved(n);
        }
    }
    for f in &merged.fields {
        numberer.use_number(&f.name, f.number);
    }
    for oneof in &merged.oneofs {
        for f in &oneof.fields {
            numberer.use_number(&f.name, f.number);
        }
    }

    let reserved_names: HashSet<String> = merge.reserved_names.iter().map(|r| r.name.clone()).collect();

    out.fields = merge_fields(spec, &base.fields, &merge.fields, &mut numberer, &reserved_names);
    out.oneofs = merge_oneofs(spec, &base.oneofs, &merge.oneofs, &mut numberer, &reserved_names);

    let mut live_names: HashSet<&str> = out.fields.iter().map(|f| f.name.as_str()).collect();
    live_names.extend(out.oneofs.iter().flat_map(|o| o.fields.iter().map(|f| f.name.as_str())));

    out.reserved_names.extend(merge.reserved_names.iter().cloned());
    for name in &merged.reserved_names {
        if reserved_names.contains(&name.name) {
            continue;
        }
        out.reserved_names.push(name.clone());
    }

    for f in merged.fields.iter().chain(merged.oneofs.iter().flat_map(|o| o.fields.iter())) {
        if live_names.contains(f.name.as_str()) {
            continue;
        }
        out.reserved_ranges.push(ReservedRange {
            comments: crate::ast::Comments {
                leading: format!("Reserved because the field {} was removed", f.name),
                ..Default::default()
            },
            start: f.number,
            end: f.number,
        });
        if !reserved_names.contains(&f.name) {
            out.reserved_names.push(ReservedName::named(f.name.clone()));
            live_names.insert(f.name.as_str());
        }
    }

    out.reserved_ranges.extend(merged.reserved_ranges.iter().cloned());

    out
}
