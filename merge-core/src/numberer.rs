//! Stable number allocation for enum values and message fields.
//!
//! One [`Numberer`] is constructed per enum and per message, seeded from the
//! `merged` (previously published) side, then handed down to the value or
//! field mergers that share it. There is no global state.

use std::collections::HashSet;

/// Assigns a stable integer to each named field or enum value, preferring
/// historical bindings recorded via [`Numberer::use_number`] and otherwise
/// handing out the next integer not already used or issued.
pub(crate) struct Numberer {
    reserved: std::collections::HashMap<String, i32>,
    used: HashSet<i32>,
    next: i32,
}

impl Numberer {
    /// `floor` is the first number a fresh allocation returns when nothing
    /// is used yet. Enum values float from 0, fields from 1.
    pub(crate) fn new(floor: i32) -> Numberer {
        Numberer {
            reserved: std::collections::HashMap::new(),
            used: HashSet::new(),
            next: floor - 1,
        }
    }

    /// Records a historical assignment: `number` is marked used and `name`
    /// is bound to it so a later `number(name)` call returns it verbatim.
    pub(crate) fn use_number(&mut self, name: &str, number: i32) {
        self.used.insert(number);
        if !name.is_empty() {
            self.reserved.insert(name.to_string(), number);
        }
    }

    /// Marks `number` used without binding any name to it, for numbers that
    /// are reserved but not currently assigned to a live field or value.
    pub(crate) fn use_reserved(&mut self, number: i32) {
        self.used.insert(number);
    }

    /// Returns `name`'s bound number if it has one, otherwise advances past
    /// every used number and binds `name` to the first free one.
    pub(crate) fn number(&mut self, name: &str) -> i32 {
        if let Some(&number) = self.reserved.get(name) {
            return number;
        }

        loop {
            self.next += 1;
            if !self.used.contains(&self.next) {
                break;
            }
        }

        self.used.insert(self.next);
        self.reserved.insert(name.to_string(), self.next);
        self.next
    }
}
