//! Interprocedural call summaries: per-function, keyed by the tuple of
//! caller-provided argument intervals, caching the inferred return
//! interval.

use std::collections::HashMap;

use crate::interval::Interval;

/// Argument-interval vectors are compared/hashed by `Interval`'s own
/// `Eq`/`Hash`, which key on endpoints only — so identical argument
/// intervals (by endpoint equality) hit the cache regardless of entropy
/// noise accumulated along the way.
pub type ArgKey = Vec<Interval>;

#[derive(Debug, Default)]
pub struct Summaries {
    table: HashMap<String, HashMap<ArgKey, Interval>>,
}

impl Summaries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, function: &str, args: &ArgKey) -> Option<&Interval> {
        self.table.get(function).and_then(|m| m.get(args))
    }

    pub fn contains(&self, function: &str, args: &ArgKey) -> bool {
        self.table.get(function).map(|m| m.contains_key(args)).unwrap_or(false)
    }

    pub fn insert(&mut self, function: &str, args: ArgKey, result: Interval) {
        self.table.entry(function.to_string()).or_default().insert(args, result);
    }
}

/// Zero-argument calls use a single `⊥` slot so the key is never empty.
pub fn arg_key(args: Vec<Interval>) -> ArgKey {
    if args.is_empty() {
        vec![Interval::bottom()]
    } else {
        args
    }
}
