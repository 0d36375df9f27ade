//! Call-site context: an ordered sequence of caller source lines
//! identifying the call path currently being analyzed.

use serde::{Deserialize, Serialize};

/// Large prime used to mix context terms into a bucket hint, matching the
/// reference implementation's context-hash constant.
pub const CONTEXT_HASH_PRIME: u64 = 32_452_657;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Context(pub Vec<u32>);

impl Context {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Extend the context with a new call-site line, returning the child
    /// context (the original is left untouched).
    pub fn extended(&self, line: u32) -> Self {
        let mut next = self.0.clone();
        next.push(line);
        Self(next)
    }

    /// A collision-prone bucket hint, per-term modulo mixing with
    /// `CONTEXT_HASH_PRIME`. Real lookups must key on the full vector (see
    /// `Context`'s `Hash`/`Eq`, which cover every element) — this value is
    /// only a hint for callers that want cheap bucketing.
    pub fn bucket_hint(&self) -> u64 {
        self.0.iter().fold(0u64, |acc, &term| {
            acc.wrapping_add((term as u64).wrapping_mul(CONTEXT_HASH_PRIME)) % CONTEXT_HASH_PRIME
        })
    }
}

impl std::fmt::Display for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|l| l.to_string()).collect();
        write!(f, "{}", parts.join(":"))
    }
}
