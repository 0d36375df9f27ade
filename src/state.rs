//! Abstract state and the per-function dataflow result map.

use std::collections::HashMap;

use crate::instruction::{BlockId, ValueId};
use crate::interval::Interval;

/// A value absent from the map denotes `⊥`.
pub type State = HashMap<ValueId, Interval>;

pub fn lookup(state: &State, id: ValueId) -> Interval {
    state.get(&id).cloned().unwrap_or_else(Interval::bottom)
}

/// Keys into a `DataflowResult`: either "state right after this
/// instruction" or "entry state of this block" (used only to seed the
/// first instruction's incoming lookup).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKey {
    Instr(ValueId),
    Entry(BlockId),
}

pub type DataflowResult = HashMap<StateKey, State>;
