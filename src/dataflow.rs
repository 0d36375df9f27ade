//! Generic forward dataflow driver (§4.4): reverse-post-order worklist,
//! predecessor merge, per-instruction dispatch, and the bound-checked
//! successor-skip optimization.

use std::collections::{HashMap, HashSet, VecDeque};

use log::{debug, trace};

use crate::context::Context;
use crate::engine::Engine;
use crate::function::Function;
use crate::instruction::{BlockId, InstrKind, Operand, ValueId};
use crate::interval::{CmpPred, Interval};
use crate::module::Module;
use crate::state::{lookup, DataflowResult, State, StateKey};
use crate::summary::arg_key;
use crate::transfer;
use crate::types::IrType;

/// Worklist of basic blocks, deduplicated so the same block is never
/// queued twice concurrently.
struct WorkList {
    queued: HashSet<BlockId>,
    order: VecDeque<BlockId>,
}

impl WorkList {
    fn new(seed: impl IntoIterator<Item = BlockId>) -> Self {
        let order: VecDeque<BlockId> = seed.into_iter().collect();
        let queued = order.iter().copied().collect();
        Self { queued, order }
    }

    fn add(&mut self, block: BlockId) {
        if self.queued.insert(block) {
            self.order.push_back(block);
        }
    }

    fn take(&mut self) -> Option<BlockId> {
        let block = self.order.pop_front()?;
        self.queued.remove(&block);
        Some(block)
    }
}

/// Analyze one function under a call context and a positional
/// argument-interval vector, returning the per-instruction dataflow
/// result. Recurses into callees through `engine` (shared summaries,
/// reports, and entropy source across the whole module run).
pub fn analyze_function(
    engine: &mut Engine,
    module: &Module,
    func: &Function,
    args: &[Interval],
    context: &Context,
) -> DataflowResult {
    debug!("analyzing {} under context [{}]", func.name, context);
    let mut results: DataflowResult = DataflowResult::new();
    let mut exit_states: HashMap<BlockId, State> = HashMap::new();
    let mut raw_entries: HashMap<BlockId, State> = HashMap::new();

    let mut param_bindings: State = State::new();
    for (param, value) in func.params.iter().zip(args.iter()) {
        param_bindings.insert(param.id, value.clone());
    }

    let preds = func.predecessors();
    let mut worklist = WorkList::new(func.reverse_post_order());

    while let Some(block_id) = worklist.take() {
        let Some(block) = func.block(block_id) else { continue };

        let old_exit = exit_states.get(&block_id).cloned();

        let raw_entry = merge_predecessors(&preds, block_id, &exit_states);
        let old_raw_entry = raw_entries.get(&block_id).cloned();
        if let Some(old) = &old_raw_entry {
            if !old.is_empty() && *old == raw_entry {
                trace!("block {block_id} entry unchanged, skipping reprocessing");
                continue;
            }
        }
        raw_entries.insert(block_id, raw_entry.clone());

        let mut entry = raw_entry;
        for (id, value) in &param_bindings {
            entry.entry(*id).or_insert_with(|| value.clone());
        }
        results.insert(StateKey::Entry(block_id), entry.clone());

        let entry_keys: HashSet<ValueId> = entry.keys().copied().collect();
        let mut state = entry;
        let mut bound_checked = false;

        for instr in &block.instrs {
            match &instr.kind {
                InstrKind::Call { callee, args: call_args } => {
                    let result = handle_call(engine, module, instr.line, callee, call_args, &state, context);
                    if let Some(result) = result {
                        state.insert(instr.id, result);
                    }
                }
                InstrKind::Return(value) => {
                    handle_return(engine, func, args, value, &state);
                }
                InstrKind::Compare { pred, lhs, rhs, ty } => {
                    handle_compare(engine, *pred, lhs, rhs, ty, &mut state);
                }
                InstrKind::Branch(_) => {}
                InstrKind::CondBranch { cond, .. } => {
                    let was_new = cond.value_id().map(|id| !entry_keys.contains(&id)).unwrap_or(true);
                    if was_new {
                        bound_checked = true;
                    }
                }
                InstrKind::Phi { incoming } => {
                    handle_phi(incoming, &mut state, instr.id);
                }
                _ => transfer::apply(func, instr, &mut state, context, &mut engine.reports),
            }
            results.insert(StateKey::Instr(instr.id), state.clone());
        }

        let changed = old_exit.as_ref() != Some(&state);
        exit_states.insert(block_id, state);

        // `bound_checked` suppresses rescheduling even when the exit state
        // changed (§4.7): the block was reprocessed only to propagate a
        // newly-acquired compare refinement into its own state, and
        // re-entering its successors on that account would not converge
        // any faster.
        if !changed || bound_checked {
            trace!("block {block_id} converged or bound-checked, not rescheduling successors");
            continue;
        }
        for succ in block.successors() {
            worklist.add(succ);
        }
    }

    results
}

fn merge_predecessors(preds: &HashMap<BlockId, Vec<BlockId>>, block: BlockId, exit_states: &HashMap<BlockId, State>) -> State {
    let mut merged = State::new();
    let Some(incoming) = preds.get(&block) else { return merged };
    for p in incoming {
        let Some(pred_exit) = exit_states.get(p) else { continue };
        for (id, value) in pred_exit {
            merged
                .entry(*id)
                .and_modify(|existing| *existing = existing.join(value))
                .or_insert_with(|| value.clone());
        }
    }
    merged
}

fn handle_phi(incoming: &[(BlockId, Operand)], state: &mut State, result_id: ValueId) {
    let mut acc = Interval::bottom();
    for (_, operand) in incoming {
        let value = match operand {
            Operand::Const(c) => Interval::from_constant(c.as_i64(), IrType::i64()),
            Operand::Value(id) => match state.get(id) {
                Some(v) => v.clone(),
                None => continue,
            },
        };
        acc = acc.join(&value);
    }
    state.insert(result_id, acc);
}

/// Compare instructions never write a state entry under their own id
/// (§4.7): when exactly one side is a literal and the other is a known
/// variable, refine the variable in place; otherwise leave state alone.
/// The predicate is never flipped based on which side holds the literal.
fn handle_compare(engine: &mut Engine, pred: CmpPred, lhs: &Operand, rhs: &Operand, ty: &IrType, state: &mut State) {
    let lc = lhs.as_const();
    let rc = rhs.as_const();
    if lc.is_some() && rc.is_some() {
        return;
    }
    let lhs_id = lhs.value_id();
    let rhs_id = rhs.value_id();
    let lhs_known = lhs_id.map(|id| state.contains_key(&id)).unwrap_or(false);
    let rhs_known = rhs_id.map(|id| state.contains_key(&id)).unwrap_or(false);

    if lhs_known == rhs_known {
        return;
    }
    if lhs_known {
        if let Some(c) = rc {
            let id = lhs_id.unwrap();
            let prev = state.get(&id).cloned();
            let refined = Interval::refine_from_constant(c.as_i64(), pred, prev.as_ref(), ty.clone(), engine.rng.as_mut());
            state.insert(id, refined);
        }
    } else if let Some(c) = lc {
        let id = rhs_id.unwrap();
        let prev = state.get(&id).cloned();
        let refined = Interval::refine_from_constant(c.as_i64(), pred, prev.as_ref(), ty.clone(), engine.rng.as_mut());
        state.insert(id, refined);
    }
}

/// Build `argAV` from the call's operands, hit/populate the summary cache,
/// and (bounded by context depth) recurse into the callee. A call to a
/// declared-only (undefined) function leaves no result bound.
fn handle_call(
    engine: &mut Engine,
    module: &Module,
    call_line: Option<u32>,
    callee: &str,
    call_args: &[Operand],
    state: &State,
    context: &Context,
) -> Option<Interval> {
    let callee_func = module.get_function(callee)?;

    let raw_args: Vec<Interval> = call_args
        .iter()
        .map(|a| match a {
            Operand::Value(id) => state.get(id).cloned().unwrap_or_else(Interval::bottom),
            Operand::Const(c) => Interval::from_constant(c.as_i64(), IrType::i64()),
        })
        .collect();
    let key = arg_key(raw_args);

    if let Some(cached) = engine.summaries.get(callee, &key) {
        return Some(cached.clone());
    }

    // Pre-insert bottom before recursing so mutual/direct recursion
    // terminates against a cached (if imprecise) answer.
    engine.summaries.insert(callee, key.clone(), Interval::bottom());

    if context.depth() <= engine.config.context_depth_bound {
        if let Some(line) = call_line {
            let child_context = context.extended(line);
            analyze_function(engine, module, callee_func, &key, &child_context);
        }
    }

    Some(engine.summaries.get(callee, &key).cloned().unwrap_or_else(Interval::bottom))
}

/// Return instructions unconditionally overwrite (never join) the
/// function's summary entry for the current argument key; if a function
/// has multiple return paths, the last one executed wins.
fn handle_return(engine: &mut Engine, func: &Function, args: &[Interval], value: &Option<Operand>, state: &State) {
    let result = match value {
        None => Interval::bottom(),
        Some(Operand::Const(c)) => Interval::from_constant(c.as_i64(), func.return_type.clone()),
        Some(Operand::Value(id)) => lookup(state, *id),
    };
    let key = arg_key(args.to_vec());
    engine.summaries.insert(&func.name, key, result);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worklist_deduplicates_pending_blocks() {
        let mut wl = WorkList::new([BlockId(0)]);
        wl.add(BlockId(1));
        wl.add(BlockId(1));
        assert_eq!(wl.take(), Some(BlockId(0)));
        assert_eq!(wl.take(), Some(BlockId(1)));
        assert_eq!(wl.take(), None);
    }
}
