//! Generic per-instruction transfer (§4.3): binary/cast ops through the
//! folding oracle, index-computation bound checking, load/store report
//! commitment, alloca propagation, and the catch-all.
//!
//! Call, return, phi, compare, and branch instructions have their own
//! driver-level handling in `dataflow` and are never routed through here.

use crate::context::Context;
use crate::fold;
use crate::function::Function;
use crate::instruction::{Instr, InstrKind, Operand};
use crate::interval::{Interval, INF, NEG_INF};
use crate::report::{CandidateReport, Reports};
use crate::state::State;
use crate::types::{element_layout, IrType};

fn eval_operand(operand: &Operand, state: &State, ty: &IrType) -> Interval {
    match operand {
        Operand::Const(c) => Interval::from_constant(c.as_i64(), ty.clone()),
        Operand::Value(id) => state.get(id).cloned().unwrap_or_else(Interval::bottom),
    }
}

/// The three ways an index operand can resolve, mirroring the
/// reference implementation's distinction between "value never seen" and
/// "value seen but proved to be ⊥" — only the latter saturates.
enum IndexEval {
    Absent,
    Constant(i64),
    Range(i64, i64),
    BottomInState,
}

fn eval_index(operand: &Operand, state: &State) -> IndexEval {
    match operand {
        Operand::Const(c) => IndexEval::Constant(c.as_i64()),
        Operand::Value(id) => match state.get(id) {
            Some(iv) => match iv.range {
                Some((lo, hi)) => IndexEval::Range(lo, hi),
                None => IndexEval::BottomInState,
            },
            None => IndexEval::Absent,
        },
    }
}

fn check_error(eval: IndexEval, length_bound: usize) -> Option<(i64, i64)> {
    let limit = length_bound as i64;
    match eval {
        IndexEval::Absent => None,
        IndexEval::Constant(k) => {
            if k < 0 || k >= limit {
                Some((k, k))
            } else {
                None
            }
        }
        IndexEval::Range(lo, hi) => {
            if lo < 0 || hi >= limit {
                Some((lo, hi))
            } else {
                None
            }
        }
        IndexEval::BottomInState => Some((NEG_INF, INF)),
    }
}

pub fn apply(func: &Function, instr: &Instr, state: &mut State, context: &Context, reports: &mut Reports) {
    match &instr.kind {
        InstrKind::Binary { op, lhs, rhs, ty } => {
            let l = eval_operand(lhs, state, ty);
            let r = eval_operand(rhs, state, ty);
            let op = *op;
            let result = l.binary_transfer(&r, move |a, b, t| fold::fold_binary(op, a, b, t));
            state.insert(instr.id, result);
        }
        InstrKind::Cast { value, target } => {
            let v = eval_operand(value, state, target);
            let result = v.unary_transfer(fold::fold_cast);
            state.insert(instr.id, result);
        }
        InstrKind::IndexAddr { index, aggregate_ty, .. } => {
            let layout = element_layout(aggregate_ty);
            let eval = eval_index(index, state);
            if let Some((lo, hi)) = check_error(eval, layout.element_count) {
                if let Some(line) = instr.line {
                    let (w_first, w_last) = layout.first_last();
                    let report = CandidateReport {
                        function: func.name.clone(),
                        context: context.clone(),
                        line,
                        length_bound: layout.element_count,
                        byte_range: (lo.saturating_mul(w_first as i64), hi.saturating_mul(w_last as i64)),
                    };
                    reports.record_candidate(context, instr.id, report);
                }
            }
            state.insert(instr.id, Interval::bottom());
        }
        InstrKind::Load { addr } => {
            if let Some(id) = addr.value_id() {
                reports.commit(context, id);
            }
            state.entry(instr.id).or_insert_with(Interval::bottom);
        }
        InstrKind::Store { addr, .. } => {
            if let Some(id) = addr.value_id() {
                reports.commit(context, id);
            }
        }
        InstrKind::Alloca { size, .. } => {
            let v = match size {
                Operand::Const(c) => Interval::from_constant(c.as_i64(), IrType::i64()),
                Operand::Value(id) => state.get(id).cloned().unwrap_or_else(Interval::bottom),
            };
            state.insert(instr.id, v);
        }
        InstrKind::Nop => {
            state.entry(instr.id).or_insert_with(Interval::bottom);
        }
        InstrKind::Compare { .. }
        | InstrKind::Phi { .. }
        | InstrKind::Call { .. }
        | InstrKind::Return(_)
        | InstrKind::Branch(_)
        | InstrKind::CondBranch { .. } => {
            unreachable!("driver-level instruction routed into generic transfer")
        }
    }
}
