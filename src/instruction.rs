//! The IR adapter: functions, blocks, and instructions over stable `u32`
//! handles. A front-end (out of scope here) would populate one of these
//! from a real compiler's IR; the handles are plain indices rather than
//! pointers, so state keyed by them is a pure value comparison.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::interval::CmpPred;
use crate::types::IrType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValueId(pub u32);

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockId(pub u32);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bb{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Constant {
    Int(i64),
    Bool(bool),
}

impl Constant {
    pub fn as_i64(&self) -> i64 {
        match self {
            Constant::Int(v) => *v,
            Constant::Bool(b) => *b as i64,
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Int(v) => write!(f, "{v}"),
            Constant::Bool(b) => write!(f, "{b}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operand {
    Value(ValueId),
    Const(Constant),
}

impl Operand {
    pub fn as_const(&self) -> Option<Constant> {
        match self {
            Operand::Const(c) => Some(*c),
            Operand::Value(_) => None,
        }
    }

    pub fn value_id(&self) -> Option<ValueId> {
        match self {
            Operand::Value(id) => Some(*id),
            Operand::Const(_) => None,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Value(id) => write!(f, "{id}"),
            Operand::Const(c) => write!(f, "{c}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinOp::Add => "add",
            BinOp::Sub => "sub",
            BinOp::Mul => "mul",
            BinOp::Div => "sdiv",
            BinOp::Rem => "srem",
            BinOp::And => "and",
            BinOp::Or => "or",
            BinOp::Xor => "xor",
            BinOp::Shl => "shl",
            BinOp::Shr => "ashr",
        };
        write!(f, "{s}")
    }
}

/// A single SSA instruction. Every instruction — even ones with no usable
/// result, like a store or branch — gets a `ValueId`, matching the LLVM
/// convention that every instruction is itself a value; this gives the
/// dataflow result map a uniform key for "the state right after this
/// instruction" regardless of whether anything downstream reads `id` as an
/// operand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instr {
    pub id: ValueId,
    pub line: Option<u32>,
    pub kind: InstrKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum InstrKind {
    Binary { op: BinOp, lhs: Operand, rhs: Operand, ty: IrType },
    Cast { value: Operand, target: IrType },
    Compare { pred: CmpPred, lhs: Operand, rhs: Operand, ty: IrType },
    Phi { incoming: Vec<(BlockId, Operand)> },
    Call { callee: String, args: Vec<Operand> },
    Return(Option<Operand>),
    Branch(BlockId),
    CondBranch { cond: Operand, then_block: BlockId, else_block: BlockId },
    /// Address-of-element into an aggregate: `base[index]` under `aggregate_ty`.
    IndexAddr { base: Operand, index: Operand, aggregate_ty: IrType },
    Load { addr: Operand },
    Store { addr: Operand, value: Operand },
    Alloca { size: Operand, ty: IrType },
    Nop,
}

impl Instr {
    pub fn is_terminator(&self) -> bool {
        matches!(
            self.kind,
            InstrKind::Return(_) | InstrKind::Branch(_) | InstrKind::CondBranch { .. }
        )
    }

    /// Whether this instruction writes a usable result into the state
    /// (as opposed to just occupying a result-map slot for its own
    /// position, like a store or a branch).
    pub fn yields_value(&self) -> bool {
        matches!(
            self.kind,
            InstrKind::Binary { .. }
                | InstrKind::Cast { .. }
                | InstrKind::Compare { .. }
                | InstrKind::Phi { .. }
                | InstrKind::Call { .. }
                | InstrKind::IndexAddr { .. }
                | InstrKind::Load { .. }
                | InstrKind::Alloca { .. }
        )
    }

    pub fn successors(&self) -> Vec<BlockId> {
        match &self.kind {
            InstrKind::Branch(b) => vec![*b],
            InstrKind::CondBranch { then_block, else_block, .. } => vec![*then_block, *else_block],
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            InstrKind::Binary { op, lhs, rhs, .. } => write!(f, "{} = {op} {lhs}, {rhs}", self.id),
            InstrKind::Cast { value, target } => write!(f, "{} = cast {value} to {target:?}", self.id),
            InstrKind::Compare { pred, lhs, rhs, .. } => write!(f, "{} = cmp {pred:?} {lhs}, {rhs}", self.id),
            InstrKind::Phi { incoming } => write!(f, "{} = phi {incoming:?}", self.id),
            InstrKind::Call { callee, args } => write!(f, "{} = call {callee}({args:?})", self.id),
            InstrKind::Return(v) => write!(f, "return {v:?}"),
            InstrKind::Branch(b) => write!(f, "br {b}"),
            InstrKind::CondBranch { cond, then_block, else_block } => {
                write!(f, "br {cond}, {then_block}, {else_block}")
            }
            InstrKind::IndexAddr { base, index, .. } => write!(f, "{} = gep {base}, {index}", self.id),
            InstrKind::Load { addr } => write!(f, "{} = load {addr}", self.id),
            InstrKind::Store { addr, value } => write!(f, "store {value}, {addr}"),
            InstrKind::Alloca { ty, .. } => write!(f, "{} = alloca {ty:?}", self.id),
            InstrKind::Nop => write!(f, "nop"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicBlock {
    pub id: BlockId,
    pub name: Option<String>,
    pub instrs: Vec<Instr>,
}

impl BasicBlock {
    pub fn new(id: BlockId) -> Self {
        Self { id, name: None, instrs: Vec::new() }
    }

    pub fn terminator(&self) -> Option<&Instr> {
        self.instrs.last().filter(|i| i.is_terminator())
    }

    pub fn successors(&self) -> Vec<BlockId> {
        self.terminator().map(|t| t.successors()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminator_detection() {
        let mut bb = BasicBlock::new(BlockId(0));
        bb.instrs.push(Instr { id: ValueId(0), line: None, kind: InstrKind::Nop });
        bb.instrs.push(Instr { id: ValueId(1), line: None, kind: InstrKind::Return(None) });
        assert!(bb.terminator().is_some());
        assert!(bb.successors().is_empty());
    }

    #[test]
    fn cond_branch_successors() {
        let mut bb = BasicBlock::new(BlockId(0));
        bb.instrs.push(Instr {
            id: ValueId(0),
            line: None,
            kind: InstrKind::CondBranch {
                cond: Operand::Const(Constant::Bool(true)),
                then_block: BlockId(1),
                else_block: BlockId(2),
            },
        });
        assert_eq!(bb.successors(), vec![BlockId(1), BlockId(2)]);
    }
}
