//! Constant-folding oracle: evaluates one or two integer endpoints under a
//! carried element type. Used both to fold literal operands and to
//! transfer interval endpoints through binary/cast instructions.

use crate::instruction::BinOp;
use crate::types::IrType;

fn mask_to_width(v: i64, ty: &IrType) -> i64 {
    match ty {
        IrType::Int(bits) if *bits < 64 => {
            let bits = *bits as u32;
            let shift = 64 - bits;
            (v << shift) >> shift
        }
        _ => v,
    }
}

/// Evaluate `lhs op rhs` under `ty`. Returns `None` on division/modulo by
/// zero; any other overflow wraps (matching typical two's-complement IR
/// semantics) rather than aborting the analysis.
pub fn fold_binary(op: BinOp, lhs: i64, rhs: i64, ty: &IrType) -> Option<i64> {
    let result = match op {
        BinOp::Add => lhs.wrapping_add(rhs),
        BinOp::Sub => lhs.wrapping_sub(rhs),
        BinOp::Mul => lhs.wrapping_mul(rhs),
        BinOp::Div => {
            if rhs == 0 {
                return None;
            }
            lhs.wrapping_div(rhs)
        }
        BinOp::Rem => {
            if rhs == 0 {
                return None;
            }
            lhs.wrapping_rem(rhs)
        }
        BinOp::And => lhs & rhs,
        BinOp::Or => lhs | rhs,
        BinOp::Xor => lhs ^ rhs,
        BinOp::Shl => {
            if !(0..64).contains(&rhs) {
                return None;
            }
            lhs.wrapping_shl(rhs as u32)
        }
        BinOp::Shr => {
            if !(0..64).contains(&rhs) {
                return None;
            }
            lhs.wrapping_shr(rhs as u32)
        }
    };
    Some(mask_to_width(result, ty))
}

/// Evaluate a cast of `value` to `target`, truncating or sign-extending as
/// the target's bit width dictates.
pub fn fold_cast(value: i64, target: &IrType) -> Option<i64> {
    match target {
        IrType::Bool => Some((value != 0) as i64),
        IrType::Int(_) => Some(mask_to_width(value, target)),
        IrType::Float => Some(value),
        _ => None,
    }
}
