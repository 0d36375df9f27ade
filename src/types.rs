//! Aggregate type model and the byte-width oracle.
//!
//! The oracle answers one question for the transfer function: given the
//! type being indexed into, what is the indexable element count `L`, and
//! what are the per-element byte widths used to scale an index range into
//! a byte range?

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IrType {
    Void,
    Bool,
    /// Signed integer of the given bit width (8, 16, 32, 64, ...).
    Int(u8),
    Float,
    Pointer(Box<IrType>),
    Array { element: Box<IrType>, count: usize },
    Struct { name: String, fields: Vec<(String, IrType)> },
}

impl IrType {
    pub fn i32() -> Self {
        IrType::Int(32)
    }

    pub fn i64() -> Self {
        IrType::Int(64)
    }

    /// Flat byte size of a value of this type. Struct widths are the sum of
    /// field widths (no padding/alignment model; not needed by the oracle).
    pub fn byte_width(&self) -> u32 {
        match self {
            IrType::Void => 0,
            IrType::Bool => 1,
            IrType::Int(bits) => (*bits as u32) / 8,
            IrType::Float => 8,
            IrType::Pointer(_) => 8,
            IrType::Array { element, count } => element.byte_width() * (*count as u32),
            IrType::Struct { fields, .. } => fields.iter().map(|(_, t)| t.byte_width()).sum(),
        }
    }
}

/// Per-element byte widths plus the element count used as the index bound.
///
/// Arrays/vectors return one width entry per element (all equal, the base
/// element's width). Structs return one entry per field, in declaration
/// order, since fields may have different widths. Anything else is treated
/// as a single scalar element of its own width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementLayout {
    pub widths: Vec<u32>,
    pub element_count: usize,
}

impl ElementLayout {
    /// First and last element width, used to scale a lo/hi index range into
    /// a byte range. Falls back to 0 on an empty layout.
    pub fn first_last(&self) -> (u32, u32) {
        let first = self.widths.first().copied().unwrap_or(0);
        let last = self.widths.last().copied().unwrap_or(0);
        (first, last)
    }
}

pub fn element_layout(ty: &IrType) -> ElementLayout {
    match ty {
        IrType::Array { element, count } => {
            let w = element.byte_width();
            ElementLayout {
                widths: vec![w; *count],
                element_count: *count,
            }
        }
        IrType::Struct { fields, .. } => {
            let widths: Vec<u32> = fields.iter().map(|(_, t)| t.byte_width()).collect();
            let element_count = widths.len();
            ElementLayout { widths, element_count }
        }
        IrType::Pointer(_) => ElementLayout { widths: Vec::new(), element_count: 0 },
        other => {
            let w = other.byte_width();
            ElementLayout { widths: vec![w], element_count: 1 }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_layout_is_per_element() {
        let ty = IrType::Array { element: Box::new(IrType::i32()), count: 10 };
        let layout = element_layout(&ty);
        assert_eq!(layout.element_count, 10);
        assert_eq!(layout.widths, vec![4; 10]);
        assert_eq!(layout.first_last(), (4, 4));
    }

    #[test]
    fn struct_layout_is_per_field() {
        let ty = IrType::Struct {
            name: "pair".into(),
            fields: vec![("a".into(), IrType::i32()), ("b".into(), IrType::i64())],
        };
        let layout = element_layout(&ty);
        assert_eq!(layout.element_count, 2);
        assert_eq!(layout.widths, vec![4, 8]);
        assert_eq!(layout.first_last(), (4, 8));
    }

    #[test]
    fn scalar_layout_is_single_element() {
        let layout = element_layout(&IrType::i64());
        assert_eq!(layout.element_count, 1);
        assert_eq!(layout.widths, vec![8]);
    }
}
