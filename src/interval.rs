//! The interval abstract value: an optional closed integer range, an
//! entropy/looseness score, and the element type the range is interpreted
//! under.

use std::hash::{Hash, Hasher};

use crate::rng::EntropySource;
use crate::types::IrType;

/// Sentinel for "unbounded", chosen small enough that multiplying by any
/// realistic element byte width cannot overflow `i64`.
pub const INF: i64 = 0x0000_FFFF_FFFF_FFFF;
pub const NEG_INF: i64 = -INF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpPred {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone)]
pub struct Interval {
    pub range: Option<(i64, i64)>,
    pub entropy: f64,
    pub ty: Option<IrType>,
}

impl PartialEq for Interval {
    /// Two values are equal iff both are `⊥` or both have ranges with
    /// identical endpoints. Entropy and carried type are deliberately
    /// excluded so that noisy widening doesn't defeat fixpoint detection.
    fn eq(&self, other: &Self) -> bool {
        self.range == other.range
    }
}

impl Eq for Interval {}

impl Hash for Interval {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self.range {
            None => 0i64.hash(state),
            Some((lo, hi)) => cantor_pair(lo, hi).hash(state),
        }
    }
}

/// Cantor-pairing hash over signed endpoints, adequate for bucketing (not
/// collision-free); mirrors the reference implementation's hash scheme.
fn cantor_pair(lo: i64, hi: i64) -> i64 {
    let signed_double = |v: i64| -> i128 {
        if v >= 0 {
            2 * v as i128
        } else {
            -2 * v as i128 - 1
        }
    };
    let a = signed_double(lo);
    let b = signed_double(hi);
    let c = if a >= b { (a * a + a + b) / 2 } else { (a + b * b) / 2 };
    let folded = if (lo < 0 && hi < 0) || (lo >= 0 && hi >= 0) { c } else { -c - 1 } + 1;
    folded as i64
}

fn overlap((l1, h1): (i64, i64), (l2, h2): (i64, i64)) -> i64 {
    let top = h1.min(h2);
    let bot = l1.max(l2);
    if top < bot {
        0
    } else {
        top - bot
    }
}

impl Interval {
    pub fn bottom() -> Self {
        Self { range: None, entropy: 0.0, ty: None }
    }

    pub fn is_bottom(&self) -> bool {
        self.range.is_none()
    }

    pub fn is_saturated(&self) -> bool {
        self.range == Some((NEG_INF, INF))
    }

    pub fn from_constant(c: i64, ty: IrType) -> Self {
        let mut v = Self { range: Some((c, c)), entropy: 0.0, ty: Some(ty) };
        v.widen();
        v
    }

    /// Predicate refinement from a literal `c`, given the previous state of
    /// the value being refined (if any). See §4.1's table.
    pub fn refine_from_constant(
        c: i64,
        pred: CmpPred,
        prev: Option<&Interval>,
        ty: IrType,
        rng: &mut dyn EntropySource,
    ) -> Self {
        let (entropy, range) = predicate_bound(c, pred, prev, rng);
        let mut v = Self { range, entropy, ty: Some(ty) };
        v.widen();
        v
    }

    /// Predicate refinement from another interval: apply the table to both
    /// endpoints independently and take the hull.
    pub fn refine_from_interval(
        &self,
        pred: CmpPred,
        prev: Option<&Interval>,
        rng: &mut dyn EntropySource,
    ) -> Self {
        let Some((lo, hi)) = self.range else {
            return Interval::bottom();
        };
        let (e_lo, b_lo) = predicate_bound(lo, pred, prev, rng);
        let (e_hi, b_hi) = predicate_bound(hi, pred, prev, rng);
        let (Some((lo1, hi1)), Some((lo2, hi2))) = (b_lo, b_hi) else {
            return Interval::bottom();
        };
        let range = Some((lo1.min(lo2), hi1.max(hi2)));
        let entropy = (e_lo + e_hi) / 2.0;
        let ty = self.ty.clone();
        let mut v = Self { range, entropy, ty };
        v.widen();
        v
    }

    /// Unary transfer through a folding oracle `f(value, type) -> Option<i64>`.
    pub fn unary_transfer(&self, f: impl Fn(i64, &IrType) -> Option<i64>) -> Self {
        if self.is_saturated() {
            return self.clone();
        }
        let Some((lo, hi)) = self.range else {
            return Interval::bottom();
        };
        let ty = match &self.ty {
            Some(t) => t.clone(),
            None => return Interval::bottom(),
        };
        let (Some(flo), Some(fhi)) = (f(lo, &ty), f(hi, &ty)) else {
            return Interval::bottom();
        };
        let candidates = [lo, hi, flo, fhi];
        let lo2 = *candidates.iter().min().unwrap();
        let hi2 = *candidates.iter().max().unwrap();
        let mut v = Self { range: Some((lo2, hi2)), entropy: self.entropy, ty: Some(ty) };
        v.widen();
        v
    }

    /// Binary transfer through a folding oracle `g(lhs, rhs, type) -> Option<i64>`.
    /// Evaluates the four corner combinations, plus zero-crossing endpoints
    /// when either operand straddles zero, to cover non-monotone ops like
    /// signed division/modulo near zero.
    pub fn binary_transfer(&self, other: &Interval, g: impl Fn(i64, i64, &IrType) -> Option<i64>) -> Self {
        if self.is_saturated() {
            return self.clone();
        }
        if other.is_saturated() {
            return other.clone();
        }
        let Some((min1, max1)) = self.range else {
            return Interval::bottom();
        };
        let Some((min2, max2)) = other.range else {
            return Interval::bottom();
        };
        let ty = match self.ty.clone().or_else(|| other.ty.clone()) {
            Some(t) => t,
            None => return Interval::bottom(),
        };

        let mut pairs = vec![(min1, min2), (max1, max2), (min1, max2), (max1, min2)];
        if min1 < 0 && max1 > 0 {
            pairs.push((0, min2));
            pairs.push((0, max2));
        }
        if min2 < 0 && max2 > 0 {
            pairs.push((0, min1));
            pairs.push((0, max1));
        }

        let mut values = Vec::with_capacity(pairs.len());
        for (a, b) in pairs {
            match g(a, b, &ty) {
                Some(v) => values.push(v),
                None => return Interval::bottom(),
            }
        }
        let lo = *values.iter().min().unwrap();
        let hi = *values.iter().max().unwrap();
        let mut v = Self {
            range: Some((lo, hi)),
            entropy: (self.entropy + other.entropy) / 2.0,
            ty: Some(ty),
        };
        v.widen();
        v
    }

    /// Join towards "unknown"; the lattice join used to merge predecessor
    /// states.
    pub fn join(&self, other: &Interval) -> Self {
        if self == other {
            return self.clone();
        }
        match (self.range, other.range) {
            (Some((l1, h1)), Some((l2, h2))) => {
                let lo = l1.min(l2);
                let hi = h1.max(h2);
                let ov = overlap((l1, h1), (l2, h2)) as f64;
                let width_a = (h1 - l1 + 1) as f64;
                let width_b = (h2 - l2 + 1) as f64;
                let p_a = ov / width_a;
                let p_b = ov / width_b;
                let entropy = (1.0 - p_a) * self.entropy
                    + (1.0 - p_b) * other.entropy
                    + (p_a * self.entropy + p_b * other.entropy) / 2.0;
                let ty = self.ty.clone().or_else(|| other.ty.clone());
                let mut v = Self { range: Some((lo, hi)), entropy, ty };
                v.widen();
                v
            }
            (Some(_), None) => self.clone(),
            (None, Some(_)) => other.clone(),
            (None, None) => Interval::bottom(),
        }
    }

    /// Enforce termination by promoting loose or wide ranges towards
    /// saturation. See §4.2.
    ///
    /// The reference implementation computes the interval width into a
    /// 32-bit `unsigned`, not a 64-bit integer — so a width adjacent to the
    /// `±INF` sentinel silently wraps instead of reading as astronomically
    /// large. That wraparound is load-bearing: without it, any one-sided
    /// refinement against an unbounded previous state (e.g. `x < 3` with no
    /// prior bound on `x`) would immediately saturate to `[-INF, INF]`,
    /// which contradicts the worked compare-refinement scenario. Mirrored
    /// here via an explicit 32-bit truncation rather than a 64-bit/double
    /// width.
    fn widen(&mut self) {
        let Some((lo, hi)) = self.range else { return };
        if self.is_saturated() {
            return;
        }
        let width_u32 = hi.wrapping_sub(lo).wrapping_add(1) as u32;
        let width = width_u32 as f64;
        if (1.0 - self.entropy) * width > (INF as f64) / 4.0 {
            self.range = Some((NEG_INF, INF));
            return;
        }
        if self.entropy < 0.5 {
            let steps = width_u32 / 256;
            if steps >= 1 {
                let growth = ((width_u32 / 2) as f64).ln();
                let total = growth * steps as f64;
                let lo2 = lo.saturating_sub(total as i64);
                let hi2 = hi.saturating_add(total as i64);
                self.range = Some((lo2.max(NEG_INF), hi2.min(INF)));
                self.entropy = (self.entropy * (1.0 + total / width)).min(1.0);
            }
        }
    }
}

fn predicate_bound(
    value: i64,
    pred: CmpPred,
    prev: Option<&Interval>,
    rng: &mut dyn EntropySource,
) -> (f64, Option<(i64, i64)>) {
    let mut lower = NEG_INF;
    let mut upper = INF;
    let mut entropy = rng.sample();
    if let Some(p) = prev {
        if let Some((lo, hi)) = p.range {
            lower = lo;
            upper = hi;
            entropy = (entropy + p.entropy) / 2.0;
        }
    }
    let bound = match pred {
        CmpPred::Eq => {
            entropy = 0.0;
            Some((value, value))
        }
        CmpPred::Lt => Some((lower, value.saturating_sub(1))),
        CmpPred::Le => Some((lower, value)),
        CmpPred::Gt => Some((value.saturating_add(1), upper)),
        CmpPred::Ge => Some((value, upper)),
        CmpPred::Ne => None,
    };
    (entropy, bound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::FixedEntropy;

    fn i32() -> IrType {
        IrType::i32()
    }

    #[test]
    fn constant_is_a_singleton() {
        let v = Interval::from_constant(5, i32());
        assert_eq!(v.range, Some((5, 5)));
        assert_eq!(v.entropy, 0.0);
    }

    #[test]
    fn join_idempotent() {
        let v = Interval::from_constant(3, i32());
        let joined = v.join(&v);
        assert_eq!(joined.range, v.range);
    }

    #[test]
    fn join_commutative_on_endpoints() {
        let a = Interval::from_constant(1, i32());
        let b = Interval::from_constant(9, i32());
        assert_eq!(a.join(&b).range, b.join(&a).range);
    }

    #[test]
    fn join_with_bottom_is_identity() {
        let a = Interval::from_constant(4, i32());
        let bot = Interval::bottom();
        assert_eq!(a.join(&bot).range, a.range);
        assert_eq!(bot.join(&a).range, a.range);
    }

    #[test]
    fn less_than_refines_upper_bound_only() {
        let mut rng = FixedEntropy(0.2);
        let v = Interval::refine_from_constant(3, CmpPred::Lt, None, i32(), &mut rng);
        assert_eq!(v.range, Some((NEG_INF, 2)));
    }

    #[test]
    fn refinement_narrows_against_previous_state() {
        let mut rng = FixedEntropy(0.2);
        let prev = Interval::from_constant(0, i32());
        let prev = prev.join(&Interval::from_constant(100, i32()));
        let v = Interval::refine_from_constant(50, CmpPred::Lt, Some(&prev), i32(), &mut rng);
        assert_eq!(v.range, Some((0, 49)));
    }

    #[test]
    fn constant_fold_equivalence() {
        let a = Interval::from_constant(3, i32());
        let b = Interval::from_constant(4, i32());
        let sum = a.binary_transfer(&b, |x, y, _| x.checked_add(y));
        assert_eq!(sum.range, Some((7, 7)));
    }

    #[test]
    fn division_by_zero_yields_bottom() {
        let a = Interval::from_constant(10, i32());
        let b = Interval::from_constant(0, i32());
        let quot = a.binary_transfer(&b, |x, y, _| if y == 0 { None } else { x.checked_div(y) });
        assert!(quot.is_bottom());
    }

    #[test]
    fn saturated_operand_propagates_unchanged() {
        let top = Interval { range: Some((NEG_INF, INF)), entropy: 1.0, ty: Some(i32()) };
        let five = Interval::from_constant(5, i32());
        let result = top.binary_transfer(&five, |x, y, _| x.checked_add(y));
        assert!(result.is_saturated());
    }

    #[test]
    fn widening_is_monotone() {
        let mut v = Interval::from_constant(0, i32());
        v.range = Some((0, 10_000));
        v.entropy = 0.1;
        let before = v.range.unwrap();
        v.widen();
        let after = v.range.unwrap();
        assert!(after.0 <= before.0);
        assert!(after.1 >= before.1);
    }

    #[test]
    fn equality_ignores_entropy_and_type() {
        let a = Interval { range: Some((1, 2)), entropy: 0.1, ty: Some(i32()) };
        let b = Interval { range: Some((1, 2)), entropy: 0.9, ty: None };
        assert_eq!(a, b);
    }
}
