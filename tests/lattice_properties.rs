//! Property tests for the interval lattice laws of §8: join idempotence
//! (invariant 2), join commutativity (invariant 3), `⊥` as the join
//! identity (invariant 4), widening monotonicity (invariant 5), and
//! constant-fold equivalence for non-overflowing binary ops (invariant 7).

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use boundcheck::interval::Interval;
use boundcheck::types::IrType;

fn i32_ty() -> IrType {
    IrType::i32()
}

proptest! {
    #[test]
    fn join_is_idempotent(n in -10_000i64..10_000) {
        let v = Interval::from_constant(n, i32_ty());
        let joined = v.join(&v);
        assert_eq!(joined.range, v.range);
    }

    #[test]
    fn join_is_commutative(a in -10_000i64..10_000, b in -10_000i64..10_000) {
        let x = Interval::from_constant(a, i32_ty());
        let y = Interval::from_constant(b, i32_ty());
        let xy = x.join(&y);
        let yx = y.join(&x);
        assert_eq!(xy.range, yx.range);
        assert_eq!(xy.entropy, yx.entropy);
    }

    #[test]
    fn bottom_is_the_join_identity(n in -10_000i64..10_000) {
        let v = Interval::from_constant(n, i32_ty());
        let bot = Interval::bottom();
        assert_eq!(v.join(&bot).range, v.range);
        assert_eq!(bot.join(&v).range, v.range);
    }

    /// Widening (invoked internally by every constructor that can grow a
    /// range) never shrinks the range it's given — a pass-through unary
    /// transfer's output must still contain the input endpoints.
    #[test]
    fn widening_never_shrinks_the_range(lo in -50_000i64..0, hi in 0i64..50_000) {
        let v = Interval { range: Some((lo, hi)), entropy: 0.1, ty: Some(i32_ty()) };
        let passed_through = v.unary_transfer(|x, _| Some(x));
        let (lo2, hi2) = passed_through.range.expect("pass-through of a non-bottom range is non-bottom");
        assert!(lo2 <= lo);
        assert!(hi2 >= hi);
    }

    /// For operands whose exact sum doesn't overflow `i32`, the folded
    /// singleton interval matches direct arithmetic.
    #[test]
    fn constant_fold_matches_direct_arithmetic(a in -1_000_000i64..1_000_000, b in -1_000_000i64..1_000_000) {
        let x = Interval::from_constant(a, i32_ty());
        let y = Interval::from_constant(b, i32_ty());
        let sum = x.binary_transfer(&y, |l, r, _| l.checked_add(r));
        assert_eq!(sum.range, Some((a + b, a + b)));
    }
}
