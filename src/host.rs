//! Parallel host reduction
//!
//! # Host Backend
//!
//! [`ParTag`]'s implementation of [`Reduce`] and [`ReduceN`], built on
//! [`rayon`](https://docs.rs/rayon).
//!
//! Each worker folds a contiguous run of elements sequentially, seeding
//! with the first element of its run, so no identity value is needed. The
//! partial results are then merged pairwise in sequence order and finally
//! folded onto `init`. Element order is never changed, only grouping, so an
//! associative operator gives the same result as the sequential fallback
//! even when it is not commutative.
//!
//! Inputs shorter than [`SEQUENTIAL_CUTOFF`] skip the thread pool.
//!
//! Parallel reduction needs the accumulator and element types to agree,
//! since partials are merged with the same operator. To accumulate into a
//! wider type, map the sequence first with [`sequence::map`](crate::sequence::map).

use rayon::prelude::*;

use crate::dispatch::{Reduce, ReduceN};
use crate::generic;
use crate::op::BinaryOp;
use crate::sequence::{ParallelSequence, RandomAccess};
use crate::tag::ParTag;

/// Below this many elements the reduction runs on the calling thread.
pub const SEQUENTIAL_CUTOFF: usize = 1 << 12;

/// Merges two optional partial results, keeping left before right.
#[inline]
fn merge<T, F: BinaryOp<T>>(op: &F, left: Option<T>, right: Option<T>) -> Option<T> {
    match (left, right) {
        (Some(l), Some(r)) => Some(op.apply(l, r)),
        (l, None) => l,
        (None, r) => r,
    }
}

/// Reduces `seq` on the `rayon` pool without an initial value.
///
/// Returns `None` for an empty sequence.
pub fn par_fold_first<S, F>(seq: S, op: &F) -> Option<S::Item>
where
    S: ParallelSequence,
    S::Item: Send,
    F: BinaryOp<S::Item> + Sync,
{
    seq.into_par_elements()
        .fold(|| None, |acc, elem| merge(op, acc, Some(elem)))
        .reduce(|| None, |left, right| merge(op, left, right))
}

impl<S, F> Reduce<S, S::Item, F> for ParTag
where
    S: ParallelSequence,
    S::Item: Send,
    F: BinaryOp<S::Item> + Sync,
{
    fn reduce(self, seq: S, init: S::Item, op: F) -> S::Item {
        if seq.len_hint().is_some_and(|len| len < SEQUENTIAL_CUTOFF) {
            return generic::fold(seq, init, op);
        }
        match par_fold_first(seq, &op) {
            Some(partial) => op.apply(init, partial),
            None => init,
        }
    }
}

impl<S, F> ReduceN<S, S::Item, F> for ParTag
where
    S: ParallelSequence + RandomAccess,
    S::Item: Send,
    F: BinaryOp<S::Item> + Sync,
{
    fn reduce_n(self, seq: S, n: usize, init: S::Item, op: F) -> S::Item {
        self.reduce(seq.prefix(n), init, op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::{Maximum, Minimum, Plus};
    use crate::sequence;
    use crate::tag::SeqTag;

    #[test]
    fn small_inputs_match_sequential() {
        let data: Vec<i64> = (1..=100).collect();
        assert_eq!(ParTag.reduce(&data[..], 0, Plus), 5050);
        assert_eq!(ParTag.reduce(&data[..], 0, Maximum), 100);
    }

    #[test]
    fn large_inputs_run_in_parallel_and_match() {
        let data: Vec<u64> = (0..100_000).collect();
        let expected = SeqTag.reduce(&data[..], 7u64, Plus);
        assert_eq!(ParTag.reduce(&data[..], 7, Plus), expected);
        assert_eq!(ParTag.reduce(&data[..], u64::MAX, Minimum), 0);
    }

    #[test]
    fn order_is_preserved_for_non_commutative_operators() {
        // 2x2 matrix product is associative but not commutative
        type M = [u64; 4];
        fn matmul(a: M, b: M) -> M {
            const P: u64 = 1_000_003;
            [
                (a[0] * b[0] + a[1] * b[2]) % P,
                (a[0] * b[1] + a[1] * b[3]) % P,
                (a[2] * b[0] + a[3] * b[2]) % P,
                (a[2] * b[1] + a[3] * b[3]) % P,
            ]
        }
        let mats: Vec<M> = (0..10_000u64)
            .map(|i| [i % 7 + 1, i % 3, i % 5, i % 11 + 1])
            .collect();
        let identity = [1, 0, 0, 1];
        let sequential = SeqTag.reduce(&mats[..], identity, matmul);
        let parallel = ParTag.reduce(&mats[..], identity, matmul);
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn empty_input_returns_init() {
        assert_eq!(ParTag.reduce(&[] as &[i32], -3, Plus), -3);
        assert_eq!(par_fold_first(&[] as &[i32], &Plus), None);
    }

    #[test]
    fn mapped_sequences_widen_before_merging() {
        let bytes = vec![255u8; 10_000];
        let total = ParTag.reduce(sequence::map(&bytes[..], u64::from), 0, Plus);
        assert_eq!(total, 2_550_000);
    }

    #[test]
    fn reduce_n_takes_a_prefix() {
        let data: Vec<i32> = (1..=10_000).collect();
        assert_eq!(ParTag.reduce_n(&data[..], 3, 100, Plus), 106);
        assert_eq!(ParTag.reduce_n(1u64..10_001, 5_000, 0, Plus), 12_502_500);
    }
}
