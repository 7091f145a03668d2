//! The generic fallback reduction.
//!
//! A strictly sequential, left-to-right fold. It is always correct, makes no
//! assumption about the operator beyond purity, and is the baseline every
//! specialized backend is tested against.
//!
//! Two macros let a tag opt into an implementation without writing one:
//!
//! - [`generic_fallback!`](crate::generic_fallback): use the sequential fold
//! - [`inherit_reduce!`](crate::inherit_reduce): use the parent tag's impl

use crate::op::BinaryOp;
use crate::sequence::Sequence;
use crate::tag::{HostTag, SeqTag};

/// Folds every element of `seq` into `init`, strictly in sequence order.
///
/// Calls `op` exactly once per element.
///
/// # Example
/// ```
/// use briny_reduce::generic::fold;
///
/// // non-associative, so only the left-to-right order gives 4
/// assert_eq!(fold(&[1, 2, 3][..], 10, |a: i32, b: i32| a - b), 4);
/// ```
pub fn fold<S, T, F>(seq: S, init: T, op: F) -> T
where
    S: Sequence,
    F: BinaryOp<T, S::Item>,
{
    seq.into_elements().fold(init, |acc, elem| op.apply(acc, elem))
}

/// Folds the first `n` elements of `seq` into `init`.
///
/// Only steps forward; a sequence shorter than `n` is folded completely.
pub fn fold_n<S, T, F>(seq: S, n: usize, init: T, op: F) -> T
where
    S: Sequence,
    F: BinaryOp<T, S::Item>,
{
    seq.into_elements()
        .take(n)
        .fold(init, |acc, elem| op.apply(acc, elem))
}

/// Folds a sequence seeded with its own first element.
///
/// Calls `op` once fewer than the sequence length. Returns `None` for an
/// empty sequence.
pub fn fold_first<S, F>(seq: S, op: F) -> Option<S::Item>
where
    S: Sequence,
    F: BinaryOp<S::Item>,
{
    let (first, rest) = seq.split_first()?;
    Some(fold(rest, first, op))
}

/// Implements [`Reduce`](crate::Reduce) and [`ReduceN`](crate::ReduceN) for
/// a tag using the sequential fold.
///
/// ```
/// use briny_reduce::{generic_fallback, reduce_init, Backend, Tag};
///
/// #[derive(Debug, Clone, Copy, Default)]
/// struct Embedded;
///
/// impl Tag for Embedded {
///     const BACKEND: Backend = Backend::Sequential;
///     const NAME: &'static str = "embedded";
/// }
///
/// generic_fallback!(Embedded);
///
/// assert_eq!(reduce_init(Embedded, &[1, 2, 3][..], 0), 6);
/// ```
#[macro_export]
macro_rules! generic_fallback {
    ($tag:ty) => {
        impl<S, T, F> $crate::Reduce<S, T, F> for $tag
        where
            S: $crate::sequence::Sequence,
            F: $crate::op::BinaryOp<T, S::Item>,
        {
            #[inline]
            fn reduce(self, seq: S, init: T, op: F) -> T {
                $crate::generic::fold(seq, init, op)
            }
        }

        impl<S, T, F> $crate::ReduceN<S, T, F> for $tag
        where
            S: $crate::sequence::Sequence,
            F: $crate::op::BinaryOp<T, S::Item>,
        {
            #[inline]
            fn reduce_n(self, seq: S, n: usize, init: T, op: F) -> T {
                $crate::generic::fold_n(seq, n, init, op)
            }
        }
    };
}

/// Implements [`Reduce`](crate::Reduce) and [`ReduceN`](crate::ReduceN) for
/// `child` by delegating to `parent`.
///
/// Fails to compile unless `child` refines `parent`.
#[macro_export]
macro_rules! inherit_reduce {
    ($child:ty => $parent:ty) => {
        const _: fn() = || {
            fn refines<C: $crate::tag::Refines<Parent = P>, P: $crate::tag::Tag>() {}
            refines::<$child, $parent>();
        };

        impl<S, T, F> $crate::Reduce<S, T, F> for $child
        where
            $parent: $crate::Reduce<S, T, F>,
        {
            #[inline]
            fn reduce(self, seq: S, init: T, op: F) -> T {
                <$parent as $crate::Reduce<S, T, F>>::reduce(
                    <$parent as Default>::default(),
                    seq,
                    init,
                    op,
                )
            }
        }

        impl<S, T, F> $crate::ReduceN<S, T, F> for $child
        where
            $parent: $crate::ReduceN<S, T, F>,
        {
            #[inline]
            fn reduce_n(self, seq: S, n: usize, init: T, op: F) -> T {
                <$parent as $crate::ReduceN<S, T, F>>::reduce_n(
                    <$parent as Default>::default(),
                    seq,
                    n,
                    init,
                    op,
                )
            }
        }
    };
}

generic_fallback!(HostTag);
inherit_reduce!(SeqTag => HostTag);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::Plus;
    use crate::sequence::forward;
    use core::cell::RefCell;

    #[test]
    fn fold_visits_elements_in_order() {
        let seen = RefCell::new(Vec::new());
        let total = fold(&[3, 1, 2][..], 0, |acc: i32, e: i32| {
            seen.borrow_mut().push(e);
            acc + e
        });
        assert_eq!(total, 6);
        assert_eq!(seen.into_inner(), vec![3, 1, 2]);
    }

    #[test]
    fn fold_calls_operator_once_per_element() {
        let calls = RefCell::new(0);
        let _ = fold(0u32..10, 0, |acc: u32, e: u32| {
            *calls.borrow_mut() += 1;
            acc + e
        });
        assert_eq!(calls.into_inner(), 10);
    }

    #[test]
    fn fold_first_calls_operator_one_fewer_times() {
        let calls = RefCell::new(0);
        let total = fold_first(&[1, 2, 3, 4][..], |acc: i32, e: i32| {
            *calls.borrow_mut() += 1;
            acc + e
        });
        assert_eq!(total, Some(10));
        assert_eq!(calls.into_inner(), 3);
        assert_eq!(fold_first(&[] as &[i32], Plus), None);
    }

    #[test]
    fn fold_n_only_steps_forward() {
        let data = vec![1, 2, 3, 4, 5];
        assert_eq!(fold_n(forward(data.iter().copied()), 3, 100, Plus), 106);
        assert_eq!(fold_n(forward(data), 9, 0, Plus), 15);
    }

    #[test]
    fn fold_handles_non_commutative_operators() {
        let words = ["x", "y", "z"];
        let joined = fold(forward(words), String::from(">"), |acc: String, w: &str| acc + w);
        assert_eq!(joined, ">xyz");
    }
}
