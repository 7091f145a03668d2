//! Sequences consumed by reductions.
//!
//! A reduction only reads its input, one element at a time, in order. The
//! traits here are the narrow interface the backends need:
//!
//! - [`Sequence`]: forward traversal by value, plus peeling the first element
//! - [`RandomAccess`]: known length and cheap prefixes, for counted reductions
//! - [`ParallelSequence`]: order-preserving `rayon` traversal
//!
//! Elements are yielded by value, so a slice of `i32` is a sequence of `i32`
//! on every backend and the same operator works everywhere.

use core::iter::{Copied, Map};
use core::ops::Range;
use core::slice;

use rayon::prelude::*;

/// The element type of a sequence.
pub type ValueOf<S> = <S as Sequence>::Item;

/// A read-only sequence traversed front to back.
pub trait Sequence: Sized {
    /// Type produced for each element.
    type Item;
    /// Iterator over the elements.
    type Elements: Iterator<Item = Self::Item>;

    /// Consumes the sequence into an iterator over its elements.
    fn into_elements(self) -> Self::Elements;

    /// Splits off the first element, or `None` if the sequence is empty.
    fn split_first(self) -> Option<(Self::Item, Self)>;

    /// Number of elements, if known without traversing.
    fn len_hint(&self) -> Option<usize> {
        None
    }
}

/// A sequence with a known length whose prefixes can be taken cheaply.
pub trait RandomAccess: Sequence {
    /// Number of elements.
    fn len(&self) -> usize;

    /// Whether the sequence has no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The first `n` elements. `n` is clamped to [`len`](Self::len).
    #[must_use]
    fn prefix(self, n: usize) -> Self;
}

/// A sequence that can be traversed by `rayon` without losing element order.
pub trait ParallelSequence: Sequence {
    /// Parallel iterator over the elements.
    type ParElements: ParallelIterator<Item = Self::Item>;

    /// Consumes the sequence into a parallel iterator.
    fn into_par_elements(self) -> Self::ParElements;
}

impl<'a, E: Copy> Sequence for &'a [E] {
    type Item = E;
    type Elements = Copied<slice::Iter<'a, E>>;

    fn into_elements(self) -> Self::Elements {
        self.iter().copied()
    }

    fn split_first(self) -> Option<(E, Self)> {
        <[E]>::split_first(self).map(|(first, rest)| (*first, rest))
    }

    fn len_hint(&self) -> Option<usize> {
        Some(<[E]>::len(self))
    }
}

impl<E: Copy> RandomAccess for &[E] {
    fn len(&self) -> usize {
        <[E]>::len(self)
    }

    fn prefix(self, n: usize) -> Self {
        &self[..n.min(<[E]>::len(self))]
    }
}

impl<'a, E: Copy + Send + Sync> ParallelSequence for &'a [E] {
    type ParElements = rayon::iter::Copied<rayon::slice::Iter<'a, E>>;

    fn into_par_elements(self) -> Self::ParElements {
        self.par_iter().copied()
    }
}

macro_rules! impl_range_sequence {
    ($($t:ty),* $(,)?) => {$(
        impl Sequence for Range<$t> {
            type Item = $t;
            type Elements = Range<$t>;

            fn into_elements(self) -> Self::Elements {
                self
            }

            fn split_first(self) -> Option<($t, Self)> {
                (self.start < self.end).then(|| (self.start, self.start + 1..self.end))
            }

            fn len_hint(&self) -> Option<usize> {
                Some(RandomAccess::len(self))
            }
        }

        impl RandomAccess for Range<$t> {
            fn len(&self) -> usize {
                Iterator::size_hint(self).0
            }

            #[allow(clippy::cast_possible_wrap)]
            fn prefix(self, n: usize) -> Self {
                let n = n.min(RandomAccess::len(&self));
                // wrapping keeps signed ranges wider than `<$t>::MAX` correct
                self.start..self.start.wrapping_add(n as $t)
            }
        }

        impl ParallelSequence for Range<$t> {
            type ParElements = rayon::range::Iter<$t>;

            fn into_par_elements(self) -> Self::ParElements {
                self.into_par_iter()
            }
        }
    )*};
}

impl_range_sequence!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

/// Any iterator viewed as a forward-only sequence.
///
/// Forward sequences can only be reduced by backends that walk elements in
/// order, which in practice means the fallback tags.
#[derive(Debug, Clone)]
pub struct Forward<I>(I);

impl<I: Iterator> Sequence for Forward<I> {
    type Item = I::Item;
    type Elements = I;

    fn into_elements(self) -> I {
        self.0
    }

    fn split_first(mut self) -> Option<(I::Item, Self)> {
        let first = self.0.next()?;
        Some((first, self))
    }

    fn len_hint(&self) -> Option<usize> {
        match self.0.size_hint() {
            (lo, Some(hi)) if lo == hi => Some(lo),
            _ => None,
        }
    }
}

/// Wraps an iterable as a [`Forward`] sequence.
pub fn forward<I: IntoIterator>(iter: I) -> Forward<I::IntoIter> {
    Forward(iter.into_iter())
}

/// A sequence whose elements pass through a conversion first.
///
/// This is how a parallel backend accumulates into a wider type: the
/// conversion is explicit, and the operator then works on the wide type.
#[derive(Debug, Clone)]
pub struct Mapped<S, M> {
    inner: S,
    map: M,
}

/// Maps every element of `seq` through `map`.
///
/// ```
/// use briny_reduce::{reduce_by, sequence, ParTag, Plus};
///
/// let bytes = [200u8, 100, 50];
/// let total = reduce_by(ParTag, sequence::map(&bytes[..], u64::from), 0u64, Plus);
/// assert_eq!(total, 350);
/// ```
pub fn map<S, M, U>(seq: S, map: M) -> Mapped<S, M>
where
    S: Sequence,
    M: Fn(S::Item) -> U + Clone,
{
    Mapped { inner: seq, map }
}

impl<S, M, U> Sequence for Mapped<S, M>
where
    S: Sequence,
    M: Fn(S::Item) -> U + Clone,
{
    type Item = U;
    type Elements = Map<S::Elements, M>;

    fn into_elements(self) -> Self::Elements {
        self.inner.into_elements().map(self.map)
    }

    fn split_first(self) -> Option<(U, Self)> {
        let (first, rest) = self.inner.split_first()?;
        Some((
            (self.map)(first),
            Self {
                inner: rest,
                map: self.map,
            },
        ))
    }

    fn len_hint(&self) -> Option<usize> {
        self.inner.len_hint()
    }
}

impl<S, M, U> RandomAccess for Mapped<S, M>
where
    S: RandomAccess,
    M: Fn(S::Item) -> U + Clone,
{
    fn len(&self) -> usize {
        self.inner.len()
    }

    fn prefix(self, n: usize) -> Self {
        Self {
            inner: self.inner.prefix(n),
            map: self.map,
        }
    }
}

impl<S, M, U> ParallelSequence for Mapped<S, M>
where
    S: ParallelSequence,
    M: Fn(S::Item) -> U + Clone + Sync + Send,
    U: Send,
{
    type ParElements = rayon::iter::Map<S::ParElements, M>;

    fn into_par_elements(self) -> Self::ParElements {
        self.inner.into_par_elements().map(self.map)
    }
}
