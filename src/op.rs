//! Binary operators for reductions.
//!
//! A reduction folds an accumulator of type `T` with elements of type `E`
//! through a [`BinaryOp<T, E>`]. Any `Fn(T, E) -> T` closure is an operator;
//! the unit structs in this module are the canonical ones, and the only ones
//! the device backend knows how to run.
//!
//! No implicit conversion happens between `E` and `T`. Accumulating narrow
//! elements into a wider type is written inside the operator:
//!
//! ```
//! use briny_reduce::op::BinaryOp;
//!
//! let widen = |acc: u64, e: u8| acc + u64::from(e);
//! assert_eq!(widen.apply(250, 10), 260);
//! ```

use core::borrow::Borrow;
use core::ops::{Add, Mul};

/// A binary operator `T × E → T`.
///
/// Backends that split the fold ([`ParTag`](crate::ParTag),
/// [`DeviceTag`](crate::tag::DeviceTag)) additionally assume the operator is
/// associative. The generic fallback applies it strictly left to right.
pub trait BinaryOp<T, E = T> {
    /// Combines the running accumulator with one element.
    fn apply(&self, acc: T, elem: E) -> T;
}

impl<T, E, F> BinaryOp<T, E> for F
where
    F: Fn(T, E) -> T,
{
    #[inline]
    fn apply(&self, acc: T, elem: E) -> T {
        self(acc, elem)
    }
}

/// Addition, the default operator when none is given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Plus;

impl<T, E> BinaryOp<T, E> for Plus
where
    T: Add<E, Output = T>,
{
    #[inline]
    fn apply(&self, acc: T, elem: E) -> T {
        acc + elem
    }
}

/// Multiplication.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Multiplies;

impl<T, E> BinaryOp<T, E> for Multiplies
where
    T: Mul<E, Output = T>,
{
    #[inline]
    fn apply(&self, acc: T, elem: E) -> T {
        acc * elem
    }
}

/// Keeps the larger value. Ties keep the accumulator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Maximum;

impl<T, E> BinaryOp<T, E> for Maximum
where
    T: PartialOrd + Clone,
    E: Borrow<T>,
{
    #[inline]
    fn apply(&self, acc: T, elem: E) -> T {
        let elem = elem.borrow();
        if *elem > acc { elem.clone() } else { acc }
    }
}

/// Keeps the smaller value. Ties keep the accumulator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Minimum;

impl<T, E> BinaryOp<T, E> for Minimum
where
    T: PartialOrd + Clone,
    E: Borrow<T>,
{
    #[inline]
    fn apply(&self, acc: T, elem: E) -> T {
        let elem = elem.borrow();
        if *elem < acc { elem.clone() } else { acc }
    }
}
