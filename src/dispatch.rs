//! Reduction Dispatch Layer
//!
//! This module defines the signature every backend must implement and the
//! entry points that route a call to it.
//!
//! Routing uses two keys:
//! 1. The tag *type*: resolved at compile time through [`Reduce`] and
//!    [`ReduceN`], with no runtime branching.
//! 2. Which of `init` and `op` were supplied: [`reduce`], [`reduce_init`],
//!    [`reduce_by`], or the options form [`reduce_with`].
//!
//! [`reduce_auto`] is the odd one out: it reads the process-global
//! [`Backend`] and picks a tag at runtime.
//!
//! # Design Highlights
//! - **No default body**: [`Reduce`] has no provided method, so a tag without
//!   an implementation is a build error rather than a slow or wrong result
//! - **Zero cost**: tags are zero-sized and every call monomorphizes
//! - **Fallback**: [`HostTag`] and [`SeqTag`] use the sequential fold in
//!   [`generic`](crate::generic), which is the reference result for any
//!   other backend

use core::fmt;

use crate::backend::{get_backend, Backend};
use crate::error::{ReduceError, Result};
use crate::op::{BinaryOp, Plus};
use crate::sequence::{ParallelSequence, RandomAccess, Sequence};
use crate::tag::{HostTag, ParTag, SeqTag, Tag};

/// The fully general reduction, implemented once per backend tag.
///
/// Folds every element of `seq` into `init` with `op` and returns the final
/// accumulator. Implementations may regroup applications only if `op` is
/// associative; they must never reorder elements.
pub trait Reduce<S, T, F>: Tag {
    /// Reduces `seq` starting from `init`.
    fn reduce(self, seq: S, init: T, op: F) -> T;
}

/// Counted reduction over the first `n` elements, implemented once per
/// backend tag.
///
/// `n` has already been validated against the sequence length by
/// [`reduce_n`]; implementations only step forward `n` times.
pub trait ReduceN<S, T, F>: Tag {
    /// Reduces the first `n` elements of `seq` starting from `init`.
    fn reduce_n(self, seq: S, n: usize, init: T, op: F) -> T;
}

/// Options for [`reduce_with`].
///
/// An absent `init` seeds the accumulator with the first element. The
/// operator defaults to [`Plus`].
///
/// ```
/// use briny_reduce::{reduce_with, Maximum, Reduction, SeqTag};
///
/// let data = [4, 1, 7];
/// assert_eq!(reduce_with(SeqTag, &data[..], Reduction::new()).unwrap(), 12);
/// assert_eq!(reduce_with(SeqTag, &data[..], Reduction::new().op(Maximum)).unwrap(), 7);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Reduction<T, F = Plus> {
    init: Option<T>,
    op: F,
}

impl<T> Reduction<T> {
    /// No initial value, default operator.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            init: None,
            op: Plus,
        }
    }
}

impl<T> Default for Reduction<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, F> Reduction<T, F> {
    /// Sets the initial accumulator value.
    #[must_use]
    pub fn init(self, init: T) -> Self {
        Self {
            init: Some(init),
            op: self.op,
        }
    }

    /// Replaces the operator.
    #[must_use]
    pub fn op<G>(self, op: G) -> Reduction<T, G> {
        Reduction {
            init: self.init,
            op,
        }
    }

    /// The initial value, if one was set.
    pub const fn init_value(&self) -> Option<&T> {
        self.init.as_ref()
    }
}

fn trace_dispatch<Tg: Tag, S: Sequence>(entry: &str, seq: &S) {
    match seq.len_hint() {
        Some(len) => log::trace!("{entry}: {} backend, {len} elements", Tg::NAME),
        None => log::trace!("{entry}: {} backend, unknown length", Tg::NAME),
    }
}

/// Reduces a non-empty sequence with `+`, seeding with the first element.
///
/// # Errors
///
/// Returns [`ReduceError::EmptyRange`] if `seq` is empty: there is no element
/// to seed the accumulator and no identity to return.
///
/// # Example
/// ```
/// use briny_reduce::{reduce, HostTag, ReduceError};
///
/// assert_eq!(reduce(HostTag, &[7][..]).unwrap(), 7);
/// assert!(matches!(reduce(HostTag, &[] as &[i32]), Err(ReduceError::EmptyRange)));
/// ```
pub fn reduce<Tg, S>(tag: Tg, seq: S) -> Result<S::Item>
where
    S: Sequence,
    Tg: Reduce<S, S::Item, Plus>,
{
    trace_dispatch::<Tg, S>("reduce", &seq);
    let (first, rest) = seq.split_first().ok_or(ReduceError::EmptyRange)?;
    Ok(tag.reduce(rest, first, Plus))
}

/// Reduces with `+` starting from `init`. An empty sequence returns `init`.
pub fn reduce_init<Tg, S, T>(tag: Tg, seq: S, init: T) -> T
where
    S: Sequence,
    Tg: Reduce<S, T, Plus>,
{
    trace_dispatch::<Tg, S>("reduce_init", &seq);
    tag.reduce(seq, init, Plus)
}

/// Reduces with `op` starting from `init`. An empty sequence returns `init`.
///
/// # Example
/// ```
/// use briny_reduce::{reduce_by, ParTag, SeqTag};
///
/// let data = [1, 2, 3, 4];
/// assert_eq!(reduce_by(SeqTag, &data[..], 0, |a: i32, b: i32| a + b), 10);
/// assert_eq!(reduce_by(ParTag, &data[..], 1, |a: i32, b: i32| a * b), 24);
/// ```
pub fn reduce_by<Tg, S, T, F>(tag: Tg, seq: S, init: T, op: F) -> T
where
    S: Sequence,
    Tg: Reduce<S, T, F>,
{
    trace_dispatch::<Tg, S>("reduce_by", &seq);
    tag.reduce(seq, init, op)
}

/// Reduces according to `options`.
///
/// # Errors
///
/// Returns [`ReduceError::EmptyRange`] if `seq` is empty and `options` has no
/// initial value.
pub fn reduce_with<Tg, S, F>(tag: Tg, seq: S, options: Reduction<S::Item, F>) -> Result<S::Item>
where
    S: Sequence,
    Tg: Reduce<S, S::Item, F>,
{
    trace_dispatch::<Tg, S>("reduce_with", &seq);
    let Reduction { init, op } = options;
    match init {
        Some(init) => Ok(tag.reduce(seq, init, op)),
        None => {
            let (first, rest) = seq.split_first().ok_or(ReduceError::EmptyRange)?;
            Ok(tag.reduce(rest, first, op))
        }
    }
}

/// Reduces the first `n` elements of `seq` with `op`, starting from `init`.
///
/// The accumulator type `T` is independent of the element type; any
/// widening happens inside `op`. `n == 0` returns `init` without calling
/// `op`.
///
/// # Errors
///
/// Returns [`ReduceError::InvalidArgument`] if `n` is negative, does not fit
/// in `usize`, or exceeds the length of `seq`.
///
/// # Example
/// ```
/// use briny_reduce::{reduce_n, ReduceError, SeqTag, Plus};
///
/// let data = [1, 2, 3, 4, 5];
/// assert_eq!(reduce_n(SeqTag, &data[..], 3, 100, Plus).unwrap(), 106);
/// assert!(matches!(
///     reduce_n(SeqTag, &data[..], -1, 0, Plus),
///     Err(ReduceError::InvalidArgument { .. })
/// ));
/// ```
pub fn reduce_n<Tg, S, N, T, F>(tag: Tg, seq: S, n: N, init: T, op: F) -> Result<T>
where
    S: RandomAccess,
    N: TryInto<usize> + Copy + fmt::Display,
    Tg: ReduceN<S, T, F>,
{
    trace_dispatch::<Tg, S>("reduce_n", &seq);
    let count: usize = n.try_into().map_err(|_| {
        ReduceError::invalid_argument("n", format!("count {n} is negative or does not fit in usize"))
    })?;
    let len = seq.len();
    if count > len {
        return Err(ReduceError::invalid_argument(
            "n",
            format!("count {count} exceeds sequence length {len}"),
        ));
    }
    if count == 0 {
        return Ok(init);
    }
    Ok(tag.reduce_n(seq, count, init, op))
}

/// Reduces on the backend chosen by [`set_backend`](crate::backend::set_backend).
///
/// # Behavior
/// `Host` and `Sequential` run the ordered fallback, `Parallel` runs on
/// `rayon`. `Device` cannot reduce arbitrary element and operator types, so
/// it is reported as a missing specialization; use
/// [`DeviceTag`](crate::tag::DeviceTag) directly for `f32` data.
///
/// # Errors
///
/// Returns [`ReduceError::MissingSpecialization`] when the selected backend
/// has no implementation for this shape.
pub fn reduce_auto<S, F>(seq: S, init: S::Item, op: F) -> Result<S::Item>
where
    S: ParallelSequence,
    S::Item: Send,
    F: BinaryOp<S::Item> + Sync,
{
    match get_backend() {
        Backend::Device => Err(ReduceError::missing_specialization(
            Backend::Device,
            "reduce",
        )),
        Backend::Parallel => Ok(reduce_by(ParTag, seq, init, op)),
        Backend::Sequential => Ok(reduce_by(SeqTag, seq, init, op)),
        Backend::Host => Ok(reduce_by(HostTag, seq, init, op)),
    }
}
