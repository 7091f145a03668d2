//! Backend tags.
//!
//! A tag is a zero-sized marker whose *type* selects the reduction
//! implementation. Tags carry no data; only the [`Reduce`]/[`ReduceN`] impls
//! for a tag type matter. A tag without an impl for a given
//! sequence/operator shape simply does not compile at the call site.
//!
//! Tags in one family form a single chain through [`Refines`]. A refined tag
//! either brings its own implementation or adopts its parent's with
//! [`inherit_reduce!`](crate::inherit_reduce).
//!
//! ```text
//! HostTag ──┬── SeqTag   (inherits the sequential fallback)
//!           └── ParTag   (rayon)
//! DeviceTag              (wgpu, separate family)
//! ```

use core::fmt;

use crate::backend::Backend;
use crate::dispatch::{self, Reduce, ReduceN, Reduction};
use crate::error::Result;
use crate::op::Plus;
use crate::sequence::{RandomAccess, Sequence};

/// A backend marker type.
pub trait Tag: Copy + Default + fmt::Debug + Send + Sync + 'static {
    /// The runtime backend this tag corresponds to.
    const BACKEND: Backend;
    /// Human readable name, used in logs.
    const NAME: &'static str;
}

/// A tag that is a more specific form of `Parent`.
pub trait Refines: Tag {
    /// The less specific tag this one refines.
    type Parent: Tag;
}

/// Generic host tag. Reduces with the sequential fallback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct HostTag;

impl Tag for HostTag {
    const BACKEND: Backend = Backend::Host;
    const NAME: &'static str = "host";
}

/// Strictly sequential host tag.
///
/// Always applies the operator left to right, so it is the reference result
/// for non-associative operators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SeqTag;

impl Tag for SeqTag {
    const BACKEND: Backend = Backend::Sequential;
    const NAME: &'static str = "sequential";
}

impl Refines for SeqTag {
    type Parent = HostTag;
}

/// Multi-threaded host tag backed by `rayon`.
///
/// Partial results are combined in sequence order, so the operator must be
/// associative but need not be commutative. Non-associative operators may
/// give results that differ from [`SeqTag`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ParTag;

impl Tag for ParTag {
    const BACKEND: Backend = Backend::Parallel;
    const NAME: &'static str = "parallel";
}

impl Refines for ParTag {
    type Parent = HostTag;
}

/// GPU tag backed by `wgpu`.
///
/// Only `f32` slices reduced with [`Plus`](crate::Plus),
/// [`Maximum`](crate::Maximum) or [`Minimum`](crate::Minimum) are supported.
/// The tree reduction regroups freely, so `f32` sums may differ in the last
/// bits from a sequential sum.
#[cfg(feature = "wgpu")]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DeviceTag;

#[cfg(feature = "wgpu")]
impl Tag for DeviceTag {
    const BACKEND: Backend = Backend::Device;
    const NAME: &'static str = "device";
}

/// A sequence that carries its backend tag.
///
/// Every method forwards to the free function of the same name in
/// [`dispatch`], with the tag taken from `self`.
///
/// ```
/// use briny_reduce::{ParTag, WithTag};
///
/// let data = [1, 2, 3, 4];
/// assert_eq!(data[..].with_tag(ParTag).reduce_init(0), 10);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Tagged<Tg, S> {
    tag: Tg,
    seq: S,
}

impl<Tg: Tag, S: Sequence> Tagged<Tg, S> {
    /// Associates `seq` with `tag`.
    pub const fn new(tag: Tg, seq: S) -> Self {
        Self { tag, seq }
    }

    /// The tag.
    pub const fn tag(&self) -> Tg {
        self.tag
    }

    /// The untagged sequence.
    pub fn into_inner(self) -> S {
        self.seq
    }

    /// See [`dispatch::reduce`].
    ///
    /// # Errors
    ///
    /// [`ReduceError::EmptyRange`](crate::ReduceError::EmptyRange) if the
    /// sequence is empty.
    pub fn reduce(self) -> Result<S::Item>
    where
        Tg: Reduce<S, S::Item, Plus>,
    {
        dispatch::reduce(self.tag, self.seq)
    }

    /// See [`dispatch::reduce_init`].
    pub fn reduce_init<T>(self, init: T) -> T
    where
        Tg: Reduce<S, T, Plus>,
    {
        dispatch::reduce_init(self.tag, self.seq, init)
    }

    /// See [`dispatch::reduce_by`].
    pub fn reduce_by<T, F>(self, init: T, op: F) -> T
    where
        Tg: Reduce<S, T, F>,
    {
        dispatch::reduce_by(self.tag, self.seq, init, op)
    }

    /// See [`dispatch::reduce_with`].
    ///
    /// # Errors
    ///
    /// [`ReduceError::EmptyRange`](crate::ReduceError::EmptyRange) if the
    /// sequence is empty and `options` has no initial value.
    pub fn reduce_with<F>(self, options: Reduction<S::Item, F>) -> Result<S::Item>
    where
        Tg: Reduce<S, S::Item, F>,
    {
        dispatch::reduce_with(self.tag, self.seq, options)
    }

    /// See [`dispatch::reduce_n`].
    ///
    /// # Errors
    ///
    /// [`ReduceError::InvalidArgument`](crate::ReduceError::InvalidArgument)
    /// if `n` is negative or larger than the sequence.
    pub fn reduce_n<N, T, F>(self, n: N, init: T, op: F) -> Result<T>
    where
        S: RandomAccess,
        N: TryInto<usize> + Copy + fmt::Display,
        Tg: ReduceN<S, T, F>,
    {
        dispatch::reduce_n(self.tag, self.seq, n, init, op)
    }
}

/// Attaches a tag to any sequence.
pub trait WithTag: Sequence {
    /// Wraps `self` in a [`Tagged`] sequence.
    fn with_tag<Tg: Tag>(self, tag: Tg) -> Tagged<Tg, Self> {
        Tagged::new(tag, self)
    }
}

impl<S: Sequence> WithTag for S {}
