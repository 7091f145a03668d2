//! # `briny_reduce`
//!
//! Tag-dispatched reductions: one call-site folds a sequence into a single
//! value, and the *type* of a zero-sized backend tag decides, at compile
//! time, which implementation runs.
//!
//! ## Features
//!
//! - **Static dispatch**: backends are marker types implementing [`Reduce`]
//!   and [`ReduceN`]; a tag without an implementation does not compile
//! - **Generic fallback**: [`HostTag`] and [`SeqTag`] run a strictly ordered
//!   sequential fold that tolerates non-associative operators
//! - **Parallel host**: [`ParTag`] reduces on `rayon`, merging partials in
//!   order so associativity is enough
//! - **GPU**: `DeviceTag` (feature `wgpu`) runs `f32` sums and extrema in a
//!   compute shader, falling back to the host on failure
//! - **Counted reductions**: [`reduce_n`] with a separately typed, possibly
//!   wider accumulator
//!
//! ## Example
//!
//! ```rust
//! use briny_reduce::{reduce, reduce_by, reduce_init, reduce_n, ParTag, SeqTag};
//!
//! let data = [1, 2, 3, 4];
//! assert_eq!(reduce_init(SeqTag, &data[..], 0), 10);
//! assert_eq!(reduce(ParTag, &data[..]).unwrap(), 10);
//! assert_eq!(reduce_by(SeqTag, &data[..], 1, |a: i32, b: i32| a * b), 24);
//!
//! let bytes = [200u8, 200, 200];
//! let wide = reduce_n(SeqTag, &bytes[..], 3, 0u32, |acc: u32, b: u8| acc + u32::from(b));
//! assert_eq!(wide.unwrap(), 600);
//! ```
//!
//! ## Feature Flags
//!
//! - `wgpu`: GPU backend via WebGPU

#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::must_use_candidate
)]
#![deny(unsafe_code)]
#![forbid(unused_must_use)]
#![warn(missing_docs)]

pub mod approx;
pub mod backend;
pub mod dispatch;
pub mod error;
pub mod generic;
pub mod host;
pub mod op;
pub mod sequence;
pub mod tag;

#[cfg(feature = "wgpu")]
pub mod device;

pub use backend::Backend;
pub use dispatch::{
    reduce, reduce_auto, reduce_by, reduce_init, reduce_n, reduce_with, Reduce, ReduceN,
    Reduction,
};
pub use error::{ReduceError, Result};
pub use op::{BinaryOp, Maximum, Minimum, Multiplies, Plus};
pub use sequence::{ParallelSequence, RandomAccess, Sequence};
pub use tag::{HostTag, ParTag, Refines, SeqTag, Tag, Tagged, WithTag};

#[cfg(feature = "wgpu")]
pub use tag::DeviceTag;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::backend::{get_backend, set_backend, Backend};
    pub use crate::dispatch::{
        reduce, reduce_auto, reduce_by, reduce_init, reduce_n, reduce_with, Reduce, ReduceN,
        Reduction,
    };
    pub use crate::error::{ReduceError, Result};
    pub use crate::op::{BinaryOp, Maximum, Minimum, Multiplies, Plus};
    pub use crate::sequence::{ParallelSequence, RandomAccess, Sequence};
    pub use crate::tag::{HostTag, ParTag, SeqTag, Tag, WithTag};

    #[cfg(feature = "wgpu")]
    pub use crate::tag::DeviceTag;
}
