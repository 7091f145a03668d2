//! Error types for reductions.
//!
//! Only three things can go wrong with a reduction: there is nothing to seed
//! the accumulator with, a count is out of range, or the selected backend has
//! no implementation for the requested shape. The last one is normally a
//! compile error (a missing [`Reduce`](crate::Reduce) impl); the runtime
//! variant only shows up through [`reduce_auto`](crate::reduce_auto).

use crate::backend::Backend;
use thiserror::Error;

#[cfg(feature = "wgpu")]
use crate::device::GpuFailure;

/// Result type alias using [`ReduceError`].
pub type Result<T> = core::result::Result<T, ReduceError>;

/// Errors that can occur while reducing a sequence.
#[derive(Error, Debug)]
pub enum ReduceError {
    /// The sequence was empty and no initial value was supplied.
    #[error("cannot reduce an empty sequence without an initial value")]
    EmptyRange,

    /// An argument was outside of its accepted domain.
    #[error("invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The argument name.
        arg: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// The backend has no reduction for the requested element/operator shape.
    #[error("backend {backend:?} provides no specialization of '{operation}'")]
    MissingSpecialization {
        /// The backend that was selected.
        backend: Backend,
        /// The operation being attempted.
        operation: &'static str,
    },

    /// The device backend failed.
    #[cfg(feature = "wgpu")]
    #[error(transparent)]
    Device(#[from] GpuFailure),
}

impl ReduceError {
    /// Create an invalid argument error.
    pub fn invalid_argument(arg: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            arg,
            reason: reason.into(),
        }
    }

    /// Create a missing specialization error.
    #[must_use]
    pub const fn missing_specialization(backend: Backend, operation: &'static str) -> Self {
        Self::MissingSpecialization { backend, operation }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_argument() {
        let err = ReduceError::invalid_argument("n", "count is negative");
        assert_eq!(err.to_string(), "invalid argument 'n': count is negative");
    }

    #[test]
    fn missing_specialization_names_backend() {
        let err = ReduceError::missing_specialization(Backend::Device, "reduce");
        assert_eq!(
            err.to_string(),
            "backend Device provides no specialization of 'reduce'"
        );
    }
}
