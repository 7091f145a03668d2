//! Backend selection module.
//!
//! This module names the available reduction backends and holds the
//! process-global choice used by [`reduce_auto`](crate::reduce_auto).
//!
//! # Supported Backends
//!
//! - `Host`: Generic host backend, runs the sequential fallback (default).
//! - `Sequential`: Explicitly sequential host backend.
//! - `Parallel`: Multi-threaded host backend using `rayon`.
//! - `Device`: GPU backend using `wgpu` (only `f32` with built-in operators).
//!
//! The backend is stored globally using an `AtomicU8`, enabling fast
//! switching at runtime. Statically tagged calls ([`reduce_by`](crate::reduce_by)
//! and friends) ignore this setting entirely; the tag type decides.
//!
//! # Environment
//!
//! [`init_from_env`] reads `BRINY_REDUCE_BACKEND` (`host`, `sequential`,
//! `parallel` or `device`) and installs it as the global backend.

use core::convert::TryFrom;
use core::fmt;
use core::str::FromStr;
use core::sync::atomic::{AtomicU8, Ordering};

use crate::error::ReduceError;

/// Name of the environment variable read by [`init_from_env`].
pub const BACKEND_ENV_VAR: &str = "BRINY_REDUCE_BACKEND";

/// Enumeration of supported reduction backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Backend {
    /// Generic host backend (default).
    #[default]
    Host = 0,
    /// Strictly sequential host backend.
    Sequential = 1,
    /// Multi-threaded host backend using `rayon`.
    Parallel = 2,
    /// GPU-accelerated backend using `wgpu`.
    Device = 3,
}

impl Backend {
    /// Short lowercase name, as accepted by [`FromStr`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Host => "host",
            Self::Sequential => "sequential",
            Self::Parallel => "parallel",
            Self::Device => "device",
        }
    }

    /// Whether this backend may regroup operator applications.
    ///
    /// Backends that regroup only agree with the sequential fallback for
    /// associative operators.
    #[must_use]
    pub const fn regroups(self) -> bool {
        matches!(self, Self::Parallel | Self::Device)
    }
}

impl TryFrom<u8> for Backend {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Host),
            1 => Ok(Self::Sequential),
            2 => Ok(Self::Parallel),
            3 => Ok(Self::Device),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = ReduceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "host" => Ok(Self::Host),
            "seq" | "sequential" => Ok(Self::Sequential),
            "par" | "parallel" | "rayon" => Ok(Self::Parallel),
            "device" | "gpu" | "wgpu" => Ok(Self::Device),
            other => Err(ReduceError::invalid_argument(
                "backend",
                format!("unknown backend '{other}'"),
            )),
        }
    }
}

/// Internal global state for the active backend.
///
/// This uses relaxed memory ordering because the backend is only expected
/// to change rarely, and not in the middle of a reduction.
static GLOBAL_DEFAULT_BACKEND: AtomicU8 = AtomicU8::new(Backend::Host as u8);

/// Sets the backend used by runtime-dispatched reductions.
///
/// # Example
/// ```
/// use briny_reduce::backend::{get_backend, set_backend, Backend};
/// set_backend(Backend::Parallel);
/// assert_eq!(get_backend(), Backend::Parallel);
/// # set_backend(Backend::Host);
/// ```
pub fn set_backend(b: Backend) {
    log::debug!("reduction backend set to {b}");
    GLOBAL_DEFAULT_BACKEND.store(b as u8, Ordering::Relaxed);
}

/// Returns the backend used by runtime-dispatched reductions.
///
/// If the stored value is invalid, defaults to `Backend::Host`.
pub fn get_backend() -> Backend {
    Backend::try_from(GLOBAL_DEFAULT_BACKEND.load(Ordering::Relaxed)).unwrap_or_default()
}

/// Reads [`BACKEND_ENV_VAR`] and installs it as the global backend.
///
/// Returns the backend now in effect. An unset variable leaves the current
/// selection untouched.
///
/// # Errors
///
/// Returns [`ReduceError::InvalidArgument`] if the variable holds an unknown
/// backend name; the current selection is left untouched.
pub fn init_from_env() -> Result<Backend, ReduceError> {
    match std::env::var(BACKEND_ENV_VAR) {
        Ok(value) => {
            let backend = value.parse()?;
            set_backend(backend);
            Ok(backend)
        }
        Err(_) => Ok(get_backend()),
    }
}
