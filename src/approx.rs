//! Approximate equality for floating point reductions.
//!
//! Regrouping a float fold changes rounding, so a parallel or device sum is
//! only expected to match the sequential fallback up to a tolerance that
//! grows with the magnitude of the result.

/// Relative tolerance accepted on `f32` results.
pub const F32_REL_ERROR: f32 = 1e-5;

/// Relative tolerance accepted on `f64` results.
pub const F64_REL_ERROR: f64 = 1e-12;

/// Absolute floor below which values compare as equal regardless of scale.
pub const ABS_FLOOR: f64 = 1e-30;

/// Relative equality between two values.
pub trait RelativeEq<Rhs: ?Sized = Self> {
    /// Whether `self` and `rhs` agree to within the type's tolerance.
    fn approx_eq(&self, rhs: &Rhs) -> bool;
}

impl RelativeEq for f32 {
    fn approx_eq(&self, rhs: &Self) -> bool {
        if self == rhs {
            return true;
        }
        let diff = (self - rhs).abs();
        let scale = self.abs().max(rhs.abs());
        f64::from(diff) < ABS_FLOOR || diff <= scale * F32_REL_ERROR
    }
}

impl RelativeEq for f64 {
    fn approx_eq(&self, rhs: &Self) -> bool {
        if self == rhs {
            return true;
        }
        let diff = (self - rhs).abs();
        let scale = self.abs().max(rhs.abs());
        diff < ABS_FLOOR || diff <= scale * F64_REL_ERROR
    }
}

impl<T: RelativeEq<U>, U> RelativeEq<[U]> for [T] {
    fn approx_eq(&self, rhs: &[U]) -> bool {
        self.len() == rhs.len() && self.iter().zip(rhs).all(|(a, b)| a.approx_eq(b))
    }
}

/// Whether `a` and `b` are relatively equal.
pub fn approx_eq<A: RelativeEq<B> + ?Sized, B: ?Sized>(a: &A, b: &B) -> bool {
    a.approx_eq(b)
}
