//! Pixel kinds and the numeric trait behind kind-generic dispatch.
//!
//! Every bulk operation is written once, generic over [`Pixel`], and
//! monomorphized for the five kinds. Arithmetic is carried out in the
//! `f64` / `Complex<f64>` compute domain and cast back to the storage kind,
//! so integer buffers get the same rounding behavior everywhere.

use num_complex::Complex;
use num_traits::ToPrimitive;
use strum_macros::Display;

/// Numeric representation of one pixel.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum PixelKind {
    /// 32-bit signed integer.
    Int32,
    /// 32-bit float.
    Float32,
    /// 64-bit float.
    Float64,
    /// Complex pair of 32-bit floats.
    Complex64,
    /// Complex pair of 64-bit floats.
    Complex128,
}

impl PixelKind {
    /// Element size in bytes.
    pub fn size_of(self) -> usize {
        match self {
            PixelKind::Int32 | PixelKind::Float32 => 4,
            PixelKind::Float64 | PixelKind::Complex64 => 8,
            PixelKind::Complex128 => 16,
        }
    }

    /// True for the two complex kinds.
    ///
    /// Complex kinds reject ordering and threshold operators, and bitwise
    /// operators require [`PixelKind::Int32`] on both sides.
    pub fn is_complex(self) -> bool {
        matches!(self, PixelKind::Complex64 | PixelKind::Complex128)
    }
}

/// One storable pixel element.
///
/// `to_c64`/`from_c64` lift a value into the `Complex<f64>` compute domain
/// and back; real kinds drop the imaginary part on the way down, the same
/// way the compute-in-double-cast-back rule drops fractional parts for
/// `Int32`. Implemented for exactly the five kinds; the engine dispatches
/// through `PixelData` so no other type ever reaches these bounds.
pub trait Pixel: Copy + PartialEq + 'static {
    const KIND: PixelKind;

    fn zero() -> Self;

    fn to_c64(self) -> Complex<f64>;
    fn from_c64(v: Complex<f64>) -> Self;

    /// Real view of the value (real part for complex kinds).
    fn to_f64(self) -> f64 {
        self.to_c64().re
    }

    fn from_f64(v: f64) -> Self {
        Self::from_c64(Complex::new(v, 0.0))
    }
}

impl Pixel for i32 {
    const KIND: PixelKind = PixelKind::Int32;

    fn zero() -> Self {
        0
    }

    fn to_c64(self) -> Complex<f64> {
        Complex::new(ToPrimitive::to_f64(&self).unwrap_or(0.0), 0.0)
    }

    fn from_c64(v: Complex<f64>) -> Self {
        // Saturating truncation, the behavior of `as` on a finite double.
        v.re as i32
    }
}

impl Pixel for f32 {
    const KIND: PixelKind = PixelKind::Float32;

    fn zero() -> Self {
        0.0
    }

    fn to_c64(self) -> Complex<f64> {
        Complex::new(self as f64, 0.0)
    }

    fn from_c64(v: Complex<f64>) -> Self {
        v.re as f32
    }
}

impl Pixel for f64 {
    const KIND: PixelKind = PixelKind::Float64;

    fn zero() -> Self {
        0.0
    }

    fn to_c64(self) -> Complex<f64> {
        Complex::new(self, 0.0)
    }

    fn from_c64(v: Complex<f64>) -> Self {
        v.re
    }
}

impl Pixel for Complex<f32> {
    const KIND: PixelKind = PixelKind::Complex64;

    fn zero() -> Self {
        Complex::new(0.0, 0.0)
    }

    fn to_c64(self) -> Complex<f64> {
        Complex::new(self.re as f64, self.im as f64)
    }

    fn from_c64(v: Complex<f64>) -> Self {
        Complex::new(v.re as f32, v.im as f32)
    }
}

impl Pixel for Complex<f64> {
    const KIND: PixelKind = PixelKind::Complex128;

    fn zero() -> Self {
        Complex::new(0.0, 0.0)
    }

    fn to_c64(self) -> Complex<f64> {
        self
    }

    fn from_c64(v: Complex<f64>) -> Self {
        v
    }
}
