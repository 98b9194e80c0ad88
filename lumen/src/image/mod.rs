//! Pixel buffers: kind-tagged 2-D pixel planes with an optional bad-pixel
//! mask.
//!
//! A [`PixelBuffer`] owns one plane of a single [`PixelKind`] plus, lazily,
//! a [`Mask`] of identical dimensions. Public pixel coordinates follow the
//! FITS convention: 1-based, pixel (1,1) at the lower-left, row index
//! increasing upward.

use num_complex::Complex;

use crate::error::{ImageError, ImageResult};
use crate::kind::{Pixel, PixelKind};
use crate::mask::Mask;
use crate::plane::Plane;

#[cfg(test)]
mod tests;

/// The closed union of per-kind pixel planes.
///
/// Every bulk operation matches on this once and runs a single generic
/// routine monomorphized per kind.
#[derive(Debug, Clone, PartialEq)]
pub enum PixelData {
    Int32(Plane<i32>),
    Float32(Plane<f32>),
    Float64(Plane<f64>),
    Complex64(Plane<Complex<f32>>),
    Complex128(Plane<Complex<f64>>),
}

/// Dispatch a generic expression over the concrete plane of a `PixelData`.
///
/// The body is monomorphized for each kind; this is the single point where
/// the tag is matched.
macro_rules! with_plane {
    ($data:expr, $p:ident => $body:expr) => {
        match $data {
            $crate::image::PixelData::Int32($p) => $body,
            $crate::image::PixelData::Float32($p) => $body,
            $crate::image::PixelData::Float64($p) => $body,
            $crate::image::PixelData::Complex64($p) => $body,
            $crate::image::PixelData::Complex128($p) => $body,
        }
    };
}
pub(crate) use with_plane;

impl PixelData {
    pub(crate) fn alloc(kind: PixelKind, width: usize, height: usize) -> PixelData {
        match kind {
            PixelKind::Int32 => PixelData::Int32(Plane::filled(width, height, 0)),
            PixelKind::Float32 => PixelData::Float32(Plane::filled(width, height, 0.0)),
            PixelKind::Float64 => PixelData::Float64(Plane::filled(width, height, 0.0)),
            PixelKind::Complex64 => {
                PixelData::Complex64(Plane::filled(width, height, Complex::new(0.0, 0.0)))
            }
            PixelKind::Complex128 => {
                PixelData::Complex128(Plane::filled(width, height, Complex::new(0.0, 0.0)))
            }
        }
    }

    pub(crate) fn kind(&self) -> PixelKind {
        match self {
            PixelData::Int32(_) => PixelKind::Int32,
            PixelData::Float32(_) => PixelKind::Float32,
            PixelData::Float64(_) => PixelKind::Float64,
            PixelData::Complex64(_) => PixelKind::Complex64,
            PixelData::Complex128(_) => PixelKind::Complex128,
        }
    }

    pub(crate) fn width(&self) -> usize {
        with_plane!(self, p => p.width())
    }

    pub(crate) fn height(&self) -> usize {
        with_plane!(self, p => p.height())
    }

    pub(crate) fn len(&self) -> usize {
        with_plane!(self, p => p.len())
    }

    /// Lift the whole plane into the `Complex<f64>` compute domain.
    pub(crate) fn to_c64_vec(&self) -> Vec<Complex<f64>> {
        with_plane!(self, p => p.as_slice().iter().map(|v| v.to_c64()).collect())
    }

    /// Cast a computed plane back down to `kind` storage.
    pub(crate) fn from_c64_slice(
        kind: PixelKind,
        width: usize,
        height: usize,
        values: &[Complex<f64>],
    ) -> PixelData {
        fn build<T: Pixel>(width: usize, height: usize, values: &[Complex<f64>]) -> Plane<T> {
            Plane::from_vec(
                width,
                height,
                values.iter().map(|&v| T::from_c64(v)).collect(),
            )
        }

        match kind {
            PixelKind::Int32 => PixelData::Int32(build(width, height, values)),
            PixelKind::Float32 => PixelData::Float32(build(width, height, values)),
            PixelKind::Float64 => PixelData::Float64(build(width, height, values)),
            PixelKind::Complex64 => PixelData::Complex64(build(width, height, values)),
            PixelKind::Complex128 => PixelData::Complex128(build(width, height, values)),
        }
    }

    pub(crate) fn get_c64(&self, idx: usize) -> Complex<f64> {
        with_plane!(self, p => p.as_slice()[idx].to_c64())
    }

    pub(crate) fn set_c64(&mut self, idx: usize, v: Complex<f64>) {
        with_plane!(self, p => {
            let slot = &mut p.as_mut_slice()[idx];
            *slot = Pixel::from_c64(v);
        })
    }
}

/// A 2-D image of one pixel kind, with an optional exclusively-owned
/// bad-pixel mask.
///
/// No mask means "all pixels valid"; a mask is materialized on the first
/// rejection and is *not* collapsed back to `None` when every pixel becomes
/// good again.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    data: PixelData,
    mask: Option<Mask>,
}

impl PixelBuffer {
    /// Allocate a zero-filled buffer.
    pub fn new(nx: usize, ny: usize, kind: PixelKind) -> ImageResult<Self> {
        if nx == 0 || ny == 0 {
            return Err(ImageError::illegal(format!(
                "image dimensions must be positive, got {nx}x{ny}"
            )));
        }
        Ok(Self {
            data: PixelData::alloc(kind, nx, ny),
            mask: None,
        })
    }

    /// Adopt caller-supplied storage without copying.
    pub fn wrap<T: Pixel>(nx: usize, ny: usize, pixels: Vec<T>) -> ImageResult<Self>
    where
        Plane<T>: Into<PixelData>,
    {
        if nx == 0 || ny == 0 {
            return Err(ImageError::illegal(format!(
                "image dimensions must be positive, got {nx}x{ny}"
            )));
        }
        if pixels.len() != nx * ny {
            return Err(ImageError::illegal(format!(
                "pixel data length {} does not match dimensions {nx}x{ny}",
                pixels.len()
            )));
        }
        Ok(Self {
            data: Plane::from_vec(nx, ny, pixels).into(),
            mask: None,
        })
    }

    pub(crate) fn from_data(data: PixelData, mask: Option<Mask>) -> Self {
        debug_assert!(mask
            .as_ref()
            .map(|m| m.width() == data.width() && m.height() == data.height())
            .unwrap_or(true));
        Self { data, mask }
    }

    /// Deep copy of pixels and mask.
    pub fn duplicate(&self) -> Self {
        self.clone()
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.data.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.data.height()
    }

    #[inline]
    pub fn kind(&self) -> PixelKind {
        self.data.kind()
    }

    #[inline]
    pub(crate) fn data(&self) -> &PixelData {
        &self.data
    }

    #[inline]
    pub(crate) fn data_mut(&mut self) -> &mut PixelData {
        &mut self.data
    }

    #[inline]
    pub(crate) fn parts_mut(&mut self) -> (&mut PixelData, &mut Option<Mask>) {
        (&mut self.data, &mut self.mask)
    }

    /// The attached bad-pixel mask, if one has been materialized.
    #[inline]
    pub fn mask(&self) -> Option<&Mask> {
        self.mask.as_ref()
    }

    #[inline]
    pub fn mask_mut(&mut self) -> Option<&mut Mask> {
        self.mask.as_mut()
    }

    /// Attach a mask; its dimensions must match.
    pub fn set_mask(&mut self, mask: Mask) -> ImageResult<()> {
        if mask.width() != self.width() || mask.height() != self.height() {
            return Err(ImageError::IncompatibleInput(
                self.width(),
                self.height(),
                mask.width(),
                mask.height(),
            ));
        }
        self.mask = Some(mask);
        Ok(())
    }

    /// Detach and return the mask.
    pub fn take_mask(&mut self) -> Option<Mask> {
        self.mask.take()
    }

    /// The mask, materializing an all-good one on first use.
    pub(crate) fn mask_or_materialize(&mut self) -> &mut Mask {
        let (w, h) = (self.width(), self.height());
        self.mask.get_or_insert_with(|| Mask::new(w, h))
    }

    /// Replace the mask without dimension checking (internal transforms keep
    /// the dimensions in lockstep themselves).
    pub(crate) fn set_mask_unchecked(&mut self, mask: Option<Mask>) {
        self.mask = mask;
    }

    /// Validate 1-based coordinates, returning the linear index.
    fn linear_index(&self, x: usize, y: usize) -> ImageResult<usize> {
        let (nx, ny) = (self.width(), self.height());
        if x < 1 || y < 1 || x > nx || y > ny {
            return Err(ImageError::AccessOutOfRange(x as i64, y as i64, nx, ny));
        }
        Ok((y - 1) * nx + (x - 1))
    }

    /// Pixel value at 1-based `(x, y)`; real part for complex kinds.
    pub fn get(&self, x: usize, y: usize) -> ImageResult<f64> {
        let idx = self.linear_index(x, y)?;
        Ok(self.data.get_c64(idx).re)
    }

    /// Complex pixel value at 1-based `(x, y)`.
    pub fn get_complex(&self, x: usize, y: usize) -> ImageResult<(f64, f64)> {
        let idx = self.linear_index(x, y)?;
        let v = self.data.get_c64(idx);
        Ok((v.re, v.im))
    }

    /// Store a value at 1-based `(x, y)`.
    pub fn set(&mut self, x: usize, y: usize, value: f64) -> ImageResult<()> {
        let idx = self.linear_index(x, y)?;
        self.data.set_c64(idx, Complex::new(value, 0.0));
        Ok(())
    }

    /// Store a complex value at 1-based `(x, y)`.
    pub fn set_complex(&mut self, x: usize, y: usize, re: f64, im: f64) -> ImageResult<()> {
        let idx = self.linear_index(x, y)?;
        self.data.set_c64(idx, Complex::new(re, im));
        Ok(())
    }

    /// Reject the pixel at 1-based `(x, y)`, materializing the mask if this
    /// is the first rejection.
    pub fn reject(&mut self, x: usize, y: usize) -> ImageResult<()> {
        let idx = self.linear_index(x, y)?;
        self.mask_or_materialize().set(idx, true);
        Ok(())
    }

    /// True if the pixel at 1-based `(x, y)` is valid.
    pub fn is_good(&self, x: usize, y: usize) -> ImageResult<bool> {
        let idx = self.linear_index(x, y)?;
        Ok(self.mask.as_ref().map(|m| !m.get(idx)).unwrap_or(true))
    }

    /// Typed read-only view of the plane, when the kind matches.
    pub fn as_i32(&self) -> Option<&Plane<i32>> {
        match &self.data {
            PixelData::Int32(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<&Plane<f32>> {
        match &self.data {
            PixelData::Float32(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<&Plane<f64>> {
        match &self.data {
            PixelData::Float64(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_f64_mut(&mut self) -> Option<&mut Plane<f64>> {
        match &mut self.data {
            PixelData::Float64(p) => Some(p),
            _ => None,
        }
    }
}

impl From<Plane<i32>> for PixelData {
    fn from(p: Plane<i32>) -> Self {
        PixelData::Int32(p)
    }
}

impl From<Plane<f32>> for PixelData {
    fn from(p: Plane<f32>) -> Self {
        PixelData::Float32(p)
    }
}

impl From<Plane<f64>> for PixelData {
    fn from(p: Plane<f64>) -> Self {
        PixelData::Float64(p)
    }
}

impl From<Plane<Complex<f32>>> for PixelData {
    fn from(p: Plane<Complex<f32>>) -> Self {
        PixelData::Complex64(p)
    }
}

impl From<Plane<Complex<f64>>> for PixelData {
    fn from(p: Plane<Complex<f64>>) -> Self {
        PixelData::Complex128(p)
    }
}

/// Dimension-equality check shared by the binary engines.
pub(crate) fn check_same_dims(a: &PixelBuffer, b: &PixelBuffer) -> ImageResult<()> {
    if a.width() != b.width() || a.height() != b.height() {
        return Err(ImageError::IncompatibleInput(
            a.width(),
            a.height(),
            b.width(),
            b.height(),
        ));
    }
    Ok(())
}

/// Union of two optional masks; `None` when both inputs are maskless, so no
/// empty mask is fabricated.
pub(crate) fn union_masks(a: Option<&Mask>, b: Option<&Mask>) -> Option<Mask> {
    match (a, b) {
        (None, None) => None,
        (Some(m), None) | (None, Some(m)) => Some(m.clone()),
        (Some(ma), Some(mb)) => {
            let mut out = ma.clone();
            // Dimensions were validated by the caller.
            out.or_assign(mb).expect("mask dimensions already checked");
            Some(out)
        }
    }
}
