//! Kernel-weighted resampling with per-pixel confidence.
//!
//! The interpolation primitive samples a source image at a sub-pixel
//! position through a separable kernel profile pair, restricted to an
//! elliptical inclusion window. Alongside the value it returns a confidence
//! score: the fraction of total kernel weight contributed by valid,
//! in-bounds source pixels. Confidence 0 means the value is meaningless;
//! anything below 1 means the window was clipped by the image border or by
//! bad pixels.

use strum_macros::Display;

use crate::error::{ImageError, ImageResult};
use crate::image::{with_plane, PixelBuffer, PixelData};
use crate::kind::{Pixel, PixelKind};
use crate::mask::Mask;
use crate::plane::Plane;

pub mod kernels;
mod poly2;

pub use poly2::Poly2;


/// A sampled 1-D kernel profile over `[0, radius]`.
///
/// Samples are indexed by quantized distance with direct-index rounding;
/// distances beyond the last sample read as zero.
#[derive(Debug, Clone)]
pub struct KernelProfile {
    samples: Vec<f64>,
    radius: f64,
    tabs_per_unit: f64,
}

impl KernelProfile {
    /// Wrap an externally produced sample table.
    pub fn new(samples: Vec<f64>, radius: f64) -> ImageResult<Self> {
        if samples.is_empty() {
            return Err(ImageError::NullInput("kernel samples"));
        }
        if !(radius > 0.0) {
            return Err(ImageError::illegal(format!(
                "kernel radius must be positive, got {radius}"
            )));
        }
        let tabs_per_unit = (samples.len() - 1) as f64 / radius;
        Ok(Self {
            samples,
            radius,
            tabs_per_unit,
        })
    }

    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Kernel weight at distance `d` (symmetric in `d`).
    #[inline]
    pub fn value(&self, d: f64) -> f64 {
        let idx = (d.abs() * self.tabs_per_unit + 0.5) as usize;
        self.samples.get(idx).copied().unwrap_or(0.0)
    }
}

/// Axis selector for [`Polynomial2D::derivative`].
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// An externally owned bivariate polynomial evaluator.
///
/// The engine only calls `eval` (warping) and `derivative` (Jacobian
/// filling); construction and fitting happen outside.
pub trait Polynomial2D {
    fn eval(&self, x: f64, y: f64) -> f64;
    fn derivative(&self, axis: Axis) -> Box<dyn Polynomial2D>;
}

/// Kernel-weighted interpolation at 1-based position `(x, y)`.
///
/// Returns `(value, confidence)`. Weights come from the separable profile
/// pair; a grid point `(ix, iy)` joins the window when it satisfies the
/// elliptical bound
/// `(iy - y)^2 <= yr^2 - (ix - x)^2 * yr^2 / xr^2`.
/// The absolute weight of every in-ellipse point accumulates into the
/// denominator of the confidence, whether or not that point is usable.
pub fn interpolate(
    image: &PixelBuffer,
    x: f64,
    y: f64,
    xprofile: &KernelProfile,
    yprofile: &KernelProfile,
) -> ImageResult<(f64, f64)> {
    if image.kind().is_complex() {
        return Err(ImageError::InvalidType(image.kind(), "interpolate"));
    }
    Ok(with_plane!(image.data(), p => {
        interpolate_plane(p, image.mask(), x, y, xprofile, yprofile)
    }))
}

/// The generic interpolation kernel shared with the warp loops.
fn interpolate_plane<T: Pixel>(
    plane: &Plane<T>,
    mask: Option<&Mask>,
    x: f64,
    y: f64,
    xprofile: &KernelProfile,
    yprofile: &KernelProfile,
) -> (f64, f64) {
    let (nx, ny) = (plane.width() as i64, plane.height() as i64);
    let (xr, yr) = (xprofile.radius(), yprofile.radius());

    let xfirst = (x - xr).ceil() as i64;
    let xlast = (x + xr).floor() as i64;
    let yfirst = (y - yr).ceil() as i64;
    let ylast = (y + yr).floor() as i64;

    let yr2 = yr * yr;
    let ratio = yr2 / (xr * xr);

    let mut weighted_sum = 0.0;
    let mut sum_weight = 0.0;
    let mut sum_abs_weight = 0.0;
    let mut sum_used_abs_weight = 0.0;

    for iy in yfirst..=ylast {
        let dy = iy as f64 - y;
        for ix in xfirst..=xlast {
            let dx = ix as f64 - x;
            if dy * dy > yr2 - dx * dx * ratio {
                continue;
            }

            let w = xprofile.value(dx) * yprofile.value(dy);
            sum_abs_weight += w.abs();

            if ix < 1 || ix > nx || iy < 1 || iy > ny {
                continue;
            }
            let (px, py) = (ix as usize - 1, iy as usize - 1);
            if mask.map(|m| m.get_xy(px, py)).unwrap_or(false) {
                continue;
            }

            weighted_sum += plane.get(px, py).to_f64() * w;
            sum_weight += w;
            sum_used_abs_weight += w.abs();
        }
    }

    let value = if sum_weight > 0.0 {
        weighted_sum / sum_weight
    } else {
        0.0
    };
    let confidence = if sum_abs_weight > 0.0 {
        sum_used_abs_weight / sum_abs_weight
    } else {
        0.0
    };

    (value, confidence)
}

/// Shared validation for the two warp entry points.
fn check_warp_kinds(out: &PixelBuffer, input: &PixelBuffer) -> ImageResult<()> {
    if input.kind().is_complex() {
        return Err(ImageError::InvalidType(input.kind(), "warp"));
    }
    if out.kind() != input.kind() {
        return Err(ImageError::TypeMismatch(out.kind(), input.kind()));
    }
    Ok(())
}

/// A delta map must be a Float64 plane matching the destination dimensions.
fn check_delta_map(out: &PixelBuffer, map: &PixelBuffer, name: &str) -> ImageResult<()> {
    if map.kind() != PixelKind::Float64 {
        return Err(ImageError::illegal(format!(
            "{name} map must be Float64, got {}",
            map.kind()
        )));
    }
    if map.width() != out.width() || map.height() != out.height() {
        return Err(ImageError::illegal(format!(
            "{name} map is {}x{}, destination is {}x{}",
            map.width(),
            map.height(),
            out.width(),
            out.height()
        )));
    }
    Ok(())
}

/// Warp `input` into `out` through per-pixel offset maps.
///
/// For every destination pixel `(u, v)` the source position is
/// `(u - delta_x(u,v), v - delta_y(u,v))`. A destination whose interpolation
/// confidence is zero is zeroed and marked bad. All preconditions are
/// checked before the first pixel is written.
pub fn warp(
    out: &mut PixelBuffer,
    input: &PixelBuffer,
    delta_x: &PixelBuffer,
    delta_y: &PixelBuffer,
    xprofile: &KernelProfile,
    yprofile: &KernelProfile,
) -> ImageResult<()> {
    check_warp_kinds(out, input)?;
    check_delta_map(out, delta_x, "delta-x")?;
    check_delta_map(out, delta_y, "delta-y")?;

    let dx_plane = delta_x.as_f64().expect("kind checked");
    let dy_plane = delta_y.as_f64().expect("kind checked");

    warp_with(out, input, xprofile, yprofile, |u, v| {
        let (px, py) = (u - 1, v - 1);
        (
            u as f64 - dx_plane.get(px, py),
            v as f64 - dy_plane.get(px, py),
        )
    })
}

/// Warp `input` into `out` through a polynomial coordinate transform:
/// the source position of `(u, v)` is `(poly_x(u,v), poly_y(u,v))`.
pub fn warp_polynomial(
    out: &mut PixelBuffer,
    input: &PixelBuffer,
    poly_x: &dyn Polynomial2D,
    poly_y: &dyn Polynomial2D,
    xprofile: &KernelProfile,
    yprofile: &KernelProfile,
) -> ImageResult<()> {
    check_warp_kinds(out, input)?;

    warp_with(out, input, xprofile, yprofile, |u, v| {
        (poly_x.eval(u as f64, v as f64), poly_y.eval(u as f64, v as f64))
    })
}

/// The shared warp loop: `source_of` maps 1-based destination coordinates
/// to a 1-based source position.
fn warp_with(
    out: &mut PixelBuffer,
    input: &PixelBuffer,
    xprofile: &KernelProfile,
    yprofile: &KernelProfile,
    source_of: impl Fn(usize, usize) -> (f64, f64),
) -> ImageResult<()> {
    let (out_w, out_h) = (out.width(), out.height());
    let mut bad = Vec::new();

    tracing::debug!(
        out_w,
        out_h,
        xradius = xprofile.radius(),
        yradius = yprofile.radius(),
        "warping image"
    );

    with_plane!(input.data(), p => {
        let mask = input.mask();
        for v in 1..=out_h {
            for u in 1..=out_w {
                let (sx, sy) = source_of(u, v);
                let (value, confidence) =
                    interpolate_plane(p, mask, sx, sy, xprofile, yprofile);
                if confidence > 0.0 {
                    out.set(u, v, value)?;
                } else {
                    out.set(u, v, 0.0)?;
                    bad.push((u - 1, v - 1));
                }
            }
        }
    });

    crate::flops::add_flops((out_w * out_h) as u64);

    if bad.is_empty() {
        out.set_mask_unchecked(None);
    } else {
        let mut mask = Mask::new(out_w, out_h);
        for (x, y) in bad {
            mask.set_xy(x, y, true);
        }
        out.set_mask_unchecked(Some(mask));
    }

    Ok(())
}

fn check_jacobian_out(out: &PixelBuffer) -> ImageResult<()> {
    if !matches!(out.kind(), PixelKind::Float32 | PixelKind::Float64) {
        return Err(ImageError::InvalidType(out.kind(), "fill_jacobian"));
    }
    Ok(())
}

/// Fill `out` with the absolute Jacobian determinant of the delta-map warp,
/// for flux-conservation correction after resampling.
///
/// The source position is `s(u,v) = (u - dx(u,v), v - dy(u,v))`; partials
/// are taken by central finite differences of the delta maps, one-sided at
/// the borders. Output kind is restricted to Float32/Float64.
pub fn fill_jacobian(
    out: &mut PixelBuffer,
    delta_x: &PixelBuffer,
    delta_y: &PixelBuffer,
) -> ImageResult<()> {
    check_jacobian_out(out)?;
    check_delta_map(out, delta_x, "delta-x")?;
    check_delta_map(out, delta_y, "delta-y")?;

    let dx_plane = delta_x.as_f64().expect("kind checked");
    let dy_plane = delta_y.as_f64().expect("kind checked");
    let (w, h) = (out.width(), out.height());

    // Finite difference of `f` along one axis at 0-based (x, y).
    let diff = |f: &Plane<f64>, x: usize, y: usize, along_x: bool| -> f64 {
        let (lo, hi, span) = if along_x {
            let lo = x.saturating_sub(1);
            let hi = (x + 1).min(w - 1);
            (*f.get(lo, y), *f.get(hi, y), (hi - lo) as f64)
        } else {
            let lo = y.saturating_sub(1);
            let hi = (y + 1).min(h - 1);
            (*f.get(x, lo), *f.get(x, hi), (hi - lo) as f64)
        };
        if span == 0.0 {
            0.0
        } else {
            (hi - lo) / span
        }
    };

    for y in 0..h {
        for x in 0..w {
            let sxu = 1.0 - diff(dx_plane, x, y, true);
            let sxv = -diff(dx_plane, x, y, false);
            let syu = -diff(dy_plane, x, y, true);
            let syv = 1.0 - diff(dy_plane, x, y, false);
            let det = (sxu * syv - sxv * syu).abs();
            out.set(x + 1, y + 1, det)?;
        }
    }

    crate::flops::add_flops((w * h) as u64);
    Ok(())
}

/// Polynomial variant of [`fill_jacobian`]: partials come from the
/// polynomials' `derivative(axis)` evaluators.
pub fn fill_jacobian_polynomial(
    out: &mut PixelBuffer,
    poly_x: &dyn Polynomial2D,
    poly_y: &dyn Polynomial2D,
) -> ImageResult<()> {
    check_jacobian_out(out)?;

    let px_u = poly_x.derivative(Axis::X);
    let px_v = poly_x.derivative(Axis::Y);
    let py_u = poly_y.derivative(Axis::X);
    let py_v = poly_y.derivative(Axis::Y);

    let (w, h) = (out.width(), out.height());
    for y in 1..=h {
        for x in 1..=w {
            let (u, v) = (x as f64, y as f64);
            let det =
                (px_u.eval(u, v) * py_v.eval(u, v) - px_v.eval(u, v) * py_u.eval(u, v)).abs();
            out.set(x, y, det)?;
        }
    }

    crate::flops::add_flops((w * h) as u64);
    Ok(())
}
