//! In-place multi-dimensional radix-2 FFT.
//!
//! The raw transform works on a split real/imaginary pair of flattened
//! row-major arrays and applies no normalization: a forward pass followed
//! by an inverse pass multiplies every element by the product of the
//! dimensions. The image-level wrapper divides that product back out on the
//! inverse direction unless the caller opts out, and can center the DC term
//! by swapping quadrant tiles.

use num_complex::Complex;
use std::f64::consts::PI;

use crate::error::{ImageError, ImageResult};
use crate::image::PixelBuffer;
use crate::kind::PixelKind;

#[cfg(test)]
mod tests;

/// Options for [`fft_image`].
#[derive(Debug, Clone, Copy)]
pub struct FftOptions {
    /// Divide by the product of the dimensions on the inverse transform.
    pub normalize: bool,
    /// Swap quadrant halves (tile permutation {4,3,2,1}) so the DC term
    /// sits at the center: after a forward transform, before an inverse
    /// one.
    pub swap_quadrants: bool,
}

impl Default for FftOptions {
    fn default() -> Self {
        Self {
            normalize: true,
            swap_quadrants: false,
        }
    }
}

/// In-place radix-2 Cooley-Tukey on one gathered line.
///
/// `sign` is +1 for the forward transform (negative twiddle exponent) and
/// -1 for the inverse.
fn fft_line(data: &mut [Complex<f64>], sign: i32) {
    let n = data.len();
    debug_assert!(n.is_power_of_two());
    if n <= 1 {
        return;
    }

    // Bit-reversal permutation.
    let mut j = 0usize;
    for i in 1..n {
        let mut bit = n >> 1;
        while j & bit != 0 {
            j ^= bit;
            bit >>= 1;
        }
        j ^= bit;
        if i < j {
            data.swap(i, j);
        }
    }

    // Butterfly stages.
    let dir = -sign as f64;
    let mut len = 2;
    while len <= n {
        let half = len / 2;
        let angle_step = dir * PI / half as f64;
        for start in (0..n).step_by(len) {
            for k in 0..half {
                let angle = angle_step * k as f64;
                let w = Complex::new(angle.cos(), angle.sin());
                let u = data[start + k];
                let v = data[start + k + half] * w;
                data[start + k] = u + v;
                data[start + k + half] = u - v;
            }
        }
        len <<= 1;
    }
}

/// In-place N-dimensional FFT over a split real/imaginary pair.
///
/// `dims` are slowest-first (row-major); every dimension must be a power of
/// two. `sign` is +1 forward, -1 inverse; no normalization is applied in
/// either direction.
pub fn fft(real: &mut [f64], imag: &mut [f64], dims: &[usize], sign: i32) -> ImageResult<()> {
    if sign != 1 && sign != -1 {
        return Err(ImageError::UnsupportedMode(format!("fft sign {sign}")));
    }
    if dims.is_empty() {
        return Err(ImageError::illegal("fft needs at least one dimension".to_string()));
    }
    for &d in dims {
        if !d.is_power_of_two() {
            return Err(ImageError::illegal(format!(
                "fft dimension {d} is not a power of two"
            )));
        }
    }
    let total: usize = dims.iter().product();
    if real.len() != total || imag.len() != total {
        return Err(ImageError::illegal(format!(
            "fft data length {}/{} does not match dimensions (need {total})",
            real.len(),
            imag.len()
        )));
    }

    // Transform along each axis in turn, gathering strided lines through a
    // scratch buffer.
    for (axis, &len) in dims.iter().enumerate() {
        if len <= 1 {
            continue;
        }
        let stride: usize = dims[axis + 1..].iter().product();
        let block = stride * len;
        let mut line = vec![Complex::new(0.0, 0.0); len];

        for base in (0..total).step_by(block) {
            for offset in 0..stride {
                let start = base + offset;
                for (k, slot) in line.iter_mut().enumerate() {
                    let idx = start + k * stride;
                    *slot = Complex::new(real[idx], imag[idx]);
                }

                fft_line(&mut line, sign);

                for (k, slot) in line.iter().enumerate() {
                    let idx = start + k * stride;
                    real[idx] = slot.re;
                    imag[idx] = slot.im;
                }
            }
        }
    }

    crate::flops::add_flops((total as u64) * (total as u64).ilog2() as u64);

    Ok(())
}

fn check_fft_plane(img: &PixelBuffer) -> ImageResult<()> {
    if img.kind() != PixelKind::Float64 {
        return Err(ImageError::InvalidType(img.kind(), "fft_image"));
    }
    if !img.width().is_power_of_two() || !img.height().is_power_of_two() {
        return Err(ImageError::illegal(format!(
            "fft image dimensions {}x{} must be powers of two",
            img.width(),
            img.height()
        )));
    }
    Ok(())
}

/// Image-level FFT over a real/imaginary plane pair.
///
/// Both planes must be Float64 with identical power-of-two dimensions. The
/// inverse direction divides by `nx * ny` unless `options.normalize` is
/// off; `options.swap_quadrants` recenters the spectrum with a four-tile
/// permutation after a forward transform (and undoes it before an inverse
/// one).
pub fn fft_image(
    real: &mut PixelBuffer,
    imag: &mut PixelBuffer,
    sign: i32,
    options: &FftOptions,
) -> ImageResult<()> {
    check_fft_plane(real)?;
    check_fft_plane(imag)?;
    if real.width() != imag.width() || real.height() != imag.height() {
        return Err(ImageError::IncompatibleInput(
            real.width(),
            real.height(),
            imag.width(),
            imag.height(),
        ));
    }
    if sign != 1 && sign != -1 {
        return Err(ImageError::UnsupportedMode(format!("fft sign {sign}")));
    }

    let (nx, ny) = (real.width(), real.height());

    if options.swap_quadrants && sign == -1 {
        real.move_tiles(2, &[4, 3, 2, 1])?;
        imag.move_tiles(2, &[4, 3, 2, 1])?;
    }

    {
        // Planes are row-major with y slow, x fast, matching `dims`.
        let dims = [ny, nx];
        let re = real.as_f64_mut().expect("kind checked");
        let im = imag.as_f64_mut().expect("kind checked");
        fft(re.as_mut_slice(), im.as_mut_slice(), &dims, sign)?;
    }

    if sign == -1 && options.normalize {
        let scale = 1.0 / (nx * ny) as f64;
        real.mul_scalar(scale)?;
        imag.mul_scalar(scale)?;
    }

    if options.swap_quadrants && sign == 1 {
        real.move_tiles(2, &[4, 3, 2, 1])?;
        imag.move_tiles(2, &[4, 3, 2, 1])?;
    }

    Ok(())
}
