//! Lumen - pixel-kind-generic 2D image engine.
//!
//! This library provides the numeric core of a scientific image pipeline:
//! - Elementwise arithmetic over five pixel kinds with bad-pixel-mask
//!   propagation
//! - Geometric transforms (extract, paste, rotate, flip, shift, tile
//!   permutation, rebinning, subsampling)
//! - Kernel-weighted resampling with per-pixel confidence scores
//! - Row/column reductions by sum and trimmed median
//! - An in-place multi-dimensional radix-2 FFT
//!
//! # Quick Start
//!
//! ```rust
//! use lumen::prelude::*;
//!
//! let flat = PixelBuffer::wrap(2, 2, vec![2.0f32, 2.0, 2.0, 2.0])?;
//! let mut light = PixelBuffer::wrap(2, 2, vec![8.0f32, 6.0, 4.0, 2.0])?;
//!
//! // Flat-field division; zero divisors would be masked, not fatal.
//! light.div_assign(&flat)?;
//! assert_eq!(light.get(1, 1)?, 4.0);
//! # Ok::<(), lumen::ImageError>(())
//! ```
//!
//! Coordinates follow the FITS convention throughout: 1-based, pixel (1,1)
//! at the lower-left. Buffers either carry no mask ("all pixels valid") or
//! exclusively own one of matching dimensions; masks appear lazily on the
//! first rejection and travel through every transform.

mod arithmetic;
mod error;
mod flops;
mod fourier;
mod geometry;
mod image;
mod kind;
mod mask;
mod plane;
mod reduce;
mod resample;
mod stats;

pub mod prelude;

// ============================================================================
// Core types
// ============================================================================

pub use error::{ImageError, ImageResult};
pub use image::{PixelBuffer, PixelData};
pub use kind::{Pixel, PixelKind};
pub use mask::Mask;
pub use plane::Plane;

// ============================================================================
// Arithmetic
// ============================================================================

pub use arithmetic::NormalizeMode;

// ============================================================================
// Geometry
// ============================================================================

pub use geometry::FlipAxis;

// ============================================================================
// Resampling
// ============================================================================

pub use resample::{
    fill_jacobian, fill_jacobian_polynomial, interpolate, kernels, warp, warp_polynomial, Axis,
    KernelProfile, Poly2, Polynomial2D,
};

// ============================================================================
// Reductions
// ============================================================================

pub use reduce::CollapseDirection;

// ============================================================================
// Fourier
// ============================================================================

pub use fourier::{fft, fft_image, FftOptions};

// ============================================================================
// Statistics collaborator and instrumentation
// ============================================================================

pub use stats::{aggregates, Aggregates};

#[cfg(feature = "flop-count")]
pub use flops::{flop_count, reset_flop_count};
