//! Prelude module for convenient imports.
//!
//! Re-exports the most commonly used types and functions.
//!
//! # Usage
//!
//! ```rust,ignore
//! use lumen::prelude::*;
//! ```

// Core types
pub use crate::{ImageError, ImageResult, Mask, PixelBuffer, PixelKind};

// Arithmetic and reductions
pub use crate::{CollapseDirection, NormalizeMode};

// Geometry
pub use crate::FlipAxis;

// Resampling
pub use crate::{
    fill_jacobian, fill_jacobian_polynomial, interpolate, warp, warp_polynomial, KernelProfile,
    Poly2, Polynomial2D,
};

// Fourier
pub use crate::{fft, fft_image, FftOptions};

// Statistics collaborator
pub use crate::{aggregates, Aggregates};
