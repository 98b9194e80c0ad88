//! Aggregate statistics over the valid pixels of a buffer.
//!
//! This is the collaborator surface `normalize` and the flux-correction
//! helpers consume: extremal values and sums only. Full statistical
//! estimator suites live outside the engine.

use crate::error::{ImageError, ImageResult};
use crate::image::PixelBuffer;

/// Scalar aggregates of a buffer's good pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aggregates {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub sum: f64,
    pub abs_sum: f64,
}

/// Compute min/max/mean/sum/abs-sum over the good pixels of `image`.
///
/// Bad pixels are skipped entirely. Fails with `DataNotFound` when no good
/// pixel exists, and with `InvalidType` for complex kinds (extrema need an
/// ordering).
pub fn aggregates(image: &PixelBuffer) -> ImageResult<Aggregates> {
    if image.kind().is_complex() {
        return Err(ImageError::InvalidType(image.kind(), "aggregates"));
    }

    let data = image.data();
    let mask = image.mask();

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    let mut abs_sum = 0.0;
    let mut count = 0usize;

    for idx in 0..data.len() {
        if mask.map(|m| m.get(idx)).unwrap_or(false) {
            continue;
        }
        let v = data.get_c64(idx).re;
        min = min.min(v);
        max = max.max(v);
        sum += v;
        abs_sum += v.abs();
        count += 1;
    }

    if count == 0 {
        return Err(ImageError::DataNotFound);
    }

    crate::flops::add_flops(2 * count as u64);

    Ok(Aggregates {
        min,
        max,
        mean: sum / count as f64,
        sum,
        abs_sum,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::PixelKind;

    #[test]
    fn aggregates_of_simple_image() {
        let img = PixelBuffer::wrap(2, 2, vec![-1.0f64, 2.0, 3.0, 4.0]).unwrap();
        let agg = aggregates(&img).unwrap();
        assert_eq!(agg.min, -1.0);
        assert_eq!(agg.max, 4.0);
        assert_eq!(agg.sum, 8.0);
        assert_eq!(agg.abs_sum, 10.0);
        assert_eq!(agg.mean, 2.0);
    }

    #[test]
    fn bad_pixels_are_skipped() {
        let mut img = PixelBuffer::wrap(2, 2, vec![100.0f64, 2.0, 3.0, 4.0]).unwrap();
        img.reject(1, 1).unwrap();
        let agg = aggregates(&img).unwrap();
        assert_eq!(agg.max, 4.0);
        assert_eq!(agg.sum, 9.0);
        assert_eq!(agg.mean, 3.0);
    }

    #[test]
    fn all_bad_fails() {
        let mut img = PixelBuffer::new(1, 2, PixelKind::Float32).unwrap();
        img.reject(1, 1).unwrap();
        img.reject(1, 2).unwrap();
        assert_eq!(aggregates(&img), Err(ImageError::DataNotFound));
    }

    #[test]
    fn complex_kind_rejected() {
        let img = PixelBuffer::new(2, 2, PixelKind::Complex64).unwrap();
        assert_eq!(
            aggregates(&img),
            Err(ImageError::InvalidType(PixelKind::Complex64, "aggregates"))
        );
    }
}
