//! Row/column reductions: windowed sums and trimmed medians.
//!
//! Sum collapses follow the optimistic bad-pixel policy: a position with
//! some bad contributors is rescaled by `total / good` to approximate the
//! full-window sum from the surviving sample. That rescaling is an
//! approximation, reproduced as-is for compatibility. Only an all-bad line
//! position is rejected outright.

use num_complex::Complex;
use strum_macros::Display;

use crate::error::{ImageError, ImageResult};
use crate::image::{PixelBuffer, PixelData};
use crate::mask::Mask;


/// Collapse axis selector.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum CollapseDirection {
    /// Sum across rows: every window column collapses into one output row.
    Vertical,
    /// Sum across columns: every window row collapses into one output
    /// column.
    Horizontal,
}

/// Median of an already sorted, non-empty slice: the central value, or the
/// mean of the two central values for even lengths.
fn median_of_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        0.5 * (sorted[n / 2 - 1] + sorted[n / 2])
    }
}

impl PixelBuffer {
    /// Collapse the 1-based inclusive window by summation along the chosen
    /// direction.
    ///
    /// A position whose contributors are all bad becomes 0 and is marked
    /// bad; a partially bad position is rescaled by `total / good`.
    pub fn collapse(
        &self,
        direction: CollapseDirection,
        llx: usize,
        lly: usize,
        urx: usize,
        ury: usize,
    ) -> ImageResult<PixelBuffer> {
        let (nx, ny) = (self.width(), self.height());
        if llx < 1 || lly < 1 || urx > nx || ury > ny || llx > urx || lly > ury {
            return Err(ImageError::illegal(format!(
                "window ({llx},{lly})-({urx},{ury}) invalid for {nx}x{ny} image"
            )));
        }

        let win_w = urx - llx + 1;
        let win_h = ury - lly + 1;
        let (out_w, out_h, lines, line_len) = match direction {
            CollapseDirection::Vertical => (win_w, 1, win_w, win_h),
            CollapseDirection::Horizontal => (1, win_h, win_h, win_w),
        };

        let mask = self.mask();
        let mut values = Vec::with_capacity(lines);
        let mut bad_lines: Vec<usize> = Vec::new();

        for line in 0..lines {
            let mut sum = Complex::new(0.0, 0.0);
            let mut good = 0usize;

            for k in 0..line_len {
                // 0-based source coordinates of the k-th contributor.
                let (x, y) = match direction {
                    CollapseDirection::Vertical => (llx - 1 + line, lly - 1 + k),
                    CollapseDirection::Horizontal => (llx - 1 + k, lly - 1 + line),
                };
                if mask.map(|m| m.get_xy(x, y)).unwrap_or(false) {
                    continue;
                }
                sum += self.data().get_c64(y * nx + x);
                good += 1;
            }

            if good == 0 {
                values.push(Complex::new(0.0, 0.0));
                bad_lines.push(line);
            } else if good < line_len {
                values.push(sum * (line_len as f64 / good as f64));
            } else {
                values.push(sum);
            }
        }

        crate::flops::add_flops((lines * line_len) as u64);

        let data = PixelData::from_c64_slice(self.kind(), out_w, out_h, &values);
        let out_mask = if bad_lines.is_empty() {
            None
        } else {
            let mut m = Mask::new(out_w, out_h);
            for line in bad_lines {
                m.set(line, true);
            }
            Some(m)
        };

        Ok(PixelBuffer::from_data(data, out_mask))
    }

    /// Collapse the whole image by a trimmed median along the chosen
    /// direction.
    ///
    /// Per line, bad pixels are discarded, the remainder is sorted and
    /// `drop_low`/`drop_high` values are trimmed from the ends before
    /// taking the median. A line with no surviving value is marked bad;
    /// when every line dies the call fails with `DataNotFound`.
    pub fn collapse_median(
        &self,
        direction: CollapseDirection,
        drop_low: usize,
        drop_high: usize,
    ) -> ImageResult<PixelBuffer> {
        if self.kind().is_complex() {
            return Err(ImageError::InvalidType(self.kind(), "collapse_median"));
        }

        let (nx, ny) = (self.width(), self.height());
        let (out_w, out_h, lines, line_len) = match direction {
            CollapseDirection::Vertical => (nx, 1, nx, ny),
            CollapseDirection::Horizontal => (1, ny, ny, nx),
        };

        let mask = self.mask();
        let mut values = Vec::with_capacity(lines);
        let mut bad_lines: Vec<usize> = Vec::new();
        let mut line_buf: Vec<f64> = Vec::with_capacity(line_len);

        for line in 0..lines {
            line_buf.clear();
            for k in 0..line_len {
                let (x, y) = match direction {
                    CollapseDirection::Vertical => (line, k),
                    CollapseDirection::Horizontal => (k, line),
                };
                if mask.map(|m| m.get_xy(x, y)).unwrap_or(false) {
                    continue;
                }
                line_buf.push(self.data().get_c64(y * nx + x).re);
            }

            if line_buf.len() <= drop_low + drop_high {
                values.push(Complex::new(0.0, 0.0));
                bad_lines.push(line);
                continue;
            }

            line_buf.sort_unstable_by(|a, b| a.partial_cmp(b).expect("pixel is not NaN"));
            let kept = &line_buf[drop_low..line_buf.len() - drop_high];
            values.push(Complex::new(median_of_sorted(kept), 0.0));
        }

        if bad_lines.len() == lines {
            return Err(ImageError::DataNotFound);
        }

        tracing::debug!(
            lines,
            rejected = bad_lines.len(),
            "median collapse finished"
        );

        let data = PixelData::from_c64_slice(self.kind(), out_w, out_h, &values);
        let out_mask = if bad_lines.is_empty() {
            None
        } else {
            let mut m = Mask::new(out_w, out_h);
            for line in bad_lines {
                m.set(line, true);
            }
            Some(m)
        };

        Ok(PixelBuffer::from_data(data, out_mask))
    }
}
