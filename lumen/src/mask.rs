//! Bad-pixel map with word-packed bulk algebra.
//!
//! One bit per pixel, `0` = good, `1` = bad/rejected, packed LSB-first into
//! `u64` words. The bitwise operators run word-at-a-time; results are
//! bit-identical to a per-element loop, including the partial last word.

use crate::error::{ImageError, ImageResult};

/// Number of bits per storage word.
const BITS_PER_WORD: usize = 64;

/// A bad-pixel map.
///
/// Dimensions always match the owning pixel buffer when attached. The slack
/// bits of the last word are kept zero so that word-level equality, counting
/// and negation need no special casing beyond the tail re-zeroing in
/// [`Mask::not_assign`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    words: Vec<u64>,
    width: usize,
    height: usize,
    len: usize,
}

impl Mask {
    /// Create an all-good mask.
    pub fn new(width: usize, height: usize) -> Self {
        let len = width * height;
        Self {
            words: vec![0u64; len.div_ceil(BITS_PER_WORD)],
            width,
            height,
            len,
        }
    }

    /// Build from one boolean per pixel, row-major.
    pub fn from_slice(width: usize, height: usize, bad: &[bool]) -> Self {
        let len = width * height;
        assert_eq!(bad.len(), len, "mask data length must equal width * height");

        let mut mask = Self::new(width, height);
        for (i, &b) in bad.iter().enumerate() {
            if b {
                mask.set(i, true);
            }
        }
        mask
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bad-bit at a linear index.
    #[inline]
    pub fn get(&self, idx: usize) -> bool {
        debug_assert!(idx < self.len);
        (self.words[idx / BITS_PER_WORD] >> (idx % BITS_PER_WORD)) & 1 != 0
    }

    /// Set the bad-bit at a linear index.
    #[inline]
    pub fn set(&mut self, idx: usize, bad: bool) {
        debug_assert!(idx < self.len);
        let word = idx / BITS_PER_WORD;
        let bit = idx % BITS_PER_WORD;
        if bad {
            self.words[word] |= 1u64 << bit;
        } else {
            self.words[word] &= !(1u64 << bit);
        }
    }

    /// Bad-bit at 0-based `(x, y)`.
    #[inline]
    pub fn get_xy(&self, x: usize, y: usize) -> bool {
        debug_assert!(x < self.width && y < self.height);
        self.get(y * self.width + x)
    }

    /// Set the bad-bit at 0-based `(x, y)`.
    #[inline]
    pub fn set_xy(&mut self, x: usize, y: usize, bad: bool) {
        debug_assert!(x < self.width && y < self.height);
        self.set(y * self.width + x, bad);
    }

    /// Number of bad pixels.
    #[inline]
    pub fn count_bad(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// True when no pixel is rejected.
    ///
    /// An all-good mask may legitimately stay materialized; callers never
    /// collapse it back to "no mask".
    #[inline]
    pub fn is_all_good(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Mark every pixel good or bad.
    pub fn fill(&mut self, bad: bool) {
        self.words.fill(if bad { !0u64 } else { 0u64 });
        if bad {
            self.zero_tail();
        }
    }

    /// Mask of the valid bits in the last word.
    #[inline]
    fn tail_mask(&self) -> u64 {
        let rem = self.len % BITS_PER_WORD;
        if rem == 0 {
            !0u64
        } else {
            (1u64 << rem) - 1
        }
    }

    /// Re-zero the slack bits of the last word.
    #[inline]
    fn zero_tail(&mut self) {
        let tail = self.tail_mask();
        if let Some(last) = self.words.last_mut() {
            *last &= tail;
        }
    }

    fn check_compatible(&self, other: &Mask) -> ImageResult<()> {
        if self.width != other.width || self.height != other.height {
            return Err(ImageError::IncompatibleInput(
                self.width,
                self.height,
                other.width,
                other.height,
            ));
        }
        Ok(())
    }

    /// Word-at-a-time binary kernel shared by the create and assign forms.
    #[inline]
    fn zip_assign(&mut self, other: &Mask, op: impl Fn(u64, u64) -> u64) {
        for (a, &b) in self.words.iter_mut().zip(other.words.iter()) {
            *a = op(*a, b);
        }
        self.zero_tail();
    }

    pub fn and_assign(&mut self, other: &Mask) -> ImageResult<()> {
        self.check_compatible(other)?;
        self.zip_assign(other, |a, b| a & b);
        Ok(())
    }

    pub fn or_assign(&mut self, other: &Mask) -> ImageResult<()> {
        self.check_compatible(other)?;
        self.zip_assign(other, |a, b| a | b);
        Ok(())
    }

    pub fn xor_assign(&mut self, other: &Mask) -> ImageResult<()> {
        self.check_compatible(other)?;
        self.zip_assign(other, |a, b| a ^ b);
        Ok(())
    }

    pub fn not_assign(&mut self) {
        for w in self.words.iter_mut() {
            *w = !*w;
        }
        self.zero_tail();
    }

    pub fn and(&self, other: &Mask) -> ImageResult<Mask> {
        let mut out = self.clone();
        out.and_assign(other)?;
        Ok(out)
    }

    pub fn or(&self, other: &Mask) -> ImageResult<Mask> {
        let mut out = self.clone();
        out.or_assign(other)?;
        Ok(out)
    }

    pub fn xor(&self, other: &Mask) -> ImageResult<Mask> {
        let mut out = self.clone();
        out.xor_assign(other)?;
        Ok(out)
    }

    pub fn not(&self) -> Mask {
        let mut out = self.clone();
        out.not_assign();
        out
    }

    /// Scalar form: combine every bit with one boolean.
    #[inline]
    fn scalar_assign(&mut self, value: bool, op: impl Fn(u64, u64) -> u64) {
        let v = if value { !0u64 } else { 0u64 };
        for w in self.words.iter_mut() {
            *w = op(*w, v);
        }
        self.zero_tail();
    }

    pub fn and_scalar_assign(&mut self, value: bool) {
        self.scalar_assign(value, |a, b| a & b);
    }

    pub fn or_scalar_assign(&mut self, value: bool) {
        self.scalar_assign(value, |a, b| a | b);
    }

    pub fn xor_scalar_assign(&mut self, value: bool) {
        self.scalar_assign(value, |a, b| a ^ b);
    }

    /// Extract the 0-based inclusive sub-rectangle `[x0..=x1] x [y0..=y1]`.
    ///
    /// Bounds are the caller's responsibility; geometry validates windows
    /// before touching the mask.
    pub fn extract(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> Mask {
        debug_assert!(x0 <= x1 && x1 < self.width);
        debug_assert!(y0 <= y1 && y1 < self.height);

        let mut out = Mask::new(x1 - x0 + 1, y1 - y0 + 1);
        for y in y0..=y1 {
            for x in x0..=x1 {
                if self.get_xy(x, y) {
                    out.set_xy(x - x0, y - y0, true);
                }
            }
        }
        out
    }

    /// Union `src` into `self` with its origin at 0-based `(x0, y0)`,
    /// clipping whatever extends past the bounds.
    pub fn union_at(&mut self, src: &Mask, x0: isize, y0: isize) {
        for sy in 0..src.height {
            let dy = y0 + sy as isize;
            if dy < 0 || dy >= self.height as isize {
                continue;
            }
            for sx in 0..src.width {
                let dx = x0 + sx as isize;
                if dx < 0 || dx >= self.width as isize {
                    continue;
                }
                if src.get_xy(sx, sy) {
                    self.set_xy(dx as usize, dy as usize, true);
                }
            }
        }
    }
}
